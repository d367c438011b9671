//! 注解路径改写：把分析工具给出的路径改成相对于仓库根目录的路径。

use std::path::{Component, Path, PathBuf};

/// 把 `path` 改写成相对 `root` 的 `/` 分隔路径
///
/// 相对路径按相对于 `root` 解释，所以对已经改写过的路径再次调用结果不变。
/// 路径落在仓库之外（或就是仓库根本身）时返回 `None`。
pub fn relative_to_root(path: &str, root: &Path) -> Option<String> {
    let candidate = Path::new(path);
    let absolute = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let normalized_root = normalize(root);
    if let Some(relative) = strip_root(&normalize(&absolute), &normalized_root) {
        return Some(relative);
    }

    // 符号链接（例如 macOS 上的 /var 与 /private/var）只能靠真实路径比较
    let real_path = absolute.canonicalize().ok()?;
    let real_root = root.canonicalize().ok()?;
    strip_root(&real_path, &real_root)
}

/// 纯词法规范化：去掉 `.`，折叠 `..`
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn strip_root(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
