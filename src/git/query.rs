use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::infrastructure::error::{CheckError, Result};

/// 仓库信息查询接口
///
/// 检查运行只需要两样东西：项目所在仓库的根目录，以及该仓库的 HEAD 提交。
#[async_trait]
pub trait RepositoryQuery: Send + Sync {
    /// 返回包含 `path` 的仓库根目录（绝对路径）
    async fn repository_root_for(&self, path: &Path) -> Result<PathBuf>;

    /// 返回 `dir` 所在仓库的 HEAD 提交 sha
    async fn head_commit_of(&self, dir: &Path) -> Result<String>;
}

/// 基于 git 命令行的实现
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn rev_parse(&self, cwd: &Path, arg: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .args(["rev-parse", arg])
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| CheckError::git(format!("Failed to run git rev-parse {}: {}", arg, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CheckError::git(format!(
                "git rev-parse {} failed in {}: {}",
                arg,
                cwd.display(),
                stderr.trim()
            )));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(CheckError::git(format!(
                "git rev-parse {} returned nothing in {}",
                arg,
                cwd.display()
            )));
        }

        Ok(value)
    }
}

/// git 命令的工作目录：文件取其父目录，目录取自身
pub fn working_dir_for(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[async_trait]
impl RepositoryQuery for GitCli {
    async fn repository_root_for(&self, path: &Path) -> Result<PathBuf> {
        let cwd = working_dir_for(path);
        if !cwd.exists() {
            return Err(CheckError::git(format!("Directory does not exist: {}", cwd.display())));
        }

        let root = self.rev_parse(&cwd, "--show-toplevel").await?;
        tracing::debug!(root = %root, path = %path.display(), "resolved repository root");
        Ok(PathBuf::from(root))
    }

    async fn head_commit_of(&self, dir: &Path) -> Result<String> {
        self.rev_parse(dir, "HEAD").await
    }
}
