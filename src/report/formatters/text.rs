use super::{utils, ReportFormatter};
use crate::infrastructure::error::Result;
use crate::models::{Annotation, AnnotationLevel, Conclusion, DiagnosticReport};

/// 文本格式化器
pub struct TextFormatter {
    use_colors: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFormatter {
    /// 创建新的文本格式化器
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// 创建不使用颜色的文本格式化器
    pub fn new_no_color() -> Self {
        Self { use_colors: false }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.use_colors {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    /// 格式化级别
    fn format_level(&self, level: AnnotationLevel, width: usize) -> String {
        let label = format!("{:<width$}", utils::level_label(level), width = width);
        match level {
            AnnotationLevel::Failure => self.paint(&label, "31"), // 红色
            AnnotationLevel::Warning => self.paint(&label, "33"), // 黄色
            AnnotationLevel::Notice => self.paint(&label, "36"),  // 青色
        }
    }

    /// 按文件分组渲染 lint 结果，格式接近 ESLint 的 stylish
    ///
    /// 没有任何发现时返回空字符串。
    pub fn stylish(&self, annotations: &[Annotation]) -> String {
        if annotations.is_empty() {
            return String::new();
        }

        // 保持首次出现的文件顺序
        let mut files: Vec<(&str, Vec<&Annotation>)> = Vec::new();
        for annotation in annotations {
            match files.iter().position(|(path, _)| *path == annotation.path()) {
                Some(index) => files[index].1.push(annotation),
                None => files.push((annotation.path(), vec![annotation])),
            }
        }

        let mut content = String::new();
        for (path, group) in &files {
            content.push('\n');
            content.push_str(&self.paint(path, "4"));
            content.push('\n');

            let positions: Vec<String> = group.iter().map(|a| position(a)).collect();
            let position_width = positions.iter().map(|p| p.len()).max().unwrap_or(0);
            let level_width = group
                .iter()
                .map(|a| utils::level_label(a.level()).len())
                .max()
                .unwrap_or(0);

            for (annotation, position) in group.iter().zip(&positions) {
                let mut line = format!(
                    "  {:>pw$}  {}  {}",
                    position,
                    self.format_level(annotation.level(), level_width),
                    annotation.message().replace('\n', " "),
                    pw = position_width
                );
                if let Some(title) = annotation.title() {
                    line.push_str("  ");
                    line.push_str(&self.paint(title, "2"));
                }
                content.push_str(line.trim_end());
                content.push('\n');
            }
        }

        let errors = annotations.iter().filter(|a| a.is_failure()).count();
        let warnings = annotations.iter().filter(|a| a.is_warning()).count();
        let footer = format!(
            "✖ {} ({}, {})",
            utils::pluralize("problem", annotations.len()),
            utils::pluralize("error", errors),
            utils::pluralize("warning", warnings)
        );

        content.push('\n');
        content.push_str(&self.paint(&footer, if errors > 0 { "31;1" } else { "33;1" }));
        content.push('\n');
        content
    }
}

fn position(annotation: &Annotation) -> String {
    match annotation.start_column() {
        Some(column) => format!("{}:{}", annotation.start_line(), column),
        None => annotation.start_line().to_string(),
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, name: &str, report: &DiagnosticReport, conclusion: Conclusion) -> Result<String> {
        let mut content = String::new();

        if !report.console_output.trim().is_empty() {
            content.push_str(report.console_output.trim_end());
            content.push_str("\n\n");
        }

        content.push_str(&format!("{}: {}\n", name, report.summary()));

        let verdict = match conclusion {
            Conclusion::Success => self.paint("success", "32"),
            Conclusion::Failure => self.paint("failure", "31"),
        };
        content.push_str(&format!("Conclusion: {}\n", verdict));

        Ok(content)
    }

    fn name(&self) -> &str {
        "text"
    }
}
