pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::infrastructure::error::Result;
use crate::models::{Conclusion, DiagnosticReport};

/// 报告格式化器 trait
pub trait ReportFormatter: Send + Sync {
    /// 格式化一次分析的报告与结论
    fn format(&self, name: &str, report: &DiagnosticReport, conclusion: Conclusion) -> Result<String>;

    /// 获取格式化器名称
    fn name(&self) -> &str;
}

/// 格式化辅助函数
pub mod utils {
    use crate::models::AnnotationLevel;

    /// 控制台输出里使用的级别名称，与 lint 工具保持一致
    pub fn level_label(level: AnnotationLevel) -> &'static str {
        match level {
            AnnotationLevel::Failure => "error",
            AnnotationLevel::Warning => "warning",
            AnnotationLevel::Notice => "info",
        }
    }

    /// `1 problem` / `2 problems`
    pub fn pluralize(word: &str, count: usize) -> String {
        if count == 1 {
            format!("{} {}", count, word)
        } else {
            format!("{} {}s", count, word)
        }
    }
}
