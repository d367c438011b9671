use serde::{Deserialize, Serialize};

/// 分析工具消息为空时使用的占位文本
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "No message provided.";

/// 注解级别，与 GitHub Checks API 的 `annotation_level` 一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Notice,
    Warning,
    Failure,
}

impl AnnotationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationLevel::Notice => "notice",
            AnnotationLevel::Warning => "warning",
            AnnotationLevel::Failure => "failure",
        }
    }
}

impl std::fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个文件位置上的诊断
///
/// 字段私有，只能通过构造器修改，所以下面两条约束总是成立：
/// - `end_line >= start_line >= 1`
/// - 只有 `start_line == end_line` 时才带列号（API 不支持跨行列范围）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    path: String,
    start_line: u32,
    end_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<u32>,
    annotation_level: AnnotationLevel,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Annotation {
    /// 创建注解，默认位于第 1 行
    pub fn new(path: impl Into<String>, level: AnnotationLevel, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            EMPTY_MESSAGE_PLACEHOLDER.to_string()
        } else {
            message
        };

        Self {
            path: path.into(),
            start_line: 1,
            end_line: 1,
            start_column: None,
            end_column: None,
            annotation_level: level,
            message,
            title: None,
        }
    }

    /// 设置 1-based 行范围；0 或缺失视为第 1 行，缺失的结束行等于起始行
    pub fn with_lines(mut self, start: Option<u32>, end: Option<u32>) -> Self {
        let start = coerce_line(start);
        let end = end.map(|e| coerce_line(Some(e))).unwrap_or(start).max(start);

        self.start_line = start;
        self.end_line = end;
        if start != end {
            self.start_column = None;
            self.end_column = None;
        }
        self
    }

    /// 设置 1-based 列范围，跨行注解会忽略列号
    pub fn with_columns(mut self, start: Option<u32>, end: Option<u32>) -> Self {
        if self.start_line != self.end_line {
            return self;
        }

        match start {
            Some(start) => {
                let start = start.max(1);
                let end = end.map(|e| e.max(start)).unwrap_or(start);
                self.start_column = Some(start);
                self.end_column = Some(end);
            }
            None => {
                self.start_column = None;
                self.end_column = None;
            }
        }
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    /// 替换路径，其余字段保持不变
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn start_column(&self) -> Option<u32> {
        self.start_column
    }

    pub fn end_column(&self) -> Option<u32> {
        self.end_column
    }

    pub fn level(&self) -> AnnotationLevel {
        self.annotation_level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.annotation_level == AnnotationLevel::Failure
    }

    pub fn is_warning(&self) -> bool {
        self.annotation_level == AnnotationLevel::Warning
    }
}

fn coerce_line(line: Option<u32>) -> u32 {
    match line {
        Some(0) | None => 1,
        Some(line) => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location() {
        let annotation = Annotation::new("/repo/src/a.ts", AnnotationLevel::Warning, "unused");
        assert_eq!(annotation.start_line(), 1);
        assert_eq!(annotation.end_line(), 1);
        assert_eq!(annotation.start_column(), None);
        assert_eq!(annotation.end_column(), None);
        assert_eq!(annotation.title(), None);
    }

    #[test]
    fn test_zero_and_missing_lines_become_one() {
        let a = Annotation::new("a.ts", AnnotationLevel::Notice, "m").with_lines(Some(0), Some(0));
        assert_eq!((a.start_line(), a.end_line()), (1, 1));

        let a = Annotation::new("a.ts", AnnotationLevel::Notice, "m").with_lines(None, None);
        assert_eq!((a.start_line(), a.end_line()), (1, 1));

        let a = Annotation::new("a.ts", AnnotationLevel::Notice, "m").with_lines(Some(7), None);
        assert_eq!((a.start_line(), a.end_line()), (7, 7));
    }

    #[test]
    fn test_end_line_never_before_start_line() {
        let a = Annotation::new("a.ts", AnnotationLevel::Failure, "m").with_lines(Some(10), Some(3));
        assert_eq!((a.start_line(), a.end_line()), (10, 10));
    }

    #[test]
    fn test_columns_only_on_single_line() {
        let single = Annotation::new("a.ts", AnnotationLevel::Failure, "m")
            .with_lines(Some(4), Some(4))
            .with_columns(Some(2), Some(9));
        assert_eq!(single.start_column(), Some(2));
        assert_eq!(single.end_column(), Some(9));

        let multi = Annotation::new("a.ts", AnnotationLevel::Failure, "m")
            .with_lines(Some(4), Some(6))
            .with_columns(Some(2), Some(9));
        assert_eq!(multi.start_column(), None);
        assert_eq!(multi.end_column(), None);
    }

    #[test]
    fn test_widening_lines_drops_columns() {
        let a = Annotation::new("a.ts", AnnotationLevel::Warning, "m")
            .with_columns(Some(3), Some(5))
            .with_lines(Some(1), Some(2));
        assert_eq!(a.start_column(), None);
        assert_eq!(a.end_column(), None);
    }

    #[test]
    fn test_missing_end_column_defaults_to_start() {
        let a = Annotation::new("a.ts", AnnotationLevel::Warning, "m")
            .with_lines(Some(2), Some(2))
            .with_columns(Some(5), None);
        assert_eq!(a.end_column(), Some(5));

        let a = Annotation::new("a.ts", AnnotationLevel::Warning, "m")
            .with_lines(Some(2), Some(2))
            .with_columns(Some(5), Some(1));
        assert_eq!(a.end_column(), Some(5));
    }

    #[test]
    fn test_empty_message_and_title() {
        let a = Annotation::new("a.ts", AnnotationLevel::Notice, "   ").with_title(Some(String::new()));
        assert_eq!(a.message(), EMPTY_MESSAGE_PLACEHOLDER);
        assert_eq!(a.title(), None);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let a = Annotation::new("src/a.ts", AnnotationLevel::Failure, "Type error")
            .with_lines(Some(3), Some(5));
        let json = serde_json::to_value(&a).unwrap();

        assert_eq!(json["path"], "src/a.ts");
        assert_eq!(json["start_line"], 3);
        assert_eq!(json["end_line"], 5);
        assert_eq!(json["annotation_level"], "failure");
        assert!(json.get("start_column").is_none());
        assert!(json.get("end_column").is_none());
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_serialization_with_columns_and_title() {
        let a = Annotation::new("src/a.ts", AnnotationLevel::Warning, "Missing semicolon")
            .with_lines(Some(8), Some(8))
            .with_columns(Some(14), Some(15))
            .with_title(Some("semi".to_string()));
        let json = serde_json::to_value(&a).unwrap();

        assert_eq!(json["start_column"], 14);
        assert_eq!(json["end_column"], 15);
        assert_eq!(json["title"], "semi");
        assert_eq!(json["annotation_level"], "warning");
    }
}
