use serde::Serialize;

use super::ReportFormatter;
use crate::infrastructure::error::Result;
use crate::models::{Conclusion, DiagnosticReport};
use crate::report::check_run::CheckRunOutcome;

/// JSON 格式化器，供 CI 脚本消费
pub struct JsonFormatter {
    pretty: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    name: &'a str,
    conclusion: Conclusion,
    summary: String,
    #[serde(flatten)]
    report: &'a DiagnosticReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_run: Option<&'a CheckRunOutcome>,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    /// 创建新的 JSON 格式化器
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// 附带检查运行结果一起输出
    pub fn format_with_outcome(
        &self,
        name: &str,
        report: &DiagnosticReport,
        conclusion: Conclusion,
        outcome: Option<&CheckRunOutcome>,
    ) -> Result<String> {
        let document = JsonReport {
            name,
            conclusion,
            summary: report.summary(),
            report,
            check_run: outcome,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(json)
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, name: &str, report: &DiagnosticReport, conclusion: Conclusion) -> Result<String> {
        self.format_with_outcome(name, report, conclusion, None)
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Annotation, AnnotationLevel};

    #[test]
    fn test_json_document() {
        let report = DiagnosticReport::from_annotations(
            vec![Annotation::new("/repo/a.ts", AnnotationLevel::Warning, "prefer-const")],
            "console text",
        );
        let output = JsonFormatter::compact()
            .format("ESLint - web", &report, Conclusion::Success)
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["name"], "ESLint - web");
        assert_eq!(json["conclusion"], "success");
        assert_eq!(json["summary"], "0 errors, 1 warnings.");
        assert_eq!(json["warning_count"], 1);
        assert_eq!(json["annotations"][0]["annotation_level"], "warning");
        assert!(json.get("console_output").is_none());
        assert!(json.get("check_run").is_none());
    }

    #[test]
    fn test_json_includes_outcome() {
        let report = DiagnosticReport::default();
        let outcome = CheckRunOutcome {
            check_run_id: 9,
            conclusion: Conclusion::Success,
            updates_sent: 1,
            annotations_sent: 0,
            dropped: 0,
        };
        let output = JsonFormatter::new()
            .format_with_outcome("TypeScript", &report, Conclusion::Success, Some(&outcome))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["check_run"]["check_run_id"], 9);
        assert_eq!(json["check_run"]["updates_sent"], 1);
    }
}
