use serde::{Deserialize, Serialize};

use super::annotation::{Annotation, AnnotationLevel};

/// 检查运行的最终结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Conclusion::Failure)
    }

    /// 合并多个结论：任一失败即失败
    pub fn combine(self, other: Conclusion) -> Conclusion {
        if self.is_failure() || other.is_failure() {
            Conclusion::Failure
        } else {
            Conclusion::Success
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 结论判定策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConclusionPolicy {
    /// 只有错误才失败（默认）
    #[default]
    ErrorsOnly,
    /// 警告也算失败
    WarningsFail,
}

/// 一次分析运行的标准化结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub annotations: Vec<Annotation>,
    pub error_count: usize,
    pub warning_count: usize,
    /// 与文件无关的错误，只有类型检查器会产生
    pub global_errors: Vec<String>,
    #[serde(skip)]
    pub console_output: String,
}

impl DiagnosticReport {
    /// 按注解级别统计计数，适用于逐条分级的 lint 引擎
    pub fn from_annotations(annotations: Vec<Annotation>, console_output: impl Into<String>) -> Self {
        let error_count = annotations.iter().filter(|a| a.is_failure()).count();
        let warning_count = annotations.iter().filter(|a| a.is_warning()).count();

        Self {
            annotations,
            error_count,
            warning_count,
            global_errors: Vec::new(),
            console_output: console_output.into(),
        }
    }

    /// 注解、计数与全局错误分别给出（类型检查器）
    pub fn new(
        annotations: Vec<Annotation>,
        error_count: usize,
        warning_count: usize,
        global_errors: Vec<String>,
        console_output: impl Into<String>,
    ) -> Self {
        Self {
            annotations,
            error_count,
            warning_count,
            global_errors,
            console_output: console_output.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.global_errors.is_empty()
    }

    pub fn count_by_level(&self, level: AnnotationLevel) -> usize {
        self.annotations.iter().filter(|a| a.level() == level).count()
    }

    /// 计数行，例如 `1 errors, 2 warnings.`
    pub fn count_line(&self) -> String {
        format!("{} errors, {} warnings.", self.error_count, self.warning_count)
    }

    /// 检查运行摘要：全局错误在前，计数行在后
    pub fn summary(&self) -> String {
        if self.global_errors.is_empty() {
            self.count_line()
        } else {
            format!("{}\n{}", self.global_errors.join("\n"), self.count_line())
        }
    }

    pub fn conclusion(&self, policy: ConclusionPolicy) -> Conclusion {
        let failing = match policy {
            ConclusionPolicy::ErrorsOnly => self.error_count,
            ConclusionPolicy::WarningsFail => self.error_count + self.warning_count,
        };

        if failing > 0 || !self.global_errors.is_empty() {
            Conclusion::Failure
        } else {
            Conclusion::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(level: AnnotationLevel) -> Annotation {
        Annotation::new("/repo/src/index.ts", level, "finding")
    }

    #[test]
    fn test_counts_from_annotations() {
        let report = DiagnosticReport::from_annotations(
            vec![
                annotation(AnnotationLevel::Failure),
                annotation(AnnotationLevel::Warning),
                annotation(AnnotationLevel::Warning),
                annotation(AnnotationLevel::Notice),
            ],
            "",
        );
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 2);
        assert_eq!(report.count_by_level(AnnotationLevel::Notice), 1);
    }

    #[test]
    fn test_all_warnings_succeed_by_default() {
        let report = DiagnosticReport::from_annotations(vec![annotation(AnnotationLevel::Warning); 3], "");
        assert_eq!(report.error_count, 0);
        assert_eq!(report.conclusion(ConclusionPolicy::ErrorsOnly), Conclusion::Success);
        assert_eq!(report.conclusion(ConclusionPolicy::WarningsFail), Conclusion::Failure);
    }

    #[test]
    fn test_error_fails_under_both_policies() {
        let report = DiagnosticReport::from_annotations(
            vec![
                annotation(AnnotationLevel::Failure),
                annotation(AnnotationLevel::Warning),
                annotation(AnnotationLevel::Warning),
            ],
            "",
        );
        assert_eq!(report.conclusion(ConclusionPolicy::ErrorsOnly), Conclusion::Failure);
        assert_eq!(report.conclusion(ConclusionPolicy::WarningsFail), Conclusion::Failure);
        assert!(report.summary().contains("1 errors, 2 warnings."));
    }

    #[test]
    fn test_clean_report_succeeds() {
        let report = DiagnosticReport::default();
        assert!(report.is_empty());
        assert_eq!(report.summary(), "0 errors, 0 warnings.");
        assert_eq!(report.conclusion(ConclusionPolicy::ErrorsOnly), Conclusion::Success);
        assert_eq!(report.conclusion(ConclusionPolicy::WarningsFail), Conclusion::Success);
    }

    #[test]
    fn test_global_errors_prefix_summary_and_fail() {
        let report = DiagnosticReport::new(
            Vec::new(),
            0,
            0,
            vec!["Unknown compiler option 'foo'.".to_string(), "No inputs were found.".to_string()],
            "",
        );
        assert_eq!(
            report.summary(),
            "Unknown compiler option 'foo'.\nNo inputs were found.\n0 errors, 0 warnings."
        );
        assert_eq!(report.conclusion(ConclusionPolicy::ErrorsOnly), Conclusion::Failure);
    }

    #[test]
    fn test_error_count_may_exceed_failure_annotations() {
        // 类型检查器的全局错误计入 error_count，但不产生注解
        let report = DiagnosticReport::new(
            vec![annotation(AnnotationLevel::Failure)],
            2,
            0,
            vec!["Cannot read file 'tsconfig.base.json'.".to_string()],
            "",
        );
        assert_eq!(report.count_by_level(AnnotationLevel::Failure), 1);
        assert_eq!(report.error_count, 2);
        assert!(report.conclusion(ConclusionPolicy::ErrorsOnly).is_failure());
    }

    #[test]
    fn test_conclusion_combine() {
        assert_eq!(Conclusion::Success.combine(Conclusion::Success), Conclusion::Success);
        assert_eq!(Conclusion::Success.combine(Conclusion::Failure), Conclusion::Failure);
        assert_eq!(Conclusion::Failure.combine(Conclusion::Success), Conclusion::Failure);
    }

    #[test]
    fn test_conclusion_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Conclusion::Failure).unwrap(), "failure");
        assert_eq!(Conclusion::Success.to_string(), "success");
    }
}
