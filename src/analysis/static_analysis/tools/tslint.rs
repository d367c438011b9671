use async_trait::async_trait;
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::analysis::static_analysis::{require_file, run_tool, Analyzer, AnalyzerKind, RuleOverrides};
use crate::infrastructure::error::{CheckError, Result};
use crate::models::{Annotation, AnnotationLevel, DiagnosticReport};
use crate::report::formatters::TextFormatter;

const CONFIG_FILE_NAME: &str = "tslint.json";

/// `tslint --format json` 输出中的位置，行列均从 0 开始
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TslintPosition {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TslintFailure {
    /// 文件路径
    pub name: String,
    pub rule_name: String,
    /// `error` / `warning` / `off`，大小写随版本不同
    #[serde(default)]
    pub rule_severity: String,
    pub failure: String,
    pub start_position: TslintPosition,
    pub end_position: TslintPosition,
}

/// TSLint 适配器
pub struct TSLintAnalyzer {
    program: String,
    tsconfig: PathBuf,
    overrides: RuleOverrides,
}

impl TSLintAnalyzer {
    pub fn new(tsconfig: impl Into<PathBuf>) -> Self {
        Self {
            program: "tslint".to_string(),
            tsconfig: tsconfig.into(),
            overrides: RuleOverrides::default(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_overrides(mut self, overrides: RuleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build_args(&self, merged_config: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            "json".to_string(),
            "--project".to_string(),
            self.tsconfig.to_string_lossy().into_owned(),
        ];
        if let Some(config) = merged_config {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
        args
    }

    /// 生成继承项目配置并追加覆盖规则的临时配置文件
    ///
    /// 返回的临时文件在 drop 时删除，必须活到 tslint 退出。
    /// `--config` 对所有文件生效，子目录里的 tslint.json 此时不再参与查找。
    fn write_merged_config(&self) -> Result<Option<NamedTempFile>> {
        if self.overrides.is_empty() {
            return Ok(None);
        }

        let start = self
            .tsconfig
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        let base = find_config(&start).ok_or_else(|| {
            CheckError::config(format!(
                "--rules given but no {} found above {}",
                CONFIG_FILE_NAME,
                self.tsconfig.display()
            ))
        })?;
        let base = base.canonicalize().unwrap_or(base);

        let merged = merged_config(&base, &self.overrides);
        let mut file = tempfile::Builder::new()
            .prefix("tslint-overrides-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(serde_json::to_string_pretty(&merged)?.as_bytes())?;
        file.flush()?;

        tracing::debug!(base = %base.display(), merged = %file.path().display(), "已生成 TSLint 覆盖配置");
        Ok(Some(file))
    }
}

/// 从 `start` 开始逐级向上查找 tslint.json
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// `{"extends": [base], "rules": overrides}`
pub fn merged_config(base: &Path, overrides: &RuleOverrides) -> serde_json::Value {
    serde_json::json!({
        "extends": [base.to_string_lossy()],
        "rules": overrides.rules(),
    })
}

/// 把 TSLint 原生结果映射为诊断报告；`off` 的失败项被忽略
pub fn normalize(failures: &[TslintFailure]) -> DiagnosticReport {
    let mut annotations = Vec::new();

    for failure in failures {
        let level = match failure.rule_severity.to_ascii_lowercase().as_str() {
            "off" => continue,
            "error" => AnnotationLevel::Failure,
            "warning" => AnnotationLevel::Warning,
            _ => AnnotationLevel::Notice,
        };

        let annotation = Annotation::new(failure.name.clone(), level, failure.failure.clone())
            .with_lines(
                Some(failure.start_position.line + 1),
                Some(failure.end_position.line + 1),
            )
            .with_columns(
                Some(failure.start_position.character + 1),
                Some(failure.end_position.character + 1),
            )
            .with_title(Some(failure.rule_name.clone()));
        annotations.push(annotation);
    }

    let console_output = TextFormatter::new_no_color().stylish(&annotations);
    DiagnosticReport::from_annotations(annotations, console_output)
}

pub fn parse_output(stdout: &str) -> Result<Vec<TslintFailure>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(stdout)
        .map_err(|e| CheckError::parsing(format!("tslint output: {}", e), "JSON"))
}

#[async_trait]
impl Analyzer for TSLintAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::TSLint
    }

    fn project_locator(&self) -> &Path {
        &self.tsconfig
    }

    fn validate(&self) -> Result<()> {
        require_file(&self.tsconfig, "TypeScript project config")
    }

    async fn run(&self) -> Result<DiagnosticReport> {
        let merged = self.write_merged_config()?;
        let args = self.build_args(merged.as_ref().map(|file| file.path()));
        let output = run_tool(&self.program, &args, None).await?;
        drop(merged);

        // 0: 无失败，2: 存在 error 级失败；1 表示参数或配置错误
        if !output.exited_with(&[0, 2]) {
            return Err(CheckError::analysis_tool(
                "tslint",
                format!("{}: {}", output.exit_description(), output.diagnostic_text()),
            ));
        }

        let failures = parse_output(&output.stdout)?;
        let report = normalize(&failures);
        tracing::info!(
            errors = report.error_count,
            warnings = report.warning_count,
            "TSLint 分析完成"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {"endPosition":{"character":14,"line":4,"position":120},"failure":"Missing semicolon","fix":{"innerStart":120,"innerLength":0,"innerText":";"},"name":"/repo/src/a.ts","ruleName":"semicolon","ruleSeverity":"ERROR","startPosition":{"character":14,"line":4,"position":120}},
      {"endPosition":{"character":1,"line":9,"position":300},"failure":"Calls to 'console.log' are not allowed.","name":"/repo/src/a.ts","ruleName":"no-console","ruleSeverity":"warning","startPosition":{"character":0,"line":7,"position":250}},
      {"endPosition":{"character":5,"line":0,"position":5},"failure":"disabled","name":"/repo/src/b.ts","ruleName":"max-line-length","ruleSeverity":"OFF","startPosition":{"character":0,"line":0,"position":0}}
    ]"#;

    #[test]
    fn test_tslint_output_parsing() {
        let failures = parse_output(SAMPLE).unwrap();
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].rule_name, "semicolon");
        assert_eq!(failures[0].start_position.line, 4);
        assert!(parse_output("\n").unwrap().is_empty());
        assert!(parse_output("[]").unwrap().is_empty());
    }

    #[test]
    fn test_positions_become_one_based() {
        let report = normalize(&parse_output(SAMPLE).unwrap());

        let semicolon = &report.annotations[0];
        assert_eq!(semicolon.level(), AnnotationLevel::Failure);
        assert_eq!((semicolon.start_line(), semicolon.end_line()), (5, 5));
        assert_eq!((semicolon.start_column(), semicolon.end_column()), (Some(15), Some(15)));
        assert_eq!(semicolon.title(), Some("semicolon"));
    }

    #[test]
    fn test_multi_line_failure_drops_columns() {
        let report = normalize(&parse_output(SAMPLE).unwrap());

        let console = &report.annotations[1];
        assert_eq!(console.level(), AnnotationLevel::Warning);
        assert_eq!((console.start_line(), console.end_line()), (8, 10));
        assert_eq!(console.start_column(), None);
    }

    #[test]
    fn test_off_severity_is_ignored() {
        let report = normalize(&parse_output(SAMPLE).unwrap());
        assert_eq!(report.annotations.len(), 2);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert!(!report.console_output.contains("max-line-length"));
    }

    #[test]
    fn test_build_args() {
        let analyzer = TSLintAnalyzer::new("web/tsconfig.json");
        assert_eq!(
            analyzer.build_args(None),
            vec!["--format", "json", "--project", "web/tsconfig.json"]
        );
        assert_eq!(
            analyzer.build_args(Some(Path::new("/tmp/merged.json"))),
            vec!["--format", "json", "--project", "web/tsconfig.json", "--config", "/tmp/merged.json"]
        );
    }

    #[test]
    fn test_merged_config_extends_project_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = dir.path().join("packages/web");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(dir.path().join("tslint.json"), r#"{"rules":{}}"#).unwrap();
        std::fs::write(project.join("tsconfig.json"), "{}").unwrap();

        let found = find_config(&project).unwrap();
        assert_eq!(found, dir.path().join("tslint.json"));

        let overrides = RuleOverrides::parse(r#"{"no-console": false}"#).unwrap();
        let analyzer = TSLintAnalyzer::new(project.join("tsconfig.json")).with_overrides(overrides);
        let merged = analyzer.write_merged_config().unwrap().unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(merged.path()).unwrap()).unwrap();
        assert_eq!(written["rules"]["no-console"], false);
        assert!(written["extends"][0].as_str().unwrap().ends_with("tslint.json"));
    }

    #[test]
    fn test_no_overrides_no_merged_config() {
        let analyzer = TSLintAnalyzer::new("tsconfig.json");
        assert!(analyzer.write_merged_config().unwrap().is_none());
    }

    #[test]
    fn test_overrides_without_project_config() {
        let dir = tempfile::TempDir::new().unwrap();
        // 临时目录的上级目录里可能恰好有 tslint.json，此时跳过
        if find_config(dir.path()).is_some() {
            return;
        }
        let overrides = RuleOverrides::parse(r#"{"no-console": false}"#).unwrap();
        let analyzer = TSLintAnalyzer::new(dir.path().join("tsconfig.json")).with_overrides(overrides);
        assert!(analyzer.write_merged_config().unwrap_err().is_configuration());
    }

    #[test]
    fn test_validate_requires_tsconfig() {
        let dir = tempfile::TempDir::new().unwrap();
        let analyzer = TSLintAnalyzer::new(dir.path().join("tsconfig.json"));
        assert!(analyzer.validate().unwrap_err().is_configuration());
    }
}
