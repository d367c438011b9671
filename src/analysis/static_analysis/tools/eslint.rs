use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::static_analysis::{run_tool, Analyzer, AnalyzerKind, RuleOverrides};
use crate::infrastructure::error::{CheckError, Result};
use crate::models::{Annotation, AnnotationLevel, DiagnosticReport};
use crate::report::formatters::TextFormatter;

/// `eslint --format json` 输出中的单个文件
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintFileResult {
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<EslintMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintMessage {
    #[serde(default)]
    pub rule_id: Option<String>,
    /// 0 = off, 1 = warn, 2 = error
    pub severity: u8,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

/// ESLint 适配器
pub struct ESLintAnalyzer {
    program: String,
    targets: Vec<String>,
    overrides: RuleOverrides,
    locator: PathBuf,
}

impl ESLintAnalyzer {
    pub fn new(targets: Vec<String>) -> Self {
        let locator = targets
            .first()
            .map(|target| glob_base(target))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            program: "eslint".to_string(),
            targets,
            overrides: RuleOverrides::default(),
            locator,
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

    /// 命令行参数：每条覆盖规则单独一个 `--rule`
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["--format".to_string(), "json".to_string()];

        for (rule, setting) in self.overrides.iter() {
            let mut single = serde_json::Map::new();
            single.insert(rule.clone(), setting.clone());
            args.push("--rule".to_string());
            args.push(serde_json::Value::Object(single).to_string());
        }

        args.extend(self.targets.iter().cloned());
        args
    }
}

/// glob 中不含通配符的前缀目录，如 `src/**/*.ts` 得到 `src`
///
/// 没有字面前缀时返回 `.`。
pub fn glob_base(target: &str) -> PathBuf {
    let base: PathBuf = Path::new(target)
        .components()
        .take_while(|component| {
            !component
                .as_os_str()
                .to_string_lossy()
                .contains(['*', '?', '[', '{'])
        })
        .collect();

    if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base
    }
}

/// 把 ESLint 原生结果映射为诊断报告；severity 0 的消息被忽略
pub fn normalize(results: &[EslintFileResult]) -> DiagnosticReport {
    let mut annotations = Vec::new();

    for result in results {
        for message in &result.messages {
            let level = match message.severity {
                0 => continue,
                2 => AnnotationLevel::Failure,
                1 => AnnotationLevel::Warning,
                _ => AnnotationLevel::Notice,
            };

            let annotation = Annotation::new(result.file_path.clone(), level, message.message.clone())
                .with_lines(message.line, message.end_line)
                .with_columns(message.column, message.end_column)
                .with_title(message.rule_id.clone());
            annotations.push(annotation);
        }
    }

    let console_output = TextFormatter::new_no_color().stylish(&annotations);
    DiagnosticReport::from_annotations(annotations, console_output)
}

/// 解析 `eslint --format json` 的标准输出
///
/// JSON 格式化器至少输出 `[]`，空输出说明 eslint 自身出了问题。
pub fn parse_output(stdout: &str) -> Result<Vec<EslintFileResult>> {
    if stdout.trim().is_empty() {
        return Err(CheckError::parsing("eslint produced no output", "JSON"));
    }
    serde_json::from_str(stdout)
        .map_err(|e| CheckError::parsing(format!("eslint output: {}", e), "JSON"))
}

#[async_trait]
impl Analyzer for ESLintAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ESLint
    }

    fn project_locator(&self) -> &Path {
        &self.locator
    }

    fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(CheckError::config("eslint needs at least one file, directory or glob"));
        }
        Ok(())
    }

    async fn run(&self) -> Result<DiagnosticReport> {
        let output = run_tool(&self.program, &self.build_args(), None).await?;

        // 0: 没有错误，1: 存在 lint 错误，其余为工具自身失败
        if !output.exited_with(&[0, 1]) {
            return Err(CheckError::analysis_tool(
                "eslint",
                format!("{}: {}", output.exit_description(), output.diagnostic_text()),
            ));
        }

        let results = parse_output(&output.stdout)?;
        let report = normalize(&results);
        tracing::info!(
            files = results.len(),
            errors = report.error_count,
            warnings = report.warning_count,
            "ESLint 分析完成"
        );
        Ok(report)
    }
}
