use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::analysis::static_analysis::{require_file, run_tool, Analyzer, AnalyzerKind};
use crate::infrastructure::error::{CheckError, Result};
use crate::models::{Annotation, AnnotationLevel, DiagnosticReport};
use crate::report::path::normalize as normalize_path;

// 编译器输出格式: filename(line,column): error TS####: message
static FILE_DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<file>.+?)\((?P<line>\d+),(?P<column>\d+)\): (?P<category>error|warning|message|suggestion) TS(?P<code>\d+): (?P<message>.*)$").unwrap()
});

// 与文件无关的诊断: error TS####: message
static GLOBAL_DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<category>error|warning|message|suggestion) TS(?P<code>\d+): (?P<message>.*)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TscCategory {
    Error,
    Warning,
    Message,
    Suggestion,
}

impl TscCategory {
    fn parse(value: &str) -> Self {
        match value {
            "error" => TscCategory::Error,
            "warning" => TscCategory::Warning,
            "suggestion" => TscCategory::Suggestion,
            _ => TscCategory::Message,
        }
    }

    fn annotation_level(&self) -> AnnotationLevel {
        match self {
            TscCategory::Error => AnnotationLevel::Failure,
            TscCategory::Warning => AnnotationLevel::Warning,
            _ => AnnotationLevel::Notice,
        }
    }
}

/// 编译器输出里的一条诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TscDiagnostic {
    /// 无文件的全局诊断为 `None`
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
    pub category: TscCategory,
    pub code: u32,
    /// 多行消息以 `\n` 连接
    pub message: String,
}

/// 解析 `tsc --pretty false` 的文本输出
///
/// 缩进开头的行是上一条诊断消息的续行。
pub fn parse_output(output: &str) -> Vec<TscDiagnostic> {
    let mut diagnostics: Vec<TscDiagnostic> = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(captures) = FILE_DIAGNOSTIC.captures(line) {
            diagnostics.push(TscDiagnostic {
                file: Some(captures["file"].trim().to_string()),
                line: captures["line"].parse().unwrap_or(1),
                column: captures["column"].parse().unwrap_or(1),
                category: TscCategory::parse(&captures["category"]),
                code: captures["code"].parse().unwrap_or(0),
                message: captures["message"].to_string(),
            });
        } else if let Some(captures) = GLOBAL_DIAGNOSTIC.captures(line) {
            diagnostics.push(TscDiagnostic {
                file: None,
                line: 1,
                column: 1,
                category: TscCategory::parse(&captures["category"]),
                code: captures["code"].parse().unwrap_or(0),
                message: captures["message"].to_string(),
            });
        } else if line.starts_with(char::is_whitespace) {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line);
            }
        }
    }

    diagnostics
}

/// 把编译器诊断映射为诊断报告
///
/// 相对路径按 `working_dir` 解析为绝对路径；全局错误计入错误数但不产生注解。
pub fn normalize(diagnostics: &[TscDiagnostic], working_dir: &Path, compiler_output: &str) -> DiagnosticReport {
    let mut annotations = Vec::new();
    let mut global_errors = Vec::new();
    let mut error_count = 0;
    let mut warning_count = 0;

    for diagnostic in diagnostics {
        match diagnostic.category {
            TscCategory::Error => error_count += 1,
            TscCategory::Warning => warning_count += 1,
            _ => {}
        }

        match &diagnostic.file {
            Some(file) => {
                let path = absolute_path(file, working_dir);
                annotations.push(
                    Annotation::new(path, diagnostic.category.annotation_level(), diagnostic.message.clone())
                        .with_lines(Some(diagnostic.line), Some(diagnostic.line)),
                );
            }
            None if diagnostic.category == TscCategory::Error => {
                global_errors.push(diagnostic.message.clone());
            }
            None => {}
        }
    }

    let console_output = if global_errors.is_empty() {
        compiler_output.to_string()
    } else {
        format!("{}\n{}", global_errors.join("\n"), compiler_output)
    };

    DiagnosticReport::new(annotations, error_count, warning_count, global_errors, console_output)
}

fn absolute_path(file: &str, working_dir: &Path) -> String {
    let path = Path::new(file);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    normalize_path(&absolute).to_string_lossy().into_owned()
}

/// TypeScript 编译器适配器
pub struct TypeScriptAnalyzer {
    program: String,
    tsconfig: PathBuf,
    working_dir: Option<PathBuf>,
}

impl TypeScriptAnalyzer {
    pub fn new(tsconfig: impl Into<PathBuf>) -> Self {
        Self {
            program: "tsc".to_string(),
            tsconfig: tsconfig.into(),
            working_dir: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// 编译器的工作目录，默认是当前进程目录
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn build_args(&self) -> Vec<String> {
        vec![
            "--noEmit".to_string(),
            "--pretty".to_string(),
            "false".to_string(),
            "--project".to_string(),
            self.tsconfig.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl Analyzer for TypeScriptAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::TypeScript
    }

    fn project_locator(&self) -> &Path {
        &self.tsconfig
    }

    fn validate(&self) -> Result<()> {
        require_file(&self.tsconfig, "TypeScript project config")
    }

    async fn run(&self) -> Result<DiagnosticReport> {
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let output = run_tool(&self.program, &self.build_args(), Some(&working_dir)).await?;

        // 编译器把诊断写到 stdout，部分版本会写到 stderr
        let text = if output.stderr.trim().is_empty() {
            output.stdout.clone()
        } else {
            format!("{}\n{}", output.stdout, output.stderr)
        };
        let diagnostics = parse_output(&text);

        if !output.exited_with(&[0]) && diagnostics.is_empty() {
            return Err(CheckError::analysis_tool(
                "tsc",
                format!("{}: {}", output.exit_description(), output.diagnostic_text()),
            ));
        }

        let report = normalize(&diagnostics, &working_dir, output.stdout.trim_end());
        tracing::info!(
            errors = report.error_count,
            warnings = report.warning_count,
            global_errors = report.global_errors.len(),
            "TypeScript 类型检查完成"
        );
        Ok(report)
    }
}
