pub mod runner;
pub mod tools;

pub use runner::{run_tool, ToolOutput};
pub use tools::{ESLintAnalyzer, TSLintAnalyzer, TypeScriptAnalyzer};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

use crate::infrastructure::error::{CheckError, Result};
use crate::models::DiagnosticReport;

/// 支持的分析工具
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    TypeScript,
    ESLint,
    TSLint,
}

impl AnalyzerKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalyzerKind::TypeScript => "TypeScript",
            AnalyzerKind::ESLint => "ESLint",
            AnalyzerKind::TSLint => "TSLint",
        }
    }

    /// 检查运行名称，同时用作输出标题：`ESLint` 或 `ESLint - frontend`
    pub fn check_name(&self, label: Option<&str>) -> String {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => format!("{} - {}", self.display_name(), label),
            None => self.display_name().to_string(),
        }
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 分析工具适配器
///
/// 每个适配器负责启动外部工具，并把原生诊断映射为 `DiagnosticReport`。
/// 代码问题总是作为报告数据返回；只有工具本身出错才返回 `Err`。
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    /// 用来定位仓库根目录的路径（tsconfig.json 或第一个 lint 目标）
    fn project_locator(&self) -> &Path;

    /// 在联系远端之前检查输入是否合法
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn run(&self) -> Result<DiagnosticReport>;
}

/// lint 规则覆盖，合并到项目自身的 lint 配置之上
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOverrides(Map<String, Value>);

impl RuleOverrides {
    /// 解析 `--rules` 参数，必须是 JSON 对象
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| CheckError::config(format!("--rules is not valid JSON: {}", e)))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(CheckError::config("--rules must be a JSON object of rule settings")),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rules(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// tsconfig.json 这类必需的项目文件不存在时返回配置错误
pub(crate) fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CheckError::config(format!(
            "{} not found: {}",
            what,
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert_eq!(AnalyzerKind::ESLint.check_name(None), "ESLint");
        assert_eq!(AnalyzerKind::TSLint.check_name(Some("api")), "TSLint - api");
        assert_eq!(AnalyzerKind::TypeScript.check_name(Some("  ")), "TypeScript");
    }

    #[test]
    fn test_rule_overrides_parse() {
        let overrides = RuleOverrides::parse(r#"{"no-console": "off", "semi": ["error", "always"]}"#).unwrap();
        assert_eq!(overrides.rules().len(), 2);
        assert_eq!(overrides.rules()["no-console"], "off");
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_rule_overrides_rejects_non_objects() {
        assert!(RuleOverrides::parse("[1, 2]").unwrap_err().is_configuration());
        assert!(RuleOverrides::parse("{not json").unwrap_err().is_configuration());
    }

    #[test]
    fn test_require_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("tsconfig.json");
        assert!(require_file(&config, "tsconfig").unwrap_err().is_configuration());

        std::fs::write(&config, "{}").unwrap();
        assert!(require_file(&config, "tsconfig").is_ok());
        assert!(require_file(dir.path(), "tsconfig").is_err());
    }
}
