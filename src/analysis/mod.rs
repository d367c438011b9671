pub mod static_analysis;

pub use static_analysis::{
    Analyzer, AnalyzerKind, ESLintAnalyzer, RuleOverrides, TSLintAnalyzer, TypeScriptAnalyzer,
};
