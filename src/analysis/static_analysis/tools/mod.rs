pub mod eslint;
pub mod tslint;
pub mod typescript;

pub use eslint::ESLintAnalyzer;
pub use tslint::TSLintAnalyzer;
pub use typescript::TypeScriptAnalyzer;
