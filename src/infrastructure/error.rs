use thiserror::Error;

/// 检查运行错误类型
///
/// 代码问题（lint/类型诊断）永远不会走到这里，它们是 `Annotation` 数据；
/// 这里只有工具本身或远端交互的失败。
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("分析工具错误: {tool} - {message}")]
    AnalysisTool { tool: String, message: String },

    #[error("解析错误: {message} ({content_type})")]
    Parsing { message: String, content_type: String },

    #[error("Git 错误: {message}")]
    Git { message: String },

    #[error("网络错误: {message}")]
    Network { message: String, url: Option<String> },

    #[error("GitHub API 错误: HTTP {status} - {message}")]
    Api { status: u16, message: String },

    #[error("认证错误: {message}")]
    Authentication { message: String },

    #[error("文件系统错误: {message}")]
    FileSystem { message: String, path: Option<String> },
}

impl CheckError {
    /// 配置错误在访问远端 API 之前就应终止进程
    pub fn is_configuration(&self) -> bool {
        matches!(self, CheckError::Configuration { .. })
    }

    /// 远端交互错误（网络、HTTP 状态、认证）
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CheckError::Network { .. } | CheckError::Api { .. } | CheckError::Authentication { .. }
        )
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        CheckError::Configuration {
            message: message.into(),
        }
    }

    /// 创建分析工具错误
    pub fn analysis_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::AnalysisTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// 创建解析错误
    pub fn parsing(message: impl Into<String>, content_type: impl Into<String>) -> Self {
        CheckError::Parsing {
            message: message.into(),
            content_type: content_type.into(),
        }
    }

    /// 创建 Git 错误
    pub fn git(message: impl Into<String>) -> Self {
        CheckError::Git {
            message: message.into(),
        }
    }

    /// 创建网络错误
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        CheckError::Network {
            message: message.into(),
            url,
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        CheckError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        CheckError::Authentication {
            message: message.into(),
        }
    }

    /// 创建文件系统错误
    pub fn file_system(message: impl Into<String>, path: Option<String>) -> Self {
        CheckError::FileSystem {
            message: message.into(),
            path,
        }
    }
}

// 实现从常见错误类型的转换
impl From<std::io::Error> for CheckError {
    fn from(error: std::io::Error) -> Self {
        CheckError::FileSystem {
            message: error.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(error: serde_json::Error) -> Self {
        CheckError::Parsing {
            message: error.to_string(),
            content_type: "JSON".to_string(),
        }
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(error: reqwest::Error) -> Self {
        CheckError::Network {
            message: error.to_string(),
            url: error.url().map(|u| u.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
