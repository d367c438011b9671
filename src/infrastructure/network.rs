use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::infrastructure::error::CheckError;

/// 网络客户端配置
///
/// 检查运行协议本身不做重试，这里只负责超时与 UA。
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("lint-check-run/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// 按配置构建 HTTP 客户端
pub fn build_client(config: &NetworkConfig) -> Result<Client, CheckError> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| CheckError::network(format!("Failed to create HTTP client: {}", e), None))
}
