use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use crate::github::types::{CheckRun, CreateCheckRun, RepoSlug, UpdateCheckRun};
use crate::infrastructure::error::{CheckError, Result};
use crate::infrastructure::network::{build_client, NetworkConfig};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// 检查运行 API
///
/// 报告器只依赖这个 trait，测试里可以换成内存实现。
#[async_trait]
pub trait CheckRunApi: Send + Sync {
    async fn create_check_run(&self, repo: &RepoSlug, request: &CreateCheckRun) -> Result<CheckRun>;

    async fn update_check_run(
        &self,
        repo: &RepoSlug,
        check_run_id: u64,
        request: &UpdateCheckRun,
    ) -> Result<CheckRun>;
}

/// GitHub REST 客户端
///
/// token 只用于 `bearer_auth()`，不会出现在日志或错误信息里。
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, network: &NetworkConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(network)?, base_url, token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check_runs_url(&self, repo: &RepoSlug) -> String {
        format!("{}/repos/{}/{}/check-runs", self.base_url, repo.owner, repo.name)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

/// 非 2xx 响应转成 `CheckError::Api`，尽量取出 GitHub 的 `message` 字段
pub(crate) async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.trim().to_string()
            }
        });

    Err(CheckError::api(status.as_u16(), message))
}

#[async_trait]
impl CheckRunApi for GitHubClient {
    async fn create_check_run(&self, repo: &RepoSlug, request: &CreateCheckRun) -> Result<CheckRun> {
        let url = self.check_runs_url(repo);
        let response = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await?;

        let check_run: CheckRun = error_for_status(response).await?.json().await?;
        Ok(check_run)
    }

    async fn update_check_run(
        &self,
        repo: &RepoSlug,
        check_run_id: u64,
        request: &UpdateCheckRun,
    ) -> Result<CheckRun> {
        let url = format!("{}/{}", self.check_runs_url(repo), check_run_id);
        let response = self
            .authorized(self.client.patch(&url))
            .json(request)
            .send()
            .await?;

        let check_run: CheckRun = error_for_status(response).await?.json().await?;
        Ok(check_run)
    }
}
