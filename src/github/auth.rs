use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::github::client::{error_for_status, GitHubClient};
use crate::infrastructure::error::{CheckError, Result};
use crate::infrastructure::network::{build_client, NetworkConfig};

/// 默认的 GitHub App ID
pub const DEFAULT_APP_ID: u64 = 42099;

/// GitHub 认证信息
#[derive(Clone, Default)]
pub struct Credentials {
    /// 直接可用的 token（个人 token 或 Actions 的 GITHUB_TOKEN）
    pub token: Option<String>,
    pub app_id: Option<u64>,
    /// 调用方预先签好的 App JWT
    pub app_jwt: Option<String>,
    /// App 私钥（PEM），用于自行签发 App JWT
    pub private_key: Option<String>,
    pub installation_id: Option<u64>,
}

// 不把密钥打进日志
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("app_id", &self.app_id)
            .field("app_jwt", &self.app_jwt.as_ref().map(|_| "***"))
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("installation_id", &self.installation_id)
            .finish()
    }
}

/// 认证方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    Token,
    /// 使用调用方签好的 App JWT 换取 installation token
    Installation { installation_id: u64 },
    /// 用 App 私钥签发 JWT 再换取 installation token
    AppKey { app_id: u64, installation_id: u64 },
}

impl Credentials {
    /// 决定使用哪种认证方式，缺少必要变量时返回配置错误
    ///
    /// 顺序：GITHUB_TOKEN，GITHUB_APP_JWT，GITHUB_APP_PRIVATE_KEY。
    pub fn method(&self) -> Result<AuthMethod> {
        if is_set(&self.token) {
            return Ok(AuthMethod::Token);
        }

        let installation_id = self.installation_id.ok_or_else(|| {
            CheckError::config(
                "GitHub credentials are missing: set GITHUB_TOKEN, or GITHUB_APP_PRIVATE_KEY (or GITHUB_APP_JWT) and GITHUB_APP_INSTALLATION_ID",
            )
        })?;

        if is_set(&self.app_jwt) {
            return Ok(AuthMethod::Installation { installation_id });
        }

        if is_set(&self.private_key) {
            return Ok(AuthMethod::AppKey {
                app_id: self.app_id.unwrap_or(DEFAULT_APP_ID),
                installation_id,
            });
        }

        Err(CheckError::config(
            "GITHUB_APP_INSTALLATION_ID is set but neither GITHUB_APP_PRIVATE_KEY nor GITHUB_APP_JWT is",
        ))
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// App JWT 的声明，时间为 Unix 秒
#[derive(Debug, Serialize, Deserialize)]
pub struct AppClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl AppClaims {
    /// iat 回拨 60 秒以容忍时钟偏差，有效期 10 分钟
    pub fn new(app_id: u64, now: i64) -> Self {
        Self {
            iat: now - 60,
            exp: now + 600,
            iss: app_id.to_string(),
        }
    }
}

/// 用 App 私钥签发 RS256 JWT
///
/// 环境变量里的 PEM 常以字面量 `\n` 换行，这里先还原。
pub fn sign_app_jwt(app_id: u64, private_key: &str) -> Result<String> {
    let pem = private_key.trim().replace("\\n", "\n");
    let key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| CheckError::config(format!("GITHUB_APP_PRIVATE_KEY is not a valid RSA PEM key: {}", e)))?;

    let claims = AppClaims::new(app_id, Utc::now().timestamp());
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| CheckError::authentication(format!("failed to sign app JWT: {}", e)))
}

#[derive(Debug, Deserialize)]
struct InstallationToken {
    token: String,
}

/// 根据认证信息得到可用的 API 客户端
pub async fn authenticate(
    credentials: &Credentials,
    base_url: &str,
    network: &NetworkConfig,
) -> Result<GitHubClient> {
    match credentials.method()? {
        AuthMethod::Token => {
            tracing::debug!("using GitHub token authentication");
            let token = credentials.token.clone().unwrap_or_default();
            GitHubClient::new(base_url, token, network)
        }
        AuthMethod::Installation { installation_id } => {
            tracing::debug!(installation_id, app_id = ?credentials.app_id, "requesting installation token");
            let jwt = credentials.app_jwt.clone().unwrap_or_default();
            installation_client(base_url, network, installation_id, &jwt).await
        }
        AuthMethod::AppKey { app_id, installation_id } => {
            tracing::debug!(installation_id, app_id, "signing app JWT for installation token");
            let jwt = sign_app_jwt(app_id, credentials.private_key.as_deref().unwrap_or_default())?;
            installation_client(base_url, network, installation_id, &jwt).await
        }
    }
}

async fn installation_client(
    base_url: &str,
    network: &NetworkConfig,
    installation_id: u64,
    jwt: &str,
) -> Result<GitHubClient> {
    let client = build_client(network)?;
    let token = installation_token(&client, base_url, installation_id, jwt).await?;
    Ok(GitHubClient::with_client(client, base_url, token))
}

async fn installation_token(
    client: &reqwest::Client,
    base_url: &str,
    installation_id: u64,
    jwt: &str,
) -> Result<String> {
    let url = format!(
        "{}/app/installations/{}/access_tokens",
        base_url.trim_end_matches('/'),
        installation_id
    );

    let response = client
        .post(&url)
        .bearer_auth(jwt)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await?;

    let response = error_for_status(response).await.map_err(|e| match e {
        CheckError::Api { status, message } => CheckError::authentication(format!(
            "installation token request failed (HTTP {}): {}",
            status, message
        )),
        other => other,
    })?;

    let token: InstallationToken = response.json().await?;
    Ok(token.token)
}
