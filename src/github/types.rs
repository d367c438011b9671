use serde::{Deserialize, Serialize};

use crate::infrastructure::error::{CheckError, Result};
use crate::models::{Annotation, Conclusion};

/// 单次更新调用允许携带的最大注解数
pub const MAX_ANNOTATIONS_PER_REQUEST: usize = 50;

/// 仓库标识 `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// 解析 `--repo` 参数，要求恰好一个 `/` 且两侧非空
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || {
            CheckError::config(format!(
                "Invalid --repo argument {}. Expected \"owner/repo\".",
                value
            ))
        };

        let (owner, name) = value.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty()
            || name.is_empty()
            || name.contains('/')
            || value.chars().any(char::is_whitespace)
        {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for RepoSlug {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// 检查运行状态，创建时总是 `in_progress`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Queued,
    InProgress,
    Completed,
}

/// `POST /repos/{owner}/{repo}/check-runs` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckRun {
    pub name: String,
    pub head_sha: String,
    pub status: CheckStatus,
}

impl CreateCheckRun {
    pub fn in_progress(name: impl Into<String>, head_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head_sha: head_sha.into(),
            status: CheckStatus::InProgress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    pub annotations: Vec<Annotation>,
}

/// `PATCH /repos/{owner}/{repo}/check-runs/{id}` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheckRun {
    pub output: CheckRunOutput,
    pub conclusion: Conclusion,
}

/// API 返回的检查运行，只取用到的字段
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}
