//! 检查运行上报：创建 → 分批更新 → 结论。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::github::client::CheckRunApi;
use crate::github::types::{
    CheckRunOutput, CreateCheckRun, RepoSlug, UpdateCheckRun, MAX_ANNOTATIONS_PER_REQUEST,
};
use crate::infrastructure::error::Result;
use crate::models::{Annotation, Conclusion, ConclusionPolicy, DiagnosticReport};
use crate::report::path::relative_to_root;

/// 一次上报的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRunOutcome {
    pub check_run_id: u64,
    pub conclusion: Conclusion,
    pub updates_sent: usize,
    pub annotations_sent: usize,
    /// 路径不在仓库内而被丢弃的注解数
    pub dropped: usize,
}

/// 检查运行上报器
///
/// 只依赖 `CheckRunApi` 与诊断报告，不关心是哪种分析工具产生的报告。
#[derive(Clone)]
pub struct CheckRunReporter {
    api: Arc<dyn CheckRunApi>,
    repo: RepoSlug,
    repository_root: PathBuf,
    policy: ConclusionPolicy,
}

impl CheckRunReporter {
    pub fn new(api: Arc<dyn CheckRunApi>, repo: RepoSlug, repository_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            repo,
            repository_root: repository_root.into(),
            policy: ConclusionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    pub fn repository_root(&self) -> &Path {
        &self.repository_root
    }

    /// 创建 `in_progress` 状态的检查运行
    pub async fn start(&self, name: &str, head_sha: &str) -> Result<InProgressCheck> {
        let request = CreateCheckRun::in_progress(name, head_sha);
        let check_run = self.api.create_check_run(&self.repo, &request).await?;

        tracing::info!(
            check_run_id = check_run.id,
            repo = %self.repo,
            name,
            head_sha,
            "已创建检查运行"
        );

        Ok(InProgressCheck {
            reporter: self.clone(),
            check_run_id: check_run.id,
            name: name.to_string(),
        })
    }

    /// 创建并立即完成一个检查运行
    pub async fn report(&self, name: &str, head_sha: &str, report: &DiagnosticReport) -> Result<CheckRunOutcome> {
        self.start(name, head_sha).await?.finish(report).await
    }
}

/// 已创建但尚未给出结论的检查运行
pub struct InProgressCheck {
    reporter: CheckRunReporter,
    check_run_id: u64,
    name: String,
}

impl InProgressCheck {
    pub fn check_run_id(&self) -> u64 {
        self.check_run_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 分批提交注解，每次更新都带同样的标题、摘要和结论
    ///
    /// 任何一次请求失败都会立即返回错误，已经提交的批次保留在远端。
    pub async fn finish(self, report: &DiagnosticReport) -> Result<CheckRunOutcome> {
        let reporter = &self.reporter;
        let (annotations, dropped) = prepare_annotations(&report.annotations, &reporter.repository_root);
        let conclusion = report.conclusion(reporter.policy);
        let summary = report.summary();

        let batches = batches(&annotations);
        let mut annotations_sent = 0;

        for (index, batch) in batches.iter().enumerate() {
            let request = UpdateCheckRun {
                output: CheckRunOutput {
                    title: self.name.clone(),
                    summary: summary.clone(),
                    annotations: batch.to_vec(),
                },
                conclusion,
            };

            reporter
                .api
                .update_check_run(&reporter.repo, self.check_run_id, &request)
                .await?;

            annotations_sent += batch.len();
            tracing::debug!(
                check_run_id = self.check_run_id,
                batch = index + 1,
                total = batches.len(),
                size = batch.len(),
                "已提交注解批次"
            );
        }

        tracing::info!(
            check_run_id = self.check_run_id,
            %conclusion,
            updates = batches.len(),
            annotations = annotations_sent,
            "检查运行已完成"
        );

        Ok(CheckRunOutcome {
            check_run_id: self.check_run_id,
            conclusion,
            updates_sent: batches.len(),
            annotations_sent,
            dropped,
        })
    }
}

/// 改写注解路径为仓库相对路径，无法改写的注解被丢弃
pub fn prepare_annotations(annotations: &[Annotation], root: &Path) -> (Vec<Annotation>, usize) {
    let mut prepared = Vec::with_capacity(annotations.len());
    let mut dropped = 0;

    for annotation in annotations {
        match relative_to_root(annotation.path(), root) {
            Some(path) => prepared.push(annotation.clone().with_path(path)),
            None => {
                dropped += 1;
                tracing::warn!(
                    path = annotation.path(),
                    root = %root.display(),
                    "注解路径不在仓库内，已跳过"
                );
            }
        }
    }

    (prepared, dropped)
}

/// 按单次请求上限切分；没有注解时仍返回一个空批次，保证结论一定会被提交
pub fn batches(annotations: &[Annotation]) -> Vec<&[Annotation]> {
    if annotations.is_empty() {
        return vec![annotations];
    }
    annotations.chunks(MAX_ANNOTATIONS_PER_REQUEST).collect()
}
