use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::cli::args::OutputFormat;
use crate::git::RepositoryQuery;
use crate::github::{CheckRunApi, RepoSlug};
use crate::infrastructure::error::Result;
use crate::models::{Conclusion, ConclusionPolicy, DiagnosticReport};
use crate::report::formatters::{JsonFormatter, ReportFormatter, TextFormatter};
use crate::report::{CheckRunOutcome, CheckRunReporter};

/// 上报目标
#[derive(Clone)]
pub struct RemoteTarget {
    pub api: Arc<dyn CheckRunApi>,
    pub repo: RepoSlug,
    /// 显式指定的提交；为空时取仓库 HEAD
    pub sha: Option<String>,
}

/// 一次检查的选项
#[derive(Clone, Default)]
pub struct CheckOptions {
    pub label: Option<String>,
    pub policy: ConclusionPolicy,
    pub output: OutputFormat,
    pub use_colors: bool,
    /// 为 `None` 时只在本地输出
    pub remote: Option<RemoteTarget>,
}

/// 一次检查的结果
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub report: DiagnosticReport,
    pub conclusion: Conclusion,
    pub outcome: Option<CheckRunOutcome>,
    /// 写往 stdout 的内容：human 模式为文本报告，json 模式只有 JSON 文档
    pub rendered: String,
}

/// 运行一个分析工具并（可选地）上报检查运行
///
/// 有上报目标时先创建 `in_progress` 的检查运行再启动分析工具，
/// 分析工具失败时检查运行保持 `in_progress`。输出放在
/// `CheckResult::rendered` 里由调用方打印，并发运行时不会交错。
pub async fn run_check(
    analyzer: &dyn Analyzer,
    git: &dyn RepositoryQuery,
    options: &CheckOptions,
) -> Result<CheckResult> {
    analyzer.validate()?;
    let name = analyzer.kind().check_name(options.label.as_deref());
    let mut rendered = String::new();

    let in_progress = match &options.remote {
        Some(remote) => {
            let root = git.repository_root_for(analyzer.project_locator()).await?;
            let sha = match &remote.sha {
                Some(sha) => sha.clone(),
                None => git.head_commit_of(&root).await?,
            };
            let reporter = CheckRunReporter::new(remote.api.clone(), remote.repo.clone(), root)
                .with_policy(options.policy);
            let check = reporter.start(&name, &sha).await?;
            tracing::info!(check_run_id = check.check_run_id(), name = %name, "已创建检查运行");
            if options.output == OutputFormat::Human {
                rendered.push_str(&format!("Created check {} ({})\n", check.check_run_id(), name));
            }
            Some(check)
        }
        None => None,
    };

    let report = analyzer.run().await?;
    let conclusion = report.conclusion(options.policy);

    if options.output == OutputFormat::Human {
        let formatter = TextFormatter::new().with_colors(options.use_colors);
        rendered.push_str(&formatter.format(&name, &report, conclusion)?);
        rendered.push('\n');
    }

    let outcome = match in_progress {
        Some(check) => {
            let outcome = check.finish(&report).await?;
            if options.output == OutputFormat::Human {
                rendered.push_str(&format!(
                    "Updated check {} with {} annotations in {} request(s).\n",
                    outcome.check_run_id, outcome.annotations_sent, outcome.updates_sent
                ));
            }
            Some(outcome)
        }
        None => None,
    };

    if options.output == OutputFormat::Json {
        let json = JsonFormatter::new().format_with_outcome(&name, &report, conclusion, outcome.as_ref())?;
        rendered.push_str(&json);
        rendered.push('\n');
    }

    Ok(CheckResult {
        name,
        report,
        conclusion,
        outcome,
        rendered,
    })
}

/// 并发运行类型检查与 TSLint，各自上报自己的检查运行
pub async fn run_all(
    typecheck: &dyn Analyzer,
    tslint: &dyn Analyzer,
    git: &dyn RepositoryQuery,
    options: &CheckOptions,
) -> Result<Vec<CheckResult>> {
    let (typecheck, tslint) = tokio::join!(
        run_check(typecheck, git, options),
        run_check(tslint, git, options)
    );
    Ok(vec![typecheck?, tslint?])
}

/// 多个结果的总体结论：任一失败即失败
pub fn overall_conclusion(results: &[CheckResult]) -> Conclusion {
    results
        .iter()
        .fold(Conclusion::Success, |acc, result| acc.combine(result.conclusion))
}
