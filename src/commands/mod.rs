pub mod check;

pub use check::{overall_conclusion, run_all, run_check, CheckOptions, CheckResult, RemoteTarget};

use std::io::IsTerminal;
use std::sync::Arc;

use crate::analysis::{Analyzer, ESLintAnalyzer, RuleOverrides, TSLintAnalyzer, TypeScriptAnalyzer};
use crate::cli::args::{Args, Command};
use crate::config::Config;
use crate::git::GitCli;
use crate::github::{authenticate, RepoSlug};
use crate::models::Conclusion;

/// 根据子命令构造分析工具并执行，返回总体结论
pub async fn route_command(args: &Args, config: &Config) -> anyhow::Result<Conclusion> {
    // 参数与项目配置的校验先于任何远端调用
    let repo = args.repo.as_deref().map(RepoSlug::parse).transpose()?;
    let overrides = args
        .command
        .rules()
        .map(RuleOverrides::parse)
        .transpose()?
        .unwrap_or_default();

    let analyzers = build_analyzers(&args.command, config, overrides);
    for analyzer in &analyzers {
        analyzer.validate()?;
    }

    let remote = match repo {
        Some(repo) => {
            config.validate_for_remote()?;
            let client = authenticate(&config.credentials, &config.github_api_url, &config.network).await?;
            Some(RemoteTarget {
                api: Arc::new(client),
                repo,
                sha: args.sha.clone(),
            })
        }
        None => {
            tracing::info!("未指定 --repo，跳过 GitHub 上报");
            None
        }
    };

    let options = CheckOptions {
        label: args.label.clone(),
        policy: config.policy,
        output: config.output,
        use_colors: std::io::stdout().is_terminal(),
        remote,
    };
    let git = GitCli::new();

    let results = match analyzers.as_slice() {
        [typecheck, tslint] => run_all(typecheck.as_ref(), tslint.as_ref(), &git, &options).await?,
        _ => {
            let mut results = Vec::with_capacity(analyzers.len());
            for analyzer in &analyzers {
                results.push(run_check(analyzer.as_ref(), &git, &options).await?);
            }
            results
        }
    };

    for result in &results {
        print!("{}", result.rendered);
    }

    Ok(overall_conclusion(&results))
}

/// 子命令对应的分析工具；`all` 为类型检查加 TSLint
fn build_analyzers(command: &Command, config: &Config, overrides: RuleOverrides) -> Vec<Box<dyn Analyzer>> {
    match command {
        Command::Typecheck { tsconfig } => {
            vec![Box::new(TypeScriptAnalyzer::new(tsconfig).with_program(&config.tsc_bin))]
        }
        Command::Eslint { targets, .. } => vec![Box::new(
            ESLintAnalyzer::new(targets.clone())
                .with_program(&config.eslint_bin)
                .with_overrides(overrides),
        )],
        Command::Tslint { tsconfig, .. } => vec![Box::new(
            TSLintAnalyzer::new(tsconfig)
                .with_program(&config.tslint_bin)
                .with_overrides(overrides),
        )],
        Command::All { tsconfig, .. } => vec![
            Box::new(TypeScriptAnalyzer::new(tsconfig).with_program(&config.tsc_bin)),
            Box::new(
                TSLintAnalyzer::new(tsconfig)
                    .with_program(&config.tslint_bin)
                    .with_overrides(overrides),
            ),
        ],
    }
}
