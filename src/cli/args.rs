use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lint-check-run",
    version,
    about = "把 tsc / ESLint / TSLint 的诊断结果作为 GitHub 检查运行上报",
    long_about = "lint-check-run 运行 TypeScript 编译器或 lint 工具，把诊断统一为注解，并通过 GitHub Checks API 分批上报到指定提交。不指定 --repo 时只在本地输出报告，退出码仍然反映结论。"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// 目标仓库 owner/name，不指定时跳过 GitHub 上报
    #[arg(long, global = true, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// 检查运行关联的提交，默认使用项目所在仓库的 HEAD
    #[arg(long, global = true, value_name = "SHA")]
    pub sha: Option<String>,

    /// 追加到检查名称后的标签，例如 "ESLint - frontend"
    #[arg(long, global = true, value_name = "LABEL")]
    pub label: Option<String>,

    /// 警告也判定为失败
    #[arg(long = "warnings-fail", global = true, default_value_t = false)]
    pub warnings_fail: bool,

    /// 输出格式
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// 输出调试日志
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 使用 tsc 对 TypeScript 项目做类型检查
    Typecheck {
        /// tsconfig.json 路径
        tsconfig: PathBuf,
    },

    /// 使用 ESLint 检查文件、目录或 glob
    Eslint {
        /// 要检查的文件、目录或 glob
        #[arg(required = true)]
        targets: Vec<String>,

        /// 覆盖项目配置的规则（JSON 对象）
        #[arg(long, value_name = "JSON")]
        rules: Option<String>,
    },

    /// 使用 TSLint 检查 TypeScript 项目
    Tslint {
        /// tsconfig.json 路径
        tsconfig: PathBuf,

        /// 覆盖项目配置的规则（JSON 对象）
        #[arg(long, value_name = "JSON")]
        rules: Option<String>,
    },

    /// 并发运行类型检查与 TSLint
    All {
        /// tsconfig.json 路径
        tsconfig: PathBuf,

        /// 覆盖 TSLint 规则（JSON 对象）
        #[arg(long, value_name = "JSON")]
        rules: Option<String>,
    },
}

impl Command {
    /// lint 规则覆盖参数，类型检查没有这个选项
    pub fn rules(&self) -> Option<&str> {
        match self {
            Command::Typecheck { .. } => None,
            Command::Eslint { rules, .. } | Command::Tslint { rules, .. } | Command::All { rules, .. } => {
                rules.as_deref()
            }
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 面向人的文本报告
    #[default]
    Human,
    /// JSON，供 CI 脚本读取
    Json,
}
