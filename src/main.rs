use clap::Parser;
use lint_check_run::cli::args::Args;
use lint_check_run::commands;
use lint_check_run::config::Config;
use lint_check_run::infrastructure::{setup_logging, CheckError};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mut config = Config::new();
    config.update_from_args(&args);

    if let Err(e) = setup_logging(&config.logging) {
        eprintln!("日志初始化失败: {}", e);
    }

    let outcome = match config.validate() {
        Ok(()) => commands::route_command(&args, &config).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(conclusion) => {
            if conclusion.is_failure() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            // 配置错误只打印一行，其余错误带上完整原因链
            match e.downcast_ref::<CheckError>() {
                Some(inner) if inner.is_configuration() => eprintln!("{}", inner),
                _ => eprintln!("Error: {:?}", e),
            }
            std::process::exit(1);
        }
    }
}
