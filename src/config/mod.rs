use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::args::{Args, OutputFormat};
use crate::github::auth::{Credentials, DEFAULT_APP_ID};
use crate::github::client::DEFAULT_API_URL;
use crate::infrastructure::logging::{LogFormat, LoggingConfig};
use crate::infrastructure::network::NetworkConfig;
use crate::models::ConclusionPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub github_api_url: String,
    pub network: NetworkConfig,
    pub eslint_bin: String,
    pub tslint_bin: String,
    pub tsc_bin: String,
    pub logging: LoggingConfig,
    pub policy: ConclusionPolicy,
    pub output: OutputFormat,
    /// 无法解析的环境变量，由 `validate()` 报告
    invalid_env: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: Credentials {
                app_id: Some(DEFAULT_APP_ID),
                ..Default::default()
            },
            github_api_url: DEFAULT_API_URL.to_string(),
            network: NetworkConfig::default(),
            eslint_bin: "eslint".to_string(),
            tslint_bin: "tslint".to_string(),
            tsc_bin: "tsc".to_string(),
            logging: LoggingConfig::default(),
            policy: ConclusionPolicy::default(),
            output: OutputFormat::default(),
            invalid_env: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config::default();

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.lint-check-run/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Some(token) = non_empty_var("GITHUB_TOKEN") {
            self.credentials.token = Some(token);
        }
        if let Some(id) = self.parse_var("GITHUB_APP_ID") {
            self.credentials.app_id = Some(id);
        }
        if let Some(jwt) = non_empty_var("GITHUB_APP_JWT") {
            self.credentials.app_jwt = Some(jwt);
        }
        if let Some(key) = non_empty_var("GITHUB_APP_PRIVATE_KEY") {
            self.credentials.private_key = Some(key);
        }
        if let Some(id) = self.parse_var("GITHUB_APP_INSTALLATION_ID") {
            self.credentials.installation_id = Some(id);
        }
        if let Some(url) = non_empty_var("GITHUB_API_URL") {
            self.github_api_url = url;
        }

        if let Some(bin) = non_empty_var("LINT_CHECK_ESLINT_BIN") {
            self.eslint_bin = bin;
        }
        if let Some(bin) = non_empty_var("LINT_CHECK_TSLINT_BIN") {
            self.tslint_bin = bin;
        }
        if let Some(bin) = non_empty_var("LINT_CHECK_TSC_BIN") {
            self.tsc_bin = bin;
        }

        if let Some(secs) = self.parse_var::<u64>("LINT_CHECK_HTTP_TIMEOUT") {
            self.network.timeout = Duration::from_secs(secs);
        }
        if let Some(format) = non_empty_var("LINT_CHECK_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.logging.format = format,
                None => self.invalid_env.push(format!(
                    "LINT_CHECK_LOG_FORMAT={} (expected pretty, compact or json)",
                    format
                )),
            }
        }
        if let Some(filter) = non_empty_var("LINT_CHECK_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    fn parse_var<T: std::str::FromStr>(&mut self, name: &str) -> Option<T> {
        let raw = non_empty_var(name)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.invalid_env.push(format!("{}={}", name, raw));
                None
            }
        }
    }

    pub fn update_from_args(&mut self, args: &Args) {
        // 命令行参数优先级最高
        if args.warnings_fail {
            self.policy = ConclusionPolicy::WarningsFail;
        }
        self.output = args.output;
        self.logging = self.logging.clone().verbose(args.verbose);
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.invalid_env.is_empty() {
            anyhow::bail!("Invalid environment variables: {}", self.invalid_env.join(", "));
        }
        if url::Url::parse(&self.github_api_url).is_err() {
            anyhow::bail!("GITHUB_API_URL is not a valid URL: {}", self.github_api_url);
        }
        Ok(())
    }

    /// 需要上报到 GitHub 时检查认证信息是否齐全
    pub fn validate_for_remote(&self) -> anyhow::Result<()> {
        self.validate()?;
        self.credentials.method()?;
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
