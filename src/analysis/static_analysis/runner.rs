use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::infrastructure::error::{CheckError, Result};

/// 外部工具一次运行的输出
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// 被信号终止时为 `None`
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// 退出码是否在允许范围内
    pub fn exited_with(&self, allowed: &[i32]) -> bool {
        self.code.map(|code| allowed.contains(&code)).unwrap_or(false)
    }

    /// 错误信息里使用的输出片段，优先 stderr
    pub fn diagnostic_text(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };

        const LIMIT: usize = 2000;
        if text.chars().count() > LIMIT {
            let truncated: String = text.chars().take(LIMIT).collect();
            format!("{}...", truncated)
        } else {
            text.to_string()
        }
    }

    pub fn exit_description(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// 运行外部分析工具并收集输出
///
/// 工具无法启动（未安装、无执行权限）时返回 `AnalysisTool` 错误；退出码由调用方解释。
pub async fn run_tool(program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput> {
    tracing::debug!(program, ?args, ?cwd, "启动分析工具");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    let output = command
        .output()
        .await
        .map_err(|e| CheckError::analysis_tool(program, format!("failed to start: {}", e)))?;

    let result = ToolOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    tracing::debug!(
        program,
        code = ?result.code,
        stdout_len = result.stdout.len(),
        stderr_len = result.stderr.len(),
        "分析工具已退出"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program() {
        let err = run_tool("definitely-not-a-real-linter-binary", &[], None)
            .await
            .unwrap_err();
        match err {
            CheckError::AnalysisTool { tool, message } => {
                assert_eq!(tool, "definitely-not-a-real-linter-binary");
                assert!(message.contains("failed to start"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = run_tool("sh", &args, None).await.unwrap();

        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(output.exited_with(&[1, 3]));
        assert!(!output.exited_with(&[0]));
        assert_eq!(output.diagnostic_text(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = vec!["-c".to_string(), "pwd".to_string()];
        let output = run_tool("sh", &args, Some(dir.path())).await.unwrap();

        let printed = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            printed.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_diagnostic_text_falls_back_to_stdout() {
        let output = ToolOutput {
            code: Some(2),
            stdout: "Oops! Something went wrong!\n".to_string(),
            stderr: "  ".to_string(),
        };
        assert_eq!(output.diagnostic_text(), "Oops! Something went wrong!");
        assert_eq!(output.exit_description(), "exit code 2");
    }
}
