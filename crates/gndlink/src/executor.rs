//! Out-of-process command execution.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use gndlink_link::CommandExecutor;

/// Runs decoded commands through an external command-line tool:
/// `<program> command-send <name> --arguments <args...> --dictionary <path>`.
pub struct ProcessCommandExecutor {
    program: String,
    dictionary_path: PathBuf,
}

impl ProcessCommandExecutor {
    pub fn new(program: String, dictionary_path: PathBuf) -> Self {
        Self {
            program,
            dictionary_path,
        }
    }
}

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(&self, command: &str, args: &[String]) -> std::io::Result<()> {
        let mut invocation = Command::new(&self.program);
        invocation.arg("command-send").arg(command);
        if !args.is_empty() {
            invocation.arg("--arguments").args(args);
        }
        invocation.arg("--dictionary").arg(&self.dictionary_path);

        info!(program = %self.program, command, "executing command out of process");
        let output = invocation.output()?;
        if output.status.success() {
            debug!(
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "command tool finished"
            );
            Ok(())
        } else {
            Err(std::io::Error::other(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_reports_spawn_error() {
        let executor = ProcessCommandExecutor::new(
            "/nonexistent/command-tool".into(),
            PathBuf::from("/tmp/dict.json"),
        );
        assert!(executor.execute("MATH.ADD", &["1".into()]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn successful_tool_run_is_ok() {
        // `true` ignores its arguments and exits zero.
        let executor =
            ProcessCommandExecutor::new("true".into(), PathBuf::from("/tmp/dict.json"));
        assert!(executor.execute("SYS.NOOP", &[]).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_run_is_err() {
        let executor =
            ProcessCommandExecutor::new("false".into(), PathBuf::from("/tmp/dict.json"));
        assert!(executor.execute("SYS.NOOP", &[]).is_err());
    }
}
