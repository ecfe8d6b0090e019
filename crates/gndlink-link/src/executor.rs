//! Command execution seam.

use tracing::info;

/// Executes a decoded command out of process.
///
/// The dispatcher logs the outcome; execution failure is never fatal to the
/// link.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &str, args: &[String]) -> std::io::Result<()>;
}

/// Executor that only logs decoded commands. Used when no external command
/// tool is configured.
#[derive(Debug, Default)]
pub struct LoggingExecutor;

impl CommandExecutor for LoggingExecutor {
    fn execute(&self, command: &str, args: &[String]) -> std::io::Result<()> {
        info!(command, ?args, "command decoded (no executor configured)");
        Ok(())
    }
}
