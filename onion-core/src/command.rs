//! Invocation of the user-configured activation/deactivation commands.
//!
//! Commands are argv vectors (no shell); stdout/stderr are inherited so an
//! operator tailing the daemon's own stdout sees the script's output
//! interleaved. Only the exit code is observed: a non-zero exit or a spawn
//! failure is logged as an error but never changes role state — the role
//! transition is considered to have happened regardless of command success.

use tracing::{error, info};

/// An argv vector parsed from a config `actions.active` / `actions.passive`
/// value via shell-word splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Parse a raw config value using POSIX shell-word rules.
    pub fn parse(raw: &str) -> Result<Self, shell_words::ParseError> {
        Ok(Self::new(shell_words::split(raw)?))
    }

    /// Run the command to completion, logging its outcome. Never returns an
    /// error: a spawn failure is logged exactly like a non-zero exit.
    pub async fn run(&self, scope: &str) {
        if self.argv.is_empty() {
            return;
        }
        let mut cmd = tokio::process::Command::new(&self.argv[0]);
        cmd.args(&self.argv[1..]);

        match cmd.status().await {
            Ok(status) if status.success() => {
                info!(scope, command = ?self.argv, "command completed");
            }
            Ok(status) => {
                error!(scope, command = ?self.argv, code = ?status.code(), "command exited non-zero");
            }
            Err(err) => {
                error!(scope, command = ?self.argv, error = %err, "failed to spawn command");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_quoted_words() {
        let cmd = Command::parse("/usr/bin/keepalived --claim \"floating ip\"").unwrap();
        assert_eq!(
            cmd.argv,
            vec!["/usr/bin/keepalived", "--claim", "floating ip"]
        );
    }

    #[tokio::test]
    async fn empty_command_is_a_no_op() {
        Command::new(vec![]).run("test").await;
    }

    #[tokio::test]
    async fn run_survives_a_missing_binary() {
        let cmd = Command::new(vec!["/no/such/binary-onion-ha-test".to_string()]);
        cmd.run("test").await;
    }
}
