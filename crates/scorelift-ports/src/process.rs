use std::io;

/// Captured result of one finished subprocess.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code_label(&self) -> String {
        self.code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// Runs a command line to completion. `argv[0]` is the program.
pub trait CommandRunner: Send + Sync {
    fn run(&self, argv: &[String]) -> io::Result<CommandOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zero_exit_is_success() {
        let killed = CommandOutput::default();
        assert!(!killed.success());
        assert_eq!(killed.code_label(), "?");

        let ok = CommandOutput {
            code: Some(0),
            ..CommandOutput::default()
        };
        assert!(ok.success());
        assert_eq!(ok.code_label(), "0");
    }
}
