use crate::types::ConversionMode;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum OmrError {
    #[error("Audiveris archive not found at {}", .0.display())]
    ToolNotFound(PathBuf),
    #[error("input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),
    #[error(
        "Audiveris failed with both -cp and -jar launches:\n\n\
         --- -cp attempt ---\nSTDOUT:\n{primary_stdout}\nSTDERR:\n{primary_stderr}\n\n\
         --- -jar attempt ---\nSTDOUT:\n{fallback_stdout}\nSTDERR:\n{fallback_stderr}\n"
    )]
    SubprocessFailure {
        primary_stdout: String,
        primary_stderr: String,
        fallback_stdout: String,
        fallback_stderr: String,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OmrError {
    /// Conditions the invoker checks for on purpose, as opposed to
    /// environment failures it merely passes through.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            OmrError::ToolNotFound(_) | OmrError::InputMissing(_) | OmrError::SubprocessFailure { .. }
        )
    }
}

/// Blocking recognition call. Implementations must not keep state between
/// calls; every call owns its subprocesses until it returns.
pub trait OmrPort: Send + Sync {
    /// Returns the discovered export for batch runs, `None` when nothing was
    /// found or when the mode leaves exporting to the user.
    fn invoke(
        &self,
        input_path: &Path,
        output_dir: &Path,
        mode: ConversionMode,
    ) -> Result<Option<PathBuf>, OmrError>;
}
