use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("MusicXML file does not exist: {}", .0.display())]
    InputMissing(PathBuf),
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("render failed (exit code: {code}): {stderr}")]
    Failed { code: String, stderr: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ScoreRenderPort: Send + Sync {
    /// Engraves `xml_path` into `<output_dir>/<stem>.pdf` and returns that path.
    fn render_pdf(&self, xml_path: &Path, output_dir: &Path) -> Result<PathBuf, RenderError>;
}
