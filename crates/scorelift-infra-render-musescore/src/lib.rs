use log::{debug, info};
use scorelift_infra_process::{find_on_path, SystemRunner};
use scorelift_ports::process::CommandRunner;
use scorelift_ports::render::{RenderError, ScoreRenderPort};
use std::fs;
use std::path::{Path, PathBuf};

const PATH_NAMES: [&str; 5] = ["mscore", "MuseScore4", "mscore4portable", "musescore", "MuseScore3"];

pub struct MuseScoreRenderer {
    executable: Option<String>,
    runner: Box<dyn CommandRunner>,
}

impl MuseScoreRenderer {
    pub fn new(executable: Option<String>) -> Self {
        Self::with_runner(executable, Box::new(SystemRunner))
    }

    pub fn with_runner(executable: Option<String>, runner: Box<dyn CommandRunner>) -> Self {
        let executable = executable
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self { executable, runner }
    }

    pub fn executable(&self) -> String {
        if let Some(explicit) = self.executable.as_ref() {
            return explicit.clone();
        }
        if let Some(installed) = default_install() {
            return installed.to_string_lossy().into_owned();
        }
        PATH_NAMES
            .iter()
            .find_map(|name| find_on_path(name))
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| PATH_NAMES[0].to_string())
    }
}

fn default_install() -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\MuseScore 4\bin\MuseScore4.exe"),
            PathBuf::from(r"C:\Program Files\MuseScore 3\bin\MuseScore3.exe"),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications/MuseScore 4.app/Contents/MacOS/mscore"),
            PathBuf::from("/Applications/MuseScore 3.app/Contents/MacOS/mscore"),
        ]
    } else {
        Vec::new()
    };
    candidates.into_iter().find(|c| c.is_file())
}

pub fn pdf_path_for(xml_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = xml_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("score");
    output_dir.join(format!("{stem}.pdf"))
}

impl ScoreRenderPort for MuseScoreRenderer {
    fn render_pdf(&self, xml_path: &Path, output_dir: &Path) -> Result<PathBuf, RenderError> {
        if !xml_path.is_file() {
            return Err(RenderError::InputMissing(xml_path.to_path_buf()));
        }
        fs::create_dir_all(output_dir)?;

        let output_pdf = pdf_path_for(xml_path, output_dir);
        let argv = vec![
            self.executable(),
            xml_path.to_string_lossy().into_owned(),
            "-o".to_string(),
            output_pdf.to_string_lossy().into_owned(),
        ];
        debug!("command line: {argv:?}");

        let output = self.runner.run(&argv).map_err(|source| RenderError::Launch {
            program: argv[0].clone(),
            source,
        })?;
        if !output.success() {
            return Err(RenderError::Failed {
                code: output.code_label(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        info!("rendered {}", output_pdf.display());
        Ok(output_pdf)
    }
}
