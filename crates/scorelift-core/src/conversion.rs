use log::{error, info, warn};
use parking_lot::RwLock;
use scorelift_ports::omr::OmrPort;
use scorelift_ports::types::{ConversionMode, ConversionRequest, ConversionResult};
use std::path::{Path, PathBuf};

/// Turns invoker outcomes into a `ConversionResult`. Holds no per-call
/// state: every `convert` runs the tool again from scratch. The default
/// output dir can be swapped while a worker holds the service.
pub struct ConversionService {
    omr: Box<dyn OmrPort>,
    default_output_dir: RwLock<PathBuf>,
}

impl ConversionService {
    pub fn new(omr: Box<dyn OmrPort>, default_output_dir: impl Into<PathBuf>) -> Self {
        Self {
            omr,
            default_output_dir: RwLock::new(default_output_dir.into()),
        }
    }

    pub fn default_output_dir(&self) -> PathBuf {
        self.default_output_dir.read().clone()
    }

    pub fn set_default_output_dir(&self, dir: impl Into<PathBuf>) {
        *self.default_output_dir.write() = dir.into();
    }

    /// The request's dir, or the default when the request leaves it empty.
    pub fn resolve_output_dir(&self, request: &ConversionRequest) -> PathBuf {
        if request.output_dir().as_os_str().is_empty() {
            self.default_output_dir()
        } else {
            request.output_dir().to_path_buf()
        }
    }

    /// Never fails: every error ends up as `success = false` with a message.
    pub fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        let output_dir = self.resolve_output_dir(request);
        info!(
            "converting {} into {} ({})",
            request.input_path().display(),
            output_dir.display(),
            request.mode()
        );

        match self.omr.invoke(request.input_path(), &output_dir, request.mode()) {
            Ok(found) => interpret(request.mode(), &output_dir, found),
            Err(err) if err.is_expected() => {
                warn!("conversion failed: {err}");
                ConversionResult::failed(err.to_string())
            }
            Err(err) => {
                error!("unexpected conversion error: {err}");
                ConversionResult::failed(format!("Unexpected error during conversion: {err}"))
            }
        }
    }
}

fn interpret(mode: ConversionMode, output_dir: &Path, found: Option<PathBuf>) -> ConversionResult {
    match (mode, found) {
        (ConversionMode::FullAutomatic, Some(path)) if path.is_file() => ConversionResult::succeeded(
            format!("Conversion finished. Generated file: {}", path.display()),
            path,
        ),
        (ConversionMode::FullAutomatic, Some(path)) => ConversionResult::failed(format!(
            "Unexpected error during conversion: reported export {} does not exist",
            path.display()
        )),
        (ConversionMode::FullAutomatic, None) => ConversionResult::failed(format!(
            "Audiveris finished without errors, but no MusicXML (.mxl/.xml) was found in {}.",
            output_dir.display()
        )),
        (ConversionMode::ManualAssisted, found) => ConversionResult::assisted(
            "Audiveris was launched in assisted mode. Make your corrections and export \
             the MusicXML from Audiveris itself.",
            found,
        ),
    }
}
