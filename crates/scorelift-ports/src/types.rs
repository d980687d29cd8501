use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// Non-interactive batch recognition followed by a MusicXML export.
    #[default]
    FullAutomatic,
    /// Opens the tool's own editor; export is left to the user.
    ManualAssisted,
}

impl ConversionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversionMode::FullAutomatic => "full_automatic",
            ConversionMode::ManualAssisted => "manual_assisted",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown conversion mode: {0}")]
pub struct ParseModeError(pub String);

impl FromStr for ConversionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_automatic" | "auto" | "automatic" => Ok(ConversionMode::FullAutomatic),
            "manual_assisted" | "manual" | "assisted" => Ok(ConversionMode::ManualAssisted),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// One user action's worth of work. Fields are fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    input_path: PathBuf,
    output_dir: PathBuf,
    mode: ConversionMode,
}

impl ConversionRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        mode: ConversionMode,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            mode,
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    success: bool,
    message: String,
    output_file: Option<PathBuf>,
}

impl ConversionResult {
    pub fn succeeded(message: impl Into<String>, output_file: PathBuf) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_file: Some(output_file),
        }
    }

    /// Success without a tracked artifact (assisted sessions).
    pub fn assisted(message: impl Into<String>, output_file: Option<PathBuf>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_file,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output_file: None,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
