use crate::types::ConversionMode;
use serde::{Deserialize, Serialize};

fn default_output_dir() -> String {
    "output".to_string()
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub audiveris_jar_path: Option<String>,
    pub java_path: Option<String>,
    #[serde(default = "default_output_dir")]
    pub default_output_dir: String,
    pub default_mode: ConversionMode,
    pub musescore_path: Option<String>,
    pub write_audiveris_log: bool,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            audiveris_jar_path: None,
            java_path: None,
            default_output_dir: default_output_dir(),
            default_mode: ConversionMode::FullAutomatic,
            musescore_path: None,
            write_audiveris_log: false,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
