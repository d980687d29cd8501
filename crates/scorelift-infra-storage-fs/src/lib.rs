use log::{debug, warn};
use scorelift_ports::storage::{SettingsDto, StorageError, StoragePort};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";
const QUARANTINE_SUFFIX: &str = "corrupt";

/// Keeps `settings.json` under the platform config dir.
///
/// Loaded values are normalised: blank tool paths become "not configured"
/// and a blank output dir becomes the default. A file that no longer parses
/// is moved aside to `settings.json.corrupt` and defaults are used, so one
/// bad edit does not lock the user out of the CLI.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("ScoreLift"))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    fn quarantine_path(&self) -> PathBuf {
        self.base_dir.join(format!("{SETTINGS_FILE}.{QUARANTINE_SUFFIX}"))
    }

    fn quarantine(&self, path: &Path, reason: &str) {
        let target = self.quarantine_path();
        warn!(
            "settings at {} are unreadable ({reason}); moved to {} and using defaults",
            path.display(),
            target.display()
        );
        if let Err(err) = fs::rename(path, &target) {
            warn!("could not move {} aside: {err}", path.display());
        }
    }

    /// Writes through a sibling temp file so an interrupted save leaves the
    /// previous settings intact.
    fn write_atomically(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { base_dir }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed tool paths, `None` for blanks, default output dir when blank.
pub fn normalize(settings: SettingsDto) -> SettingsDto {
    let default_output_dir = match settings.default_output_dir.trim() {
        "" => SettingsDto::default().default_output_dir,
        dir => dir.to_string(),
    };
    SettingsDto {
        audiveris_jar_path: blank_to_none(settings.audiveris_jar_path),
        java_path: blank_to_none(settings.java_path),
        musescore_path: blank_to_none(settings.musescore_path),
        default_output_dir,
        ..settings
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(SettingsDto::default());
        }
        let data = fs::read(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        match serde_json::from_slice::<SettingsDto>(&data) {
            Ok(settings) => Ok(normalize(settings)),
            Err(err) => {
                self.quarantine(&path, &err.to_string());
                Ok(SettingsDto::default())
            }
        }
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let path = self.settings_path();
        debug!("saving settings to {}", path.display());
        let data = serde_json::to_vec_pretty(&normalize(s.clone()))
            .map_err(|e| StorageError::Serde(e.to_string()))?;
        Self::write_atomically(&path, &data)
    }
}
