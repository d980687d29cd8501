use scorelift_ports::storage::{SettingsDto, StorageError};
use scorelift_ports::types::ConversionResult;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

/// Resolved external tools, captured by the caller that built the adapters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainSnapshot {
    pub java_runtime: String,
    pub audiveris_jar: String,
    pub jar_present: bool,
    pub primary_command: Vec<String>,
    pub fallback_command: Vec<String>,
    pub musescore: String,
}

#[derive(Serialize)]
struct RecentResults<'a> {
    results: &'a [ConversionResult],
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    toolchain: &ToolchainSnapshot,
    recent_results: &[ConversionResult],
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "ScoreLift".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(&dir.join("toolchain.json"), toolchain)?;
    write_json(
        &dir.join("recent_results.json"),
        &RecentResults {
            results: recent_results,
        },
    )?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
