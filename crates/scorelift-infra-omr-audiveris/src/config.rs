use scorelift_infra_process::executable_name;
use scorelift_ports::storage::SettingsDto;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAIN_CLASS: &str = "Audiveris";

/// Where Audiveris lives and how to start it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudiverisConfig {
    /// The application archive, e.g. `.../Audiveris/app/audiveris.jar`.
    pub jar_path: PathBuf,
    /// Explicit Java runtime; skips runtime discovery when set.
    pub java_path: Option<PathBuf>,
    pub main_class: String,
    /// Dump the captured streams of every attempt to `audiveris.log` in the output dir.
    pub write_log: bool,
}

impl AudiverisConfig {
    pub fn new(jar_path: impl Into<PathBuf>) -> Self {
        Self {
            jar_path: jar_path.into(),
            java_path: None,
            main_class: DEFAULT_MAIN_CLASS.to_string(),
            write_log: false,
        }
    }

    pub fn from_settings(settings: &SettingsDto) -> Self {
        let jar_path = settings
            .audiveris_jar_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_jar_path);
        Self {
            jar_path,
            java_path: settings
                .java_path
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            main_class: DEFAULT_MAIN_CLASS.to_string(),
            write_log: settings.write_audiveris_log,
        }
    }

    pub fn default_jar_path() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\Program Files\Audiveris\app\audiveris.jar")
        } else if cfg!(target_os = "macos") {
            PathBuf::from("/Applications/Audiveris.app/Contents/app/audiveris.jar")
        } else {
            PathBuf::from("/opt/audiveris/lib/app/audiveris.jar")
        }
    }

    /// Directory holding the archive and its sibling libraries.
    pub fn app_dir(&self) -> &Path {
        match self.jar_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Runtime locations bundled by the Audiveris installers, in lookup order.
    pub fn embedded_runtime_candidates(&self) -> Vec<PathBuf> {
        let Some(install_root) = self.app_dir().parent() else {
            return Vec::new();
        };
        let java = executable_name("java");
        vec![
            install_root.join("runtime").join("bin").join(&java),
            install_root
                .join("runtime")
                .join("Contents")
                .join("Home")
                .join("bin")
                .join(&java),
        ]
    }
}

impl Default for AudiverisConfig {
    fn default() -> Self {
        Self::new(Self::default_jar_path())
    }
}
