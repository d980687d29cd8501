mod config;
mod discovery;

pub use config::{AudiverisConfig, DEFAULT_MAIN_CLASS};
pub use discovery::{export_rank, find_export, EXPORT_EXTENSIONS};

use log::{debug, info, warn};
use scorelift_ports::omr::{OmrError, OmrPort};
use scorelift_infra_process::{find_on_path, SystemRunner};
use scorelift_ports::process::{CommandOutput, CommandRunner};
use scorelift_ports::types::ConversionMode;
use std::fs;
use std::path::{Path, PathBuf};

/// The two ways of starting Audiveris. `invoke` walks `ORDER` and stops at
/// the first attempt that exits with code 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// `java -cp <every file in app dir> Audiveris`
    Classpath,
    /// `java -jar audiveris.jar`
    Jar,
}

impl LaunchStrategy {
    pub const ORDER: [LaunchStrategy; 2] = [LaunchStrategy::Classpath, LaunchStrategy::Jar];

    pub fn label(self) -> &'static str {
        match self {
            LaunchStrategy::Classpath => "-cp",
            LaunchStrategy::Jar => "-jar",
        }
    }
}

pub struct AudiverisOmr {
    config: AudiverisConfig,
    runner: Box<dyn CommandRunner>,
}

impl AudiverisOmr {
    pub fn new(config: AudiverisConfig) -> Self {
        Self::with_runner(config, Box::new(SystemRunner))
    }

    pub fn with_runner(config: AudiverisConfig, runner: Box<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &AudiverisConfig {
        &self.config
    }

    /// Java executable to start. Never fails: when nothing better is found
    /// the bare `java` is returned and left to the OS to resolve.
    pub fn locate_runtime(&self) -> String {
        if let Some(explicit) = self.config.java_path.as_ref() {
            return explicit.to_string_lossy().into_owned();
        }
        if let Some(embedded) = self
            .config
            .embedded_runtime_candidates()
            .into_iter()
            .find(|candidate| candidate.is_file())
        {
            return embedded.to_string_lossy().into_owned();
        }
        if let Some(found) = find_on_path("java") {
            return found.to_string_lossy().into_owned();
        }
        "java".to_string()
    }

    pub fn build_primary_command(&self) -> Vec<String> {
        vec![
            self.locate_runtime(),
            "-cp".to_string(),
            self.classpath(),
            self.config.main_class.clone(),
        ]
    }

    pub fn build_fallback_command(&self) -> Vec<String> {
        vec![
            self.locate_runtime(),
            "-jar".to_string(),
            self.config.jar_path.to_string_lossy().into_owned(),
        ]
    }

    pub fn build_command(
        &self,
        strategy: LaunchStrategy,
        input_path: &Path,
        output_dir: &Path,
        mode: ConversionMode,
    ) -> Vec<String> {
        let mut argv = match strategy {
            LaunchStrategy::Classpath => self.build_primary_command(),
            LaunchStrategy::Jar => self.build_fallback_command(),
        };
        argv.extend(mode_arguments(mode, input_path, output_dir));
        argv
    }

    /// Every regular file of the app dir, sorted, joined with the platform
    /// list separator. Falls back to the archive alone if the directory
    /// cannot be listed.
    fn classpath(&self) -> String {
        let jar = self.config.jar_path.to_string_lossy().into_owned();
        let Ok(entries) = fs::read_dir(self.config.app_dir()) else {
            return jar;
        };
        let mut members: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        if members.is_empty() {
            return jar;
        }
        members.sort();
        match std::env::join_paths(&members) {
            Ok(joined) => joined.to_string_lossy().into_owned(),
            Err(err) => {
                warn!("cannot build classpath from {}: {err}", self.config.app_dir().display());
                jar
            }
        }
    }

    fn attempt(&self, strategy: LaunchStrategy, argv: &[String]) -> Result<CommandOutput, OmrError> {
        info!("running Audiveris ({})", strategy.label());
        debug!("command line: {argv:?}");
        let output = self.runner.run(argv).map_err(|source| OmrError::Launch {
            program: argv.first().cloned().unwrap_or_default(),
            source,
        })?;
        info!(
            "Audiveris ({}) exited with code {}",
            strategy.label(),
            output.code_label()
        );
        Ok(output)
    }

    fn write_log(&self, output_dir: &Path, attempts: &[(LaunchStrategy, CommandOutput)]) {
        if !self.config.write_log {
            return;
        }
        let mut content = String::new();
        for (strategy, output) in attempts {
            content.push_str(&format!(
                "--- {} attempt (exit code: {}) ---\nSTDOUT:\n{}\nSTDERR:\n{}\n\n",
                strategy.label(),
                output.code_label(),
                output.stdout,
                output.stderr
            ));
        }
        let path = output_dir.join("audiveris.log");
        if let Err(err) = fs::write(&path, content) {
            warn!("could not write {}: {err}", path.display());
        }
    }
}

/// Both attempts' streams, in launch order.
fn subprocess_failure(attempts: Vec<(LaunchStrategy, CommandOutput)>) -> OmrError {
    let mut outputs = attempts.into_iter().map(|(_, output)| output);
    let primary = outputs.next().unwrap_or_default();
    let fallback = outputs.next().unwrap_or_default();
    OmrError::SubprocessFailure {
        primary_stdout: primary.stdout,
        primary_stderr: primary.stderr,
        fallback_stdout: fallback.stdout,
        fallback_stderr: fallback.stderr,
    }
}

/// Arguments appended after either launch prefix.
pub fn mode_arguments(mode: ConversionMode, input_path: &Path, output_dir: &Path) -> Vec<String> {
    let input = input_path.to_string_lossy().into_owned();
    match mode {
        ConversionMode::FullAutomatic => vec![
            "-batch".to_string(),
            "-export".to_string(),
            "-output".to_string(),
            output_dir.to_string_lossy().into_owned(),
            input,
        ],
        ConversionMode::ManualAssisted => vec![input],
    }
}

impl OmrPort for AudiverisOmr {
    fn invoke(
        &self,
        input_path: &Path,
        output_dir: &Path,
        mode: ConversionMode,
    ) -> Result<Option<PathBuf>, OmrError> {
        if !self.config.jar_path.is_file() {
            return Err(OmrError::ToolNotFound(self.config.jar_path.clone()));
        }
        if !input_path.is_file() {
            return Err(OmrError::InputMissing(input_path.to_path_buf()));
        }

        fs::create_dir_all(output_dir)?;

        let mut attempts: Vec<(LaunchStrategy, CommandOutput)> =
            Vec::with_capacity(LaunchStrategy::ORDER.len());
        for strategy in LaunchStrategy::ORDER {
            if let Some((previous, output)) = attempts.last() {
                warn!(
                    "{} launch failed (exit code: {}), retrying with {}",
                    previous.label(),
                    output.code_label(),
                    strategy.label()
                );
            }
            let argv = self.build_command(strategy, input_path, output_dir, mode);
            let output = self.attempt(strategy, &argv)?;
            let succeeded = output.success();
            attempts.push((strategy, output));
            if succeeded {
                break;
            }
        }
        self.write_log(output_dir, &attempts);

        if !attempts.iter().any(|(_, output)| output.success()) {
            return Err(subprocess_failure(attempts));
        }

        match mode {
            ConversionMode::FullAutomatic => {
                let stem = input_path.file_stem().and_then(|s| s.to_str());
                let found = find_export(output_dir, stem);
                match found.as_ref() {
                    Some(path) => info!("found export {}", path.display()),
                    None => warn!("no MusicXML export under {}", output_dir.display()),
                }
                Ok(found)
            }
            ConversionMode::ManualAssisted => Ok(None),
        }
    }
}
