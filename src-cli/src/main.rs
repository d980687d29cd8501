mod cli;
mod interactive;

use clap::Parser;
use cli::{Cli, Commands, ConfigArgs, ConvertArgs};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use scorelift_core::{AppCore, AppError, Command, Event, ToolchainSnapshot};
use scorelift_infra_omr_audiveris::{AudiverisConfig, AudiverisOmr};
use scorelift_infra_render_musescore::MuseScoreRenderer;
use scorelift_infra_storage_fs::FsStorage;
use scorelift_ports::storage::{SettingsDto, StorageError, StoragePort};
use scorelift_ports::types::{ConversionMode, ConversionRequest, ConversionResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    Open(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) if !filters.trim().is_empty() => {
            builder.parse_filters(&filters);
        }
        _ => {
            let filter = log::LevelFilter::from_str(level).unwrap_or(log::LevelFilter::Warn);
            builder.filter_level(filter);
        }
    }
    builder.format_timestamp_secs().init();
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let storage = FsStorage::default();
    let stored = storage.load_settings().unwrap_or_else(|err| {
        warn!("ignoring unreadable settings at {}: {err}", storage.settings_path().display());
        SettingsDto::default()
    });
    let settings = apply_overrides(stored, &cli);

    match cli.command {
        None => {
            interactive::show_welcome();
            let choice = interactive::prompt_request(&settings.default_output_dir)?;
            let mut core = build_core(settings, storage);
            run_conversion(&mut core, choice.request, choice.render, false)
        }
        Some(Commands::Convert(args)) => {
            let mut settings = settings;
            if args.write_log {
                settings.write_audiveris_log = true;
            }
            let request = convert_request(&args, &settings);
            let mut core = build_core(settings, storage);
            run_conversion(&mut core, request, args.render, args.open)
        }
        Some(Commands::Render { xml, output, open }) => {
            let output_dir = output.unwrap_or_else(|| PathBuf::from(&settings.default_output_dir));
            let mut core = build_core(settings, storage);
            let pdf = render(&mut core, &xml, &output_dir)?;
            if open {
                open_with_default_app(&pdf)?;
            }
            Ok(true)
        }
        Some(Commands::Config(args)) => {
            let path = storage.settings_path();
            let mut core = build_core(settings, storage);
            configure(&mut core, &args, &path)?;
            Ok(true)
        }
        Some(Commands::Diagnostics { dir }) => {
            let mut core = build_core(settings, storage);
            core.handle_command(Command::ExportDiagnostics {
                path: dir.to_string_lossy().into_owned(),
            })?;
            println!("Diagnostics written to {}", dir.display());
            Ok(true)
        }
    }
}

fn apply_overrides(mut settings: SettingsDto, cli: &Cli) -> SettingsDto {
    if let Some(jar) = cli.jar.as_ref() {
        settings.audiveris_jar_path = Some(jar.to_string_lossy().into_owned());
    }
    if let Some(java) = cli.java.as_ref() {
        settings.java_path = Some(java.to_string_lossy().into_owned());
    }
    if let Some(musescore) = cli.musescore.as_ref() {
        settings.musescore_path = Some(musescore.clone());
    }
    settings
}

fn convert_request(args: &ConvertArgs, settings: &SettingsDto) -> ConversionRequest {
    let mode = args.mode.unwrap_or(settings.default_mode);
    let output_dir = args.output.clone().unwrap_or_default();
    ConversionRequest::new(args.input.clone(), output_dir, mode)
}

fn build_core(settings: SettingsDto, storage: FsStorage) -> AppCore {
    let omr = AudiverisOmr::new(AudiverisConfig::from_settings(&settings));
    let renderer = MuseScoreRenderer::new(settings.musescore_path.clone());

    let config = omr.config();
    let toolchain = ToolchainSnapshot {
        java_runtime: omr.locate_runtime(),
        audiveris_jar: config.jar_path.to_string_lossy().into_owned(),
        jar_present: config.jar_path.is_file(),
        primary_command: omr.build_primary_command(),
        fallback_command: omr.build_fallback_command(),
        musescore: renderer.executable(),
    };
    info!("java runtime: {}", toolchain.java_runtime);

    AppCore::new(
        Box::new(omr),
        Box::new(renderer),
        Some(Box::new(storage)),
        settings,
        toolchain,
    )
}

fn run_conversion(
    core: &mut AppCore,
    request: ConversionRequest,
    render_pdf: bool,
    open: bool,
) -> Result<bool, CliError> {
    let mode = request.mode();
    core.handle_command(Command::Convert { request })?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = loop {
        match core.next_event(Duration::from_millis(200)) {
            Some(Event::ConversionStarted { input_path, .. }) => {
                spinner.set_message(match mode {
                    ConversionMode::FullAutomatic => format!("Recognizing {input_path}"),
                    ConversionMode::ManualAssisted => {
                        format!("Audiveris session open for {input_path}; close it to continue")
                    }
                });
            }
            Some(Event::ConversionFinished { result }) => break result,
            Some(_) => {}
            // The worker frees its slot just before posting the finish event.
            None if !core.is_converting() => match core.next_event(Duration::from_secs(1)) {
                Some(Event::ConversionFinished { result }) => break result,
                _ => break ConversionResult::failed("conversion worker stopped without a result"),
            },
            None => {}
        }
    };
    spinner.finish_and_clear();
    show_result(&result);

    if let Some(xml) = result.output_file().filter(|_| result.success()) {
        let target = if render_pdf {
            let output_dir = xml.parent().unwrap_or_else(|| Path::new("."));
            Some(render(core, xml, output_dir)?)
        } else {
            None
        };
        if open {
            open_with_default_app(target.as_deref().unwrap_or(xml))?;
        }
    }
    Ok(result.success())
}

fn render(core: &mut AppCore, xml: &Path, output_dir: &Path) -> Result<PathBuf, CliError> {
    core.handle_command(Command::RenderScore {
        xml_path: xml.to_string_lossy().into_owned(),
        output_dir: output_dir.to_string_lossy().into_owned(),
    })?;
    let pdf = core
        .drain_events()
        .into_iter()
        .find_map(|event| match event {
            Event::ScoreRendered { pdf_path, .. } => Some(PathBuf::from(pdf_path)),
            _ => None,
        })
        .unwrap_or_else(|| output_dir.to_path_buf());
    println!("Rendered PDF: {}", pdf.display());
    Ok(pdf)
}

fn configure(core: &mut AppCore, args: &ConfigArgs, settings_path: &Path) -> Result<(), CliError> {
    let mut settings = core.settings().clone();
    if let Some(dir) = args.output_dir.as_ref() {
        settings.default_output_dir = dir.clone();
    }
    if let Some(mode) = args.mode {
        settings.default_mode = mode;
    }
    if let Some(write_log) = args.write_log {
        settings.write_audiveris_log = write_log;
    }

    if args.save {
        core.update_settings(settings.clone())?;
        println!("Saved settings to {}", settings_path.display());
    } else {
        println!("Settings file: {}", settings_path.display());
    }
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| StorageError::Serde(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn show_result(result: &ConversionResult) {
    println!("\n===== RESULT =====");
    println!("{}", result.message());
    if result.success() {
        if let Some(path) = result.output_file() {
            println!("Output file: {}", path.display());
        }
    }
    println!("==================\n");
}

fn open_with_default_app(path: &Path) -> Result<(), CliError> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(path);
        c
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(path);
        c
    };

    command
        .spawn()
        .map(|_| ())
        .map_err(|e| CliError::Open(format!("could not open {}: {e}", path.display())))
}
