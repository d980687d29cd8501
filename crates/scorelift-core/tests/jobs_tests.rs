use parking_lot::Mutex;
use scorelift_core::{AppCore, AppError, Command, ConversionJobs, ConversionService, Event, JobError, ToolchainSnapshot};
use scorelift_ports::omr::{OmrError, OmrPort};
use scorelift_ports::render::{RenderError, ScoreRenderPort};
use scorelift_ports::storage::SettingsDto;
use scorelift_ports::types::{ConversionMode, ConversionRequest, ConversionResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

/// Blocks every invocation until the test releases it.
struct GatedOmr {
    gate: Mutex<Receiver<()>>,
}

impl OmrPort for GatedOmr {
    fn invoke(
        &self,
        _input_path: &Path,
        _output_dir: &Path,
        _mode: ConversionMode,
    ) -> Result<Option<PathBuf>, OmrError> {
        let _ = self.gate.lock().recv_timeout(WAIT);
        Ok(None)
    }
}

/// Records the output dir it was asked to use.
struct RecordingOmr {
    output_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl OmrPort for RecordingOmr {
    fn invoke(
        &self,
        _input_path: &Path,
        output_dir: &Path,
        _mode: ConversionMode,
    ) -> Result<Option<PathBuf>, OmrError> {
        self.output_dirs.lock().push(output_dir.to_path_buf());
        Ok(None)
    }
}

struct PanickingOmr;

impl OmrPort for PanickingOmr {
    fn invoke(
        &self,
        _input_path: &Path,
        _output_dir: &Path,
        _mode: ConversionMode,
    ) -> Result<Option<PathBuf>, OmrError> {
        panic!("adapter bug");
    }
}

struct NoRender;

impl ScoreRenderPort for NoRender {
    fn render_pdf(&self, xml_path: &Path, _output_dir: &Path) -> Result<PathBuf, RenderError> {
        Err(RenderError::InputMissing(xml_path.to_path_buf()))
    }
}

fn assisted(input: &str) -> ConversionRequest {
    ConversionRequest::new(input, "", ConversionMode::ManualAssisted)
}

#[test]
fn worker_reports_start_then_finish() {
    let (gate_tx, gate_rx) = mpsc::channel();
    let service = Arc::new(ConversionService::new(
        Box::new(GatedOmr {
            gate: Mutex::new(gate_rx),
        }),
        "fallback-dir",
    ));
    let (events_tx, events_rx) = mpsc::channel();
    let jobs = ConversionJobs::new(service, events_tx);

    jobs.start(assisted("a.pdf")).unwrap();
    assert!(jobs.is_running());

    match events_rx.recv_timeout(WAIT).unwrap() {
        Event::ConversionStarted {
            input_path,
            output_dir,
            mode,
        } => {
            assert_eq!(input_path, "a.pdf");
            assert_eq!(output_dir, "fallback-dir");
            assert_eq!(mode, ConversionMode::ManualAssisted);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    gate_tx.send(()).unwrap();
    match events_rx.recv_timeout(WAIT).unwrap() {
        Event::ConversionFinished { result } => assert!(result.success()),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!jobs.is_running());
}

#[test]
fn second_job_is_rejected_while_first_runs() {
    let (gate_tx, gate_rx) = mpsc::channel();
    let service = Arc::new(ConversionService::new(
        Box::new(GatedOmr {
            gate: Mutex::new(gate_rx),
        }),
        "out",
    ));
    let (events_tx, events_rx) = mpsc::channel();
    let jobs = ConversionJobs::new(service, events_tx);

    jobs.start(assisted("first.pdf")).unwrap();
    let err = jobs.start(assisted("second.pdf")).unwrap_err();
    assert!(matches!(err, JobError::AlreadyRunning(ref p) if p == Path::new("first.pdf")));

    gate_tx.send(()).unwrap();
    loop {
        if let Event::ConversionFinished { .. } = events_rx.recv_timeout(WAIT).unwrap() {
            break;
        }
    }

    gate_tx.send(()).unwrap();
    jobs.start(assisted("second.pdf")).unwrap();
}

#[test]
fn app_core_runs_conversion_and_exports_diagnostics() {
    let tmp = tempfile::tempdir().unwrap();
    let (gate_tx, gate_rx) = mpsc::channel();
    gate_tx.send(()).unwrap();
    let mut core = AppCore::new(
        Box::new(GatedOmr {
            gate: Mutex::new(gate_rx),
        }),
        Box::new(NoRender),
        None,
        SettingsDto::default(),
        ToolchainSnapshot {
            java_runtime: "java".to_string(),
            ..ToolchainSnapshot::default()
        },
    );

    core.handle_command(Command::Convert {
        request: assisted("a.pdf"),
    })
    .unwrap();

    let mut finished = None;
    while finished.is_none() {
        match core.next_event(WAIT) {
            Some(Event::ConversionFinished { result }) => finished = Some(result),
            Some(_) => {}
            None => panic!("conversion never finished"),
        }
    }
    assert!(finished.unwrap().success());

    let diag_dir = tmp.path().join("diag");
    core.handle_command(Command::ExportDiagnostics {
        path: diag_dir.to_string_lossy().into_owned(),
    })
    .unwrap();

    let recent = fs::read_to_string(diag_dir.join("recent_results.json")).unwrap();
    assert!(recent.contains("assisted mode"));
    let toolchain = fs::read_to_string(diag_dir.join("toolchain.json")).unwrap();
    assert!(toolchain.contains("\"java_runtime\": \"java\""));
    assert!(matches!(
        core.drain_events().as_slice(),
        [Event::DiagnosticsExported { .. }]
    ));
}

#[test]
fn render_failure_surfaces_as_app_error() {
    let (_gate_tx, gate_rx) = mpsc::channel();
    let mut core = AppCore::new(
        Box::new(GatedOmr {
            gate: Mutex::new(gate_rx),
        }),
        Box::new(NoRender),
        None,
        SettingsDto::default(),
        ToolchainSnapshot::default(),
    );

    let err = core
        .handle_command(Command::RenderScore {
            xml_path: "missing.mxl".to_string(),
            output_dir: "out".to_string(),
        })
        .unwrap_err();

    assert!(matches!(err, AppError::Render(RenderError::InputMissing(_))));
    assert!(core.drain_events().is_empty());
}

fn wait_for_finish(core: &mut AppCore) -> ConversionResult {
    loop {
        match core.next_event(WAIT) {
            Some(Event::ConversionFinished { result }) => return result,
            Some(_) => {}
            None => panic!("conversion never finished"),
        }
    }
}

#[test]
fn updated_default_dir_applies_to_next_conversion() {
    let output_dirs = Arc::new(Mutex::new(Vec::new()));
    let mut core = AppCore::new(
        Box::new(RecordingOmr {
            output_dirs: output_dirs.clone(),
        }),
        Box::new(NoRender),
        None,
        SettingsDto::default(),
        ToolchainSnapshot::default(),
    );

    core.update_settings(SettingsDto {
        default_output_dir: "newdir".to_string(),
        ..SettingsDto::default()
    })
    .unwrap();
    core.handle_command(Command::Convert {
        request: assisted("a.pdf"),
    })
    .unwrap();
    wait_for_finish(&mut core);

    assert_eq!(core.settings().default_output_dir, "newdir");
    assert_eq!(output_dirs.lock().clone(), vec![PathBuf::from("newdir")]);
}

#[test]
fn panicking_worker_releases_the_slot() {
    let service = Arc::new(ConversionService::new(Box::new(PanickingOmr), "out"));
    let (events_tx, events_rx) = mpsc::channel();
    let jobs = ConversionJobs::new(service, events_tx);

    jobs.start(assisted("a.pdf")).unwrap();

    let result = loop {
        match events_rx.recv_timeout(WAIT).unwrap() {
            Event::ConversionFinished { result } => break result,
            _ => {}
        }
    };
    assert!(!result.success());
    assert!(result.message().starts_with("Unexpected error during conversion"));
    assert!(!jobs.is_running());
    jobs.start(assisted("b.pdf")).unwrap();
}
