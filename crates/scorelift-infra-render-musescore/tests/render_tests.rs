use parking_lot::Mutex;
use scorelift_infra_render_musescore::{pdf_path_for, MuseScoreRenderer};
use scorelift_ports::process::{CommandOutput, CommandRunner};
use scorelift_ports::render::{RenderError, ScoreRenderPort};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
struct FixedRunner {
    code: i32,
    stderr: &'static str,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FixedRunner {
    fn exiting(code: i32, stderr: &'static str) -> Self {
        Self {
            code,
            stderr,
            calls: Arc::default(),
        }
    }
}

impl CommandRunner for FixedRunner {
    fn run(&self, argv: &[String]) -> io::Result<CommandOutput> {
        self.calls.lock().push(argv.to_vec());
        Ok(CommandOutput {
            code: Some(self.code),
            stdout: String::new(),
            stderr: self.stderr.to_string(),
        })
    }
}

#[test]
fn renders_next_to_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let xml = tmp.path().join("etude.mxl");
    fs::write(&xml, b"zip").unwrap();
    let out = tmp.path().join("pdf");
    let runner = FixedRunner::exiting(0, "");
    let renderer = MuseScoreRenderer::with_runner(Some("mscore-test".to_string()), Box::new(runner.clone()));

    let pdf = renderer.render_pdf(&xml, &out).unwrap();

    assert_eq!(pdf, out.join("etude.pdf"));
    assert!(out.is_dir());
    let calls = runner.calls.lock().clone();
    assert_eq!(
        calls,
        vec![vec![
            "mscore-test".to_string(),
            xml.to_string_lossy().into_owned(),
            "-o".to_string(),
            pdf.to_string_lossy().into_owned(),
        ]]
    );
}

#[test]
fn missing_xml_is_rejected_before_launch() {
    let tmp = tempfile::tempdir().unwrap();
    let runner = FixedRunner::exiting(0, "");
    let renderer = MuseScoreRenderer::with_runner(None, Box::new(runner.clone()));

    let err = renderer
        .render_pdf(&tmp.path().join("none.xml"), tmp.path())
        .unwrap_err();

    assert!(matches!(err, RenderError::InputMissing(_)));
    assert!(runner.calls.lock().is_empty());
}

#[test]
fn non_zero_exit_reports_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let xml = tmp.path().join("etude.xml");
    fs::write(&xml, b"<score-partwise/>").unwrap();
    let renderer = MuseScoreRenderer::with_runner(
        Some("mscore-test".to_string()),
        Box::new(FixedRunner::exiting(4, "cannot read file\n")),
    );

    let err = renderer.render_pdf(&xml, tmp.path()).unwrap_err();

    match err {
        RenderError::Failed { code, stderr } => {
            assert_eq!(code, "4");
            assert_eq!(stderr, "cannot read file");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_executable_is_ignored() {
    let renderer = MuseScoreRenderer::new(Some("   ".to_string()));
    assert!(!renderer.executable().trim().is_empty());
}

#[test]
fn pdf_name_follows_xml_stem() {
    assert_eq!(
        pdf_path_for(Path::new("in/sonata.musicxml"), Path::new("out")),
        Path::new("out").join("sonata.pdf")
    );
}
