use crate::conversion::ConversionService;
use crate::diagnostics::{export_diagnostics, ToolchainSnapshot};
use crate::ipc::{Command, Event};
use crate::jobs::{ConversionJobs, JobError};
use scorelift_ports::omr::OmrPort;
use scorelift_ports::render::{RenderError, ScoreRenderPort};
use scorelift_ports::storage::{SettingsDto, StorageError, StoragePort};
use scorelift_ports::types::ConversionResult;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

const RECENT_RESULTS: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("job error: {0}")]
    Job(#[from] JobError),
}

pub struct AppCore {
    service: Arc<ConversionService>,
    renderer: Box<dyn ScoreRenderPort>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    toolchain: ToolchainSnapshot,
    jobs: ConversionJobs,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    recent_results: VecDeque<ConversionResult>,
}

impl AppCore {
    pub fn new(
        omr: Box<dyn OmrPort>,
        renderer: Box<dyn ScoreRenderPort>,
        storage: Option<Box<dyn StoragePort>>,
        settings: SettingsDto,
        toolchain: ToolchainSnapshot,
    ) -> Self {
        let service = Arc::new(ConversionService::new(
            omr,
            settings.default_output_dir.clone(),
        ));
        let (events_tx, events_rx) = mpsc::channel();
        let jobs = ConversionJobs::new(service.clone(), events_tx.clone());

        Self {
            service,
            renderer,
            storage,
            settings,
            toolchain,
            jobs,
            events_tx,
            events_rx,
            recent_results: VecDeque::with_capacity(RECENT_RESULTS),
        }
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn is_converting(&self) -> bool {
        self.jobs.is_running()
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::Convert { request } => {
                self.jobs.start(request)?;
            }
            Command::RenderScore {
                xml_path,
                output_dir,
            } => {
                let pdf = self
                    .renderer
                    .render_pdf(Path::new(&xml_path), Path::new(&output_dir))?;
                self.emit(Event::ScoreRendered {
                    xml_path,
                    pdf_path: pdf.to_string_lossy().into_owned(),
                });
            }
            Command::ExportDiagnostics { path } => {
                let recent: Vec<_> = self.recent_results.iter().cloned().collect();
                export_diagnostics(Path::new(&path), &self.settings, &self.toolchain, &recent)?;
                self.emit(Event::DiagnosticsExported { path });
            }
        }
        Ok(())
    }

    /// Persists `settings` and applies them to conversions started from now on.
    pub fn update_settings(&mut self, settings: SettingsDto) -> Result<(), AppError> {
        if let Some(storage) = self.storage.as_ref() {
            storage.save_settings(&settings)?;
        }
        self.service
            .set_default_output_dir(settings.default_output_dir.clone());
        self.settings = settings;
        Ok(())
    }

    /// Everything queued so far, without blocking.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let events: Vec<Event> = self.events_rx.try_iter().collect();
        for event in &events {
            self.observe(event);
        }
        events
    }

    /// Waits up to `timeout` for the next event.
    pub fn next_event(&mut self, timeout: Duration) -> Option<Event> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.observe(&event);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn emit(&self, event: Event) {
        // AppCore owns the receiver, so the channel cannot be closed here.
        let _ = self.events_tx.send(event);
    }

    fn observe(&mut self, event: &Event) {
        if let Event::ConversionFinished { result } = event {
            if self.recent_results.len() >= RECENT_RESULTS {
                self.recent_results.pop_front();
            }
            self.recent_results.push_back(result.clone());
        }
    }
}
