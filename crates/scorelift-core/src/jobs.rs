use crate::conversion::ConversionService;
use crate::ipc::Event;
use log::{debug, info};
use parking_lot::Mutex;
use scorelift_ports::types::{ConversionRequest, ConversionResult};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("a conversion is already running for {}", .0.display())]
    AlreadyRunning(PathBuf),
    #[error("failed to start conversion worker: {0}")]
    Spawn(String),
}

struct ActiveJob {
    input_path: PathBuf,
}

type Slot = Arc<Mutex<Option<ActiveJob>>>;

/// Frees the job slot when the worker ends, including by panic. A panicking
/// worker also posts a failed `ConversionFinished` so listeners stop waiting.
struct SlotRelease {
    active: Slot,
    events: Sender<Event>,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        self.active.lock().take();
        if thread::panicking() {
            let result =
                ConversionResult::failed("Unexpected error during conversion: worker panicked");
            let _ = self.events.send(Event::ConversionFinished { result });
        }
    }
}

/// Runs the blocking `convert` off the caller's thread, one job at a time.
///
/// Progress is reported on the event channel: `ConversionStarted` from the
/// worker, then `ConversionFinished` once the slot has been released, so a
/// listener that reacts to the finish event can immediately start another
/// job. A started job cannot be cancelled.
pub struct ConversionJobs {
    service: Arc<ConversionService>,
    events: Sender<Event>,
    active: Slot,
}

impl ConversionJobs {
    pub fn new(service: Arc<ConversionService>, events: Sender<Event>) -> Self {
        Self {
            service,
            events,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    pub fn start(&self, request: ConversionRequest) -> Result<(), JobError> {
        {
            let mut active = self.active.lock();
            if let Some(job) = active.as_ref() {
                return Err(JobError::AlreadyRunning(job.input_path.clone()));
            }
            *active = Some(ActiveJob {
                input_path: request.input_path().to_path_buf(),
            });
        }

        let service = self.service.clone();
        let events = self.events.clone();
        let release = SlotRelease {
            active: self.active.clone(),
            events: events.clone(),
        };
        let spawned = thread::Builder::new()
            .name("scorelift-convert".to_string())
            .spawn(move || {
                let output_dir = service.resolve_output_dir(&request);
                let _ = events.send(Event::ConversionStarted {
                    input_path: request.input_path().to_string_lossy().into_owned(),
                    output_dir: output_dir.to_string_lossy().into_owned(),
                    mode: request.mode(),
                });

                let result = service.convert(&request);
                info!("conversion finished (success: {})", result.success());

                drop(release);
                if events.send(Event::ConversionFinished { result }).is_err() {
                    debug!("event receiver dropped before conversion finished");
                }
            });

        if let Err(err) = spawned {
            self.active.lock().take();
            return Err(JobError::Spawn(err.to_string()));
        }
        Ok(())
    }
}
