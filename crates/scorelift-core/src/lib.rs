pub mod app;
pub mod conversion;
pub mod diagnostics;
pub mod ipc;
pub mod jobs;

pub use app::*;
pub use conversion::*;
pub use diagnostics::*;
pub use ipc::*;
pub use jobs::*;
