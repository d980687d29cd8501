pub mod omr;
pub mod process;
pub mod render;
pub mod storage;
pub mod types;

pub use omr::*;
pub use process::*;
pub use render::*;
pub use storage::*;
pub use types::*;
