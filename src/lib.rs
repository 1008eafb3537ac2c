// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod card;
pub mod config;
pub mod content;
pub mod error;
pub mod filter;
pub mod history;
pub mod navigation;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;
pub mod tracker;
pub mod util;

pub use session::{SessionPhase, StudyEngine};
