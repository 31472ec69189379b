//! CLI command implementations

mod logging;
mod progress;
mod style;
mod sync;

pub use logging::init_logging;
pub use progress::CliProgress;
pub use sync::{report_failure, run_sync};
