// Handler modules
pub mod contexts;
pub mod report;
pub mod summary;
pub mod utils;

// Re-export all handler functions
pub use contexts::handle_contexts;
pub use report::{ReportOutcome, ReportSettings, handle_report, run_report};
pub use summary::{handle_summary, render_summary};
pub use utils::ClusterTarget;
