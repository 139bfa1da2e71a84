//! The two coursecrawl pipelines.
//!
//! - [`run_list`]: channels → course pages → rows → delimited file
//! - [`run_details`]: pending records → detail pages → extracted fields → updates

pub mod details;
pub mod list;
pub mod progress;

pub use details::{CourseFailure, DetailsSummary, run_details};
pub use list::{ListSummary, run_list, run_list_dated};
pub use progress::{ProgressReporter, SilentProgress};
