//! CLI output formatting.
//!
//! Decision lines stay plain so scripts can parse them; headers, tables and
//! summaries are colored.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{format_duration, print_separator_with_spacing, print_summary_box};
pub use status::{print_decision, print_error, print_success};
pub use tables::{print_decision_table, print_feature_list, print_feature_table};
