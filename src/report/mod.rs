pub mod check_run;
pub mod formatters;
pub mod path;

pub use check_run::{CheckRunOutcome, CheckRunReporter, InProgressCheck};
pub use formatters::{JsonFormatter, ReportFormatter, TextFormatter};
pub use path::relative_to_root;
