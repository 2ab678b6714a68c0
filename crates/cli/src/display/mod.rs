pub mod command_breakdown;
pub mod formatter;

pub use command_breakdown::{CommandBreakdown, print_command_breakdown};
pub use formatter::{
    format_collection_errors, format_execution_report, print_collection_errors,
    print_execution_report,
};
