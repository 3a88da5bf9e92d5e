//! Report artifacts handed off to the external upload/import path.

mod export;
mod message;

pub use export::{
    delayed_report_rows, filter_rows, monthly_report_filename, write_delayed_csv,
    write_monthly_report, ExportRow, EXPORT_HEADERS,
};
pub use message::outreach_message;
