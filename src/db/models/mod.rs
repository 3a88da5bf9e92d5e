pub mod access;
pub mod history;
pub mod user;

pub use access::{AccessMetric, AccessRow, MonthlyAccess};
pub use history::{HistoryEntry, HistoryRecord, MaintenanceFlag};
pub use user::{NewUser, User};
