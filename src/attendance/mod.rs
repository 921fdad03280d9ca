//! Attendance aggregation: payroll-period summaries and monthly reports.

pub mod period;
pub mod report;
pub mod schedule;
pub mod service;
pub mod summary;
pub mod walk;

pub use service::Scope;
