mod report;

pub use report::{IssueType, NewReport, PendingReport, Report, ReportStatus, Severity};
