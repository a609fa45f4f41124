/// Identifiers handed out by the booking API (deals, projects, invoices).
pub type EntityId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
