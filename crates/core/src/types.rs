/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates carry no time or zone component.
pub type CalendarDate = chrono::NaiveDate;
