/// Listing, dealer and saved-search keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Profiles are keyed by the auth provider's UUID subject.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
