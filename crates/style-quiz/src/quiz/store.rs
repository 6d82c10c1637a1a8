use super::results::ResultRecord;

/// Persistence collaborator for completed sessions.
///
/// One record is submitted per completed session. Retries, the wire
/// format, and authentication are the collaborator's concern; a failed
/// save never blocks the respondent from seeing their results.
pub trait ResultStore: Send + Sync {
    fn save(&self, record: &ResultRecord) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("result store unavailable: {0}")]
    Unavailable(String),
    #[error("result store rejected the record: {0}")]
    Rejected(String),
}
