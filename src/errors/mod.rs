use thiserror::Error;

/// Failures raised while processing a delivery.
///
/// Missing-record errors are fatal for the delivery that raised them;
/// conflicts and busy databases are retried in place.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("event {0} not found")]
    EventNotFound(String),

    #[error("group {group_id} is not part of event {event_id}")]
    GroupNotInEvent { event_id: String, group_id: String },

    #[error("series {0} not found")]
    SeriesNotFound(String),

    #[error("round {0} is still live")]
    RoundNotFinished(String),

    #[error(
        "event {event_id} has round index {round_index:?} \
         but series {series_id} has {total_rounds} rounds"
    )]
    InvalidRoundIndex {
        event_id: String,
        series_id: String,
        round_index: Option<u32>,
        total_rounds: u32,
    },

    /// Some pairs of a finalized event were not applied. Redelivering the
    /// round resumes exactly those pairs.
    #[error("event {event_id}: {failed} rivalry pairs not applied")]
    PartialRivalryFailure { event_id: String, failed: usize },

    #[error("concurrent update of {0}")]
    Conflict(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LedgerError> },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    /// Whether the read-modify-write should simply be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Conflict(_) => true,
            LedgerError::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Missing referenced records: the delivery is logged and discarded.
    pub fn is_fatal_for_delivery(&self) -> bool {
        matches!(
            self,
            LedgerError::EventNotFound(_)
                | LedgerError::GroupNotInEvent { .. }
                | LedgerError::SeriesNotFound(_)
                | LedgerError::RoundNotFinished(_)
                | LedgerError::InvalidRoundIndex { .. }
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
