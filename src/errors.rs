use crate::models::DateRange;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    /// Any read or write failure in the interval store. Callers must treat
    /// this as "state unknown" and never proceed with a booking or block.
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("reconciliation failed at field {field}: {source}")]
    Reconciliation {
        field: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("room {room_id} is not free for {range}")]
    Unavailable { room_id: i64, range: DateRange },
}

pub type EngineResult<T> = Result<T, EngineError>;
