use thiserror::Error;

/// Errors raised while validating a query before execution.
/// These are surfaced synchronously to the query caller.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot parse bucket size for field {field:?}: {input:?}")]
    InvalidBucketSize { field: String, input: String },

    #[error("cannot parse bucket offset for field {field:?}: {input:?}")]
    InvalidBucketOffset { field: String, input: String },

    #[error("unknown stats func {0:?}")]
    UnknownStatsFunc(String),

    #[error("stats func {func:?} expects exactly one field; got {got}")]
    StatsFuncArity { func: String, got: usize },

    #[error("stats pipe must contain at least one stats func")]
    EmptyStatsPipe,

    #[error("missing closing '>' in pattern {0:?}")]
    UnclosedPatternField(String),
}

/// Errors raised while executing a stats pipe.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("cannot calculate [{stats}], since it requires more than {limit_mib}MB of memory")]
    MemoryLimitExceeded { stats: String, limit_mib: i64 },
}

/// Errors local to the ingestion boundary. Retrying is the caller's choice.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot parse timestamp field {field:?} value {value:?}")]
    InvalidTimestamp { field: String, value: String },

    #[error("cannot extract binary field {field:?} value size")]
    BinaryFieldSize { field: String },

    #[error("invalid binary field {field:?} size {size}: exceeds remaining {remaining} bytes")]
    BinaryFieldTooLong {
        field: String,
        size: u64,
        remaining: usize,
    },

    #[error("cannot parse tenant id {0:?}")]
    InvalidTenantId(String),
}
