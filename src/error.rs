use thiserror::Error;

/// Maximum number of series codes the API accepts in one physical request.
pub const MAX_CODES_PER_REQUEST: usize = 250;

/// Errors surfaced by the public query operations.
///
/// Validation errors (`UnknownDatabase`, `UnknownFrequency`, `EmptyCodes`,
/// `TooManyCodes`, `InvalidLayer`) never reach the network. `Server` carries
/// the error envelope of a successfully transported response whose `STATUS`
/// is not 200; `Transport` wraps network/timeout failures from reqwest.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown database code: {0:?} (see reference::databases())")]
    UnknownDatabase(String),

    #[error("unknown frequency code: {0:?} (expected CY, FY, CH, FH, Q, M, W, W1-W7, or D)")]
    UnknownFrequency(String),

    #[error("unsupported language: {0:?} (expected \"jp\" or \"en\")")]
    UnknownLanguage(String),

    #[error("invalid layer specifier {spec:?}: {reason}")]
    InvalidLayer { spec: String, reason: &'static str },

    #[error("at least one series code is required")]
    EmptyCodes,

    #[error("a single request accepts at most {MAX_CODES_PER_REQUEST} series codes, got {0}")]
    TooManyCodes(usize),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[{status}] {message_id}: {message}")]
    Server {
        status: u32,
        message_id: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("series {code}: {dates} survey dates but {values} values")]
    MalformedSeries {
        code: String,
        dates: usize,
        values: usize,
    },

    #[error("server repeated continuation position {0:?} without progress")]
    PaginationLoop(String),
}
