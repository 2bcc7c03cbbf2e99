use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("game type of {0} is not supported")]
    UnsupportedGameType(String),

    #[error("fetch of {url} failed{}: {reason}", status_suffix(.status))]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("data table not found (selector `{selector}`)")]
    TableNotFound { selector: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("malformed record stream at line {line}: {message}")]
    Protocol { line: usize, message: String },

    #[error("record stream has no header message")]
    MissingHeader,

    #[error("record field `{field}` is not declared in the stream header")]
    UnexpectedField { field: String },

    #[error("invalid value {value} for field `{field}`: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("payload is missing the `{key}` collection")]
    MissingPayload { key: String },

    #[error("no stage registered under the name `{0}`")]
    UnknownStage(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}
