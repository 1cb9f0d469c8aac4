#[cfg(feature = "grpc")]
use bb8::RunError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The query template could not be parsed.
    #[error("template parse error: {0}")]
    Parse(String),
    /// A dynamic query template failed to evaluate.
    #[error("template evaluation error: {0}")]
    Evaluation(String),
    /// Call arguments could not be bound to the query's placeholders.
    #[error("parameter binding error: {0}")]
    Binding(String),
    #[error("codec error: {0}")]
    Codec(String),
    #[error("spanner client error: {0}")]
    Client(String),
    #[error("configuration error: {0}")]
    Config(String),

    #[cfg(feature = "grpc")]
    #[error("transport error: {0}")]
    TransportError(#[from] tonic::transport::Error),

    #[cfg(feature = "grpc")]
    #[error("unexpected gRPC status: {0}")]
    Status(#[from] tonic::Status),

    #[cfg(feature = "grpc")]
    #[error("authentication error: {0}")]
    Auth(#[from] gcp_auth::Error),
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(value: derive_builder::UninitializedFieldError) -> Self {
        Error::Config(format!("missing required field '{}'", value.field_name()))
    }
}

#[cfg(feature = "grpc")]
impl From<RunError<Error>> for Error {
    fn from(value: RunError<Error>) -> Self {
        match value {
            RunError::User(error) => error,
            RunError::TimedOut => Error::Client("timeout while obtaining new session".to_string()),
        }
    }
}
