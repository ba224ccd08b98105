use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MaraError {
    #[error("input file does not exist: {0}")]
    MissingInput(Utf8PathBuf),

    #[error("failed to read file list at {0}: {1}")]
    ManifestRead(Utf8PathBuf, String),

    #[error("session request failed: {0}")]
    SessionHttp(String),

    #[error("session endpoint returned status {status}: {message}")]
    SessionStatus { status: u16, message: String },

    #[error("session endpoint returned an empty token")]
    EmptySession,

    #[error("parameter registration failed: {0}")]
    RegisterHttp(String),

    #[error("parameter registration returned status {status}: {message}")]
    RegisterStatus { status: u16, message: String },

    #[error("chunk upload failed: {0}")]
    UploadHttp(String),

    #[error("upload endpoint returned status {status}: {message}")]
    UploadStatus { status: u16, message: String },

    #[error("job run request failed: {0}")]
    RunHttp(String),

    #[error("run endpoint returned status {status}: {message}")]
    RunStatus { status: u16, message: String },

    #[error("retry budget exhausted after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
