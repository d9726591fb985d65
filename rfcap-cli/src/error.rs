use rfcap_types::CapError;
use thiserror::Error;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Ошибка контейнера захвата или спектрограммы
    #[error("{0}")]
    Capture(#[from] CapError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Недопустимые аргументы командной строки
    #[error("Invalid argument: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn config<S: Into<String>>(s: S) -> Self {
        Self::Config(s.into())
    }
}
