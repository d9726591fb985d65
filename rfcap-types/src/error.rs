use thiserror::Error;

/// Результат для операций rfcap
pub type CapResult<T> = std::result::Result<T, CapError>;

/// Типы ошибок контейнеров захвата и спектрограмм.
#[derive(Debug, Error)]
pub enum CapError {
    /// Недопустимая комбинация входных данных контейнера
    #[error("Usage error: {0}")]
    Usage(String),

    /// Версию заголовка определить не удалось
    #[error("Format error: {0}")]
    Format(String),

    /// Заголовок короче, чем требует определённая версия
    #[error("Header read error: expected {expected} bytes, found {found}")]
    HeaderRead { expected: usize, found: usize },

    /// Полезная нагрузка усечена или не декодируется
    #[error("Data read error: {0}")]
    DataRead(String),

    /// Вычисляемое значение недопустимо (деление на ноль, переполнение)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CapError {
    /// Удобные конструкторы
    pub fn usage<S: Into<String>>(s: S) -> Self {
        Self::Usage(s.into())
    }

    pub fn format<S: Into<String>>(s: S) -> Self {
        Self::Format(s.into())
    }

    pub fn data_read<S: Into<String>>(s: S) -> Self {
        Self::DataRead(s.into())
    }

    pub fn invalid_value<S: Into<String>>(s: S) -> Self {
        Self::InvalidValue(s.into())
    }

    pub fn header_read(
        expected: usize,
        found: usize,
    ) -> Self {
        Self::HeaderRead { expected, found }
    }
}
