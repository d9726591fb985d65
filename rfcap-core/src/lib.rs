//! Библиотека контейнеров захвата радиосигнала
//!
//! Чтение файлов захвата (`.dat`, заголовки версий 1–5) с автоматическим
//! определением версии, запись в версиях 4–5 и файлы спектрограмм.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use rfcap_core::{CaptureFile, SaveOptions};
//!
//! let capture = CaptureFile::load("capture.dat")?;
//! println!("{} samples", capture.num_samples());
//!
//! // Версии ниже 4 сохраняются как версия 5
//! capture.save("capture_v5.dat", &SaveOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod array_file;
pub mod binary;
pub mod capture;
pub mod codec;
pub mod detect;
pub mod layout;
pub mod payload;
pub mod spectrogram;

pub use array_file::*;
pub use capture::*;
pub use codec::*;
pub use detect::*;
pub use layout::*;
pub use payload::*;
pub use spectrogram::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(HEADER_V5_TRACK_LEN, 228);
        assert_eq!(SPECTROGRAM_HEADER_LEN, 88);
        assert_eq!(DETECT_PREFIX_LEN, 12);
    }
}
