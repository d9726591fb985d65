pub mod error;
pub mod field;
pub mod header;
pub mod search_map;
pub mod spectrogram;
pub mod version;

pub use error::*;
pub use field::*;
pub use header::*;
pub use search_map::*;
pub use spectrogram::*;
pub use version::*;

/// Комплексный I/Q отсчёт.
pub type IqSample = num_complex::Complex<f32>;
