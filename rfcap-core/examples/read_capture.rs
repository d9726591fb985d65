//! Пример: чтение файла захвата любой версии
//!
//! Демонстрирует:
//! - определение версии заголовка по первым байтам
//! - дамп полей заголовка
//! - первые комплексные отсчёты

use std::env;

use rfcap_core::CaptureFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "rfcap-core/test_output.dat".to_string());

    let capture = CaptureFile::load(&input_path)?;

    println!("✓ {} header", capture.header().version());
    for (name, value) in capture.header_map() {
        println!("  {name:<20}: {value}");
    }

    println!("\nFirst samples:");
    for (i, s) in capture.iter_samples().take(4).enumerate() {
        println!("  [{i}] {:>7} {:+}j", s.re, s.im);
    }

    Ok(())
}
