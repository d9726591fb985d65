//! Пример: запись файла захвата версии 5 с синтетическими данными

use rfcap_core::{CaptureFile, SaveOptions};
use rfcap_types::{CaptureBase, CaptureHeader, CaptureMode, HeaderV1};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "rfcap-core/test_output.dat";

    // --- Исходный заголовок версии 1 (total_len пересчитается при записи) ---
    let header = CaptureHeader::V1(HeaderV1 {
        base: CaptureBase {
            total_len: 0,
            sensor_id: 1,
            fc_khz: 2_442_000,
            fs_khz: 56_000,
            bw_khz: 56_000,
            gain_db: 40,
            start_time_ticks: 0,
            tps: 1,
        },
    });

    // --- Комплексная синусоида 1 МГц, 1 мс ---
    let n = 56_000;
    let raw: Vec<i16> = (0..n)
        .flat_map(|k| {
            let phase = 2.0 * std::f32::consts::PI * 1_000.0 * k as f32 / 56_000.0;
            [
                (8_000.0 * phase.cos()) as i16,
                (8_000.0 * phase.sin()) as i16,
            ]
        })
        .collect();

    let capture = CaptureFile::new(header, raw);
    let opts = SaveOptions {
        capture_mode: Some(CaptureMode::Track),
        ..SaveOptions::default()
    };
    capture.save(output_path, &opts)?;

    println!("✓ Записано: {output_path}");
    println!("  Samples  : {}", capture.num_samples());
    Ok(())
}
