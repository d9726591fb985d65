//! Бенчмарки декодирования нагрузки и полной загрузки файла захвата

use std::{hint::black_box, io::Write};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rfcap_core::{decode_i16_le, deinterleave, CaptureFile, CaptureHeaderExt, SaveOptions};
use rfcap_types::{
    AntennaInfo, CaptureBase, CaptureHeader, CaptureMode, FpgaTiming, HeaderV5, V5Mode,
};
use tempfile::NamedTempFile;

/// Случайная нагрузка из `n` целых (фиксированный seed).
fn random_payload(n: usize) -> Vec<i16> {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    (0..n).map(|_| rng.gen_range(-2048..2048)).collect()
}

fn v5_header(n_ints: usize) -> CaptureHeader {
    CaptureHeader::V5(HeaderV5 {
        base: CaptureBase {
            total_len: (104 + 2 * n_ints - 4) as u32,
            sensor_id: 1,
            fc_khz: 2_442_000,
            fs_khz: 56_000,
            bw_khz: 44_800,
            gain_db: 30,
            start_time_ticks: 0,
            tps: 1,
        },
        header_len: 104,
        fpga: FpgaTiming::default(),
        antenna: AntennaInfo::LEGACY,
        ant_type: 0,
        angle: 0,
        mode: V5Mode::Search,
    })
}

fn payload_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload");

    for n in [56_000usize, 560_000, 5_600_000] {
        let raw = random_payload(n);
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("decode_i16_le", n), &bytes, |b, bytes| {
            b.iter(|| decode_i16_le(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("deinterleave", n), &raw, |b, raw| {
            b.iter(|| deinterleave(black_box(raw)))
        });
    }

    group.finish();
}

fn file_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_file");
    group.sample_size(20);

    // 10 мс при 56 МГц
    let n = 56_000 * 10 * 2;
    let raw = random_payload(n);
    let header = v5_header(n);

    let mut src = NamedTempFile::new().unwrap();
    src.write_all(&header.encode().unwrap()).unwrap();
    for v in &raw {
        src.write_all(&v.to_le_bytes()).unwrap();
    }
    src.flush().unwrap();

    group.throughput(Throughput::Bytes((n * 2) as u64));
    group.bench_function("load_v5_10ms", |b| {
        b.iter(|| CaptureFile::load(black_box(src.path())).unwrap())
    });

    let capture = CaptureFile::load(src.path()).unwrap();
    let dst = NamedTempFile::new().unwrap();
    let opts = SaveOptions {
        capture_mode: Some(CaptureMode::Track),
        ..SaveOptions::default()
    };
    group.bench_function("save_v5_track_10ms", |b| {
        b.iter(|| capture.save(dst.path(), &opts).unwrap())
    });

    group.finish();
}

criterion_group!(benches, payload_benchmarks, file_benchmarks);
criterion_main!(benches);
