use std::{fs, io::Write, path::Path};

use rfcap_core::{
    attach_header, detect_version, ArrayFile, ArrayFileLoader, CaptureDuration, CaptureFile,
    CaptureHeaderExt, RawCaptureHeaderExt, SaveOptions, SpectrogramFile,
};
use rfcap_types::{
    AntennaInfo, CapError, CapResult, CaptureBase, CaptureHeader, CaptureMode, DroneSearchMap,
    FpgaTiming, HeaderV1, HeaderV2, HeaderV3, HeaderV4, HeaderV5, HeaderVersion, IqSample, SearchMapEntry,
    SpectrogramHeader, V5Mode,
};
use tempfile::NamedTempFile;

// ===========================================================================
// Helpers — детерминированные тест-данные
// ===========================================================================

fn base(fs_khz: u32) -> CaptureBase {
    CaptureBase {
        total_len: 0,
        sensor_id: 0x21,
        fc_khz: 2_422_300,
        fs_khz,
        bw_khz: 40_000u32.min(fs_khz),
        gain_db: 35,
        start_time_ticks: 1_704_067_200,
        tps: 1_000_000,
    }
}

fn antenna() -> AntennaInfo {
    AntennaInfo {
        num_ant: 4,
        ant_seq: 0x3210,
        ant_dwell_time_ms: 50,
        capture_id: 777,
    }
}

/// Пилообразная нагрузка из `n` целых.
fn sawtooth(n: usize) -> Vec<i16> {
    (0..n).map(|i| ((i % 256) as i16 - 128) * 64).collect()
}

fn payload_bytes(raw: &[i16]) -> Vec<u8> {
    raw.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Файл из готового заголовка и нагрузки.
fn write_file(
    header: &CaptureHeader,
    raw: &[i16],
) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&header.encode().unwrap()).unwrap();
    tmp.write_all(&payload_bytes(raw)).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn v5_track_header(n_ints: usize) -> CaptureHeader {
    let mut map = DroneSearchMap::placeholder();
    map.declared_len = 3;
    for (i, chan) in [36u32, 149, 161].into_iter().enumerate() {
        map.entries[i] = SearchMapEntry {
            dr_type: i as u32 + 1,
            reserved: 1,
            chan_list: [chan],
        };
    }

    let mut b = base(1_000);
    b.total_len = (228 + 2 * n_ints - 4) as u32;
    CaptureHeader::V5(HeaderV5 {
        base: b,
        header_len: 228,
        fpga: FpgaTiming {
            fpga_pps: 100,
            fpga_start_time: 200,
            fpga_tps: 300,
            pps_flag: 1,
        },
        antenna: antenna(),
        ant_type: 3,
        angle: 120,
        mode: V5Mode::Track(map),
    })
}

fn v4_header(n_ints: usize) -> CaptureHeader {
    let mut b = base(1_000);
    b.total_len = (104 + 2 * n_ints - 4) as u32;
    CaptureHeader::V4(HeaderV4 {
        base: b,
        header_len: 104,
        fpga: FpgaTiming {
            fpga_pps: 1,
            fpga_start_time: 2,
            fpga_tps: 3,
            pps_flag: 0,
        },
        antenna: antenna(),
        capture_mode: CaptureMode::Search,
        drone_search_bitmap: 0x0F0F,
    })
}

fn spectrogram_header() -> SpectrogramHeader {
    SpectrogramHeader {
        sensor_id: 5,
        capture_id: 6,
        capture_mode: 0,
        start_time_ticks: 7,
        tps: 8,
        fc_khz: 5_785_000,
        fs_khz: 56_000,
        bw_khz: 44_800,
        gain_db: 20,
        nfft: 1024,
        window_len: 1024,
        overlap_len: 512,
        margin: 3,
        tbin_width_ms: 9.142_857,
        fbin_width_khz: 54.6875,
        tbins: 10,
        fbins: 20,
        margin_removed: false,
        flattened: false,
        denoised: true,
        normalised: false,
        window_type: 1,
    }
}

struct FixedLoader;

impl ArrayFileLoader for FixedLoader {
    fn load(
        &self,
        _path: &Path,
    ) -> CapResult<ArrayFile> {
        Ok(ArrayFile {
            center_freq: 915_000_000.0,
            samp_rate: 20_000_000.0,
            sdr_rx_gain: 12.0,
            rxdata: vec![IqSample::new(0.5, -0.5); 40],
        })
    }
}

// ===========================================================================
// Чтение
// ===========================================================================

#[test]
fn test_v5_track_round_trip_is_byte_identical() {
    let raw = sawtooth(2_000);
    let header = v5_track_header(raw.len());
    let src = write_file(&header, &raw);

    let capture = CaptureFile::load(src.path()).unwrap();
    assert_eq!(capture.header(), &header);
    assert_eq!(capture.raw_data().unwrap(), &raw[..]);

    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &SaveOptions::default()).unwrap();

    assert_eq!(fs::read(src.path()).unwrap(), fs::read(dst.path()).unwrap());
}

#[test]
fn test_v4_round_trip_is_byte_identical() {
    let raw = sawtooth(1_000);
    let src = write_file(&v4_header(raw.len()), &raw);

    let capture = CaptureFile::load(src.path()).unwrap();
    assert_eq!(capture.header().version(), HeaderVersion::V4);

    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &SaveOptions::default()).unwrap();
    assert_eq!(fs::read(src.path()).unwrap(), fs::read(dst.path()).unwrap());
}

#[test]
fn test_v3_211ms_detected_by_total_len() {
    let header = CaptureHeader::V3(HeaderV3 {
        base: CaptureBase {
            total_len: 47_264_068,
            ..base(56_000)
        },
        antenna: antenna(),
        capture_mode: CaptureMode::Track,
        drone_search_bitmap: u64::MAX,
    });

    // Только заголовок: детектору хватает первых 4 байт
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&header.encode().unwrap()).unwrap();
    tmp.flush().unwrap();

    let mut file = fs::File::open(tmp.path()).unwrap();
    let d = detect_version(&mut file).unwrap();
    assert_eq!(d.version, HeaderVersion::V3);
    assert_eq!(d.header_len, 72);

    // Нагрузки нет — загрузка падает на данных, а не на заголовке
    assert!(matches!(
        CaptureFile::load(tmp.path()),
        Err(CapError::DataRead(_))
    ));
}

#[test]
fn test_v1_90ms_loaded_from_disk() {
    let header = CaptureHeader::V1(HeaderV1 {
        base: CaptureBase {
            total_len: 20_160_036,
            ..base(56_000)
        },
    });
    // 20 160 000 байт нагрузки
    let raw = sawtooth(10_080_000);
    let src = write_file(&header, &raw);
    assert_eq!(fs::metadata(src.path()).unwrap().len(), 40 + 20_160_000);

    let capture = CaptureFile::load(src.path()).unwrap();
    let h = capture.header();
    assert_eq!(h, &header);
    assert_eq!(h.version(), HeaderVersion::V1);
    assert_eq!(h.header_len(), 40);
    assert_eq!(h.antenna(), AntennaInfo::LEGACY);
    assert_eq!(h.capture_mode(), CaptureMode::Search);
    assert_eq!(h.drone_search_bitmap(), Some(u64::MAX));

    assert_eq!(capture.num_samples(), 5_040_000);
    assert_eq!(capture.dwell_time_ms().unwrap(), 90.0);
    // Нагрузка начинается сразу за 40-байтовым заголовком
    let data = capture.raw_data().unwrap();
    assert_eq!(&data[..4], &raw[..4]);
    assert_eq!(data[data.len() - 1], raw[raw.len() - 1]);
}

#[test]
fn test_v2_633ms_header_from_disk() {
    let header = CaptureHeader::V2(HeaderV2 {
        base: CaptureBase {
            total_len: 141_792_052,
            ..base(56_000)
        },
        antenna: AntennaInfo {
            num_ant: 2,
            ant_seq: 0x10,
            ant_dwell_time_ms: 633,
            capture_id: 42,
        },
    });

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&header.encode().unwrap()).unwrap();
    tmp.write_all(&payload_bytes(&sawtooth(64))).unwrap();
    tmp.flush().unwrap();

    let mut file = fs::File::open(tmp.path()).unwrap();
    let d = detect_version(&mut file).unwrap();
    assert_eq!(d.version, HeaderVersion::V2);
    assert_eq!(d.header_len, 56);

    let bytes = fs::read(tmp.path()).unwrap();
    let decoded = CaptureHeader::decode(d.version, &bytes[..d.header_len]).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(decoded.capture_mode(), CaptureMode::Search);
    assert_eq!(decoded.drone_search_bitmap(), Some(u64::MAX));
    assert_eq!(decoded.dwell_time_ms().unwrap(), 633.0);

    // 141 792 000 байт заявлено, 128 в наличии
    assert!(matches!(
        CaptureFile::load(tmp.path()),
        Err(CapError::DataRead(_))
    ));
}

#[test]
fn test_truncated_header_is_header_read_error() {
    let header = v5_track_header(8);
    let bytes = header.encode().unwrap();

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&bytes[..150]).unwrap();
    tmp.flush().unwrap();

    match CaptureFile::load(tmp.path()) {
        Err(CapError::HeaderRead { expected, found }) => {
            assert_eq!(expected, 228);
            assert_eq!(found, 150);
        }
        other => panic!("ожидалась HeaderRead, получено {other:?}"),
    }
}

#[test]
fn test_truncated_payload_is_data_read_error() {
    let raw = sawtooth(100);
    let header = v4_header(raw.len());
    let src = write_file(&header, &raw[..60]);

    assert!(matches!(
        CaptureFile::load(src.path()),
        Err(CapError::DataRead(_))
    ));
}

#[test]
fn test_unknown_version_is_format_error() {
    let mut tmp = NamedTempFile::new().unwrap();
    for w in [500u32, 104, 9] {
        tmp.write_all(&w.to_be_bytes()).unwrap();
    }
    tmp.write_all(&[0u8; 200]).unwrap();
    tmp.flush().unwrap();

    assert!(matches!(
        CaptureFile::load(tmp.path()),
        Err(CapError::Format(_))
    ));
}

// ===========================================================================
// Запись и повышение версии
// ===========================================================================

#[test]
fn test_v1_upgraded_to_v5_search() {
    let raw = sawtooth(400);
    let header = CaptureHeader::V1(HeaderV1 {
        base: CaptureBase {
            total_len: (40 + 800 - 4) as u32,
            ..base(1_000)
        },
    });
    // v1 на диске с произвольным total_len не распознаётся: загрузка из памяти
    let capture = CaptureFile::new(header, raw.clone());

    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &SaveOptions::default()).unwrap();

    let upgraded = CaptureFile::load(dst.path()).unwrap();
    let h = upgraded.header();
    assert_eq!(h.version(), HeaderVersion::V5);
    assert_eq!(h.stored_header_len(), Some(104));
    assert_eq!(h.total_len(), 104 + 800 - 4);
    assert_eq!(h.antenna(), AntennaInfo::LEGACY);
    assert_eq!(h.base().sensor_id, 0x21);
    assert_eq!(upgraded.raw_data().unwrap(), &raw[..]);
}

#[test]
fn test_v3_upgraded_to_v5_track_gets_placeholder_map() {
    let raw = sawtooth(64);
    let capture = CaptureFile::new(
        CaptureHeader::V3(HeaderV3 {
            base: CaptureBase {
                total_len: (72 + 128 - 4) as u32,
                ..base(1_000)
            },
            antenna: antenna(),
            capture_mode: CaptureMode::Track,
            drone_search_bitmap: 0xFF,
        }),
        raw,
    );

    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &SaveOptions::default()).unwrap();

    let bytes = fs::read(dst.path()).unwrap();
    assert_eq!(bytes.len(), 228 + 128);
    assert!(bytes[104..228].iter().all(|b| *b == 0));

    let upgraded = CaptureFile::load(dst.path()).unwrap();
    assert_eq!(
        upgraded.header().drone_search_map(),
        Some(&DroneSearchMap::placeholder())
    );
    assert_eq!(upgraded.header().antenna(), antenna());
}

#[test]
fn test_capture_len_pads_with_one_on_disk() {
    let raw = sawtooth(10);
    let src = write_file(&v4_header(raw.len()), &raw);
    let capture = CaptureFile::load(src.path()).unwrap();

    // fs = 1000 кГц, 1 мс → 2000 целых
    let opts = SaveOptions {
        capture_len_ms: Some(1),
        ..SaveOptions::default()
    };
    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &opts).unwrap();

    let padded = CaptureFile::load(dst.path()).unwrap();
    let data = padded.raw_data().unwrap();
    assert_eq!(data.len(), 2_000);
    assert_eq!(&data[..10], &raw[..]);
    assert!(data[10..].iter().all(|v| *v == 1));
    assert!((padded.dwell_time_ms().unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_overrides_do_not_mutate_source() {
    let raw = sawtooth(20);
    let src = write_file(&v4_header(raw.len()), &raw);
    let capture = CaptureFile::load(src.path()).unwrap();

    let opts = SaveOptions {
        version: Some(5),
        center_freq_khz: Some(5_745_000),
        sensor_id: Some(9),
        capture_bw_khz: Some(1_000_000),
        ..SaveOptions::default()
    };
    let dst = NamedTempFile::new().unwrap();
    capture.save(dst.path(), &opts).unwrap();

    let saved = CaptureFile::load(dst.path()).unwrap();
    assert_eq!(saved.header().version(), HeaderVersion::V5);
    assert_eq!(saved.header().base().fc_khz, 5_745_000);
    assert_eq!(saved.header().base().sensor_id, 9);
    assert_eq!(saved.header().base().bw_khz, 1_000, "clamped to fs");

    assert_eq!(capture.header().version(), HeaderVersion::V4);
    assert_eq!(capture.header().base().fc_khz, 2_422_300);
}

#[test]
fn test_invalid_save_target_leaves_no_file() {
    let capture = CaptureFile::new(v4_header(4), sawtooth(4));
    let dir = tempfile::tempdir().unwrap();
    let dst = dir.path().join("out.dat");

    let opts = SaveOptions {
        version: Some(2),
        ..SaveOptions::default()
    };
    assert!(matches!(
        capture.save(&dst, &opts),
        Err(CapError::Usage(_))
    ));
    assert!(!dst.exists());
}

// ===========================================================================
// Файлы массивов
// ===========================================================================

#[test]
fn test_mat_without_loader_is_usage_error() {
    assert!(matches!(
        CaptureFile::load("recording.mat"),
        Err(CapError::Usage(_))
    ));
}

#[test]
fn test_mat_with_loader() {
    let capture = CaptureFile::load_with("recording.MAT", &FixedLoader).unwrap();
    let h = capture.header();

    assert_eq!(h.version(), HeaderVersion::V0);
    assert_eq!(h.base().fc_khz, 915_000);
    assert_eq!(h.base().fs_khz, 20_000);
    assert_eq!(h.base().bw_khz, 44_800);
    assert_eq!(capture.num_samples(), 40);
    assert!(capture.raw_data().is_none());
    assert!((capture.dwell_time_ms().unwrap() - 0.002).abs() < 1e-12);
}

// ===========================================================================
// Сырые захваты
// ===========================================================================

#[test]
fn test_attach_header_to_raw_capture() {
    // Заголовок 211 мс, но нагрузка уменьшена до реального размера файла
    let mut header = HeaderV3::for_raw_capture(CaptureDuration::Ms211, 2_442_000, 30).unwrap();
    let raw = sawtooth(1_000);
    header.base.total_len = (72 + 2 * raw.len() - 4) as u32;

    let mut raw_file = NamedTempFile::new().unwrap();
    raw_file.write_all(&payload_bytes(&raw)).unwrap();
    raw_file.flush().unwrap();

    let dst = NamedTempFile::new().unwrap();
    attach_header(raw_file.path(), dst.path(), &header).unwrap();

    let bytes = fs::read(dst.path()).unwrap();
    assert_eq!(bytes.len(), 72 + 2_000);
    assert_eq!(&bytes[72..], &payload_bytes(&raw)[..]);
    assert_eq!(
        CaptureHeader::decode(HeaderVersion::V3, &bytes[..72]).unwrap(),
        CaptureHeader::V3(header)
    );
}

#[test]
fn test_attach_header_rejects_short_raw_file() {
    let header = HeaderV3::for_raw_capture(CaptureDuration::Ms211, 2_442_000, 30).unwrap();

    let mut raw_file = NamedTempFile::new().unwrap();
    raw_file.write_all(&payload_bytes(&sawtooth(100))).unwrap();
    raw_file.flush().unwrap();

    let dst = NamedTempFile::new().unwrap();
    assert!(matches!(
        attach_header(raw_file.path(), dst.path(), &header),
        Err(CapError::DataRead(_))
    ));
}

// ===========================================================================
// Спектрограммы
// ===========================================================================

#[test]
fn test_spectrogram_file_round_trip() {
    let header = spectrogram_header();
    let payload: Vec<f32> = (0..200).map(|v| v as f32 * 0.25).collect();
    let original = SpectrogramFile::new(header, payload).unwrap();

    let tmp = NamedTempFile::new().unwrap();
    original.save(tmp.path()).unwrap();
    assert_eq!(fs::metadata(tmp.path()).unwrap().len(), 88 + 800);

    let loaded = SpectrogramFile::load(tmp.path()).unwrap();
    assert_eq!(loaded, original);

    assert_eq!(loaded.get_spectrogram(false).unwrap().shape(), (14, 10));
    assert_eq!(loaded.get_spectrogram(true).unwrap().shape(), (20, 10));
}
