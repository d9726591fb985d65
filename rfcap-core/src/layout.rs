//! Таблица байтовых раскладок заголовков.
//!
//! Для каждой версии заголовка захвата: порядок полей, их ширина, порядок
//! байт и фиксированная длина. Многобайтовые поля заголовков захвата —
//! big-endian, полезная нагрузка — little-endian `i16`. Длины включают само
//! поле `total_len`.

use byteorder::{BigEndian, LittleEndian};
use rfcap_types::{CaptureMode, HeaderVersion, MAX_DRONE_SEARCH_MAP_LEN};

/// Ширина поля в байтах.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U8,
    U32,
    U64,
    F32,
}

/// Порядок байт заголовков захвата всех версий.
pub type CaptureHeaderOrder = BigEndian;
/// Порядок байт полезной нагрузки захвата.
pub type PayloadOrder = LittleEndian;
/// Порядок байт заголовка и матрицы спектрограммы.
pub type SpectrogramOrder = LittleEndian;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: FieldWidth,
}

/// Раскладка заголовка одной версии.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    pub fields: &'static [FieldSpec],
    /// Полная длина в байтах
    pub len: usize,
}

impl FieldWidth {
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::U8 => 1,
            FieldWidth::U32 | FieldWidth::F32 => 4,
            FieldWidth::U64 => 8,
        }
    }
}

impl HeaderLayout {
    /// Сумма ширин всех полей (должна совпадать с `len`).
    pub fn fields_len(&self) -> usize {
        self.fields.iter().map(|f| f.width.bytes()).sum()
    }

    /// Смещение поля от начала заголовка.
    pub fn offset_of(
        &self,
        name: &str,
    ) -> Option<usize> {
        let mut off = 0;
        for f in self.fields {
            if f.name == name {
                return Some(off);
            }
            off += f.width.bytes();
        }
        None
    }
}

const fn u32f(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        width: FieldWidth::U32,
    }
}

const fn u64f(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        width: FieldWidth::U64,
    }
}

const fn u8f(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        width: FieldWidth::U8,
    }
}

const fn f32f(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        width: FieldWidth::F32,
    }
}

pub const HEADER_V1_LEN: usize = 40;
pub const HEADER_V2_LEN: usize = 56;
pub const HEADER_V3_LEN: usize = 72;
/// Номинальная длина; в файле может быть записана другая
pub const HEADER_V4_LEN: usize = 104;
pub const HEADER_V5_SEARCH_LEN: usize = 104;
pub const SPECTROGRAM_HEADER_LEN: usize = 88;

/// Размер записи карты поиска дронов на диске: `dr_type`, резерв, `chan_list`.
pub const SEARCH_MAP_ENTRY_LEN: usize = 12;

/// Префикс версии 5, длина карты и всегда 10 записей.
pub const HEADER_V5_TRACK_LEN: usize =
    HEADER_V5_SEARCH_LEN + 4 + MAX_DRONE_SEARCH_MAP_LEN * SEARCH_MAP_ENTRY_LEN;

/// Смещения самоописывающих полей версий 4–5.
pub const SELF_DESCRIBING_HEADER_LEN_OFFSET: usize = 4;
pub const SELF_DESCRIBING_VERSION_OFFSET: usize = 8;

/// Байт на одно целое полезной нагрузки (`i16`).
pub const PAYLOAD_INT_BYTES: usize = 2;

// Длины полезной нагрузки фиксированных захватов, байт
pub const PAYLOAD_LEN_633MS: usize = 141_792_000;
pub const PAYLOAD_LEN_460MS: usize = 103_040_000;
pub const PAYLOAD_LEN_211MS: usize = 47_264_000;
pub const PAYLOAD_LEN_90MS: usize = 20_160_000;

const BASE_FIELDS: [FieldSpec; 8] = [
    u32f("total_len"),
    u32f("sensor_id"),
    u32f("fc_khz"),
    u32f("fs_khz"),
    u32f("bw_khz"),
    u32f("gain_db"),
    u64f("start_time_ticks"),
    u64f("tps"),
];

pub const V1_FIELDS: &[FieldSpec] = &BASE_FIELDS;

pub const V2_FIELDS: &[FieldSpec] = &[
    BASE_FIELDS[0],
    BASE_FIELDS[1],
    BASE_FIELDS[2],
    BASE_FIELDS[3],
    BASE_FIELDS[4],
    BASE_FIELDS[5],
    BASE_FIELDS[6],
    BASE_FIELDS[7],
    u32f("num_ant"),
    u32f("ant_seq"),
    u32f("ant_dwell_time_ms"),
    u32f("capture_id"),
];

pub const V3_FIELDS: &[FieldSpec] = &[
    BASE_FIELDS[0],
    BASE_FIELDS[1],
    BASE_FIELDS[2],
    BASE_FIELDS[3],
    BASE_FIELDS[4],
    BASE_FIELDS[5],
    BASE_FIELDS[6],
    BASE_FIELDS[7],
    u32f("num_ant"),
    u64f("ant_seq"),
    u32f("ant_dwell_time_ms"),
    u32f("capture_id"),
    u32f("capture_mode"),
    u64f("drone_search_bitmap"),
];

pub const V4_FIELDS: &[FieldSpec] = &[
    u32f("total_len"),
    u32f("header_len"),
    u32f("header_version"),
    u32f("sensor_id"),
    u32f("fc_khz"),
    u32f("fs_khz"),
    u32f("bw_khz"),
    u32f("gain_db"),
    u64f("start_time_ticks"),
    u64f("tps"),
    u64f("fpga_pps"),
    u64f("fpga_start_time"),
    u32f("fpga_tps"),
    u32f("pps_flag"),
    u32f("num_ant"),
    u64f("ant_seq"),
    u32f("ant_dwell_time_ms"),
    u32f("capture_id"),
    u32f("capture_mode"),
    u64f("drone_search_bitmap"),
];

/// Фиксированный префикс версии 5 (общий для поиска и слежения).
pub const V5_FIELDS: &[FieldSpec] = &[
    u32f("total_len"),
    u32f("header_len"),
    u32f("header_version"),
    u32f("sensor_id"),
    u32f("fc_khz"),
    u32f("fs_khz"),
    u32f("bw_khz"),
    u32f("gain_db"),
    u64f("start_time_ticks"),
    u64f("tps"),
    u64f("fpga_pps"),
    u64f("fpga_start_time"),
    u32f("fpga_tps"),
    u32f("pps_flag"),
    u32f("num_ant"),
    u64f("ant_seq"),
    u32f("ant_dwell_time_ms"),
    u32f("capture_id"),
    u32f("capture_mode"),
    u32f("ant_type"),
    u32f("angle"),
];

pub const SPECTROGRAM_FIELDS: &[FieldSpec] = &[
    u8f("header_version"),
    u8f("reserved_0"),
    u8f("reserved_1"),
    u8f("reserved_2"),
    u32f("sensor_id"),
    u32f("capture_id"),
    u32f("capture_mode"),
    u64f("start_time_ticks"),
    u64f("tps"),
    u32f("fc_khz"),
    u32f("fs_khz"),
    u32f("bw_khz"),
    u32f("gain_db"),
    u32f("nfft"),
    u32f("window_len"),
    u32f("overlap_len"),
    u32f("margin"),
    f32f("tbin_width_ms"),
    f32f("fbin_width_khz"),
    u32f("tbins"),
    u32f("fbins"),
    u8f("margin_removed"),
    u8f("flattened"),
    u8f("denoised"),
    u8f("normalised"),
    u8f("window_type"),
    u8f("reserved_3"),
    u8f("reserved_4"),
    u8f("reserved_5"),
];

pub const V1_LAYOUT: HeaderLayout = HeaderLayout {
    fields: V1_FIELDS,
    len: HEADER_V1_LEN,
};

pub const V2_LAYOUT: HeaderLayout = HeaderLayout {
    fields: V2_FIELDS,
    len: HEADER_V2_LEN,
};

pub const V3_LAYOUT: HeaderLayout = HeaderLayout {
    fields: V3_FIELDS,
    len: HEADER_V3_LEN,
};

pub const V4_LAYOUT: HeaderLayout = HeaderLayout {
    fields: V4_FIELDS,
    len: HEADER_V4_LEN,
};

pub const V5_LAYOUT: HeaderLayout = HeaderLayout {
    fields: V5_FIELDS,
    len: HEADER_V5_SEARCH_LEN,
};

/// Заголовок спектрограммы, без выравнивания.
pub const SPECTROGRAM_LAYOUT: HeaderLayout = HeaderLayout {
    fields: SPECTROGRAM_FIELDS,
    len: SPECTROGRAM_HEADER_LEN,
};

/// Сигнатуры версий без самоописания: `(версия, длина заголовка, допустимые
/// длины нагрузки)`. Порядок проверки 1 → 2 → 3, выигрывает первое
/// совпадение.
pub const FIXED_LENGTH_SIGNATURES: [(HeaderVersion, usize, &[usize]); 3] = [
    (
        HeaderVersion::V1,
        HEADER_V1_LEN,
        &[PAYLOAD_LEN_633MS, PAYLOAD_LEN_90MS],
    ),
    (HeaderVersion::V2, HEADER_V2_LEN, &[PAYLOAD_LEN_633MS]),
    (
        HeaderVersion::V3,
        HEADER_V3_LEN,
        &[PAYLOAD_LEN_633MS, PAYLOAD_LEN_460MS, PAYLOAD_LEN_211MS],
    ),
];

/// Раскладка фиксированной части заголовка версии.
pub fn layout_for(version: HeaderVersion) -> Option<&'static HeaderLayout> {
    match version {
        HeaderVersion::V0 => None,
        HeaderVersion::V1 => Some(&V1_LAYOUT),
        HeaderVersion::V2 => Some(&V2_LAYOUT),
        HeaderVersion::V3 => Some(&V3_LAYOUT),
        HeaderVersion::V4 => Some(&V4_LAYOUT),
        HeaderVersion::V5 => Some(&V5_LAYOUT),
    }
}

/// Длина заголовка, записываемого при сохранении в версии 4/5.
pub fn nominal_header_len(
    version: HeaderVersion,
    mode: CaptureMode,
) -> usize {
    match (version, mode) {
        (HeaderVersion::V5, CaptureMode::Track) => HEADER_V5_TRACK_LEN,
        (v, _) => layout_for(v).map_or(0, |l| l.len),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Длительности фиксированных захватов
////////////////////////////////////////////////////////////////////////////////

/// Допустимые длительности захвата фиксированной длины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDuration {
    Ms633,
    Ms460,
    Ms211,
    /// Только версия 1
    Ms90,
}

impl CaptureDuration {
    pub fn from_millis(ms: u32) -> Option<Self> {
        match ms {
            633 => Some(CaptureDuration::Ms633),
            460 => Some(CaptureDuration::Ms460),
            211 => Some(CaptureDuration::Ms211),
            90 => Some(CaptureDuration::Ms90),
            _ => None,
        }
    }

    pub fn millis(&self) -> u32 {
        match self {
            CaptureDuration::Ms633 => 633,
            CaptureDuration::Ms460 => 460,
            CaptureDuration::Ms211 => 211,
            CaptureDuration::Ms90 => 90,
        }
    }

    /// Длина полезной нагрузки в байтах.
    pub fn payload_len(&self) -> usize {
        match self {
            CaptureDuration::Ms633 => PAYLOAD_LEN_633MS,
            CaptureDuration::Ms460 => PAYLOAD_LEN_460MS,
            CaptureDuration::Ms211 => PAYLOAD_LEN_211MS,
            CaptureDuration::Ms90 => PAYLOAD_LEN_90MS,
        }
    }

    /// Значение `total_len` для файла этой длительности в данной версии;
    /// `None`, если версия такой длительности не допускает.
    pub fn expected_total_len(
        &self,
        version: HeaderVersion,
    ) -> Option<u32> {
        FIXED_LENGTH_SIGNATURES
            .iter()
            .find(|(v, _, _)| *v == version)
            .filter(|(_, _, lens)| lens.contains(&self.payload_len()))
            .map(|(_, header_len, _)| (self.payload_len() + header_len - 4) as u32)
    }

    /// Нагрузка короче требуемой — захват надо повторить.
    pub fn is_undersized(
        &self,
        observed_payload_bytes: u64,
    ) -> bool {
        observed_payload_bytes < self.payload_len() as u64
    }
}
