//! Заголовок файла захвата: по одному варианту на каждую версию формата.
//!
//! Каждый вариант несёт ровно тот набор полей, который присутствует в
//! соответствующей версии на диске. Поля, отсутствующие в старых версиях
//! (антенны, режим захвата, битовая карта поиска), отдаются через методы
//! [`CaptureHeader`] со значениями по умолчанию, а не хранятся в варианте.

use crate::{CaptureMode, DroneSearchMap, HeaderVersion};

/// Битовая карта поиска для версий без этого поля: все единицы.
pub const LEGACY_DRONE_SEARCH_BITMAP: u64 = u64::MAX;

/// Поля, общие для всех версий.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureBase {
    /// Число байт файла после самого поля `total_len` (размер файла − 4)
    pub total_len: u32,
    /// Идентификатор сенсора
    pub sensor_id: u32,
    /// Центральная частота, кГц
    pub fc_khz: u32,
    /// Частота дискретизации, кГц
    pub fs_khz: u32,
    /// Полоса, кГц
    pub bw_khz: u32,
    /// Усиление приёмника, дБ
    pub gain_db: u32,
    /// Время начала захвата в тиках
    pub start_time_ticks: u64,
    /// Тиков в секунду
    pub tps: u64,
}

/// Антенные поля версий 2–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntennaInfo {
    pub num_ant: u32,
    /// На диске `u32` в версии 2 и `u64` начиная с версии 3
    pub ant_seq: u64,
    pub ant_dwell_time_ms: u32,
    pub capture_id: u32,
}

impl AntennaInfo {
    /// Значения для версий 0–2, где этих полей нет (одна антенна, 633 мс).
    pub const LEGACY: AntennaInfo = AntennaInfo {
        num_ant: 1,
        ant_seq: 0,
        ant_dwell_time_ms: 633,
        capture_id: 0,
    };
}

/// Поля синхронизации FPGA версий 4–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FpgaTiming {
    pub fpga_pps: u64,
    pub fpga_start_time: u64,
    pub fpga_tps: u32,
    pub pps_flag: u32,
}

/// Синтетический заголовок для данных из `.mat` файлов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV0 {
    pub base: CaptureBase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV1 {
    pub base: CaptureBase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV2 {
    pub base: CaptureBase,
    pub antenna: AntennaInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV3 {
    pub base: CaptureBase,
    pub antenna: AntennaInfo,
    pub capture_mode: CaptureMode,
    pub drone_search_bitmap: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV4 {
    pub base: CaptureBase,
    /// Длина заголовка, записанная в самом файле
    pub header_len: u32,
    pub fpga: FpgaTiming,
    pub antenna: AntennaInfo,
    pub capture_mode: CaptureMode,
    pub drone_search_bitmap: u64,
}

/// Режим захвата версии 5. Карта поиска есть только в режиме слежения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum V5Mode {
    Search,
    Track(DroneSearchMap),
    /// Неизвестный код режима, хранится как есть
    Other(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderV5 {
    pub base: CaptureBase,
    /// Длина заголовка, записанная в самом файле
    pub header_len: u32,
    pub fpga: FpgaTiming,
    pub antenna: AntennaInfo,
    pub ant_type: u32,
    pub angle: u32,
    pub mode: V5Mode,
}

/// Заголовок файла захвата (версии 0–5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureHeader {
    V0(HeaderV0),
    V1(HeaderV1),
    V2(HeaderV2),
    V3(HeaderV3),
    V4(HeaderV4),
    V5(HeaderV5),
}

impl V5Mode {
    pub fn capture_mode(&self) -> CaptureMode {
        match self {
            V5Mode::Search => CaptureMode::Search,
            V5Mode::Track(_) => CaptureMode::Track,
            V5Mode::Other(v) => CaptureMode::Unknown(*v),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CaptureHeader {
    pub fn version(&self) -> HeaderVersion {
        match self {
            CaptureHeader::V0(_) => HeaderVersion::V0,
            CaptureHeader::V1(_) => HeaderVersion::V1,
            CaptureHeader::V2(_) => HeaderVersion::V2,
            CaptureHeader::V3(_) => HeaderVersion::V3,
            CaptureHeader::V4(_) => HeaderVersion::V4,
            CaptureHeader::V5(_) => HeaderVersion::V5,
        }
    }

    pub fn base(&self) -> &CaptureBase {
        match self {
            CaptureHeader::V0(h) => &h.base,
            CaptureHeader::V1(h) => &h.base,
            CaptureHeader::V2(h) => &h.base,
            CaptureHeader::V3(h) => &h.base,
            CaptureHeader::V4(h) => &h.base,
            CaptureHeader::V5(h) => &h.base,
        }
    }

    pub fn total_len(&self) -> u32 {
        self.base().total_len
    }

    pub fn fs_khz(&self) -> u32 {
        self.base().fs_khz
    }

    /// Антенные поля; для версий 0–1 — [`AntennaInfo::LEGACY`].
    pub fn antenna(&self) -> AntennaInfo {
        match self {
            CaptureHeader::V0(_) | CaptureHeader::V1(_) => AntennaInfo::LEGACY,
            CaptureHeader::V2(h) => h.antenna,
            CaptureHeader::V3(h) => h.antenna,
            CaptureHeader::V4(h) => h.antenna,
            CaptureHeader::V5(h) => h.antenna,
        }
    }

    /// Режим захвата; версии 0–2 всегда в режиме поиска.
    pub fn capture_mode(&self) -> CaptureMode {
        match self {
            CaptureHeader::V0(_) | CaptureHeader::V1(_) | CaptureHeader::V2(_) => {
                CaptureMode::Search
            }
            CaptureHeader::V3(h) => h.capture_mode,
            CaptureHeader::V4(h) => h.capture_mode,
            CaptureHeader::V5(h) => h.mode.capture_mode(),
        }
    }

    /// Битовая карта поиска. В версии 5 её заменяет карта поиска дронов.
    pub fn drone_search_bitmap(&self) -> Option<u64> {
        match self {
            CaptureHeader::V0(_) | CaptureHeader::V1(_) | CaptureHeader::V2(_) => {
                Some(LEGACY_DRONE_SEARCH_BITMAP)
            }
            CaptureHeader::V3(h) => Some(h.drone_search_bitmap),
            CaptureHeader::V4(h) => Some(h.drone_search_bitmap),
            CaptureHeader::V5(_) => None,
        }
    }

    /// Поля FPGA; нули для версий, где их нет.
    pub fn fpga(&self) -> FpgaTiming {
        match self {
            CaptureHeader::V4(h) => h.fpga,
            CaptureHeader::V5(h) => h.fpga,
            _ => FpgaTiming::default(),
        }
    }

    /// `(ant_type, angle)` — только версия 5.
    pub fn ant_type_angle(&self) -> Option<(u32, u32)> {
        match self {
            CaptureHeader::V5(h) => Some((h.ant_type, h.angle)),
            _ => None,
        }
    }

    pub fn drone_search_map(&self) -> Option<&DroneSearchMap> {
        match self {
            CaptureHeader::V5(HeaderV5 {
                mode: V5Mode::Track(map),
                ..
            }) => Some(map),
            _ => None,
        }
    }

    /// Длина заголовка, записанная в файле (версии 4–5).
    pub fn stored_header_len(&self) -> Option<u32> {
        match self {
            CaptureHeader::V4(h) => Some(h.header_len),
            CaptureHeader::V5(h) => Some(h.header_len),
            _ => None,
        }
    }
}
