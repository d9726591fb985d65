//! Граница с внешним загрузчиком `.mat` файлов.
//!
//! Сам формат массивов здесь не реализуется: загрузчик обязан отдать четыре
//! именованных значения, из которых строится синтетический заголовок
//! версии 0.

use std::path::Path;

use rfcap_types::{CapResult, CaptureBase, HeaderV0, IqSample};

/// Полоса, подставляемая для данных из `.mat`, кГц.
pub const ARRAY_FILE_BW_KHZ: u32 = 44_800;

/// Расширение файлов, делегируемых внешнему загрузчику.
pub const ARRAY_FILE_EXTENSION: &str = "mat";

/// Значения, которые обязан предоставить загрузчик.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFile {
    /// `centerFreq`, Гц
    pub center_freq: f64,
    /// `sampRate`, Гц
    pub samp_rate: f64,
    /// `sdrRxGain`, дБ
    pub sdr_rx_gain: f64,
    /// `rxdata`
    pub rxdata: Vec<IqSample>,
}

/// Внешний загрузчик файлов массивов.
pub trait ArrayFileLoader {
    fn load(
        &self,
        path: &Path,
    ) -> CapResult<ArrayFile>;
}

impl ArrayFile {
    /// Синтетический заголовок версии 0: частоты в кГц (с отбрасыванием
    /// дробной части), полоса фиксирована.
    pub fn header(&self) -> HeaderV0 {
        HeaderV0 {
            base: CaptureBase {
                total_len: 0,
                sensor_id: 0,
                fc_khz: (self.center_freq / 1e3) as u32,
                fs_khz: (self.samp_rate / 1e3) as u32,
                bw_khz: ARRAY_FILE_BW_KHZ,
                gain_db: self.sdr_rx_gain as u32,
                start_time_ticks: 0,
                tps: 0,
            },
        }
    }
}
