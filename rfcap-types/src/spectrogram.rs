/// Заголовок файла спектрограммы (единственная версия, 88 байт).
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramHeader {
    pub sensor_id: u32,
    pub capture_id: u32,
    pub capture_mode: u32,
    pub start_time_ticks: u64,
    pub tps: u64,
    pub fc_khz: u32,
    pub fs_khz: u32,
    pub bw_khz: u32,
    pub gain_db: u32,
    /// Размер БПФ
    pub nfft: u32,
    pub window_len: u32,
    pub overlap_len: u32,
    /// Число бинов, обрезаемых с каждого края по частоте
    pub margin: u32,
    pub tbin_width_ms: f32,
    pub fbin_width_khz: f32,
    pub tbins: u32,
    pub fbins: u32,
    pub margin_removed: bool,
    pub flattened: bool,
    pub denoised: bool,
    pub normalised: bool,
    /// Код оконной функции
    pub window_type: u8,
}

impl SpectrogramHeader {
    /// Версия формата спектрограммы
    pub const VERSION: u8 = 1;

    /// Число элементов полезной нагрузки (`tbins * fbins`).
    pub fn payload_len(&self) -> usize {
        self.tbins as usize * self.fbins as usize
    }
}
