use rfcap_core::{CaptureDuration, SaveOptions};
use rfcap_types::CaptureMode;

use crate::{CliError, CliResult};

/// Аргументы `convert` в виде, полученном из командной строки.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertArgs {
    pub version: Option<u32>,
    pub capture_len_ms: Option<u32>,
    pub center_freq: Option<String>,
    pub mode: Option<String>,
    pub sensor_id: Option<u32>,
    pub bandwidth: Option<String>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ConvertArgs {
    /// Переводит строковые аргументы в [`SaveOptions`].
    pub fn save_options(&self) -> CliResult<SaveOptions> {
        let center_freq_khz = self
            .center_freq
            .as_deref()
            .map(parse_freq_khz)
            .transpose()
            .map_err(|e| CliError::config(format!("--center-freq: {e}")))?;

        let capture_bw_khz = self
            .bandwidth
            .as_deref()
            .map(parse_freq_khz)
            .transpose()
            .map_err(|e| CliError::config(format!("--bandwidth: {e}")))?;

        let capture_mode = self
            .mode
            .as_deref()
            .map(str::parse::<CaptureMode>)
            .transpose()
            .map_err(|e| CliError::config(format!("--mode: {e}")))?;

        Ok(SaveOptions {
            version: self.version,
            capture_len_ms: self.capture_len_ms,
            center_freq_khz,
            capture_mode,
            sensor_id: self.sensor_id,
            capture_bw_khz,
        })
    }
}

/// Длительность сырого захвата: 211, 460 или 633 мс.
pub fn parse_duration(ms: u32) -> CliResult<CaptureDuration> {
    match CaptureDuration::from_millis(ms) {
        Some(d) if d != CaptureDuration::Ms90 => Ok(d),
        _ => Err(CliError::config(format!(
            "--duration {ms} ms is not supported. Use: 211, 460, 633"
        ))),
    }
}

/// Парсит строку частоты в килогерцы.
///
/// Поддерживает суффиксы: `GHz`, `MHz`, `kHz`, `Hz` (регистронезависимо).
/// Число без суффикса считается заданным в кГц.
///
/// # Примеры
/// ```
/// use rfcap_cli::config::parse_freq_khz;
/// assert_eq!(parse_freq_khz("2422.3MHz").unwrap(), 2_422_300);
/// assert_eq!(parse_freq_khz("5.8GHz").unwrap(), 5_800_000);
/// assert_eq!(parse_freq_khz("56000").unwrap(), 56_000);
/// ```
pub fn parse_freq_khz(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("ghz") {
        (v.trim(), 1_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1_000_f64)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1_f64)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 0.001_f64)
    } else {
        // Без суффикса — число в килогерцах
        return s
            .parse::<u32>()
            .map_err(|e| format!("Invalid frequency '{s}': {e}"));
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid frequency value '{num_str}': {e}"))?;

    let khz = (n * mult).round();
    if !(0.0..=u32::MAX as f64).contains(&khz) {
        return Err(format!("Frequency '{s}' is out of range"));
    }
    Ok(khz as u32)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_freq_khz() {
        assert_eq!(parse_freq_khz("2422.3MHz").unwrap(), 2_422_300);
        assert_eq!(parse_freq_khz("5.8GHz").unwrap(), 5_800_000);
        assert_eq!(parse_freq_khz("44800kHz").unwrap(), 44_800);
        assert_eq!(parse_freq_khz("2442000000Hz").unwrap(), 2_442_000);
        assert_eq!(parse_freq_khz("56000").unwrap(), 56_000);
        assert_eq!(parse_freq_khz(" 56 mhz ").unwrap(), 56_000);
    }

    #[test]
    fn test_parse_freq_khz_invalid() {
        assert!(parse_freq_khz("abc").is_err());
        assert!(parse_freq_khz("MHz").is_err());
        assert!(parse_freq_khz("-5MHz").is_err());
        assert!(parse_freq_khz("9000000GHz").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(211).unwrap(), CaptureDuration::Ms211);
        assert_eq!(parse_duration(633).unwrap(), CaptureDuration::Ms633);
        assert!(parse_duration(90).is_err());
        assert!(parse_duration(100).is_err());
    }

    #[test]
    fn test_save_options() {
        let args = ConvertArgs {
            version: Some(5),
            capture_len_ms: Some(211),
            center_freq: Some("2.4GHz".into()),
            mode: Some("track".into()),
            sensor_id: Some(3),
            bandwidth: Some("40MHz".into()),
        };

        let opts = args.save_options().unwrap();
        assert_eq!(opts.version, Some(5));
        assert_eq!(opts.center_freq_khz, Some(2_400_000));
        assert_eq!(opts.capture_mode, Some(CaptureMode::Track));
        assert_eq!(opts.capture_bw_khz, Some(40_000));

        assert_eq!(
            ConvertArgs::default().save_options().unwrap(),
            SaveOptions::default()
        );

        let bad = ConvertArgs {
            mode: Some("scan".into()),
            ..ConvertArgs::default()
        };
        assert!(matches!(bad.save_options(), Err(CliError::Config(_))));
    }
}
