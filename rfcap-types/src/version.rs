use crate::{CapError, CapResult};

/// Версия заголовка файла захвата.
///
/// `V0` — синтетическая версия для данных, пришедших из `.mat` файлов; на
/// диске в формате `.dat` она не встречается.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum HeaderVersion {
    V0 = 0,
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
}

/// Режим захвата (0 — поиск, 1 — слежение).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    Search,
    Track,
    /// Код, не известный этой версии формата
    Unknown(u32),
}

impl HeaderVersion {
    pub fn from_u32(v: u32) -> CapResult<Self> {
        match v {
            0 => Ok(HeaderVersion::V0),
            1 => Ok(HeaderVersion::V1),
            2 => Ok(HeaderVersion::V2),
            3 => Ok(HeaderVersion::V3),
            4 => Ok(HeaderVersion::V4),
            5 => Ok(HeaderVersion::V5),
            _ => Err(CapError::format(format!("Unknown header version: {v}"))),
        }
    }

    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// Версии 4 и 5 хранят `header_len` и `header_version` в самом файле.
    pub fn is_self_describing(&self) -> bool {
        matches!(self, HeaderVersion::V4 | HeaderVersion::V5)
    }
}

impl CaptureMode {
    pub const SEARCH: u32 = 0;
    pub const TRACK: u32 = 1;

    pub fn from_u32(v: u32) -> Self {
        match v {
            Self::SEARCH => CaptureMode::Search,
            Self::TRACK => CaptureMode::Track,
            other => CaptureMode::Unknown(other),
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            CaptureMode::Search => Self::SEARCH,
            CaptureMode::Track => Self::TRACK,
            CaptureMode::Unknown(v) => *v,
        }
    }

    pub fn is_track(&self) -> bool {
        *self == CaptureMode::Track
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для HeaderVersion, CaptureMode
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for HeaderVersion {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            CaptureMode::Search => write!(f, "search"),
            CaptureMode::Track => write!(f, "track"),
            CaptureMode::Unknown(v) => write!(f, "unknown({v})"),
        }
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "search" | "0" => Ok(CaptureMode::Search),
            "track" | "tracking" | "1" => Ok(CaptureMode::Track),
            _ => Err(format!("Unknown capture mode: '{s}'. Use: search, track")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_u32() {
        assert_eq!(HeaderVersion::from_u32(3).unwrap(), HeaderVersion::V3);
        assert_eq!(HeaderVersion::V5.as_u32(), 5);
        assert!(matches!(
            HeaderVersion::from_u32(6),
            Err(CapError::Format(_))
        ));
    }

    #[test]
    fn test_self_describing() {
        assert!(!HeaderVersion::V3.is_self_describing());
        assert!(HeaderVersion::V4.is_self_describing());
        assert!(HeaderVersion::V5.is_self_describing());
    }

    #[test]
    fn test_capture_mode_codes() {
        assert_eq!(CaptureMode::from_u32(0), CaptureMode::Search);
        assert_eq!(CaptureMode::from_u32(1), CaptureMode::Track);
        assert_eq!(CaptureMode::from_u32(9), CaptureMode::Unknown(9));
        assert_eq!(CaptureMode::Unknown(9).as_u32(), 9);
    }

    #[test]
    fn test_capture_mode_fromstr() {
        assert_eq!("search".parse::<CaptureMode>().unwrap(), CaptureMode::Search);
        assert_eq!("TRACK".parse::<CaptureMode>().unwrap(), CaptureMode::Track);
        assert_eq!("1".parse::<CaptureMode>().unwrap(), CaptureMode::Track);
        assert!("scan".parse::<CaptureMode>().is_err());
    }
}
