//! Определение версии заголовка по первым байтам файла.
//!
//! Версии 1–3 не хранят ни версию, ни длину заголовка: они распознаются по
//! значению `total_len`, которое обязано совпасть с одной из известных сумм
//! «длина нагрузки + длина заголовка». Проверки идут в порядке 1 → 2 → 3,
//! выигрывает первое совпадение. Отсутствие пересечений с файлами версий
//! 4–5, у которых `total_len` случайно совпал с такой суммой, не доказано:
//! порядок сохранён ради совместимости с записывающей стороной.

use std::io::{Read, Seek, SeekFrom};

use byteorder::ByteOrder;
use log::debug;
use rfcap_types::{CapError, CapResult, HeaderVersion};

use crate::layout::{
    layout_for, CaptureHeaderOrder, FIXED_LENGTH_SIGNATURES, HEADER_V4_LEN,
    SELF_DESCRIBING_HEADER_LEN_OFFSET, SELF_DESCRIBING_VERSION_OFFSET,
};

/// Максимум байт, который читает детектор.
pub const DETECT_PREFIX_LEN: usize = 12;

/// Результат определения версии.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub version: HeaderVersion,
    /// Длина заголовка в байтах, включая поле `total_len`
    pub header_len: usize,
}

/// Проверяет `total_len` по таблице сигнатур версий 1–3.
pub fn match_fixed_length(total_len: u32) -> Option<Detection> {
    let file_len = total_len as u64 + 4;

    FIXED_LENGTH_SIGNATURES
        .iter()
        .find(|(_, header_len, payload_lens)| {
            payload_lens
                .iter()
                .any(|p| (*p + *header_len) as u64 == file_len)
        })
        .map(|(version, header_len, _)| Detection {
            version: *version,
            header_len: *header_len,
        })
}

/// Разбирает самоописывающие поля `header_len`/`header_version`.
fn self_described(
    header_len: u32,
    version: u32,
) -> CapResult<Detection> {
    let version = HeaderVersion::from_u32(version)?;
    let header_len = header_len as usize;

    match version {
        HeaderVersion::V0 => Err(CapError::format(
            "header version 0 is not a valid on-disk version",
        )),
        HeaderVersion::V4 | HeaderVersion::V5 => {
            if header_len < HEADER_V4_LEN {
                return Err(CapError::format(format!(
                    "{version} header_len {header_len} is shorter than {HEADER_V4_LEN}"
                )));
            }
            Ok(Detection {
                version,
                header_len,
            })
        }
        fixed => {
            // Версии 1–3 имеют только одну допустимую длину
            let expected = layout_for(fixed).map_or(0, |l| l.len);
            if header_len != expected {
                return Err(CapError::format(format!(
                    "{fixed} header_len {header_len} does not match fixed length {expected}"
                )));
            }
            Ok(Detection {
                version: fixed,
                header_len,
            })
        }
    }
}

/// Определяет версию по префиксу файла (нужно не более 12 байт).
pub fn detect_prefix(prefix: &[u8]) -> CapResult<Detection> {
    if prefix.len() < 4 {
        return Err(CapError::format(format!(
            "need at least 4 bytes to read total_len, got {}",
            prefix.len()
        )));
    }

    let total_len = CaptureHeaderOrder::read_u32(&prefix[0..4]);
    if let Some(d) = match_fixed_length(total_len) {
        return Ok(d);
    }

    if prefix.len() < DETECT_PREFIX_LEN {
        return Err(CapError::format(format!(
            "total_len {total_len} matches no fixed-length version and the \
             self-describing fields are missing ({} bytes available)",
            prefix.len()
        )));
    }

    let header_len = CaptureHeaderOrder::read_u32(
        &prefix[SELF_DESCRIBING_HEADER_LEN_OFFSET..SELF_DESCRIBING_HEADER_LEN_OFFSET + 4],
    );
    let version = CaptureHeaderOrder::read_u32(
        &prefix[SELF_DESCRIBING_VERSION_OFFSET..SELF_DESCRIBING_VERSION_OFFSET + 4],
    );

    self_described(header_len, version)
}

/// Определяет версию из потока и возвращает позицию потока к началу.
///
/// Читает не более [`DETECT_PREFIX_LEN`] байт и не выделяет память под
/// полезную нагрузку.
pub fn detect_version<R: Read + Seek>(reader: &mut R) -> CapResult<Detection> {
    let start = reader.stream_position()?;
    let result = read_and_detect(reader);

    reader.seek(SeekFrom::Start(start))?;

    if let Ok(d) = &result {
        debug!(
            "Detected capture header {} ({} bytes)",
            d.version, d.header_len
        );
    }
    result
}

fn read_and_detect<R: Read>(reader: &mut R) -> CapResult<Detection> {
    let mut prefix = [0u8; DETECT_PREFIX_LEN];
    let n = read_up_to(reader, &mut prefix[..4])?;
    if n < 4 {
        return detect_prefix(&prefix[..n]);
    }

    let total_len = CaptureHeaderOrder::read_u32(&prefix[0..4]);
    if let Some(d) = match_fixed_length(total_len) {
        return Ok(d);
    }

    let m = read_up_to(reader, &mut prefix[4..])?;
    detect_prefix(&prefix[..4 + m])
}

/// `read` до заполнения буфера или EOF.
fn read_up_to<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> CapResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CapError::Io(e)),
        }
    }
    Ok(filled)
}
