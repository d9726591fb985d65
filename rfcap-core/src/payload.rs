//! Полезная нагрузка захвата: little-endian `i16`, чередование I/Q.
//!
//! Отсчёт `k` — это `data[2k] + j·data[2k+1]`. Непарное последнее целое
//! отбрасывается.

use std::io::{ErrorKind, Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};
use log::warn;
use rfcap_types::{CapError, CapResult, IqSample};

use crate::layout::{PayloadOrder, PAYLOAD_INT_BYTES};

/// Значение, которым дополняется нагрузка короче запрошенной длины.
pub const PAYLOAD_PAD_VALUE: i16 = 1;

/// Читает ровно `data_len_bytes` байт нагрузки и декодирует их в `i16`.
///
/// Единственное выделение памяти — итоговый вектор.
pub fn read_payload<R: Read>(
    reader: &mut R,
    data_len_bytes: i64,
) -> CapResult<Vec<i16>> {
    if data_len_bytes < 1 {
        return Err(CapError::data_read(format!(
            "declared payload length {data_len_bytes} is not positive"
        )));
    }
    if data_len_bytes as usize % PAYLOAD_INT_BYTES != 0 {
        return Err(CapError::data_read(format!(
            "payload length {data_len_bytes} is not a whole number of 16-bit integers"
        )));
    }

    let mut data = vec![0i16; data_len_bytes as usize / PAYLOAD_INT_BYTES];
    reader
        .read_i16_into::<PayloadOrder>(&mut data)
        .map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => CapError::data_read(format!(
                "payload truncated: expected {data_len_bytes} bytes"
            )),
            _ => CapError::Io(e),
        })?;

    Ok(data)
}

/// Декодирует байты little-endian `i16`.
pub fn decode_i16_le(bytes: &[u8]) -> CapResult<Vec<i16>> {
    if bytes.len() % PAYLOAD_INT_BYTES != 0 {
        return Err(CapError::data_read(format!(
            "{} bytes are not a whole number of 16-bit integers",
            bytes.len()
        )));
    }

    let mut data = vec![0i16; bytes.len() / PAYLOAD_INT_BYTES];
    PayloadOrder::read_i16_into(bytes, &mut data);
    Ok(data)
}

/// Итератор комплексных отсчётов поверх сырых целых (без выделения памяти).
pub fn iter_samples(raw: &[i16]) -> impl Iterator<Item = IqSample> + '_ {
    raw.chunks_exact(2)
        .map(|iq| IqSample::new(iq[0] as f32, iq[1] as f32))
}

/// Разворачивает чередующиеся I/Q в комплексные отсчёты.
pub fn deinterleave(raw: &[i16]) -> Vec<IqSample> {
    if raw.len() % 2 != 0 {
        warn!(
            "odd payload length {}: trailing integer dropped",
            raw.len()
        );
    }
    iter_samples(raw).collect()
}

/// Обратное преобразование: комплексные отсчёты в чередующиеся `i16`
/// (округление и насыщение).
pub fn interleave(samples: &[IqSample]) -> Vec<i16> {
    let to_i16 = |v: f32| v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;

    samples
        .iter()
        .flat_map(|s| [to_i16(s.re), to_i16(s.im)])
        .collect()
}

/// Пишет `target_len` целых little-endian: усечение либо дополнение
/// значением [`PAYLOAD_PAD_VALUE`].
pub fn write_payload<W: Write>(
    writer: &mut W,
    raw: &[i16],
    target_len: usize,
) -> CapResult<()> {
    let keep = target_len.min(raw.len());

    for &v in &raw[..keep] {
        writer.write_i16::<PayloadOrder>(v)?;
    }

    if target_len > raw.len() {
        warn!(
            "payload padded with {} samples of value {PAYLOAD_PAD_VALUE}",
            target_len - raw.len()
        );
        for _ in raw.len()..target_len {
            writer.write_i16::<PayloadOrder>(PAYLOAD_PAD_VALUE)?;
        }
    }

    Ok(())
}

/// Кодирует нагрузку в байты (см. [`write_payload`]).
pub fn encode_i16_le(
    raw: &[i16],
    target_len: usize,
) -> CapResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(target_len * PAYLOAD_INT_BYTES);
    write_payload(&mut buf, raw, target_len)?;
    Ok(buf)
}
