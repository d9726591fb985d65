//! Контейнер файла захвата: заголовок + полезная нагрузка.
//!
//! Чтение: определение версии → заголовок → нагрузка. Запись всегда идёт в
//! версии 4 или 5 (по умолчанию версии ниже 4 повышаются до 5), с
//! пересчётом `total_len` и необязательными подменами полей.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use log::{debug, info, warn};
use rfcap_types::{
    AntennaInfo, CapError, CapResult, CaptureBase, CaptureHeader, CaptureMode, DroneSearchMap,
    FieldMap, FieldValue, FpgaTiming, HeaderV3, HeaderV4, HeaderV5, HeaderVersion,
    IqSample, V5Mode, LEGACY_DRONE_SEARCH_BITMAP,
};

use crate::{
    array_file::{ArrayFile, ArrayFileLoader, ARRAY_FILE_EXTENSION},
    codec::CaptureHeaderExt,
    detect::detect_version,
    layout::{nominal_header_len, CaptureDuration, PAYLOAD_INT_BYTES},
    payload::{deinterleave, interleave, iter_samples, read_payload, write_payload},
};

/// Нагрузка в памяти.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Чередующиеся I/Q целые, как на диске
    Raw(Vec<i16>),
    /// Комплексные отсчёты из `.mat`; при записи округляются до `i16`
    Complex(Vec<IqSample>),
}

/// Подмены полей при сохранении. `None` — взять из исходного заголовка.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Версия записи: только 4 или 5
    pub version: Option<u32>,
    /// Длина захвата, мс; задаёт число целых как `fs_khz * ms * 2`
    pub capture_len_ms: Option<u32>,
    pub center_freq_khz: Option<u32>,
    pub capture_mode: Option<CaptureMode>,
    pub sensor_id: Option<u32>,
    /// Ограничивается сверху частотой дискретизации
    pub capture_bw_khz: Option<u32>,
}

/// Файл захвата в памяти.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFile {
    header: CaptureHeader,
    payload: Payload,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CaptureFile {
    pub fn new(
        header: CaptureHeader,
        raw: Vec<i16>,
    ) -> Self {
        Self {
            header,
            payload: Payload::Raw(raw),
        }
    }

    /// Контейнер из данных внешнего загрузчика `.mat` (заголовок версии 0).
    pub fn from_array_file(file: ArrayFile) -> Self {
        let header = CaptureHeader::V0(file.header());
        Self {
            header,
            payload: Payload::Complex(file.rxdata),
        }
    }

    /// Загружает файл захвата. Для `.mat` нужен [`CaptureFile::load_with`].
    pub fn load<P: AsRef<Path>>(path: P) -> CapResult<Self> {
        let path = path.as_ref();
        if is_array_file(path) {
            return Err(CapError::usage(format!(
                "{} is an array file, a loader is required",
                path.display()
            )));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let capture = Self::read_from(&mut reader)?;

        info!(
            "Loaded {} capture from {} ({} samples)",
            capture.header.version(),
            path.display(),
            capture.num_samples()
        );
        Ok(capture)
    }

    /// Как [`CaptureFile::load`], но `.mat` файлы отдаются загрузчику.
    pub fn load_with<P: AsRef<Path>>(
        path: P,
        loader: &dyn ArrayFileLoader,
    ) -> CapResult<Self> {
        let path = path.as_ref();
        if is_array_file(path) {
            let file = loader.load(path)?;
            debug!("Array file {} loaded through external loader", path.display());
            return Ok(Self::from_array_file(file));
        }
        Self::load(path)
    }

    /// Читает захват из потока, начиная с текущей позиции.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> CapResult<Self> {
        let detection = detect_version(reader)?;

        // header_len версий 4–5 берётся из самого файла
        let available = remaining_len(reader)?;
        if detection.header_len as u64 > available {
            return Err(CapError::header_read(
                detection.header_len,
                available as usize,
            ));
        }

        let mut buf = Vec::with_capacity(detection.header_len);
        reader
            .by_ref()
            .take(detection.header_len as u64)
            .read_to_end(&mut buf)?;
        if buf.len() < detection.header_len {
            return Err(CapError::header_read(detection.header_len, buf.len()));
        }

        let header = CaptureHeader::decode(detection.version, &buf)?;
        let data_len = header.data_len_bytes();

        // Проверка до выделения памяти под нагрузку
        let available = remaining_len(reader)?;
        if data_len > 0 && (data_len as u64) > available {
            return Err(CapError::data_read(format!(
                "payload truncated: header declares {data_len} bytes, {available} available"
            )));
        }

        let raw = read_payload(reader, data_len)?;
        debug!(
            "Payload: {} bytes, {} samples",
            data_len,
            raw.len() / 2
        );

        Ok(Self::new(header, raw))
    }

    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Сырые целые; `None` для данных из `.mat`.
    pub fn raw_data(&self) -> Option<&[i16]> {
        match &self.payload {
            Payload::Raw(raw) => Some(raw),
            Payload::Complex(_) => None,
        }
    }

    /// Комплексные отсчёты (`data[2k] + j·data[2k+1]`).
    pub fn samples(&self) -> Vec<IqSample> {
        match &self.payload {
            Payload::Raw(raw) => deinterleave(raw),
            Payload::Complex(samples) => samples.clone(),
        }
    }

    /// Итератор отсчётов без промежуточного вектора.
    pub fn iter_samples(&self) -> Box<dyn Iterator<Item = IqSample> + '_> {
        match &self.payload {
            Payload::Raw(raw) => Box::new(iter_samples(raw)),
            Payload::Complex(samples) => Box::new(samples.iter().copied()),
        }
    }

    /// Целые для записи на диск.
    fn packed_data(&self) -> Cow<'_, [i16]> {
        match &self.payload {
            Payload::Raw(raw) => Cow::Borrowed(raw.as_slice()),
            Payload::Complex(samples) => Cow::Owned(interleave(samples)),
        }
    }

    fn packed_len(&self) -> usize {
        match &self.payload {
            Payload::Raw(raw) => raw.len(),
            Payload::Complex(samples) => 2 * samples.len(),
        }
    }

    pub fn num_samples(&self) -> usize {
        match &self.payload {
            Payload::Raw(raw) => raw.len() / 2,
            Payload::Complex(samples) => samples.len(),
        }
    }

    /// Длительность захвата, мс. Для версии 0 считается по числу отсчётов.
    pub fn dwell_time_ms(&self) -> CapResult<f64> {
        match self.header {
            CaptureHeader::V0(ref h) => {
                if h.base.fs_khz == 0 {
                    return Err(CapError::invalid_value(
                        "fs_khz is 0, dwell time is undefined",
                    ));
                }
                Ok(self.num_samples() as f64 / h.base.fs_khz as f64)
            }
            _ => self.header.dwell_time_ms(),
        }
    }

    /// Поля заголовка и, если вычислима, длительность захвата.
    pub fn header_map(&self) -> FieldMap {
        let mut map = self.header.to_map();
        match self.dwell_time_ms() {
            Ok(ms) => map.push(("dwell_time_ms", FieldValue::Float(ms))),
            Err(e) => debug!("dwell time omitted: {e}"),
        }
        map
    }

    /// Сохраняет копию захвата. Сам контейнер не меняется.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        opts: &SaveOptions,
    ) -> CapResult<()> {
        let path = path.as_ref();
        // Ошибки параметров до создания файла
        self.output_header(opts)?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = self.write_to(&mut writer, opts)?;
        writer.flush()?;

        info!(
            "Saved {} capture to {} (total_len {})",
            header.version(),
            path.display(),
            header.total_len()
        );
        Ok(())
    }

    /// Пишет заголовок и нагрузку; возвращает записанный заголовок.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        opts: &SaveOptions,
    ) -> CapResult<CaptureHeader> {
        let (header, data_len) = self.output_header(opts)?;

        writer.write_all(&header.encode()?)?;
        write_payload(writer, &self.packed_data(), data_len)?;

        Ok(header)
    }

    /// Заголовок, который будет записан при сохранении, и длина нагрузки в
    /// целых `i16`.
    pub fn output_header(
        &self,
        opts: &SaveOptions,
    ) -> CapResult<(CaptureHeader, usize)> {
        let source = &self.header;

        let version = match opts.version {
            None if source.version() < HeaderVersion::V4 => HeaderVersion::V5,
            None => source.version(),
            Some(4) => HeaderVersion::V4,
            Some(5) => HeaderVersion::V5,
            Some(v) => {
                return Err(CapError::usage(format!(
                    "captures can only be saved as version 4 or 5, got {v}"
                )))
            }
        };

        let src = source.base();
        let data_len = match opts.capture_len_ms {
            Some(ms) => {
                let ints = src.fs_khz as u64 * ms as u64 * 2;
                usize::try_from(ints).map_err(|_| {
                    CapError::invalid_value(format!("capture length {ms} ms is too large"))
                })?
            }
            None => self.packed_len(),
        };

        let bw_khz = match opts.capture_bw_khz {
            Some(bw) if bw < src.fs_khz => bw,
            Some(bw) => {
                warn!("bandwidth {bw} kHz clamped to sample rate {} kHz", src.fs_khz);
                src.fs_khz
            }
            None => src.bw_khz,
        };

        let capture_mode = opts.capture_mode.unwrap_or_else(|| source.capture_mode());
        let header_len = nominal_header_len(version, capture_mode);

        let total_len = (header_len as u64 + (PAYLOAD_INT_BYTES * data_len) as u64)
            .checked_sub(4)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                CapError::invalid_value(format!(
                    "payload of {data_len} integers does not fit the 32-bit total_len"
                ))
            })?;

        let base = CaptureBase {
            total_len,
            sensor_id: opts.sensor_id.unwrap_or(src.sensor_id),
            fc_khz: opts.center_freq_khz.unwrap_or(src.fc_khz),
            bw_khz,
            ..*src
        };
        let fpga: FpgaTiming = source.fpga();
        let antenna = source.antenna();

        let header = match version {
            HeaderVersion::V4 => CaptureHeader::V4(HeaderV4 {
                base,
                header_len: header_len as u32,
                fpga,
                antenna,
                capture_mode,
                drone_search_bitmap: source
                    .drone_search_bitmap()
                    .unwrap_or(LEGACY_DRONE_SEARCH_BITMAP),
            }),
            _ => {
                let (ant_type, angle) = source.ant_type_angle().unwrap_or((0, 0));
                let mode = match capture_mode {
                    CaptureMode::Search => V5Mode::Search,
                    CaptureMode::Track => V5Mode::Track(
                        source
                            .drone_search_map()
                            .cloned()
                            .unwrap_or_else(DroneSearchMap::placeholder),
                    ),
                    CaptureMode::Unknown(v) => V5Mode::Other(v),
                };
                CaptureHeader::V5(HeaderV5 {
                    base,
                    header_len: header_len as u32,
                    fpga,
                    antenna,
                    ant_type,
                    angle,
                    mode,
                })
            }
        };

        Ok((header, data_len))
    }
}

/// Хвост потока после текущей позиции (позиция не меняется).
pub(crate) fn remaining_len<R: Seek>(reader: &mut R) -> CapResult<u64> {
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(end.saturating_sub(pos))
}

fn is_array_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ARRAY_FILE_EXTENSION))
}

////////////////////////////////////////////////////////////////////////////////
// Заголовок для «сырых» захватов
////////////////////////////////////////////////////////////////////////////////

/// Заголовок, который инструмент захвата дописывает к файлу без заголовка.
pub trait RawCaptureHeaderExt: Sized {
    fn for_raw_capture(
        duration: CaptureDuration,
        fc_khz: u32,
        gain_db: u32,
    ) -> CapResult<Self>;
}

impl RawCaptureHeaderExt for HeaderV3 {
    fn for_raw_capture(
        duration: CaptureDuration,
        fc_khz: u32,
        gain_db: u32,
    ) -> CapResult<Self> {
        let total_len = duration
            .expected_total_len(HeaderVersion::V3)
            .ok_or_else(|| {
                CapError::usage(format!(
                    "{} ms captures have no version 3 layout",
                    duration.millis()
                ))
            })?;

        Ok(HeaderV3 {
            base: CaptureBase {
                total_len,
                sensor_id: 1,
                fc_khz,
                fs_khz: 56_000,
                bw_khz: 56_000,
                gain_db,
                start_time_ticks: 0,
                tps: 1,
            },
            antenna: AntennaInfo {
                num_ant: 1,
                ant_seq: 0x7654_3210,
                ant_dwell_time_ms: duration.millis(),
                capture_id: 123_456,
            },
            capture_mode: CaptureMode::Track,
            drone_search_bitmap: LEGACY_DRONE_SEARCH_BITMAP,
        })
    }
}

/// Дописывает заголовок версии 3 перед сырыми I/Q данными.
///
/// Файл короче объявленной нагрузки отвергается; лишний хвост сохраняется.
pub fn attach_header<P: AsRef<Path>, Q: AsRef<Path>>(
    raw_path: P,
    dest: Q,
    header: &HeaderV3,
) -> CapResult<()> {
    let header = CaptureHeader::V3(header.clone());
    let declared = header.data_len_bytes().max(0) as u64;

    let raw = std::fs::read(raw_path.as_ref())?;
    if (raw.len() as u64) < declared {
        return Err(CapError::data_read(format!(
            "raw capture {} has {} bytes, header declares {declared}",
            raw_path.as_ref().display(),
            raw.len()
        )));
    }

    let mut writer = BufWriter::new(File::create(dest.as_ref())?);
    writer.write_all(&header.encode()?)?;
    writer.write_all(&raw)?;
    writer.flush()?;

    info!(
        "Attached v3 header to {} -> {}",
        raw_path.as_ref().display(),
        dest.as_ref().display()
    );
    Ok(())
}
