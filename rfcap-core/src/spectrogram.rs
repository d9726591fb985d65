//! Файл спектрограммы: 88-байтовый заголовок и `tbins × fbins` значений
//! `f32`, всё в порядке little-endian.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, Write},
    path::Path,
};

use byteorder::{ByteOrder, ReadBytesExt};
use log::{debug, info};
use rfcap_types::{CapError, CapResult, FieldMap, SpectrogramHeader};

use crate::{
    binary::{FieldReader, FieldWriter},
    capture::remaining_len,
    layout::{SpectrogramOrder, SPECTROGRAM_LAYOUT},
};

type Reader<'a> = FieldReader<'a, SpectrogramOrder>;
type Writer = FieldWriter<SpectrogramOrder>;

/// Кодек заголовка спектрограммы.
pub trait SpectrogramHeaderExt: Sized {
    fn decode(buf: &[u8]) -> CapResult<Self>;

    fn encode(&self) -> Vec<u8>;

    fn to_map(&self) -> FieldMap;
}

impl SpectrogramHeaderExt for SpectrogramHeader {
    fn decode(buf: &[u8]) -> CapResult<Self> {
        if buf.len() < SPECTROGRAM_LAYOUT.len {
            return Err(CapError::header_read(SPECTROGRAM_LAYOUT.len, buf.len()));
        }

        let mut r = Reader::new(buf);
        // Версия и резерв не проверяются
        r.skip(4)?;

        let header = SpectrogramHeader {
            sensor_id: r.u32()?,
            capture_id: r.u32()?,
            capture_mode: r.u32()?,
            start_time_ticks: r.u64()?,
            tps: r.u64()?,
            fc_khz: r.u32()?,
            fs_khz: r.u32()?,
            bw_khz: r.u32()?,
            gain_db: r.u32()?,
            nfft: r.u32()?,
            window_len: r.u32()?,
            overlap_len: r.u32()?,
            margin: r.u32()?,
            tbin_width_ms: r.f32()?,
            fbin_width_khz: r.f32()?,
            tbins: r.u32()?,
            fbins: r.u32()?,
            margin_removed: r.u8()? != 0,
            flattened: r.u8()? != 0,
            denoised: r.u8()? != 0,
            normalised: r.u8()? != 0,
            window_type: r.u8()?,
        };
        r.skip(3)?;

        Ok(header)
    }

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(SPECTROGRAM_LAYOUT.len);

        w.u8(SpectrogramHeader::VERSION)
            .zeros(3)
            .u32(self.sensor_id)
            .u32(self.capture_id)
            .u32(self.capture_mode)
            .u64(self.start_time_ticks)
            .u64(self.tps)
            .u32(self.fc_khz)
            .u32(self.fs_khz)
            .u32(self.bw_khz)
            .u32(self.gain_db)
            .u32(self.nfft)
            .u32(self.window_len)
            .u32(self.overlap_len)
            .u32(self.margin)
            .f32(self.tbin_width_ms)
            .f32(self.fbin_width_khz)
            .u32(self.tbins)
            .u32(self.fbins)
            .u8(self.margin_removed as u8)
            .u8(self.flattened as u8)
            .u8(self.denoised as u8)
            .u8(self.normalised as u8)
            .u8(self.window_type)
            .zeros(3);

        w.into_inner()
    }

    fn to_map(&self) -> FieldMap {
        vec![
            ("header_version", SpectrogramHeader::VERSION.into()),
            ("sensor_id", self.sensor_id.into()),
            ("capture_id", self.capture_id.into()),
            ("capture_mode", self.capture_mode.into()),
            ("start_time_ticks", self.start_time_ticks.into()),
            ("tps", self.tps.into()),
            ("fc_khz", self.fc_khz.into()),
            ("fs_khz", self.fs_khz.into()),
            ("bw_khz", self.bw_khz.into()),
            ("gain_db", self.gain_db.into()),
            ("nfft", self.nfft.into()),
            ("window_len", self.window_len.into()),
            ("overlap_len", self.overlap_len.into()),
            ("margin", self.margin.into()),
            ("tbin_width_ms", self.tbin_width_ms.into()),
            ("fbin_width_khz", self.fbin_width_khz.into()),
            ("tbins", self.tbins.into()),
            ("fbins", self.fbins.into()),
            ("margin_removed", self.margin_removed.into()),
            ("flattened", self.flattened.into()),
            ("denoised", self.denoised.into()),
            ("normalised", self.normalised.into()),
            ("window_type", self.window_type.into()),
        ]
    }
}

////////////////////////////////////////////////////////////////////////////////
// Матрица частота × время
////////////////////////////////////////////////////////////////////////////////

/// Плотная матрица `f32` в построчном порядке.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(
        &self,
        row: usize,
        col: usize,
    ) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    pub fn row(
        &self,
        row: usize,
    ) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        Some(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

////////////////////////////////////////////////////////////////////////////////
// Контейнер
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramFile {
    header: SpectrogramHeader,
    payload: Vec<f32>,
}

impl SpectrogramFile {
    /// Длина `payload` обязана быть равна `tbins * fbins`.
    pub fn new(
        header: SpectrogramHeader,
        payload: Vec<f32>,
    ) -> CapResult<Self> {
        if payload.len() != header.payload_len() {
            return Err(CapError::usage(format!(
                "payload has {} values, header declares {} x {}",
                payload.len(),
                header.tbins,
                header.fbins
            )));
        }
        Ok(Self { header, payload })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CapResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let file = Self::read_from(&mut reader)?;

        info!(
            "Loaded spectrogram from {} ({} x {})",
            path.display(),
            file.header.tbins,
            file.header.fbins
        );
        Ok(file)
    }

    /// Читает спектрограмму из потока, начиная с текущей позиции.
    ///
    /// Размер матрицы сверяется с длиной потока до выделения памяти.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> CapResult<Self> {
        let mut buf = Vec::with_capacity(SPECTROGRAM_LAYOUT.len);
        reader
            .by_ref()
            .take(SPECTROGRAM_LAYOUT.len as u64)
            .read_to_end(&mut buf)?;
        let header = SpectrogramHeader::decode(&buf)?;

        let declared = (header.tbins as u64)
            .checked_mul(header.fbins as u64)
            .and_then(|n| n.checked_mul(4));
        let available = remaining_len(reader)?;
        if !declared.is_some_and(|bytes| bytes <= available) {
            return Err(CapError::data_read(format!(
                "spectrogram payload truncated: header declares {} x {} values, \
                 {available} bytes available",
                header.tbins, header.fbins
            )));
        }

        let mut payload = vec![0f32; header.payload_len()];
        reader
            .read_f32_into::<SpectrogramOrder>(&mut payload)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => CapError::data_read(format!(
                    "spectrogram payload truncated: expected {} values",
                    header.payload_len()
                )),
                _ => CapError::Io(e),
            })?;

        debug!("Spectrogram payload: {} values", payload.len());
        Ok(Self { header, payload })
    }

    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> CapResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;

        info!("Saved spectrogram to {}", path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
    ) -> CapResult<()> {
        writer.write_all(&self.header.encode())?;

        let mut buf = vec![0u8; self.payload.len() * 4];
        SpectrogramOrder::write_f32_into(&self.payload, &mut buf);
        writer.write_all(&buf)?;
        Ok(())
    }

    pub fn header(&self) -> &SpectrogramHeader {
        &self.header
    }

    pub fn payload(&self) -> &[f32] {
        &self.payload
    }

    /// Матрица `(fbins, tbins)`: транспонирование, циклический сдвиг по
    /// частоте на `margin` и, если `keep_margin == false`, отсечение
    /// `margin` строк с каждого края.
    pub fn get_spectrogram(
        &self,
        keep_margin: bool,
    ) -> CapResult<Matrix> {
        let tbins = self.header.tbins as usize;
        let fbins = self.header.fbins as usize;
        let margin = self.header.margin as usize;

        if !keep_margin && 2 * margin > fbins {
            return Err(CapError::invalid_value(format!(
                "margin {margin} leaves no rows out of {fbins} frequency bins"
            )));
        }
        if fbins == 0 {
            return Ok(Matrix {
                rows: 0,
                cols: tbins,
                data: Vec::new(),
            });
        }

        let (first, last) = if keep_margin {
            (0, fbins)
        } else {
            (margin, fbins - margin)
        };
        let shift = margin % fbins;

        let mut data = Vec::with_capacity((last - first) * tbins);
        for f in first..last {
            // Строка f после сдвига — исходная строка (f − margin) mod fbins
            let src = (f + fbins - shift) % fbins;
            data.extend((0..tbins).map(|t| self.payload[t * fbins + src]));
        }

        Ok(Matrix {
            rows: last - first,
            cols: tbins,
            data,
        })
    }
}
