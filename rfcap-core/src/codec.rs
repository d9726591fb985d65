//! Кодек заголовков захвата.
//!
//! Все многобайтовые поля заголовка — big-endian. Версии 1–4 читаются как
//! запись фиксированной ширины. Для версии 5 сначала разбирается общий
//! префикс (104 байта), и только в режиме слежения — хвост с картой поиска:
//! длина карты и всегда ровно 10 записей, независимо от объявленной длины.

use log::warn;
use rfcap_types::{
    AntennaInfo, CapError, CapResult, CaptureBase, CaptureHeader, CaptureMode, DroneSearchMap,
    FieldMap, FieldValue, FpgaTiming, HeaderV1, HeaderV2, HeaderV3, HeaderV4, HeaderV5,
    HeaderVersion, SearchMapEntry, V5Mode, MAX_DRONE_SEARCH_MAP_LEN,
};

use crate::{
    binary::{FieldReader, FieldWriter},
    layout::{
        layout_for, CaptureHeaderOrder, HEADER_V1_LEN, HEADER_V2_LEN, HEADER_V3_LEN, HEADER_V4_LEN,
        HEADER_V5_TRACK_LEN, PAYLOAD_INT_BYTES,
    },
};

type Reader<'a> = FieldReader<'a, CaptureHeaderOrder>;
type Writer = FieldWriter<CaptureHeaderOrder>;

// Имена полей записей карты поиска для дампа, по индексу записи
const DR_TYPE_NAMES: [&str; MAX_DRONE_SEARCH_MAP_LEN] = [
    "dr_type_0", "dr_type_1", "dr_type_2", "dr_type_3", "dr_type_4",
    "dr_type_5", "dr_type_6", "dr_type_7", "dr_type_8", "dr_type_9",
];
const CHAN_LIST_NAMES: [&str; MAX_DRONE_SEARCH_MAP_LEN] = [
    "chan_list_0", "chan_list_1", "chan_list_2", "chan_list_3", "chan_list_4",
    "chan_list_5", "chan_list_6", "chan_list_7", "chan_list_8", "chan_list_9",
];

/// Кодирование/декодирование и производные величины заголовка захвата.
pub trait CaptureHeaderExt: Sized {
    /// Декодирует заголовок версии `version` из буфера длиной не меньше
    /// длины заголовка.
    fn decode(
        version: HeaderVersion,
        buf: &[u8],
    ) -> CapResult<Self>;

    /// Кодирует заголовок в байты (big-endian).
    fn encode(&self) -> CapResult<Vec<u8>>;

    /// Длина заголовка в байтах, включая `total_len`.
    fn header_len(&self) -> usize;

    /// Число байт полезной нагрузки: `total_len − (header_len − 4)`.
    /// Может быть отрицательным у испорченного заголовка.
    fn data_len_bytes(&self) -> i64;

    /// Длительность захвата, мс: число I/Q пар, делённое на `fs_khz`.
    fn dwell_time_ms(&self) -> CapResult<f64>;

    /// Поля конкретной версии в порядке на диске.
    fn to_map(&self) -> FieldMap;
}

impl CaptureHeaderExt for CaptureHeader {
    fn decode(
        version: HeaderVersion,
        buf: &[u8],
    ) -> CapResult<Self> {
        if let Some(layout) = layout_for(version) {
            if buf.len() < layout.len {
                return Err(CapError::header_read(layout.len, buf.len()));
            }
        }

        let mut r = Reader::new(buf);
        match version {
            HeaderVersion::V0 => Err(CapError::usage(
                "version 0 headers are synthetic and have no on-disk layout",
            )),
            HeaderVersion::V1 => Ok(CaptureHeader::V1(HeaderV1 {
                base: read_legacy_base(&mut r)?,
            })),
            HeaderVersion::V2 => {
                let base = read_legacy_base(&mut r)?;
                let antenna = AntennaInfo {
                    num_ant: r.u32()?,
                    ant_seq: r.u32()? as u64,
                    ant_dwell_time_ms: r.u32()?,
                    capture_id: r.u32()?,
                };
                Ok(CaptureHeader::V2(HeaderV2 { base, antenna }))
            }
            HeaderVersion::V3 => {
                let base = read_legacy_base(&mut r)?;
                let antenna = read_antenna(&mut r)?;
                Ok(CaptureHeader::V3(HeaderV3 {
                    base,
                    antenna,
                    capture_mode: CaptureMode::from_u32(r.u32()?),
                    drone_search_bitmap: r.u64()?,
                }))
            }
            HeaderVersion::V4 => {
                let (base, header_len) = read_self_describing_base(&mut r)?;
                if header_len as usize > HEADER_V4_LEN {
                    warn!("v4 header_len {header_len} exceeds nominal {HEADER_V4_LEN}, extra bytes ignored");
                }
                let fpga = read_fpga(&mut r)?;
                let antenna = read_antenna(&mut r)?;
                Ok(CaptureHeader::V4(HeaderV4 {
                    base,
                    header_len,
                    fpga,
                    antenna,
                    capture_mode: CaptureMode::from_u32(r.u32()?),
                    drone_search_bitmap: r.u64()?,
                }))
            }
            HeaderVersion::V5 => {
                let (base, header_len) = read_self_describing_base(&mut r)?;
                let fpga = read_fpga(&mut r)?;
                let antenna = read_antenna(&mut r)?;
                let capture_mode = CaptureMode::from_u32(r.u32()?);
                let ant_type = r.u32()?;
                let angle = r.u32()?;

                let mode = match capture_mode {
                    CaptureMode::Search => V5Mode::Search,
                    CaptureMode::Track => V5Mode::Track(read_search_map(&mut r)?),
                    CaptureMode::Unknown(v) => V5Mode::Other(v),
                };

                Ok(CaptureHeader::V5(HeaderV5 {
                    base,
                    header_len,
                    fpga,
                    antenna,
                    ant_type,
                    angle,
                    mode,
                }))
            }
        }
    }

    fn encode(&self) -> CapResult<Vec<u8>> {
        let mut w = Writer::with_capacity(self.header_len().max(HEADER_V5_TRACK_LEN));

        match self {
            CaptureHeader::V0(_) => {
                return Err(CapError::usage(
                    "version 0 headers are synthetic and cannot be encoded",
                ))
            }
            CaptureHeader::V1(h) => {
                write_legacy_base(&mut w, &h.base);
            }
            CaptureHeader::V2(h) => {
                let ant_seq = u32::try_from(h.antenna.ant_seq).map_err(|_| {
                    CapError::invalid_value(format!(
                        "ant_seq {:#x} does not fit the 32-bit v2 field",
                        h.antenna.ant_seq
                    ))
                })?;
                write_legacy_base(&mut w, &h.base);
                w.u32(h.antenna.num_ant)
                    .u32(ant_seq)
                    .u32(h.antenna.ant_dwell_time_ms)
                    .u32(h.antenna.capture_id);
            }
            CaptureHeader::V3(h) => {
                write_legacy_base(&mut w, &h.base);
                write_antenna(&mut w, &h.antenna);
                w.u32(h.capture_mode.as_u32()).u64(h.drone_search_bitmap);
            }
            CaptureHeader::V4(h) => {
                write_self_describing_base(&mut w, &h.base, h.header_len, HeaderVersion::V4);
                write_fpga(&mut w, &h.fpga);
                write_antenna(&mut w, &h.antenna);
                w.u32(h.capture_mode.as_u32()).u64(h.drone_search_bitmap);
            }
            CaptureHeader::V5(h) => {
                write_self_describing_base(&mut w, &h.base, h.header_len, HeaderVersion::V5);
                write_fpga(&mut w, &h.fpga);
                write_antenna(&mut w, &h.antenna);
                w.u32(h.mode.capture_mode().as_u32())
                    .u32(h.ant_type)
                    .u32(h.angle);

                if let V5Mode::Track(map) = &h.mode {
                    w.u32(map.declared_len);
                    for entry in &map.entries {
                        w.u32(entry.dr_type)
                            .u32(entry.reserved)
                            .u32(entry.chan_list[0]);
                    }
                }
            }
        }

        Ok(w.into_inner())
    }

    fn header_len(&self) -> usize {
        match self {
            CaptureHeader::V0(_) => 0,
            CaptureHeader::V1(_) => HEADER_V1_LEN,
            CaptureHeader::V2(_) => HEADER_V2_LEN,
            CaptureHeader::V3(_) => HEADER_V3_LEN,
            CaptureHeader::V4(h) => h.header_len as usize,
            CaptureHeader::V5(h) => h.header_len as usize,
        }
    }

    fn data_len_bytes(&self) -> i64 {
        self.total_len() as i64 - (self.header_len() as i64 - 4)
    }

    fn dwell_time_ms(&self) -> CapResult<f64> {
        let fs_khz = self.fs_khz();
        if fs_khz == 0 {
            return Err(CapError::invalid_value(
                "fs_khz is 0, dwell time is undefined",
            ));
        }

        let payload_bytes = self.data_len_bytes();
        if payload_bytes < 0 {
            return Err(CapError::invalid_value(format!(
                "total_len {} is shorter than header_len {} − 4",
                self.total_len(),
                self.header_len()
            )));
        }

        let num_ints = payload_bytes / PAYLOAD_INT_BYTES as i64;
        let num_iq_pairs = num_ints / 2;
        Ok(num_iq_pairs as f64 / fs_khz as f64)
    }

    fn to_map(&self) -> FieldMap {
        let mut m: FieldMap = vec![
            ("header_version", self.version().as_u32().into()),
            ("header_len", FieldValue::UInt(self.header_len() as u64)),
        ];
        let base = self.base();

        match self {
            CaptureHeader::V0(_) | CaptureHeader::V1(_) => {
                push_base(&mut m, base);
            }
            CaptureHeader::V2(h) => {
                push_base(&mut m, base);
                push_antenna(&mut m, &h.antenna);
            }
            CaptureHeader::V3(h) => {
                push_base(&mut m, base);
                push_antenna(&mut m, &h.antenna);
                m.push(("capture_mode", h.capture_mode.as_u32().into()));
                m.push(("drone_search_bitmap", h.drone_search_bitmap.into()));
            }
            CaptureHeader::V4(h) => {
                push_base(&mut m, base);
                push_fpga(&mut m, &h.fpga);
                push_antenna(&mut m, &h.antenna);
                m.push(("capture_mode", h.capture_mode.as_u32().into()));
                m.push(("drone_search_bitmap", h.drone_search_bitmap.into()));
            }
            CaptureHeader::V5(h) => {
                push_base(&mut m, base);
                push_fpga(&mut m, &h.fpga);
                push_antenna(&mut m, &h.antenna);
                m.push(("capture_mode", h.mode.capture_mode().as_u32().into()));
                m.push(("ant_type", h.ant_type.into()));
                m.push(("angle", h.angle.into()));
                if let V5Mode::Track(map) = &h.mode {
                    m.push(("drone_search_map_len", map.declared_len.into()));
                    for (i, entry) in map.active_entries().iter().enumerate() {
                        m.push((DR_TYPE_NAMES[i], entry.dr_type.into()));
                        m.push((CHAN_LIST_NAMES[i], entry.chan_list[0].into()));
                    }
                }
            }
        }

        m
    }
}

////////////////////////////////////////////////////////////////////////////////
// Чтение групп полей
////////////////////////////////////////////////////////////////////////////////

/// `total_len, sensor_id, fc, fs, bw, gain, ticks, tps` — версии 1–3.
fn read_legacy_base(r: &mut Reader<'_>) -> CapResult<CaptureBase> {
    Ok(CaptureBase {
        total_len: r.u32()?,
        sensor_id: r.u32()?,
        fc_khz: r.u32()?,
        fs_khz: r.u32()?,
        bw_khz: r.u32()?,
        gain_db: r.u32()?,
        start_time_ticks: r.u64()?,
        tps: r.u64()?,
    })
}

/// Версии 4–5: после `total_len` идут `header_len` и `header_version`.
/// Поле версии уже проверено детектором и здесь пропускается.
fn read_self_describing_base(r: &mut Reader<'_>) -> CapResult<(CaptureBase, u32)> {
    let total_len = r.u32()?;
    let header_len = r.u32()?;
    r.skip(4)?;

    let base = CaptureBase {
        total_len,
        sensor_id: r.u32()?,
        fc_khz: r.u32()?,
        fs_khz: r.u32()?,
        bw_khz: r.u32()?,
        gain_db: r.u32()?,
        start_time_ticks: r.u64()?,
        tps: r.u64()?,
    };
    Ok((base, header_len))
}

fn read_fpga(r: &mut Reader<'_>) -> CapResult<FpgaTiming> {
    Ok(FpgaTiming {
        fpga_pps: r.u64()?,
        fpga_start_time: r.u64()?,
        fpga_tps: r.u32()?,
        pps_flag: r.u32()?,
    })
}

/// Антенные поля версий 3–5 (`ant_seq` — u64).
fn read_antenna(r: &mut Reader<'_>) -> CapResult<AntennaInfo> {
    Ok(AntennaInfo {
        num_ant: r.u32()?,
        ant_seq: r.u64()?,
        ant_dwell_time_ms: r.u32()?,
        capture_id: r.u32()?,
    })
}

fn read_search_map(r: &mut Reader<'_>) -> CapResult<DroneSearchMap> {
    let declared_len = r.u32()?;
    if declared_len as usize > MAX_DRONE_SEARCH_MAP_LEN {
        warn!(
            "drone_search_map_len {declared_len} exceeds capacity {MAX_DRONE_SEARCH_MAP_LEN}"
        );
    }

    let mut entries = [SearchMapEntry::default(); MAX_DRONE_SEARCH_MAP_LEN];
    for entry in entries.iter_mut() {
        *entry = SearchMapEntry {
            dr_type: r.u32()?,
            reserved: r.u32()?,
            chan_list: [r.u32()?],
        };
    }

    Ok(DroneSearchMap {
        declared_len,
        entries,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Запись групп полей
////////////////////////////////////////////////////////////////////////////////

fn write_legacy_base(
    w: &mut Writer,
    b: &CaptureBase,
) {
    w.u32(b.total_len)
        .u32(b.sensor_id)
        .u32(b.fc_khz)
        .u32(b.fs_khz)
        .u32(b.bw_khz)
        .u32(b.gain_db)
        .u64(b.start_time_ticks)
        .u64(b.tps);
}

fn write_self_describing_base(
    w: &mut Writer,
    b: &CaptureBase,
    header_len: u32,
    version: HeaderVersion,
) {
    w.u32(b.total_len)
        .u32(header_len)
        .u32(version.as_u32())
        .u32(b.sensor_id)
        .u32(b.fc_khz)
        .u32(b.fs_khz)
        .u32(b.bw_khz)
        .u32(b.gain_db)
        .u64(b.start_time_ticks)
        .u64(b.tps);
}

fn write_fpga(
    w: &mut Writer,
    f: &FpgaTiming,
) {
    w.u64(f.fpga_pps)
        .u64(f.fpga_start_time)
        .u32(f.fpga_tps)
        .u32(f.pps_flag);
}

fn write_antenna(
    w: &mut Writer,
    a: &AntennaInfo,
) {
    w.u32(a.num_ant)
        .u64(a.ant_seq)
        .u32(a.ant_dwell_time_ms)
        .u32(a.capture_id);
}

////////////////////////////////////////////////////////////////////////////////
// Дамп полей
////////////////////////////////////////////////////////////////////////////////

fn push_base(
    m: &mut FieldMap,
    b: &CaptureBase,
) {
    m.push(("total_len", b.total_len.into()));
    m.push(("sensor_id", b.sensor_id.into()));
    m.push(("fc_khz", b.fc_khz.into()));
    m.push(("fs_khz", b.fs_khz.into()));
    m.push(("bw_khz", b.bw_khz.into()));
    m.push(("gain_db", b.gain_db.into()));
    m.push(("start_time_ticks", b.start_time_ticks.into()));
    m.push(("tps", b.tps.into()));
}

fn push_fpga(
    m: &mut FieldMap,
    f: &FpgaTiming,
) {
    m.push(("fpga_pps", f.fpga_pps.into()));
    m.push(("fpga_start_time", f.fpga_start_time.into()));
    m.push(("fpga_tps", f.fpga_tps.into()));
    m.push(("pps_flag", f.pps_flag.into()));
}

fn push_antenna(
    m: &mut FieldMap,
    a: &AntennaInfo,
) {
    m.push(("num_ant", a.num_ant.into()));
    m.push(("ant_seq", a.ant_seq.into()));
    m.push(("ant_dwell_time_ms", a.ant_dwell_time_ms.into()));
    m.push(("capture_id", a.capture_id.into()));
}
