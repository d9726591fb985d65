//! Реализация подкоманд `rfcap`.

use std::path::Path;

use log::info;
use rfcap_core::{
    attach_header, CaptureFile, RawCaptureHeaderExt, SaveOptions, SpectrogramFile,
    SpectrogramHeaderExt,
};
use rfcap_types::{CaptureHeader, FieldMap, HeaderV3};
use serde_json::{Map, Value};

use crate::{config::parse_duration, CliResult};

/// Краткая сводка по файлу для `info`.
#[derive(Debug, Clone)]
pub struct InfoReport {
    pub fields: FieldMap,
    /// Число комплексных отсчётов; `None` для спектрограмм
    pub num_samples: Option<usize>,
}

impl InfoReport {
    pub fn to_json(&self) -> CliResult<Value> {
        let mut obj = fields_to_json(&self.fields)?;
        if let Some(n) = self.num_samples {
            obj.insert("num_samples".into(), Value::from(n));
        }
        Ok(Value::Object(obj))
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.fields {
            out.push_str(&format!("  {name:<22}: {value}\n"));
        }
        if let Some(n) = self.num_samples {
            out.push_str(&format!("  {:<22}: {n}\n", "num_samples"));
        }
        out
    }
}

pub fn fields_to_json(fields: &FieldMap) -> CliResult<Map<String, Value>> {
    let mut obj = Map::new();
    for (name, value) in fields {
        obj.insert((*name).to_string(), serde_json::to_value(value)?);
    }
    Ok(obj)
}

/// `rfcap info`
pub fn info(
    path: &Path,
    spectrogram: bool,
) -> CliResult<InfoReport> {
    if spectrogram {
        let file = SpectrogramFile::load(path)?;
        return Ok(InfoReport {
            fields: file.header().to_map(),
            num_samples: None,
        });
    }

    let capture = CaptureFile::load(path)?;
    Ok(InfoReport {
        fields: capture.header_map(),
        num_samples: Some(capture.num_samples()),
    })
}

/// `rfcap convert`: загрузка и сохранение с подменами.
pub fn convert(
    input: &Path,
    output: &Path,
    opts: &SaveOptions,
) -> CliResult<CaptureHeader> {
    let capture = CaptureFile::load(input)?;
    let (header, _) = capture.output_header(opts)?;
    capture.save(output, opts)?;

    info!(
        "{} -> {} ({} -> {})",
        input.display(),
        output.display(),
        capture.header().version(),
        header.version()
    );
    Ok(header)
}

/// `rfcap attach-header`
pub fn attach(
    raw: &Path,
    output: &Path,
    duration_ms: u32,
    fc_khz: u32,
    gain_db: u32,
) -> CliResult<HeaderV3> {
    let duration = parse_duration(duration_ms)?;
    let header = HeaderV3::for_raw_capture(duration, fc_khz, gain_db)?;
    attach_header(raw, output, &header)?;
    Ok(header)
}

/// Форма матрицы и средние по частотным строкам.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramSummary {
    pub shape: (usize, usize),
    pub row_means: Vec<f32>,
}

/// `rfcap spectrogram`
pub fn spectrogram(
    path: &Path,
    keep_margin: bool,
) -> CliResult<SpectrogramSummary> {
    let file = SpectrogramFile::load(path)?;
    let matrix = file.get_spectrogram(keep_margin)?;
    let (rows, cols) = matrix.shape();

    let row_means = (0..rows)
        .filter_map(|r| matrix.row(r))
        .map(|row| {
            if cols == 0 {
                0.0
            } else {
                row.iter().sum::<f32>() / cols as f32
            }
        })
        .collect();

    Ok(SpectrogramSummary {
        shape: (rows, cols),
        row_means,
    })
}
