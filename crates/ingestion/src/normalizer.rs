//! Logger export normalization.
//!
//! Turns raw logger-export bytes into an ordered sequence of unit-tagged
//! [`Reading`] records. Format heterogeneity lives behind the
//! [`ReadingNormalizer`] trait, one implementation per format; the pipeline
//! never branches on file type inline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wse_core::{Error, PressureUnit, Reading, Result};

/// Header substrings used to locate the timestamp column.
const TIMESTAMP_CANDIDATES: &[&str] = &["date time", "datetime", "timestamp", "time"];

/// Header substrings used to locate the pressure column.
const PRESSURE_CANDIDATES: &[&str] = &["abs pres", "pressure", "kpa", "psi"];

/// Header substrings used to locate the temperature column.
const TEMPERATURE_CANDIDATES: &[&str] = &["temp"];

/// Timestamp layouts seen in HOBOware and plain CSV exports.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Logger export formats recognized by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggerFormat {
    /// HOBOware text export: metadata preamble followed by delimited data.
    Hobo,
    /// Plain delimited text (.csv / .txt).
    Delimited,
    /// Excel workbook. Recognized so callers get a precise error; parsing it
    /// belongs to the report tooling, not this pipeline.
    Excel,
}

impl LoggerFormat {
    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "hobo" => Ok(LoggerFormat::Hobo),
            "csv" | "txt" => Ok(LoggerFormat::Delimited),
            "xls" | "xlsx" => Ok(LoggerFormat::Excel),
            other => Err(Error::unsupported_format(format!(
                "unknown file type: .{other}"
            ))),
        }
    }
}

/// Column mapping and unit declaration for one logger export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerOptions {
    /// Units of the pressure column.
    pub unit: PressureUnit,
    /// Timestamp column header. Auto-detected when `None`.
    pub timestamp_column: Option<String>,
    /// Pressure column header. Auto-detected when `None`.
    pub value_column: Option<String>,
    /// Temperature column header. Auto-detected when `None`; readings simply
    /// carry no temperature if no candidate header matches.
    pub temperature_column: Option<String>,
}

impl NormalizerOptions {
    /// Options with auto-detected columns and the given pressure unit.
    pub fn new(unit: PressureUnit) -> Self {
        Self {
            unit,
            timestamp_column: None,
            value_column: None,
            temperature_column: None,
        }
    }
}

/// Format-specific parser turning export bytes into readings.
pub trait ReadingNormalizer {
    /// Parse an export into readings. `name` identifies the source file in
    /// error messages. A malformed record fails the whole file; no partial
    /// output is produced.
    fn normalize(
        &self,
        name: &str,
        bytes: &[u8],
        options: &NormalizerOptions,
    ) -> Result<Vec<Reading>>;
}

/// Select the parser for a declared format.
pub fn normalizer_for(format: LoggerFormat) -> Result<Box<dyn ReadingNormalizer>> {
    match format {
        LoggerFormat::Hobo => Ok(Box::new(HoboNormalizer)),
        LoggerFormat::Delimited => Ok(Box::new(DelimitedNormalizer)),
        LoggerFormat::Excel => Err(Error::unsupported_format(
            "Excel workbooks are not parsed here; export the logger data as CSV",
        )),
    }
}

/// Parse an export with the parser for its declared format.
pub fn normalize(
    name: &str,
    bytes: &[u8],
    format: LoggerFormat,
    options: &NormalizerOptions,
) -> Result<Vec<Reading>> {
    normalizer_for(format)?.normalize(name, bytes, options)
}

/// Parser for HOBOware text exports.
///
/// HOBO files carry a metadata preamble (plot title, serial numbers) before
/// the header row; the header is located by finding the first line mentioning
/// both "date" and "time", and the delimiter is sniffed from that line.
pub struct HoboNormalizer;

impl ReadingNormalizer for HoboNormalizer {
    fn normalize(
        &self,
        name: &str,
        bytes: &[u8],
        options: &NormalizerOptions,
    ) -> Result<Vec<Reading>> {
        let text = decode(bytes);
        let lines: Vec<&str> = text.lines().collect();
        let header_idx = lines
            .iter()
            .position(|line| {
                let lowered = line.to_ascii_lowercase();
                lowered.contains("date") && lowered.contains("time")
            })
            .unwrap_or(0);
        let table = lines[header_idx..].join("\n");
        let delimiter = sniff_delimiter(lines.get(header_idx).copied().unwrap_or(""));
        parse_table(name, &table, delimiter, options)
    }
}

/// Parser for plain delimited text exports (.csv / .txt).
pub struct DelimitedNormalizer;

impl ReadingNormalizer for DelimitedNormalizer {
    fn normalize(
        &self,
        name: &str,
        bytes: &[u8],
        options: &NormalizerOptions,
    ) -> Result<Vec<Reading>> {
        let text = decode(bytes);
        let delimiter = sniff_delimiter(text.lines().next().unwrap_or(""));
        parse_table(name, &text, delimiter, options)
    }
}

fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    // HOBOware writes a UTF-8 BOM on some exports.
    text.trim_start_matches('\u{feff}').to_string()
}

fn sniff_delimiter(header_line: &str) -> u8 {
    // Comma last: max_by_key keeps the last maximum, so ties fall to comma.
    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|&d| header_line.matches(d as char).count())
        .unwrap_or(b',')
}

fn parse_table(
    name: &str,
    text: &str,
    delimiter: u8,
    options: &NormalizerOptions,
) -> Result<Vec<Reading>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::malformed_record(name, 0, e.to_string()))?
        .clone();

    let timestamp_idx = resolve_column(
        options.timestamp_column.as_deref(),
        &headers,
        TIMESTAMP_CANDIDATES,
    )
    .ok_or_else(|| Error::malformed_record(name, 0, "no timestamp column found"))?;
    let value_idx = resolve_column(options.value_column.as_deref(), &headers, PRESSURE_CANDIDATES)
        .ok_or_else(|| Error::malformed_record(name, 0, "no pressure column found"))?;
    let temperature_idx = resolve_column(
        options.temperature_column.as_deref(),
        &headers,
        TEMPERATURE_CANDIDATES,
    );

    let mut readings = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::malformed_record(name, row, e.to_string()))?;
        if record.iter().all(|field| field.is_empty()) {
            // HOBO exports end with blank padding lines.
            continue;
        }

        let timestamp_text = record.get(timestamp_idx).unwrap_or("");
        let timestamp = parse_timestamp(timestamp_text).ok_or_else(|| {
            Error::malformed_record(name, row, format!("unparseable timestamp: {timestamp_text:?}"))
        })?;

        let value_text = record.get(value_idx).unwrap_or("");
        let value: f64 = value_text.parse().map_err(|_| {
            Error::malformed_record(name, row, format!("unparseable pressure value: {value_text:?}"))
        })?;

        let temperature = match temperature_idx.and_then(|idx| record.get(idx)) {
            None | Some("") => None,
            Some(text) => Some(text.parse().map_err(|_| {
                Error::malformed_record(name, row, format!("unparseable temperature: {text:?}"))
            })?),
        };

        readings.push(Reading {
            timestamp,
            value,
            unit: options.unit,
            temperature,
        });
    }

    debug!(source = name, rows = readings.len(), "normalized logger export");
    Ok(readings)
}

/// Resolve a column either by the operator-supplied header (exact,
/// case-insensitive) or by candidate substring match, preferring earlier
/// candidates.
fn resolve_column(
    explicit: Option<&str>,
    headers: &csv::StringRecord,
    candidates: &[&str],
) -> Option<usize> {
    if let Some(wanted) = explicit {
        return headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(wanted));
    }
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.to_ascii_lowercase().contains(candidate))
    })
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
