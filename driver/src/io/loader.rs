use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};
use std::fs;
use std::path::Path;
use sweepcore::CenterFrequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Tab,
    Whitespace,
}

impl Delimiter {
    fn detect(line: &str) -> Self {
        if line.contains(',') {
            Delimiter::Comma
        } else if line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Whitespace
        }
    }

    fn byte(self) -> Option<u8> {
        match self {
            Delimiter::Comma => Some(b','),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Whitespace => None,
        }
    }
}

fn parse_fields<'a>(fields: impl Iterator<Item = &'a str>) -> Option<Vec<f64>> {
    let values = fields
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| field.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    (!values.is_empty()).then_some(values)
}

fn split_rows(text: &str, delimiter: Delimiter) -> Result<Vec<Option<Vec<f64>>>> {
    match delimiter.byte() {
        Some(byte) => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(byte)
                .comment(Some(b'#'))
                .from_reader(text.as_bytes());
            reader
                .records()
                .enumerate()
                .map(|(row, record)| {
                    let record = record.with_context(|| format!("reading row {}", row + 1))?;
                    Ok(parse_fields(record.iter()))
                })
                .collect()
        }
        None => Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .map(|line| parse_fields(line.split_whitespace()))
            .collect()),
    }
}

/// Parses delimited numeric text: rows are samples, columns are bands.
///
/// Leading rows that are not numeric are treated as headers and skipped.
pub fn parse_matrix(text: &str) -> Result<Array2<f64>> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .context("no data rows")?;
    let rows = split_rows(text, Delimiter::detect(first))?;

    let header_rows = rows.iter().take_while(|row| row.is_none()).count();
    let mut data: Vec<f64> = Vec::new();
    let mut width = None;
    for (index, row) in rows.into_iter().enumerate().skip(header_rows) {
        let values = row.with_context(|| format!("non-numeric data at row {}", index + 1))?;
        match width {
            None => width = Some(values.len()),
            Some(expected) if expected != values.len() => bail!(
                "row {} has {} columns, expected {}",
                index + 1,
                values.len(),
                expected
            ),
            Some(_) => {}
        }
        data.extend(values);
    }

    let width = width.context("no numeric rows")?;
    if header_rows > 0 {
        log::debug!("skipped {} header rows", header_rows);
    }
    Array2::from_shape_vec((data.len() / width, width), data).context("shaping data matrix")
}

pub fn load_matrix(path: &Path) -> Result<Array2<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("{} does not exist or cannot be read", path.display()))?;
    parse_matrix(&text).with_context(|| format!("{} format is not supported", path.display()))
}

/// Loads a single row or single column as a vector.
pub fn load_vector(path: &Path) -> Result<Array1<f64>> {
    let matrix = load_matrix(path)?;
    if matrix.nrows() != 1 && matrix.ncols() != 1 {
        bail!(
            "{} holds a {}x{} table, expected one row or column",
            path.display(),
            matrix.nrows(),
            matrix.ncols()
        );
    }
    Ok(Array1::from_iter(matrix.iter().copied()))
}

/// A number is a single center; anything else names a file of band centers.
pub fn parse_center(value: &str) -> Result<CenterFrequency> {
    if let Ok(center) = value.trim().parse::<f64>() {
        return Ok(CenterFrequency::Single(center));
    }
    let centers = load_vector(Path::new(value))
        .with_context(|| format!("loading center frequencies from {}", value))?;
    Ok(CenterFrequency::Bands(centers.to_vec()))
}
