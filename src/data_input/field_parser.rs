// src/data_input/field_parser.rs

use csv::ReaderBuilder;
use ndarray::{Array1, Array3, Array4};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::component::COMPONENT_COUNT;
use crate::data_input::ts_data::TsData;
use crate::error::{PlotError, Result};

/// Columns every field file must provide, in the order they are stored below.
const TARGET_HEADERS: [&str; 8] = ["iz", "iy", "z", "y", "t", "u", "v", "w"];

/// A parsed field together with the metadata found before the CSV header.
#[derive(Debug)]
pub struct ParsedField {
    pub data: TsData,
    pub title: Option<String>,
    pub metadata: Vec<(String, String)>,
}

/// Parses a long-format wind field CSV file.
///
/// The file may start with `key,value` metadata lines (`dt`, `hub_iz`, `hub_iy`, `title`)
/// followed by a header naming `iz, iy, z, y, t, u, v, w`; every following row holds one
/// grid point at one time step. `uprof` is the time mean of each point and `uturb` the
/// remaining fluctuation.
pub fn parse_field_file(input_file_path: &Path) -> Result<ParsedField> {
    let file = File::open(input_file_path)?;
    parse_field_reader(BufReader::new(file))
}

/// Same as [`parse_field_file`], reading from any buffered source.
pub fn parse_field_reader<R: Read>(reader: R) -> Result<ParsedField> {
    // --- Metadata Extraction ---
    let mut metadata: Vec<(String, String)> = Vec::new();
    let mut csv_lines: Vec<String> = Vec::new();
    let mut found_csv_headers = false;

    for line_result in BufReader::new(reader).lines() {
        let line = line_result?;
        let trimmed_line = line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if !found_csv_headers && is_header_line(trimmed_line) {
            found_csv_headers = true;
            csv_lines.push(line);
            continue;
        }
        if found_csv_headers {
            csv_lines.push(line);
        } else if let Some((key, value)) = trimmed_line.split_once(',') {
            let key = key.trim().trim_matches('"').to_string();
            let value = value.trim().trim_matches('"').to_string();
            if !key.is_empty() {
                metadata.push((key, value));
            }
        }
    }

    if !found_csv_headers {
        return Err(PlotError::Input(format!(
            "could not find a CSV header with columns {}",
            TARGET_HEADERS.join(", ")
        )));
    }
    debug!("Extracted {} metadata entries", metadata.len());

    // --- Header Mapping ---
    let csv_content = csv_lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());
    let header_record = reader.headers()?.clone();
    let header_indices: Vec<Option<usize>> = TARGET_HEADERS
        .iter()
        .map(|&target| header_record.iter().position(|h| h.eq_ignore_ascii_case(target)))
        .collect();
    let missing: Vec<&str> = TARGET_HEADERS
        .iter()
        .zip(&header_indices)
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(PlotError::Input(format!("missing columns: {}", missing.join(", "))));
    }
    let header_indices: Vec<usize> = header_indices.into_iter().flatten().collect();

    // --- Data Reading ---
    // (iz, iy) -> time-ordered samples of (t, u, v, w)
    let mut points: BTreeMap<(usize, usize), Vec<[f64; 4]>> = BTreeMap::new();
    let mut z_coords: BTreeMap<usize, f64> = BTreeMap::new();
    let mut y_coords: BTreeMap<usize, f64> = BTreeMap::new();

    for (row_index, result) in reader.records().enumerate() {
        let record = result?;
        let field = |target_idx: usize| -> Result<f64> {
            let raw = record.get(header_indices[target_idx]).unwrap_or("");
            raw.parse::<f64>().map_err(|_| {
                PlotError::Input(format!(
                    "row {}: invalid '{}' value '{}'",
                    row_index + 1,
                    TARGET_HEADERS[target_idx],
                    raw
                ))
            })
        };
        let iz = parse_grid_index(field(0)?, row_index)?;
        let iy = parse_grid_index(field(1)?, row_index)?;
        z_coords.insert(iz, field(2)?);
        y_coords.insert(iy, field(3)?);
        points
            .entry((iz, iy))
            .or_default()
            .push([field(4)?, field(5)?, field(6)?, field(7)?]);
    }

    let nz = dense_len("iz", &z_coords)?;
    let ny = dense_len("iy", &y_coords)?;
    if points.len() != nz * ny {
        return Err(PlotError::Input(format!(
            "found {} grid points, expected a full {}x{} grid",
            points.len(),
            nz,
            ny
        )));
    }
    let nt = points.values().map(Vec::len).next().unwrap_or(0);
    if let Some(((iz, iy), samples)) = points.iter().find(|(_, samples)| samples.len() != nt) {
        return Err(PlotError::Input(format!(
            "point ({iz}, {iy}) has {} samples, expected {nt}",
            samples.len()
        )));
    }

    // --- Mean / fluctuation split ---
    let mut uturb = Array4::<f64>::zeros((COMPONENT_COUNT, nz, ny, nt));
    let mut uprof = Array3::<f64>::zeros((COMPONENT_COUNT, nz, ny));
    let mut times: Vec<f64> = Vec::new();
    for (&(iz, iy), samples) in points.iter_mut() {
        samples.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap_or(std::cmp::Ordering::Equal));
        if times.is_empty() {
            times = samples.iter().map(|s| s[0]).collect();
        }
        for comp in 0..COMPONENT_COUNT {
            let mean = samples.iter().map(|s| s[comp + 1]).sum::<f64>() / nt as f64;
            uprof[[comp, iz, iy]] = mean;
            for (it, sample) in samples.iter().enumerate() {
                uturb[[comp, iz, iy, it]] = sample[comp + 1] - mean;
            }
        }
    }

    let lookup = |key: &str| metadata.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
    let dt = match lookup("dt") {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| PlotError::Input(format!("invalid dt metadata '{raw}'")))?,
        None => estimate_dt(&times)?,
    };
    let ihub = match (lookup("hub_iz"), lookup("hub_iy")) {
        (Some(iz), Some(iy)) => (
            iz.parse::<usize>()
                .map_err(|_| PlotError::Input(format!("invalid hub_iz metadata '{iz}'")))?,
            iy.parse::<usize>()
                .map_err(|_| PlotError::Input(format!("invalid hub_iy metadata '{iy}'")))?,
        ),
        _ => {
            warn!("No hub index in metadata; using the grid centre.");
            (nz / 2, ny / 2)
        }
    };
    let title = lookup("title").map(str::to_string);

    let z = Array1::from_iter(z_coords.into_values());
    let y = Array1::from_iter(y_coords.into_values());
    let data = TsData::new(uturb, uprof, z, y, dt, ihub)?;
    info!(
        "Loaded {}x{} grid, {} time steps at dt = {} s (hub at {:?})",
        nz, ny, nt, dt, ihub
    );
    Ok(ParsedField {
        data,
        title,
        metadata,
    })
}

fn is_header_line(line: &str) -> bool {
    let columns: Vec<String> = line
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();
    ["iz", "iy", "u"].iter().all(|h| columns.iter().any(|c| c == h))
}

fn parse_grid_index(value: f64, row_index: usize) -> Result<usize> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(PlotError::Input(format!(
            "row {}: grid index {value} is not a non-negative integer",
            row_index + 1
        )));
    }
    Ok(value as usize)
}

/// Ensures the indices are exactly 0..n and returns n.
fn dense_len(name: &str, coords: &BTreeMap<usize, f64>) -> Result<usize> {
    let n = coords.len();
    if n == 0 || coords.keys().copied().ne(0..n) {
        return Err(PlotError::Input(format!("{name} indices must cover 0..{n} without gaps")));
    }
    Ok(n)
}

/// Median positive spacing of the time column.
fn estimate_dt(times: &[f64]) -> Result<f64> {
    let mut steps: Vec<f64> = times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .collect();
    if steps.is_empty() {
        return Err(PlotError::Input(
            "cannot estimate dt: no increasing time values and no dt metadata".into(),
        ));
    }
    steps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(steps[steps.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_csv(with_metadata: bool) -> String {
        let mut text = String::new();
        if with_metadata {
            text.push_str("title,Test field\ndt,0.25\nhub_iz,1\nhub_iy,0\n");
        }
        text.push_str("t, iz, iy, z, y, u, v, w\n");
        for it in 0..4 {
            for iz in 0..2 {
                for iy in 0..2 {
                    let t = it as f64 * 0.25;
                    let u = 10.0 + iz as f64 + if it % 2 == 0 { 1.0 } else { -1.0 };
                    text.push_str(&format!(
                        "{t},{iz},{iy},{},{},{u},{},0.0\n",
                        20.0 * (iz + 1) as f64,
                        -3.0 + 6.0 * iy as f64,
                        0.5 * it as f64
                    ));
                }
            }
        }
        text
    }

    #[test]
    fn test_parse_with_metadata() {
        let parsed = parse_field_reader(field_csv(true).as_bytes()).unwrap();
        let data = &parsed.data;
        assert_eq!(parsed.title.as_deref(), Some("Test field"));
        assert_eq!((data.nz(), data.ny(), data.n_time()), (2, 2, 4));
        assert_eq!(data.ihub, (1, 0));
        assert!((data.dt - 0.25).abs() < 1e-12);
        assert_eq!(data.z.to_vec(), vec![20.0, 40.0]);
        assert_eq!(data.y.to_vec(), vec![-3.0, 3.0]);
        assert!((data.uprof[[0, 1, 0]] - 11.0).abs() < 1e-12);
        assert!((data.uturb[[0, 1, 0, 0]] - 1.0).abs() < 1e-12);
        assert!((data.uturb[[0, 1, 0, 1]] + 1.0).abs() < 1e-12);
        assert!((data.uprof[[1, 0, 0]] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_parse_without_metadata_estimates_dt_and_hub() {
        let parsed = parse_field_reader(field_csv(false).as_bytes()).unwrap();
        assert!((parsed.data.dt - 0.25).abs() < 1e-12);
        assert_eq!(parsed.data.ihub, (1, 1));
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let text = "iz,iy,z,y,t,u,v\n0,0,1,1,0,1,1\n";
        let err = parse_field_reader(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing columns: w"));
    }

    #[test]
    fn test_no_header() {
        assert!(parse_field_reader("dt,0.1\n".as_bytes()).is_err());
    }

    #[test]
    fn test_ragged_points_rejected() {
        let mut text = field_csv(true);
        text.push_str("1.0,0,0,20,-3,10,0,0\n");
        let err = parse_field_reader(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("samples"));
    }

    #[test]
    fn test_bad_value_reports_row() {
        let text = "iz,iy,z,y,t,u,v,w\n0,0,1,1,0,abc,1,1\n";
        let err = parse_field_reader(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }
}
