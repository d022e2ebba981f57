use crate::error::{Error, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A presence/absence table with samples as rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceAbsence {
    /// Sample names, in row order.
    pub names: Vec<String>,
    /// Feature (gene) identifiers, in column order.
    pub features: Vec<String>,
    /// `matrix[(sample, feature)]` is true when the feature is present.
    pub matrix: Array2<bool>,
}

/// Read a tab-separated gene × sample presence/absence table.
///
/// The header row names the samples (its first cell labels the gene column
/// and is ignored). Every following row is a gene id then one cell per
/// sample: `1`/`0` or `true`/`false` in any case. Blank lines are skipped.
/// The result is transposed so rows are samples.
pub fn read_presence_absence(path: &Path) -> Result<PresenceAbsence> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|e| Error::io(path, e))?,
        None => return Err(Error::invalid("accessory", "table is empty")),
    };
    let names: Vec<String> = header
        .trim_end_matches('\r')
        .split('\t')
        .skip(1)
        .map(str::to_owned)
        .collect();
    if names.is_empty() {
        return Err(Error::invalid("accessory", "header names no samples"));
    }

    let mut features = Vec::new();
    let mut cells: Vec<bool> = Vec::new();
    for (lineno, line) in lines.enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let gene = fields.next().unwrap_or_default().to_owned();
        let before = cells.len();
        for field in fields {
            cells.push(parse_cell(field).ok_or_else(|| {
                Error::invalid(
                    "accessory",
                    format!("line {}: '{field}' is not a presence value", lineno + 2),
                )
            })?);
        }
        let found = cells.len() - before;
        if found != names.len() {
            return Err(Error::shape(
                format!("{} sample columns", names.len()),
                format!("{found} on line {} ({gene})", lineno + 2),
            ));
        }
        features.push(gene);
    }

    // Parsed gene-major; transpose to sample-major.
    let by_gene = Array2::from_shape_vec((features.len(), names.len()), cells)
        .map_err(|e| Error::shape("gene x sample table", e.to_string()))?;
    let matrix = by_gene.reversed_axes().as_standard_layout().to_owned();

    log::info!(
        "read presence/absence for {} samples over {} features from {}",
        names.len(),
        features.len(),
        path.display()
    );
    Ok(PresenceAbsence {
        names,
        features,
        matrix,
    })
}

fn parse_cell(field: &str) -> Option<bool> {
    match field.trim() {
        "1" => Some(true),
        "0" => Some(false),
        s if s.eq_ignore_ascii_case("true") => Some(true),
        s if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
