//! Sample identity and per-sample weights.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Below this many samples the graph is still built and saved, but the
/// embedding step is skipped.
pub const MIN_SAMPLES: usize = 100;

/// Ordered, unique sample names. Position is the sample index used by every
/// distance vector and edge list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    names: Vec<String>,
}

impl SampleSet {
    /// Build a sample set, rejecting duplicate names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::invalid("samples", format!("duplicate sample name '{name}'")));
            }
        }
        Ok(Self { names })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sample names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether there are enough samples to embed.
    pub fn is_embeddable(&self) -> bool {
        self.len() >= MIN_SAMPLES
    }

    /// [`Error::InvalidInput`] unless there are at least [`MIN_SAMPLES`].
    pub fn require_embeddable(&self) -> Result<()> {
        if self.is_embeddable() {
            return Ok(());
        }
        Err(Error::invalid(
            "samples",
            format!(
                "{} samples is below the minimum of {MIN_SAMPLES} for embedding",
                self.len()
            ),
        ))
    }

    /// Write one name per line.
    pub fn write_names(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path).map_err(|e| Error::io(path, e))?);
        for name in &self.names {
            writeln!(writer, "{name}").map_err(|e| Error::io(path, e))?;
        }
        writer.flush().map_err(|e| Error::io(path, e))
    }

    /// Read a names file written by [`SampleSet::write_names`]. Blank lines
    /// are skipped.
    pub fn read_names(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut names = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::io(path, e))?;
            let name = line.trim_end_matches('\r');
            if !name.is_empty() {
                names.push(name.to_owned());
            }
        }
        Self::new(names)
    }
}

/// One weight per sample, passed to the embedding optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWeights(Vec<f64>);

impl SampleWeights {
    /// Weight 1 for every sample.
    pub fn uniform(n: usize) -> Self {
        Self(vec![1.0; n])
    }

    /// Weights from a two-column tab-separated `name<TAB>weight` table.
    ///
    /// Samples missing from the table get weight 1 and names in the table that
    /// are not samples are ignored; both are logged as warnings. A weight that
    /// does not parse, or is negative or non-finite, is an error.
    pub fn from_table(path: &Path, samples: &SampleSet) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut table: HashMap<String, f64> = HashMap::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| Error::io(path, e))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (name, value) = line.split_once('\t').ok_or_else(|| {
                Error::invalid(
                    "weights",
                    format!("line {}: expected name<TAB>weight", lineno + 1),
                )
            })?;
            let weight: f64 = value.trim().parse().map_err(|_| {
                Error::invalid(
                    "weights",
                    format!("line {}: '{}' is not a number", lineno + 1, value.trim()),
                )
            })?;
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(Error::invalid(
                    "weights",
                    format!("line {}: weight {weight} must be finite and >= 0", lineno + 1),
                ));
            }
            let _ = table.insert(name.to_owned(), weight);
        }
        Ok(Self::from_map(&table, samples))
    }

    /// Weights looked up by sample name, defaulting to 1.
    pub fn from_map(table: &HashMap<String, f64>, samples: &SampleSet) -> Self {
        let mut missing = 0usize;
        let weights = samples
            .names()
            .iter()
            .map(|name| match table.get(name) {
                Some(w) => *w,
                None => {
                    missing += 1;
                    1.0
                }
            })
            .collect();

        if missing > 0 {
            log::warn!(
                "{missing} of {} samples have no weight in the table; using weight 1 for them",
                samples.len()
            );
        }
        let unknown = table
            .keys()
            .filter(|name| samples.index_of(name).is_none())
            .count();
        if unknown > 0 {
            log::warn!("ignoring {unknown} weight entries that match no sample");
        }
        Self(weights)
    }

    /// Weights in sample order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no weights.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    #[test]
    fn duplicate_names_rejected() {
        assert!(SampleSet::new(["a", "b", "c"]).is_ok());
        let err = SampleSet::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { name: "samples", .. }));
    }

    #[test]
    fn embeddable_threshold() {
        let small = SampleSet::new((0..5).map(|i| format!("s{i}"))).unwrap();
        assert!(!small.is_embeddable());
        assert!(small.require_embeddable().is_err());
        let big = SampleSet::new((0..MIN_SAMPLES).map(|i| format!("s{i}"))).unwrap();
        assert!(big.require_embeddable().is_ok());
    }

    #[test]
    fn names_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.txt");
        let samples = SampleSet::new(["ERR001", "ERR002", "sample 3"]).unwrap();
        samples.write_names(&path).unwrap();
        assert_eq!(SampleSet::read_names(&path).unwrap(), samples);
    }

    #[test]
    fn weights_fall_back_per_name() {
        init();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.tsv");
        fs::write(&path, "a\t2.5\nc\t0.5\nzzz\t9\n").unwrap();
        let samples = SampleSet::new(["a", "b", "c"]).unwrap();

        let w = SampleWeights::from_table(&path, &samples).unwrap();
        assert_eq!(w.as_slice(), &[2.5, 1.0, 0.5]);
    }

    #[test]
    fn malformed_weight_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.tsv");
        let samples = SampleSet::new(["a"]).unwrap();

        fs::write(&path, "a\theavy\n").unwrap();
        assert!(SampleWeights::from_table(&path, &samples).is_err());
        fs::write(&path, "a\t-1\n").unwrap();
        assert!(SampleWeights::from_table(&path, &samples).is_err());
        fs::write(&path, "a 1\n").unwrap();
        assert!(SampleWeights::from_table(&path, &samples).is_err());
    }

    #[test]
    fn uniform_weights() {
        assert_eq!(SampleWeights::uniform(3).as_slice(), &[1.0, 1.0, 1.0]);
        assert!(SampleWeights::uniform(0).is_empty());
    }
}
