use pathograph::jaccard::read_presence_absence;
use pathograph::pipeline::{DistanceSource, Pipeline};
use pathograph::{PipelineConfig, SampleSet};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Accessory presence/absence -> Jaccard -> perplexity-calibrated graph -> bundle.
    //
    //   cargo run --example accessory_graph -- gene_presence_absence.tsv out/prefix
    //
    // Without arguments a small synthetic population is used and written to
    // the system temp directory.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let mut args = std::env::args().skip(1);
    let (samples, matrix) = match args.next() {
        Some(path) => {
            let table = read_presence_absence(&PathBuf::from(path))?;
            (SampleSet::new(table.names)?, table.matrix)
        }
        None => synthetic()?,
    };
    let prefix = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("pathograph_demo"));

    let config = PipelineConfig::from_options(None, 5.0, false, true)?;
    let pipeline = Pipeline::new(config)?;
    let output = pipeline.run(&samples, DistanceSource::PresenceAbsence(matrix))?;
    let paths = Pipeline::persist(&output, &samples, &prefix)?;

    println!(
        "n_samples={} n_edges={} total_weight={:.6} embedding_ready={}",
        samples.len(),
        output.edges.len(),
        output.edges.total_weight(),
        output.embedding_ready
    );
    println!("bundle={}", paths.bundle.display());
    println!("names={}", paths.names.display());
    Ok(())
}

/// Two lineages with mostly disjoint accessory genes.
fn synthetic() -> pathograph::Result<(SampleSet, ndarray::Array2<bool>)> {
    let n = 12;
    let m = 40;
    let matrix = ndarray::Array2::from_shape_fn((n, m), |(s, g)| {
        let lineage = s % 2;
        let core_to_lineage = g % 2 == lineage;
        core_to_lineage && (g + s) % 5 != 0
    });
    let names = SampleSet::new((0..n).map(|i| format!("isolate_{i:02}")))?;
    Ok((names, matrix))
}
