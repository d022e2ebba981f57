#[cfg(test)]
mod tests {
    use crate::bundle::load_bundle;
    use crate::config::PipelineConfig;
    use crate::cutoff::DistanceMode;
    use crate::jaccard::JaccardStrategy;
    use crate::pipeline::{DistanceSource, PersistedPaths, Pipeline};
    use crate::samples::{SampleSet, MIN_SAMPLES};
    use crate::similarity::{Calibration, EntropyCalibrator};
    use crate::{Error, Result};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use tempfile::TempDir;

    fn init() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    fn samples(n: usize) -> SampleSet {
        SampleSet::new((0..n).map(|i| format!("sample_{i}"))).unwrap()
    }

    fn ten_distances() -> Vec<f64> {
        vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
    }

    #[test]
    fn cutoff_linear_five_samples() -> Result<()> {
        init();
        let config = PipelineConfig::new()
            .with_distance_mode(DistanceMode::cutoff(0.5)?)
            .with_calibration(Calibration::Linear);
        let out = Pipeline::new(config)?
            .run(&samples(5), DistanceSource::Condensed(ten_distances()))?;

        assert_eq!(out.edges.len(), 10);
        assert_eq!(out.edges.i, vec![0, 0, 0, 0, 1, 1, 2, 3, 4, 2]);
        assert_eq!(out.edges.j, vec![1, 2, 3, 4, 2, 0, 0, 0, 0, 1]);
        let expected = [0.8, 0.6, 0.4, 0.2, 0.0];
        for (k, want) in expected.iter().enumerate() {
            assert_abs_diff_eq!(out.edges.p[k], *want, epsilon = 1e-12);
            assert_abs_diff_eq!(out.edges.p[k + 5], *want, epsilon = 1e-12);
        }
        assert!(out.edges.is_symmetric());
        assert!(!out.embedding_ready);
        assert_eq!(out.weights.as_slice(), &[1.0; 5]);
        Ok(())
    }

    #[test]
    fn entropy_full_graph_has_unit_mass() -> Result<()> {
        let out = Pipeline::new(PipelineConfig::new())?
            .run(&samples(5), DistanceSource::Condensed(ten_distances()))?;
        assert_eq!(out.edges.len(), 20);
        assert_abs_diff_eq!(out.edges.total_weight(), 1.0, epsilon = 1e-9);
        assert!(out.edges.p.iter().all(|p| *p > 0.0));
        Ok(())
    }

    #[test]
    fn entropy_with_cutoff_calibrates_then_filters() -> Result<()> {
        let d = vec![1.0, 10.0, 10.0, 10.0, 10.0, 1.0];
        let config = PipelineConfig::new()
            .with_distance_mode(DistanceMode::cutoff(1.0)?)
            .with_calibration(Calibration::entropy(2.0)?);
        let out = Pipeline::new(config)?.run(&samples(4), DistanceSource::Condensed(d.clone()))?;

        let joint = EntropyCalibrator::new(2.0).joint(&d, 4)?;
        assert_eq!(out.edges.i, vec![0, 2, 1, 3]);
        assert_eq!(out.edges.j, vec![1, 3, 0, 2]);
        assert_abs_diff_eq!(out.edges.p[0], joint.weights[0], epsilon = 1e-15);
        assert_abs_diff_eq!(out.edges.p[1], joint.weights[5], epsilon = 1e-15);
        Ok(())
    }

    #[test]
    fn presence_absence_strategies_give_same_graph() -> Result<()> {
        let matrix = array![
            [true, false, true, false],
            [true, true, false, false],
            [false, false, true, true],
            [true, false, true, false],
            [false, false, false, false],
            [false, true, false, true],
        ];
        let dense = Pipeline::new(PipelineConfig::new().with_jaccard(JaccardStrategy::Dense))?
            .run(&samples(6), DistanceSource::PresenceAbsence(matrix.clone()))?;
        let sparse = Pipeline::new(PipelineConfig::new().with_jaccard(JaccardStrategy::Sparse))?
            .run(&samples(6), DistanceSource::PresenceAbsence(matrix))?;

        assert_eq!(dense.edges.i, sparse.edges.i);
        assert_eq!(dense.edges.j, sparse.edges.j);
        for (a, b) in dense.edges.p.iter().zip(sparse.edges.p.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
        Ok(())
    }

    #[test]
    fn persisted_bundle_reloads_identically() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("run");
        let names = samples(5);
        let pipeline = Pipeline::new(PipelineConfig::new())?;

        let fresh = pipeline.run(&names, DistanceSource::Condensed(ten_distances()))?;
        let paths = Pipeline::persist(&fresh, &names, &prefix)?;
        assert_eq!(paths, PersistedPaths::for_prefix(&prefix));
        assert!(paths.bundle.ends_with("run.bundle"));

        let reloaded = pipeline.run(&names, DistanceSource::Bundle(paths.bundle.clone()))?;
        assert_eq!(reloaded.edges, fresh.edges);
        assert_eq!(load_bundle(&paths.bundle)?, fresh.edges);

        let (names_back, edges_back) = Pipeline::load_persisted(&prefix)?;
        assert_eq!(names_back, names);
        assert_eq!(edges_back, fresh.edges);
        Ok(())
    }

    #[test]
    fn bundle_for_fewer_samples_is_rejected() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("run");
        let pipeline = Pipeline::new(PipelineConfig::new())?;
        let out = pipeline.run(&samples(5), DistanceSource::Condensed(ten_distances()))?;
        let paths = Pipeline::persist(&out, &samples(5), &prefix)?;

        let err = pipeline
            .run(&samples(3), DistanceSource::Bundle(paths.bundle))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        Ok(())
    }

    #[test]
    fn shape_and_size_errors() -> Result<()> {
        let pipeline = Pipeline::new(PipelineConfig::new())?;
        let err = pipeline
            .run(&samples(4), DistanceSource::Condensed(ten_distances()))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let err = pipeline
            .run(&samples(1), DistanceSource::Condensed(vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let err = pipeline
            .run(
                &samples(3),
                DistanceSource::PresenceAbsence(array![[true], [false]]),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let err = pipeline
            .run(&samples(2), DistanceSource::Condensed(vec![-0.5]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let bad = PipelineConfig::new().with_calibration(Calibration::Entropy { perplexity: 0.0 });
        assert!(Pipeline::new(bad).is_err());
        Ok(())
    }

    #[test]
    fn size_errors_say_what_the_distances_describe() -> Result<()> {
        let pipeline = Pipeline::new(PipelineConfig::new())?;
        match pipeline.run(&samples(4), DistanceSource::Condensed(ten_distances())) {
            Err(Error::ShapeMismatch { actual, .. }) => {
                assert!(actual.contains("describe 5 samples"), "{actual}")
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
        match pipeline.run(&samples(4), DistanceSource::Condensed(vec![0.1; 7])) {
            Err(Error::ShapeMismatch { actual, .. }) => {
                assert!(actual.contains("not a triangular"), "{actual}")
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn invalid_distance_names_its_pair() -> Result<()> {
        let mut d = ten_distances();
        d[7] = f64::NAN;
        match Pipeline::new(PipelineConfig::new())?.build_graph(&d, 5) {
            Err(Error::InvalidInput { name, message }) => {
                assert_eq!(name, "distances");
                assert!(message.contains("samples 2 and 3"), "{message}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn enough_samples_are_embedding_ready() -> Result<()> {
        let n = MIN_SAMPLES;
        let distances: Vec<f64> = (0..n * (n - 1) / 2)
            .map(|k| ((k * 37) % 101) as f64 / 100.0)
            .collect();
        let out = Pipeline::new(PipelineConfig::new())?
            .run(&samples(n), DistanceSource::Condensed(distances))?;
        assert!(out.embedding_ready);
        assert_eq!(out.edges.len(), n * (n - 1));
        assert_eq!(out.weights.len(), n);
        assert_abs_diff_eq!(out.edges.total_weight(), 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn weight_table_flows_through() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("weights.tsv");
        std::fs::write(&table, "sample_0\t3\nsample_4\t0.25\n").unwrap();

        let out = Pipeline::new(PipelineConfig::new().with_calibration(Calibration::Linear))?
            .with_weight_table(&table)
            .run(&samples(5), DistanceSource::Condensed(ten_distances()))?;
        assert_eq!(out.weights.as_slice(), &[3.0, 1.0, 1.0, 1.0, 0.25]);
        Ok(())
    }
}
