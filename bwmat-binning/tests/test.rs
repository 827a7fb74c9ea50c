use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bigtools::beddata::BedParserStreamingIterator;
use bigtools::{BedEntry, BigBedWrite, BigWigWrite, Value};
use rstest::*;

use bwmat_core::ChromSizes;

#[fixture]
fn path_to_chrom_sizes() -> &'static str {
    "tests/data/test.chrom.sizes"
}

#[fixture]
fn path_to_restrict_bed() -> &'static str {
    "tests/data/restrict.bed"
}

type Record = (&'static str, u32, u32, f32);

fn signal_records() -> Vec<Record> {
    vec![
        ("chr1", 0, 40, 1.0),
        ("chr1", 40, 60, 3.0),
        ("chr1", 80, 100, 2.0),
        ("chr2", 0, 45, 5.0),
    ]
}

fn input_records() -> Vec<Record> {
    vec![("chr1", 0, 100, 0.5), ("chr3", 0, 30, 1.0)]
}

fn chrom_size_map(chrom_sizes: &ChromSizes) -> HashMap<String, u32> {
    chrom_sizes
        .iter()
        .map(|(chrom, &len)| (chrom.clone(), len))
        .collect()
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()?)
}

fn write_bigwig(path: &Path, chrom_sizes: &ChromSizes, records: Vec<Record>) -> anyhow::Result<()> {
    let out = BigWigWrite::create_file(path, chrom_size_map(chrom_sizes))
        .map_err(|e| anyhow::anyhow!("Failed to create bigWig: {:?}", e))?;

    let values = records.into_iter().map(|(chrom, start, end, value)| {
        Ok::<_, std::io::Error>((chrom.to_string(), Value { start, end, value }))
    });
    let data = BedParserStreamingIterator::wrap_iter(values, true);

    out.write(data, runtime()?)
        .map_err(|e| anyhow::anyhow!("Failed to write bigWig: {:?}", e))?;
    Ok(())
}

fn write_bigbed(
    path: &Path,
    chrom_sizes: &ChromSizes,
    intervals: Vec<(&'static str, u32, u32)>,
) -> anyhow::Result<()> {
    let out = BigBedWrite::create_file(path, chrom_size_map(chrom_sizes))
        .map_err(|e| anyhow::anyhow!("Failed to create bigBed: {:?}", e))?;

    let entries = intervals.into_iter().map(|(chrom, start, end)| {
        Ok::<_, std::io::Error>((
            chrom.to_string(),
            BedEntry {
                start,
                end,
                rest: String::new(),
            },
        ))
    });
    let data = BedParserStreamingIterator::wrap_iter(entries, true);

    out.write(data, runtime()?)
        .map_err(|e| anyhow::anyhow!("Failed to write bigBed: {:?}", e))?;
    Ok(())
}

/// Writes `signal.bw` and `input.bw` into `dir`, in that column order.
fn write_tracks(dir: &Path, chrom_sizes: &ChromSizes) -> anyhow::Result<Vec<PathBuf>> {
    let signal = dir.join("signal.bw");
    let input = dir.join("input.bw");
    write_bigwig(&signal, chrom_sizes, signal_records())?;
    write_bigwig(&input, chrom_sizes, input_records())?;
    Ok(vec![signal, input])
}

/// Compares floats treating NaN as equal to NaN.
fn assert_same(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a.is_nan() && e.is_nan()) || a == e,
            "{:?} vs {:?}",
            actual,
            expected
        );
    }
}

mod tests {
    use super::*;

    use bwmat_binning::{
        BigWigTrack, BinningEngine, BinningError, CoordinateSpec, MatrixOrientation, TrackReader,
        open_tracks, write_result_store,
    };
    use bwmat_core::Interval;
    use ndarray::Array2;
    use ndarray_npy::read_npy;
    use pretty_assertions::assert_eq;

    const NAN: f64 = f64::NAN;

    #[rstest]
    fn test_bigwig_fetch_marks_missing_positions(path_to_chrom_sizes: &str) {
        let chrom_sizes = ChromSizes::try_from(path_to_chrom_sizes).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        let paths = write_tracks(tempdir.path(), &chrom_sizes).unwrap();

        let track = BigWigTrack::open(&paths[0]).unwrap();
        assert_eq!(track.name(), "signal");

        let debug = format!("{:?}", track);
        assert!(debug.starts_with("BigWigTrack {"));
        assert!(debug.contains("name: \"signal\""));
        assert!(debug.contains("signal.bw"));

        let values = track.fetch("chr1", Interval::new(55, 85)).unwrap();
        assert_eq!(values.len(), 30);
        assert_eq!(values[0], Some(3.0));
        assert_eq!(values[5], None);
        assert_eq!(values[24], None);
        assert_eq!(values[25], Some(2.0));

        // no records on chr3
        assert_eq!(
            track.fetch("chr3", Interval::new(0, 30)).unwrap(),
            vec![None; 30]
        );
        // not in the file at all
        assert_eq!(
            track.fetch("chrX", Interval::new(0, 4)).unwrap(),
            vec![None; 4]
        );
    }

    #[rstest]
    fn test_open_missing_track_fails() {
        let err = open_tracks(&["tests/data/does_not_exist.bw"]).unwrap_err();
        assert!(matches!(err, BinningError::TrackOpen { .. }));
    }

    #[rstest]
    fn test_full_genome_pipeline(path_to_chrom_sizes: &str) {
        let chrom_sizes = ChromSizes::try_from(path_to_chrom_sizes).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        let paths = write_tracks(tempdir.path(), &chrom_sizes).unwrap();
        let out_dir = tempdir.path().join("out");

        let tracks = open_tracks(&paths).unwrap();
        let engine = BinningEngine::new(tracks, CoordinateSpec::full_chromosomes(&chrom_sizes), 10)
            .unwrap();
        let store = engine.bin_all().unwrap();
        write_result_store(&store, &out_dir, MatrixOrientation::BinsByTracks).unwrap();

        let chr1: Array2<f64> = read_npy(out_dir.join("chr1.npy")).unwrap();
        assert_eq!(chr1.dim(), (10, 2));
        assert_same(
            &chr1.column(0).to_vec(),
            &[1.0, 1.0, 1.0, 1.0, 3.0, 3.0, NAN, NAN, 2.0, 2.0],
        );
        assert_same(&chr1.column(1).to_vec(), &[0.5; 10]);

        // the last bin of chr2 is only partly covered
        let chr2: Array2<f64> = read_npy(out_dir.join("chr2.npy")).unwrap();
        assert_same(&chr2.column(0).to_vec(), &[5.0, 5.0, 5.0, 5.0, NAN]);
        assert_same(&chr2.column(1).to_vec(), &[NAN; 5]);

        let chr3: Array2<f64> = read_npy(out_dir.join("chr3.npy")).unwrap();
        assert_same(&chr3.column(0).to_vec(), &[NAN; 3]);
        assert_same(&chr3.column(1).to_vec(), &[1.0; 3]);

        let manifest = std::fs::read_to_string(out_dir.join("tracks.csv")).unwrap();
        assert_eq!(manifest, "column,name\n0,signal\n1,input\n");
    }

    #[rstest]
    fn test_chunked_reads_match_whole_reads(path_to_chrom_sizes: &str, path_to_restrict_bed: &str) {
        let chrom_sizes = ChromSizes::try_from(path_to_chrom_sizes).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        let paths = write_tracks(tempdir.path(), &chrom_sizes).unwrap();

        for coords in [
            CoordinateSpec::full_chromosomes(&chrom_sizes),
            CoordinateSpec::from_path(path_to_restrict_bed, &chrom_sizes).unwrap(),
        ] {
            let whole = BinningEngine::new(open_tracks(&paths).unwrap(), coords.clone(), 10)
                .unwrap()
                .bin_all()
                .unwrap();
            // 30bp chunks split chr1 into several reads per track
            let chunked = BinningEngine::new(open_tracks(&paths).unwrap(), coords, 10)
                .unwrap()
                .with_chunk_size(30)
                .bin_all()
                .unwrap();

            for chrom in whole.chroms() {
                assert_eq!(
                    chunked.get(chrom).unwrap().values(),
                    whole.get(chrom).unwrap().values()
                );
            }
        }
    }

    #[rstest]
    fn test_bed_restriction_pipeline(path_to_chrom_sizes: &str, path_to_restrict_bed: &str) {
        let chrom_sizes = ChromSizes::try_from(path_to_chrom_sizes).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        let paths = write_tracks(tempdir.path(), &chrom_sizes).unwrap();
        let out_dir = tempdir.path().join("out");

        let coords = CoordinateSpec::from_path(path_to_restrict_bed, &chrom_sizes).unwrap();
        let store = BinningEngine::new(open_tracks(&paths).unwrap(), coords, 10)
            .unwrap()
            .bin_all()
            .unwrap();
        write_result_store(&store, &out_dir, MatrixOrientation::TracksByBins).unwrap();

        // [5, 40) keeps grid bins 1..4, [80, 100) adds two more
        let chr1: Array2<f64> = read_npy(out_dir.join("chr1.npy")).unwrap();
        assert_eq!(chr1.dim(), (2, 5));
        assert_same(&chr1.row(0).to_vec(), &[1.0, 1.0, 1.0, 2.0, 2.0]);
        assert_same(&chr1.row(1).to_vec(), &[0.5; 5]);

        assert!(!out_dir.join("chr2.npy").exists());
        assert!(out_dir.join("chr3.npy").exists());

        let content = std::fs::read_to_string(out_dir.join("bins.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["orientation"], "tracks-by-bins");
        assert!(json["chromosomes"].get("chr2").is_none());
        assert_eq!(json["chromosomes"]["chr1"]["num_bins"], 5);
        assert_eq!(json["chromosomes"]["chr1"]["intervals"][1]["first_bin"], 3);
    }

    #[rstest]
    fn test_bigbed_restriction(path_to_chrom_sizes: &str) {
        let chrom_sizes = ChromSizes::try_from(path_to_chrom_sizes).unwrap();
        let tempdir = tempfile::tempdir().unwrap();
        let bigbed = tempdir.path().join("restrict.bb");
        write_bigbed(
            &bigbed,
            &chrom_sizes,
            vec![("chr1", 0, 20), ("chr1", 50, 70), ("chr2", 10, 50)],
        )
        .unwrap();

        let coords = CoordinateSpec::from_path(&bigbed, &chrom_sizes).unwrap();

        assert_eq!(coords.chroms().collect::<Vec<_>>(), vec!["chr1", "chr2"]);
        assert_eq!(
            coords.get("chr1").unwrap(),
            &[Interval::new(0, 20), Interval::new(50, 70)]
        );
        assert_eq!(coords.layout("chr2", 10).unwrap().total_bins(), 4);
        assert!(!coords.contains("chr3"));
    }
}
