use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::input::{ColumnData, TableError};
use crate::stats::StatsError;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_tmbplot_dist_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Default)]
struct RecordingViewer {
    shown: Vec<RenderedFigure>,
}

impl FigureViewer for RecordingViewer {
    fn show(&mut self, figure: &RenderedFigure) -> Result<(), RenderError> {
        self.shown.push(figure.clone());
        Ok(())
    }
}

fn tmb_table(values: Vec<Option<f64>>) -> Table {
    let ids = (0..values.len()).map(|i| format!("s{i}")).collect();
    let mut t = Table::new("sample", ids).unwrap();
    t.push_column("TMB", ColumnData::Numeric(values)).unwrap();
    t
}

fn hundred_with_gaps() -> Table {
    let mut values: Vec<Option<f64>> = (0..100).map(|i| Some((i % 17) as f64 * 1.3)).collect();
    values.extend([None, None, None]);
    tmb_table(values)
}

#[test]
fn test_auto_title_counts_non_missing() {
    let data = prepare_distribution(&hundred_with_gaps(), &DistributionConfig::default()).unwrap();
    assert_eq!(data.n, 100);
    assert!(data.title.contains("(n=100)"));
    assert_eq!(data.title, "Distribution of TMB (n=100)");
    assert_eq!(data.bins.total(), 100);
    assert_eq!(data.bins.counts.len(), 30);
}

#[test]
fn test_nan_cells_excluded_from_title_count() {
    let t = tmb_table(vec![Some(1.0), Some(f64::NAN), Some(2.0), None]);
    let data = prepare_distribution(&t, &DistributionConfig::default()).unwrap();
    assert_eq!(data.n, 2);
    assert_eq!(data.title, "Distribution of TMB (n=2)");
    assert_eq!(data.bins.total(), 2);
}

#[test]
fn test_explicit_title_and_column() {
    let mut t = hundred_with_gaps();
    t.push_column("MSI", ColumnData::Numeric(vec![Some(1.0); 103]))
        .unwrap();
    let cfg = DistributionConfig {
        column: "MSI".to_string(),
        title: Some("MSI scores".to_string()),
        bins: 5,
        ..DistributionConfig::default()
    };
    let data = prepare_distribution(&t, &cfg).unwrap();
    assert_eq!(data.title, "MSI scores");
    assert_eq!(data.n, 103);
    assert_eq!(data.bins.counts.len(), 5);
}

#[test]
fn test_missing_or_empty_column_propagates() {
    let t = hundred_with_gaps();
    let cfg = DistributionConfig {
        column: "MSI".to_string(),
        ..DistributionConfig::default()
    };
    assert!(matches!(
        prepare_distribution(&t, &cfg),
        Err(RenderError::Table(TableError::MissingColumn(_)))
    ));

    let empty = tmb_table(vec![None, None]);
    assert!(matches!(
        prepare_distribution(&empty, &DistributionConfig::default()),
        Err(RenderError::Stats(StatsError::NoFiniteValues))
    ));
}

#[test]
fn test_save_writes_tiff_and_png_and_shows_titled() {
    let dir = make_temp_dir();
    let save = dir.join("tmb_hist");
    let cfg = DistributionConfig {
        save_path: Some(save.clone()),
        ..DistributionConfig::default()
    };
    let mut viewer = RecordingViewer::default();
    let outcome =
        plot_distribution(&hundred_with_gaps(), &cfg, &FigureStyle::default(), &mut viewer)
            .unwrap();

    let saved = outcome.saved.unwrap();
    assert_eq!(saved.tiff, dir.join("tmb_hist.tiff"));
    assert_eq!(saved.png, dir.join("tmb_hist.png"));
    assert!(saved.tiff.exists());
    assert!(saved.png.exists());

    assert_eq!(viewer.shown.len(), 1);
    let shown = &viewer.shown[0];
    let decoder = png::Decoder::new(File::open(&saved.png).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).unwrap();
    assert_eq!((frame.width, frame.height), (shown.width, shown.height));
    assert_eq!(&buf[..frame.buffer_size()], shown.pixels.as_slice());

    let mut tiff = tiff::decoder::Decoder::new(File::open(&saved.tiff).unwrap()).unwrap();
    let (tw, th) = tiff.dimensions().unwrap();
    assert!(tw <= shown.width);
    assert!(th < shown.height, "title-free export should be cropped above the axes");
}

#[test]
fn test_unsaved_plot_still_shown() {
    let mut viewer = RecordingViewer::default();
    let outcome = plot_distribution(
        &hundred_with_gaps(),
        &DistributionConfig::default(),
        &FigureStyle::default(),
        &mut viewer,
    )
    .unwrap();
    assert!(outcome.saved.is_none());
    assert_eq!(viewer.shown.len(), 1);
    assert!(viewer.shown[0].width > 0);
}
