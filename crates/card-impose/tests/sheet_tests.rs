use card_compose::{CompositionOp, RasterCompositor, RecordingCompositor};
use card_impose::*;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn write_cards(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("card_{i:02}.png"));
            RgbaImage::from_pixel(30, 40, Rgba([i as u8 * 20, 0, 0, 255]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

/// 50 x 50 mm paper at 50 dpi (98 x 98 px) holding 2 x 2 cards of 39 px
fn small_sheet() -> SheetOptions {
    SheetOptions {
        paper_size: PaperSize::Custom {
            width_mm: 50.0,
            height_mm: 50.0,
        },
        dpi: 50.0,
        card_width_mm: 20.0,
        card_height_mm: 20.0,
        margin_px: 5,
        rows: 2,
        columns: 2,
        ..Default::default()
    }
}

#[test]
fn test_sheets_follow_card_order() {
    let dir = tempfile::tempdir().unwrap();
    let cards: Vec<PathBuf> = (1..=10).map(|i| PathBuf::from(format!("c{i}.png"))).collect();
    let mut compositor = RecordingCompositor::default();

    let report = render_sheets(
        &cards,
        Some(Path::new("back.png")),
        &SheetOptions::default(),
        &mut compositor,
        dir.path(),
    )
    .unwrap();

    assert_eq!(
        report.rectos,
        vec![
            dir.path().join("page_1_recto.pdf"),
            dir.path().join("page_2_recto.pdf")
        ]
    );
    assert_eq!(report.verso, Some(dir.path().join("verso_all_page.pdf")));
    assert_eq!(compositor.plans.len(), 3);

    let opened: Vec<_> = compositor.plans[1]
        .ops
        .iter()
        .filter_map(|op| match op {
            CompositionOp::Open {
                source: card_compose::ImageSource::File(path),
                ..
            } => Some(path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(opened, vec![PathBuf::from("c10.png")]);

    let verso_cells = compositor.plans[2]
        .ops
        .iter()
        .filter(|op| matches!(op, CompositionOp::Composite { .. }))
        .count();
    assert_eq!(verso_cells, 9);
}

#[test]
fn test_overflow_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sheets");
    let options = SheetOptions {
        margin_px: 400,
        ..Default::default()
    };
    let mut compositor = RecordingCompositor::default();

    let err = render_sheets(
        &[PathBuf::from("c.png")],
        None,
        &options,
        &mut compositor,
        &out,
    )
    .unwrap_err();

    assert!(matches!(err, ImposeError::LayoutOverflow { .. }));
    assert!(compositor.plans.is_empty());
    assert!(!out.exists());
}

#[test]
fn test_uniform_sheets_with_verso() {
    let dir = tempfile::tempdir().unwrap();
    let mut compositor = RecordingCompositor::default();

    let report = render_uniform_sheets(
        Path::new("front.png"),
        Some(Path::new("back.png")),
        &SheetOptions::default(),
        &mut compositor,
        dir.path(),
    )
    .unwrap();

    assert_eq!(report.rectos, vec![dir.path().join("recto_all_page.pdf")]);
    assert_eq!(report.verso, Some(dir.path().join("verso_all_page.pdf")));
    assert_eq!(compositor.plans.len(), 2);
    assert_eq!(
        compositor.plans[1].output(),
        Some(&dir.path().join("verso_all_page.pdf"))
    );
    assert!(compositor.plans[1].ops.contains(&CompositionOp::Open {
        layer: card_compose::Layer::Overlay,
        source: card_compose::ImageSource::File(PathBuf::from("back.png")),
    }));

    let mut front_only = RecordingCompositor::default();
    let report = render_uniform_sheets(
        Path::new("front.png"),
        None,
        &SheetOptions::default(),
        &mut front_only,
        dir.path(),
    )
    .unwrap();
    assert_eq!(report.verso, None);
    assert_eq!(front_only.plans.len(), 1);
}

#[tokio::test]
async fn test_cards_to_series_documents() {
    let dir = tempfile::tempdir().unwrap();
    let cards = write_cards(dir.path(), 5);
    let verso = dir.path().join("back.png");
    RgbaImage::from_pixel(30, 40, Rgba([0, 0, 255, 255]))
        .save(&verso)
        .unwrap();

    let sheets_dir = dir.path().join("sheets");
    let mut compositor = RasterCompositor::new();
    let report = render_sheets(
        &cards,
        Some(verso.as_path()),
        &small_sheet(),
        &mut compositor,
        &sheets_dir,
    )
    .unwrap();
    assert_eq!(report.rectos.len(), 2);

    let verso_sheet = report.verso.unwrap();
    let jobs = assemble_series(&report.rectos, &verso_sheet, &SeriesOptions::default()).unwrap();
    assert_eq!(jobs.len(), 1);

    let out = dir.path().join("series");
    let series = run_series(jobs, Arc::new(LopdfMerger), &out).await.unwrap();
    assert!(series.failed.is_empty());

    let merged = load_pdf(&series.produced[0]).await.unwrap();
    assert_eq!(merged.get_pages().len(), 4);
}
