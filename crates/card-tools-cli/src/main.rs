mod config;
mod logger;

use anyhow::{Context, Result, bail};
use card_compose::{DeckGenerator, DeckReport, HttpFetcher, RandomStats, RasterCompositor};
use card_impose::{
    InterleaveMode, LopdfMerger, MergeBackend, PrintOptions, QpdfMerger, SeriesReport,
    SheetReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use config::ToolConfig;
use logger::ConsoleLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "cardt", about = "Trading card deck and print sheet tools", version)]
struct Cli {
    /// JSON config file with "cards" and "print" sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate card images from person records
    Cards {
        /// Records file (.csv or .json)
        #[arg(short, long)]
        records: PathBuf,

        /// Output directory for card images
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for reproducible stats
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Lay out card images on print sheets
    Sheets {
        /// Directory of card images (PNG), placed in file name order
        #[arg(long, required_unless_present = "uniform")]
        cards: Option<PathBuf>,

        /// Card back image repeated on the verso sheet
        #[arg(long)]
        verso: Option<PathBuf>,

        /// Build a single recto sheet of this image repeated in every cell,
        /// plus a verso sheet when `--verso` is given
        #[arg(long, conflicts_with = "cards")]
        uniform: Option<PathBuf>,

        /// Output directory for sheet PDFs
        #[arg(short, long)]
        output: PathBuf,

        /// Show statistics only, don't render sheets
        #[arg(long, conflicts_with = "uniform")]
        stats_only: bool,
    },

    /// Merge recto sheets and the verso sheet into series documents
    Series {
        /// Directory containing page_<n>_recto.pdf sheets
        #[arg(long)]
        sheets: PathBuf,

        /// Verso sheet PDF
        #[arg(long)]
        verso: PathBuf,

        /// Output directory for series PDFs
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Cards, sheets and series in one go
    Run {
        /// Records file (.csv or .json)
        #[arg(short, long)]
        records: PathBuf,

        /// Card back image
        #[arg(long)]
        verso: PathBuf,

        /// Output root; cards/, sheets/ and series/ are created inside
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for reproducible stats
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        series: SeriesArgs,
    },
}

/// Overrides for the "print.series" config section
#[derive(clap::Args)]
struct SeriesArgs {
    /// Verso placement
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Maximum pages per series document
    #[arg(long)]
    max_pages: Option<usize>,

    /// Merge backend
    #[arg(long, value_enum)]
    merger: Option<MergerArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Verso after every recto
    Paired,
    /// Verso once at the end of each series
    Appended,
}

#[derive(Clone, Copy, ValueEnum)]
enum MergerArg {
    Lopdf,
    Qpdf,
}

impl From<ModeArg> for InterleaveMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Paired => Self::Paired,
            ModeArg::Appended => Self::Appended,
        }
    }
}

impl From<MergerArg> for MergeBackend {
    fn from(arg: MergerArg) -> Self {
        match arg {
            MergerArg::Lopdf => Self::Lopdf,
            MergerArg::Qpdf => Self::Qpdf,
        }
    }
}

impl SeriesArgs {
    fn apply(&self, options: &mut PrintOptions) {
        if let Some(mode) = self.mode {
            options.series.mode = mode.into();
        }
        if let Some(max_pages) = self.max_pages {
            options.series.max_pages_per_job = max_pages;
        }
        if let Some(merger) = self.merger {
            options.series.merger = merger.into();
        }
    }
}

/// Counts reported at the end of every command
#[derive(Debug, Default)]
struct RunSummary {
    cards_generated: usize,
    records_skipped: usize,
    sheets_produced: usize,
    series_produced: usize,
    series_failed: usize,
}

impl RunSummary {
    fn print(&self) {
        println!("Summary:");
        println!("  Cards generated: {}", self.cards_generated);
        println!("  Records skipped: {}", self.records_skipped);
        println!("  Sheets produced: {}", self.sheets_produced);
        println!("  Series produced: {}", self.series_produced);
        println!("  Series failed: {}", self.series_failed);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ConsoleLogger::new(ConsoleLogger::level_for(cli.verbose, cli.quiet)).init()?;

    let mut config = ToolConfig::load(cli.config.as_deref()).await?;
    let mut summary = RunSummary::default();

    match cli.command {
        Commands::Cards {
            records,
            output,
            seed,
        } => {
            config.cards.validate()?;
            let report = generate_cards(&config, &records, &output, seed).await?;
            summary.cards_generated = report.generated.len();
            summary.records_skipped = report.skipped.len();
        }

        Commands::Sheets {
            cards,
            verso,
            uniform,
            output,
            stats_only,
        } => {
            config.print.validate()?;
            if let Some(image) = uniform {
                let report = render_uniform(&config.print, image, verso, &output).await?;
                summary.sheets_produced = report.rectos.len() + usize::from(report.verso.is_some());
            } else if let Some(dir) = cards {
                let images = list_card_images(&dir)?;
                if stats_only {
                    print_statistics(images.len(), &config.print)?;
                    return Ok(());
                }
                let report = render_sheets(&config.print, images, verso, &output).await?;
                summary.sheets_produced = report.rectos.len() + usize::from(report.verso.is_some());
            }
        }

        Commands::Series {
            sheets,
            verso,
            output,
            series,
        } => {
            series.apply(&mut config.print);
            config.print.series.validate()?;
            let rectos = list_recto_sheets(&sheets)?;
            let report = merge_series(&config.print, &rectos, &verso, &output).await?;
            summary.series_produced = report.produced.len();
            summary.series_failed = report.failed.len();
        }

        Commands::Run {
            records,
            verso,
            output,
            seed,
            series,
        } => {
            series.apply(&mut config.print);
            // Configuration and layout problems abort before any work
            config.validate()?;
            if !verso.is_file() {
                bail!("Verso image not found: {}", verso.display());
            }

            let deck = generate_cards(&config, &records, &output.join("cards"), seed).await?;
            summary.cards_generated = deck.generated.len();
            summary.records_skipped = deck.skipped.len();

            if deck.generated.is_empty() {
                log::warn!("No cards generated, nothing to print");
            } else {
                let sheets = render_sheets(
                    &config.print,
                    deck.generated,
                    Some(verso),
                    &output.join("sheets"),
                )
                .await?;
                summary.sheets_produced = sheets.rectos.len() + usize::from(sheets.verso.is_some());

                let verso_sheet = sheets
                    .verso
                    .context("Verso sheet was not produced")?;
                let report =
                    merge_series(&config.print, &sheets.rectos, &verso_sheet, &output.join("series"))
                        .await?;
                summary.series_produced = report.produced.len();
                summary.series_failed = report.failed.len();
            }
        }
    }

    summary.print();
    if summary.series_failed > 0 {
        bail!("{} series failed", summary.series_failed);
    }
    Ok(())
}

async fn generate_cards(
    config: &ToolConfig,
    records: &Path,
    output: &Path,
    seed: Option<u64>,
) -> Result<DeckReport> {
    let records = card_compose::load_records(records)
        .await
        .with_context(|| format!("Failed to load records from {}", records.display()))?;
    log::info!("Loaded {} records", records.len());

    let options = config.cards.clone();
    let output = output.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(Duration::from_secs(options.fetch_timeout_secs));
        let stats = match seed {
            Some(seed) => RandomStats::seeded(seed),
            None => RandomStats::from_entropy(),
        };
        let mut deck = DeckGenerator::new(&options, fetcher, RasterCompositor::new(), stats);
        deck.generate(&records, &output)
    })
    .await??;
    Ok(report)
}

async fn render_sheets(
    options: &PrintOptions,
    images: Vec<PathBuf>,
    verso: Option<PathBuf>,
    output: &Path,
) -> Result<SheetReport> {
    let sheets = options.sheets.clone();
    let output = output.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        let mut compositor = RasterCompositor::new();
        card_impose::render_sheets(&images, verso.as_deref(), &sheets, &mut compositor, &output)
    })
    .await??;
    Ok(report)
}

async fn render_uniform(
    options: &PrintOptions,
    image: PathBuf,
    verso: Option<PathBuf>,
    output: &Path,
) -> Result<SheetReport> {
    let sheets = options.sheets.clone();
    let output = output.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        let mut compositor = RasterCompositor::new();
        card_impose::render_uniform_sheets(
            &image,
            verso.as_deref(),
            &sheets,
            &mut compositor,
            &output,
        )
    })
    .await??;
    Ok(report)
}

async fn merge_series(
    options: &PrintOptions,
    rectos: &[PathBuf],
    verso: &Path,
    output: &Path,
) -> Result<SeriesReport> {
    let verso_doc = card_impose::load_pdf(verso)
        .await
        .with_context(|| format!("Failed to load verso sheet {}", verso.display()))?;
    if verso_doc.get_pages().len() != 1 {
        log::warn!(
            "Verso sheet {} has {} pages, expected 1",
            verso.display(),
            verso_doc.get_pages().len()
        );
    }

    let jobs = card_impose::assemble_series(rectos, verso, &options.series)?;
    log::info!("Assembling {} recto sheets into {} series", rectos.len(), jobs.len());

    let report = match options.series.merger {
        MergeBackend::Lopdf => card_impose::run_series(jobs, Arc::new(LopdfMerger), output).await?,
        MergeBackend::Qpdf => {
            card_impose::run_series(jobs, Arc::new(QpdfMerger::default()), output).await?
        }
    };
    Ok(report)
}

fn print_statistics(cards: usize, options: &PrintOptions) -> Result<()> {
    let stats = card_impose::calculate_print_statistics(cards, options)?;
    println!("Print Statistics:");
    println!("  Cards: {}", stats.cards);
    println!("  Cards per sheet: {}", stats.capacity);
    println!("  Recto sheets: {}", stats.recto_sheets);
    println!("  Blank cells: {}", stats.blank_cells);
    println!("  Series: {}", stats.series_jobs);
    println!("  Output pages: {}", stats.output_pages);
    Ok(())
}

/// PNG files in `dir`, sorted by file name.
fn list_card_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    images.sort();
    Ok(images)
}

/// `page_<n>_recto.pdf` files in `dir`, in page order.
fn list_recto_sheets(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sheets: Vec<(usize, PathBuf)> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            let page = path
                .file_name()?
                .to_str()?
                .strip_prefix("page_")?
                .strip_suffix("_recto.pdf")?
                .parse()
                .ok()?;
            Some((page, path))
        })
        .collect();
    sheets.sort_by_key(|(page, _)| *page);
    Ok(sheets.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recto_sheets_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "page_10_recto.pdf",
            "page_2_recto.pdf",
            "page_1_recto.pdf",
            "verso_all_page.pdf",
            "page_3_verso.pdf",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let sheets = list_recto_sheets(dir.path()).unwrap();
        let names: Vec<_> = sheets
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["page_1_recto.pdf", "page_2_recto.pdf", "page_10_recto.pdf"]
        );
    }

    #[test]
    fn test_card_images_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["card_b_Q_.png", "card_a_Q_.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let images = list_card_images(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("card_a_Q_.PNG"));
    }

    #[test]
    fn test_series_args_override_config() {
        let mut options = PrintOptions::default();
        SeriesArgs {
            mode: Some(ModeArg::Appended),
            max_pages: Some(10),
            merger: None,
        }
        .apply(&mut options);
        assert_eq!(options.series.mode, InterleaveMode::Appended);
        assert_eq!(options.series.max_pages_per_job, 10);
        assert_eq!(options.series.merger, MergeBackend::Lopdf);
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "cardt", "run", "-r", "people.csv", "--verso", "back.png", "-o", "out", "--mode",
            "appended", "--max-pages", "20",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Run { .. }));
    }

    #[test]
    fn test_cli_uniform_sheets_take_verso() {
        let cli = Cli::try_parse_from([
            "cardt", "sheets", "--uniform", "front.png", "--verso", "back.png", "-o", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Sheets { uniform, verso, .. } => {
                assert_eq!(uniform, Some(PathBuf::from("front.png")));
                assert_eq!(verso, Some(PathBuf::from("back.png")));
            }
            _ => panic!("expected sheets command"),
        }
    }

    #[test]
    fn test_cli_rejects_stats_only_with_uniform() {
        let err = Cli::try_parse_from([
            "cardt", "sheets", "--uniform", "front.png", "-o", "out", "--stats-only",
        ]);
        assert!(err.is_err());

        let ok = Cli::try_parse_from([
            "cardt", "sheets", "--cards", "cards", "-o", "out", "--stats-only",
        ]);
        assert!(ok.is_ok());
    }
}
