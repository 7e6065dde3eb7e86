use std::path::PathBuf;

use clap::{Parser, Subcommand};
use refscan::pipeline::services::gallery::{GalleryStore, JsonFileGalleryStore};
use refscan::pipeline::services::orchestration::TracingProgress;
use refscan::{AnomalyOrchestrator, AppError, Configuration, FeatureExtractor, GalleryBuilder};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "refscan", about = "Score images against a gallery of normal references")]
struct Cli {
    /// Configuration file (defaults to ./refscan.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a gallery snapshot from a directory of reference images
    Ingest {
        dir: PathBuf,
        #[arg(long, default_value = "gallery.json")]
        out: PathBuf,
        #[arg(long)]
        category: Option<String>,
    },
    /// Analyze one image and print the JSON report
    Analyze {
        image: PathBuf,
        #[arg(long, default_value = "gallery.json")]
        gallery: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let configuration = Configuration::load(cli.config.as_deref())?;
    init_logging(configuration.max_log_level()?);

    match cli.command {
        Command::Ingest { dir, out, category } => {
            let extractor = FeatureExtractor::new().with_grid_size(configuration.analysis.grid_size);
            let builder = GalleryBuilder::new(extractor).with_workers(configuration.ingest_workers);
            let report = builder.ingest_directory(&dir, category.as_deref()).await?;

            JsonFileGalleryStore::new(&out).save(&report.entries).await?;
            info!(
                "Wrote {} usable references ({} skipped) to {}",
                report.usable(),
                report.skipped,
                out.display()
            );
        }
        Command::Analyze {
            image,
            gallery,
            seed,
        } => {
            let mut analysis = configuration.analysis.clone();
            if let Some(seed) = seed {
                analysis = analysis.with_seed(seed);
            }

            let entries = JsonFileGalleryStore::new(&gallery).load().await?;
            let bytes = tokio::fs::read(&image).await?;

            let orchestrator = AnomalyOrchestrator::new(analysis)?;
            let report = orchestrator.analyze_bytes(&bytes, &entries, &mut TracingProgress)?;
            println!("{}", report.to_json()?);
        }
    }

    Ok(())
}
