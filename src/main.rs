use clap::{Parser, Subcommand};
use pncp_scraper::config::Config;
use pncp_scraper::logging;
use pncp_scraper::pipeline::ingestion::PncpFeed;
use pncp_scraper::pipeline::processing::classify::{fold_text, Classifier};
use pncp_scraper::pipeline::storage::FlatFileRepository;
use pncp_scraper::pipeline::{Pipeline, RunOptions, RunReport, RunStage};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "pncp_scraper")]
#[command(about = "PNCP procurement notice scraper and classifier")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file (defaults to config.toml or $PNCP_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new notices, merge them into the table and save it
    Run {
        /// Keep every row and mark duplicates instead of replacing them
        #[arg(long)]
        audit: bool,
        /// Output table path
        #[arg(long)]
        output: Option<String>,
        /// First publication date (YYYYMMDD)
        #[arg(long)]
        start_date: Option<String>,
        /// Last publication date (YYYYMMDD), defaults to today
        #[arg(long)]
        end_date: Option<String>,
        /// State (UF) to query
        #[arg(long)]
        uf: Option<String>,
    },
    /// Classify a description without fetching anything
    Classify {
        /// Description text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn print_report(report: &RunReport, output: &str) {
    println!("\n📊 Run results:");
    for modality in &report.modalities {
        println!(
            "   {}: {} notices in {} pages ({:?})",
            modality.label, modality.notices, modality.pages, modality.stop
        );
    }
    println!("   New records: {}", report.new_records);
    if report.stage == RunStage::NoNewData {
        println!("💤 No new data; {} left untouched", output);
        return;
    }
    println!("   Previous rows: {}", report.prior_rows);
    println!("   Superseded: {}", report.superseded);
    println!("   Persisted rows: {}", report.persisted_rows);
    if report.repeated > 0 || report.mode == pncp_scraper::pipeline::processing::MergeMode::Audit {
        println!("   Rows marked REPEATED: {}", report.repeated);
    }
    if report.prior_recovered {
        println!("⚠️  The previous table was corrupt and could not be merged");
    }
    println!("💾 Output file: {}", output);
}

fn apply_overrides(
    config: &mut Config,
    audit: bool,
    output: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    uf: Option<String>,
) -> pncp_scraper::error::Result<()> {
    if audit {
        config.store.audit = true;
    }
    if let Some(path) = output {
        config.store.path = path;
    }
    if let Some(start) = start_date {
        config.feed.start_date = start;
    }
    if end_date.is_some() {
        config.feed.end_date = end_date;
    }
    if let Some(uf) = uf {
        config.feed.uf = uf.trim().to_uppercase();
    }
    config.validate()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    let _guard = logging::init_logging(&config.log_dir);

    match cli.command {
        Commands::Run {
            audit,
            output,
            start_date,
            end_date,
            uf,
        } => {
            apply_overrides(&mut config, audit, output, start_date, end_date, uf)?;
            println!("🔄 Running PNCP pipeline for {}...", config.feed.uf);

            let feed = PncpFeed::from_config(&config.feed)?;
            let repository = FlatFileRepository::new(&config.store.path);
            let pipeline = Pipeline::new(&feed, &repository, RunOptions::from_config(&config));

            match pipeline.run().await {
                Ok(report) => {
                    if report.prior_recovered {
                        warn!("Previous table at {} was corrupt and has been replaced", config.store.path);
                    }
                    info!("Pipeline finished");
                    print_report(&report, &config.store.path);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                }
            }
        }
        Commands::Classify { text } => {
            let text = text.join(" ");
            let classifier = Classifier::default();
            let result = classifier.classify(Some(&text));
            println!("Natureza:        {}", result.nature);
            println!("Função:          {}", result.function);
            println!("Categoria_Final: {}", result.category());

            let scores: Vec<String> = classifier
                .score(&fold_text(&text))
                .into_iter()
                .filter(|(_, score)| *score > 0)
                .map(|(function, score)| format!("{}={}", function, score))
                .collect();
            if !scores.is_empty() {
                println!("Scores:          {}", scores.join(", "));
            }
        }
    }

    Ok(())
}
