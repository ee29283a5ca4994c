use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use batchfetch::downloader::worker;
use batchfetch::{BatchConfig, BatchFetcher, HttpTransport, Locator, Strategy, telemetry};

#[derive(Parser)]
#[command(name = "batchfetch")]
#[command(about = "Download URLs with a thread pool, a process pool and async tasks")]
#[command(version = "1.0")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(value_name = "URL", required = true, help = "URLs to download")]
    urls: Vec<Locator>,
    #[arg(short, long, help = "pool size, defaults to available parallelism")]
    workers: Option<NonZeroUsize>,
    #[arg(short, long, default_value = ".", help = "directory to write files into")]
    output_dir: PathBuf,
    #[arg(short, long, value_enum, help = "strategies to run, defaults to all in order")]
    strategy: Vec<Strategy>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single URL and report back as JSON; used by the process strategy.
    #[command(name = "worker", hide = true)]
    Worker {
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        url: Locator,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    if let Some(Commands::Worker { output_dir, url }) = cli.command {
        let transport = HttpTransport::new();
        let fetched = worker::serve(&transport, &url, &output_dir, std::io::stdout().lock())
            .await
            .context("failed to write worker report")?;
        if !fetched {
            std::process::exit(1);
        }
        return Ok(());
    }

    let workers = cli.workers.unwrap_or_else(BatchConfig::host_parallelism);
    let config = BatchConfig::new(workers).with_output_dir(cli.output_dir);
    let fetcher = BatchFetcher::new(config);

    let strategies = if cli.strategy.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        cli.strategy
    };

    for (i, strategy) in strategies.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("Downloading using {}:", strategy);
        fetcher
            .run_batch(&cli.urls, strategy, |completion| {
                println!(
                    "Downloaded: {} in {:.2} seconds",
                    completion.filename,
                    completion.elapsed.as_secs_f64()
                );
            })
            .await
            .with_context(|| format!("download using {} failed", strategy))?;
    }

    Ok(())
}
