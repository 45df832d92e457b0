use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use zaif_export::api::zaif::ZaifClient;
use zaif_export::config::{self, ExportConfig};
use zaif_export::{CsvSink, ExportKind, Exporter};

/// Export Zaif account history as CSV
#[derive(Parser, Debug)]
#[command(name = "zaif-export", version, about, long_about = None)]
struct Cli {
    /// API key
    #[arg(value_name = "KEY")]
    key: String,

    /// API secret
    #[arg(value_name = "SECRET")]
    secret: String,

    /// spot (現物), margin (信用), future (先物), deposit (入金) or withdrawal (出金)
    #[arg(value_name = "EXPORT_TYPE")]
    export_type: ExportKind,

    /// Output file; standard output when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Seconds to wait before retrying a rate-limited or failed request
    #[arg(long, value_name = "SECONDS", default_value_t = config::DEFAULT_WAIT_INTERVAL_SECS)]
    wait_interval: f64,

    /// Records fetched per request
    #[arg(long, value_name = "LIMIT", default_value_t = config::DEFAULT_LIMIT)]
    limit: u32,

    /// Number of record ids remembered for de-duplication
    #[arg(long, value_name = "LIMIT", default_value_t = config::DEFAULT_CACHE_LIMIT)]
    cache_limit: usize,

    /// Comma-separated currencies to export (deposit and withdrawal only)
    #[arg(long, value_name = "CURRENCIES")]
    currencies: Option<String>,

    /// Give up after this many retries of one request (default: retry forever)
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Maximum API requests per second
    #[arg(long, value_name = "N", default_value_t = config::DEFAULT_REQUESTS_PER_SECOND)]
    requests_per_second: u32,
}

impl Cli {
    fn export_config(&self) -> anyhow::Result<ExportConfig> {
        let config = ExportConfig {
            wait_interval: config::wait_interval_from_secs(self.wait_interval)?,
            limit: self.limit,
            cache_limit: self.cache_limit,
            currencies: self.currencies.as_deref().and_then(config::parse_currencies),
            max_retries: self.max_retries,
            requests_per_second: self.requests_per_second,
        };
        config.validate()?;
        Ok(config)
    }
}

fn open_output(file: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.export_config().context("Invalid configuration")?;
    let output = open_output(cli.file.as_ref())?;

    let client = ZaifClient::new(cli.key, cli.secret, config.requests_per_second)
        .context("Failed to create API client")?;
    let exporter = Exporter::new(client, config);

    let records = exporter
        .export(cli.export_type)
        .await
        .with_context(|| format!("Failed to list {} export targets", cli.export_type))?;

    let mut sink = CsvSink::new(output);
    let rows = sink
        .write_all(records)
        .await
        .with_context(|| format!("{} export aborted after {} rows", cli.export_type, sink.rows()))?;

    log::info!("Exported {} {} rows", rows, cli.export_type);
    Ok(())
}
