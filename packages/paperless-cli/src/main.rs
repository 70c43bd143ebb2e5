//! Command-line view over a Paperless instance.
//!
//! Reads `PAPERLESS_API_URL` and `PAPERLESS_TOKEN` from the environment (or
//! `.env`); `--base-url` and `--token` override them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paperless_sync::{CatalogKind, ClientConfig, FetchCoordinator, Identifier, QueryParams};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser)]
#[command(name = "paperless")]
#[command(about = "Fetch documents and reference catalogs from Paperless")]
#[command(version)]
struct Cli {
    /// API root, e.g. https://paperless.example.com/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API token (prefer PAPERLESS_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Rewrite http:// pagination cursors to https://
    #[arg(long, global = true)]
    force_https_cursors: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, following every page
    Documents {
        /// Query filter as key=value (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Only documents of this document type
        #[arg(long, conflicts_with = "tag")]
        document_type: Option<Identifier>,

        /// Only documents carrying this tag
        #[arg(long)]
        tag: Option<Identifier>,
    },

    /// Build the catalog of document types or tags used by documents
    Catalog {
        kind: KindArg,

        /// Query filter as key=value (repeatable); forces a documents refresh
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    DocumentTypes,
    Tags,
}

impl From<KindArg> for CatalogKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::DocumentTypes => CatalogKind::DocumentType,
            KindArg::Tags => CatalogKind::Tag,
        }
    }
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,paperless_sync=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(token) = &cli.token {
        config = config.with_token(token.as_str());
    }
    if cli.force_https_cursors {
        config = config.with_force_https_cursors(true);
    }
    config
}

async fn run(cli: Cli) -> Result<()> {
    let coordinator = FetchCoordinator::new(build_config(&cli));
    if let Some(e) = coordinator.config_error() {
        return Err(e.clone()).context("Paperless connection is not configured");
    }

    match cli.command {
        Commands::Documents {
            filters,
            document_type,
            tag,
        } => {
            let reference = document_type
                .map(|id| (CatalogKind::DocumentType, id))
                .or_else(|| tag.map(|id| (CatalogKind::Tag, id)));

            let count = match reference {
                Some((kind, id)) if filters.is_empty() => coordinator
                    .fetch_documents_by_reference(kind, Some(id.clone()))
                    .await
                    .with_context(|| format!("Failed to fetch documents for {kind} {id}"))?,
                reference => {
                    let mut params: QueryParams = filters.into_iter().collect();
                    if let Some((kind, id)) = reference {
                        params.set(kind.filter_key(), id);
                    }
                    coordinator
                        .fetch_documents(params)
                        .await
                        .context("Failed to fetch documents")?
                }
            };

            tracing::debug!(count, "Documents ready");
            output::documents(&coordinator.documents(), cli.json)
        }
        Commands::Catalog { kind, filters } => {
            let kind = CatalogKind::from(kind);
            let params: QueryParams = filters.into_iter().collect();
            let report = coordinator
                .fetch_catalog(kind, params)
                .await
                .with_context(|| format!("Failed to build {kind} catalog"))?;

            output::catalog(kind, &report, cli.json)
        }
    }
}
