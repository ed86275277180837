//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::backend::{HistoryBackend, HttpBackend};
use crate::config::Config;
use crate::error::ExplorerError;
use crate::explorer::{ExplorerSession, FilterState, GroupBy, SortKey, SortOrder, ViewState};
use crate::models::{DocKind, ExplorerScope, PaymentPeriod};
use crate::services::{ClipboardSink, LinkSink};

#[derive(Parser)]
#[command(name = "expd")]
#[command(about = "Fiscal document history explorer")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Install the global tracing subscriber. Verbosity is read from the raw
/// arguments because this runs before clap parses them.
pub fn init_tracing() {
    let default_filter = if is_verbose() {
        "expediente=info"
    } else {
        "expediente=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Scope arguments shared by every command.
#[derive(Debug, clap::Args)]
struct ScopeArgs {
    /// Client id
    #[arg(long)]
    client: String,
    /// Start of the date range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// End of the date range (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl ScopeArgs {
    fn scope(&self) -> ExplorerScope {
        ExplorerScope::new(self.client.clone(), self.from, self.to)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List a client's historical documents, filtered and grouped
    List {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Free-text search over titles and filenames
        #[arg(short, long)]
        search: Option<String>,
        /// Restrict to document kinds (pdf, image, other)
        #[arg(long)]
        kind: Vec<String>,
        /// Restrict to payment periods (MONTHLY, QUARTERLY, ...)
        #[arg(long)]
        period: Vec<String>,
        /// Restrict to process ids
        #[arg(long)]
        process: Vec<String>,
        /// Restrict to month labels, e.g. "ene 2024"
        #[arg(long)]
        month: Vec<String>,
        /// Group by "process" or "month"
        #[arg(long, default_value = "process")]
        group_by: String,
        /// Sort field (originalDate, dateCompleted, processName, size)
        #[arg(long, default_value = "originalDate")]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        /// Flat table output instead of grouped buckets
        #[arg(long)]
        table: bool,
    },

    /// Resolve a document's signed URL for viewing
    Preview {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Document id
        document_id: String,
        /// Bypass the URL cache (retry path)
        #[arg(long)]
        refresh: bool,
    },

    /// Download a document to disk under its original filename
    Download {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Document id
        document_id: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Bypass the URL cache (retry path)
        #[arg(long)]
        refresh: bool,
    },

    /// Export documents as a server-built zip archive
    Zip {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Document ids to export (all visible when omitted)
        ids: Vec<String>,
    },

    /// Copy signed download links for documents
    Links {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Document ids to resolve (all visible when omitted)
        ids: Vec<String>,
        /// Print links to stdout instead of the clipboard
        #[arg(long)]
        stdout: bool,
    },
}

/// Sink that prints links instead of touching the clipboard.
struct StdoutSink;

impl LinkSink for StdoutSink {
    fn write_links(&self, text: &str) -> Result<(), ExplorerError> {
        println!("{text}");
        Ok(())
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let backend: Arc<dyn HistoryBackend> = Arc::new(HttpBackend::new(
        &config.api_base_url,
        config.auth_token.as_deref(),
        config.request_timeout(),
    )?);

    match cli.command {
        Commands::List {
            scope,
            search,
            kind,
            period,
            process,
            month,
            group_by,
            sort,
            asc,
            table,
        } => {
            let mut session = open_session(&backend, &config, &scope).await?;
            session.set_filters(FilterState {
                search: search.unwrap_or_default(),
                doc_kinds: kind
                    .iter()
                    .map(|k| {
                        DocKind::from_str(k)
                            .with_context(|| format!("unknown document kind: {k}"))
                    })
                    .collect::<anyhow::Result<_>>()?,
                payment_periods: period
                    .iter()
                    .map(|p| {
                        PaymentPeriod::from_tag(p)
                            .with_context(|| format!("unknown payment period: {p}"))
                    })
                    .collect::<anyhow::Result<_>>()?,
                selected_processes: process,
                selected_months: month,
            });
            session.set_view(ViewState {
                group_by: parse_group_by(&group_by)?,
                sort_by: SortKey::from_str(&sort)
                    .with_context(|| format!("unknown sort field: {sort}"))?,
                sort_order: if asc { SortOrder::Asc } else { SortOrder::Desc },
                ..Default::default()
            });
            print_listing(&session, table);
        }

        Commands::Preview {
            scope,
            document_id,
            refresh,
        } => {
            let session = open_session(&backend, &config, &scope).await?;
            let preview = session.preview(&document_id, refresh).await?;
            println!(
                "{} [{}]\n{}",
                style("Preview ready").green().bold(),
                preview.kind.display_name(),
                preview.url
            );
        }

        Commands::Download {
            scope,
            document_id,
            output,
            refresh,
        } => {
            let session = open_session(&backend, &config, &scope).await?;
            let spinner = spinner("Downloading document...");
            let file = session.download(&document_id, refresh).await?;
            spinner.finish_and_clear();

            let path = output.join(&file.file_name);
            tokio::fs::write(&path, &file.bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} {} ({})",
                style("Saved:").green().bold(),
                path.display(),
                human_size(Some(file.bytes.len() as u64))
            );
        }

        Commands::Zip { scope, ids } => {
            let mut session = open_session(&backend, &config, &scope).await?;
            select(&mut session, ids);
            let descriptor = session.export_zip().await?;
            println!(
                "{} {} file(s)\n{}",
                style("Archive ready:").green().bold(),
                descriptor
                    .file_count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".into()),
                descriptor.url
            );
        }

        Commands::Links { scope, ids, stdout } => {
            let mut session = open_session(&backend, &config, &scope).await?;
            select(&mut session, ids);

            let spinner = spinner("Resolving links...");
            let outcome = if stdout {
                session.copy_links(&StdoutSink).await?
            } else {
                session.copy_links(&ClipboardSink).await?
            };
            spinner.finish_and_clear();

            println!(
                "{} {} copied, {} failed",
                style("Links:").bold(),
                style(outcome.copied).green(),
                if outcome.failed_count() > 0 {
                    style(outcome.failed_count()).red()
                } else {
                    style(0).dim()
                }
            );
            for (id, err) in &outcome.failed {
                eprintln!("  {} {id}: {err}", style("failed").red());
            }
        }
    }

    Ok(())
}

async fn open_session(
    backend: &Arc<dyn HistoryBackend>,
    config: &Config,
    scope: &ScopeArgs,
) -> anyhow::Result<ExplorerSession> {
    let mut session =
        ExplorerSession::new(backend.clone(), scope.scope(), config.url_cache_ttl())?;
    let spinner = spinner("Fetching document history...");
    let count = session.refresh().await?;
    spinner.finish_and_clear();
    tracing::info!(count, "documents materialized");
    Ok(session)
}

/// Select explicit ids, or everything visible when none were given.
fn select(session: &mut ExplorerSession, ids: Vec<String>) {
    if ids.is_empty() {
        session.select_all_visible();
    } else {
        session.set_selection(ids);
    }
}

fn parse_group_by(s: &str) -> anyhow::Result<GroupBy> {
    match s {
        "process" => Ok(GroupBy::Process),
        "month" => Ok(GroupBy::Month),
        other => anyhow::bail!("unknown grouping: {other} (expected process or month)"),
    }
}

fn print_listing(session: &ExplorerSession, table: bool) {
    let visible = session.visible();
    if visible.is_empty() {
        println!("{}", style("No documents match the current filters").dim());
        return;
    }

    if table {
        for doc in &visible {
            println!(
                "{:<24} {:<6} {:>10} {:<12} {}",
                doc.id,
                doc.doc_kind.as_str(),
                human_size(doc.size_bytes),
                doc.month_label,
                doc.display_title
            );
        }
    } else {
        for group in session.grouped() {
            println!(
                "{} ({})",
                style(&group.label).bold(),
                group.documents.len()
            );
            for doc in &group.documents {
                println!(
                    "  {:<24} {:<6} {:>10} {}",
                    doc.id,
                    doc.doc_kind.as_str(),
                    human_size(doc.size_bytes),
                    doc.file_name
                );
            }
        }
    }
    println!("{} document(s)", visible.len());
}

fn human_size(size: Option<u64>) -> String {
    match size {
        Some(bytes) if bytes >= 1024 * 1024 => format!("{:.1} MB", bytes as f64 / 1048576.0),
        Some(bytes) if bytes >= 1024 => format!("{:.1} KB", bytes as f64 / 1024.0),
        Some(bytes) => format!("{bytes} B"),
        None => "-".to_string(),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or(ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}
