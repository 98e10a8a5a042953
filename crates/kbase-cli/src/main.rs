//! kbase CLI: command-line client for the knowledge content API.
//!
//! Reads KBASE_API_URL, KBASE_API_KEY (Bearer auth) and KBASE_DB_ID from the
//! environment or a `.env` file.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use kbase_api_client::{ApiClient, ContentApi};
use kbase_core::models::{
    flatten_metadata, ChunkerKind, ChunkingConfig, ContentUpdate, MetadataPair, ReaderKind,
};
use kbase_core::ClientConfig;
use kbase_intake::{
    ContentLibrary, DraftPatch, IntakeSession, PollOutcome, PollPolicy, SubmissionReport,
};
use kbase_cli::{
    describe_error, describe_submit_error, format_timestamp, init_tracing, parse_metadata_arg,
    parse_text_arg, truncate_string,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kbase", about = "Knowledge content CLI")]
struct Cli {
    /// Knowledge database id (defaults to KBASE_DB_ID, or the only database)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the knowledge databases the server exposes
    Databases,
    /// List content in a database
    List {
        /// Only show items still processing
        #[arg(long)]
        pending: bool,
    },
    /// Show one content item
    Show {
        /// Content id
        id: String,
    },
    /// Show the processing status of one item
    Status {
        /// Content id
        id: String,
    },
    /// Delete a content item
    Delete {
        /// Content id
        id: String,
    },
    /// Edit name, description or metadata of an item
    Edit {
        /// Content id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Metadata as key=value; replaces the item's metadata. Repeatable.
        #[arg(long = "meta", value_parser = parse_metadata_arg)]
        meta: Vec<MetadataPair>,
    },
    /// Add files, URLs and text, then wait for processing
    Ingest {
        /// Local file to upload. Repeatable.
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// URL to ingest. Repeatable.
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Text as NAME=BODY; an empty NAME uses the first line. Repeatable.
        #[arg(long = "text", value_parser = parse_text_arg)]
        texts: Vec<(String, String)>,
        /// Reader for every item (default: inferred per item)
        #[arg(long)]
        reader: Option<ReaderKind>,
        /// Enable chunking with this strategy
        #[arg(long)]
        chunker: Option<ChunkerKind>,
        #[arg(long, default_value = "5000")]
        chunk_size: u32,
        #[arg(long, default_value = "0")]
        chunk_overlap: u32,
        /// Metadata as key=value, applied to every item. Repeatable.
        #[arg(long = "meta", value_parser = parse_metadata_arg)]
        meta: Vec<MetadataPair>,
        /// Description applied to every item
        #[arg(long)]
        description: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// `--db`, then KBASE_DB_ID, then the only database on the server.
async fn resolve_db(
    arg: Option<String>,
    config: &ClientConfig,
    api: &dyn ContentApi,
) -> anyhow::Result<String> {
    if let Some(db_id) = arg.or_else(|| config.default_db_id.clone()) {
        return Ok(db_id);
    }
    let databases = api.list_databases().await?;
    match databases.as_slice() {
        [only] => Ok(only.db_id.clone()),
        [] => bail!("The server lists no knowledge databases"),
        _ => bail!("Several databases available; pass --db or set KBASE_DB_ID"),
    }
}

fn print_report(report: &SubmissionReport) {
    println!(
        "\n{:<36} {:<30} {:<20}",
        "Content ID", "Name", "Outcome"
    );
    println!("{}", "-".repeat(88));
    for item in &report.items {
        let outcome = match &item.outcome {
            PollOutcome::Settled(status) => status.to_string(),
            PollOutcome::Exhausted { attempts } => format!("still processing ({} checks)", attempts),
            PollOutcome::Cancelled => "cancelled".to_string(),
        };
        println!(
            "{:<36} {:<30} {:<20}",
            truncate_string(&item.content_id, 36),
            truncate_string(&item.name, 30),
            outcome
        );
    }
    println!();
}

#[allow(clippy::too_many_arguments)]
async fn ingest(
    api: Arc<dyn ContentApi>,
    config: &ClientConfig,
    db: Option<String>,
    json: bool,
    files: Vec<PathBuf>,
    urls: Vec<String>,
    texts: Vec<(String, String)>,
    reader: Option<ReaderKind>,
    chunking: ChunkingConfig,
    meta: Vec<MetadataPair>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let mut session = IntakeSession::new(api, PollPolicy::from_config(config))
        .with_default_database(config.default_db_id.clone());
    session.open();
    session.load_databases().await?;
    if let Some(db_id) = db {
        session
            .select_database(&db_id)
            .map_err(|e| anyhow!(describe_error(&e)))?;
    }

    session.drafts_mut().add_files(files);
    for url in urls {
        session.url_form.set_input(url);
        session
            .submit_url()
            .map_err(|e| anyhow!(describe_error(&e)))?;
    }
    for (name, body) in texts {
        session.text_form.name = name;
        session.text_form.body = body;
        session
            .submit_text()
            .map_err(|e| anyhow!(describe_error(&e)))?;
    }

    for id in session.drafts().ids() {
        let drafts = session.drafts_mut();
        drafts.update(
            id,
            DraftPatch {
                description: description.clone(),
                reader,
                chunking: Some(chunking),
                ..Default::default()
            },
        );
        for pair in &meta {
            drafts.set_metadata_input(id, pair.key.clone(), pair.value.clone());
            drafts.add_metadata(id);
        }
    }

    if session.drafts().is_empty() {
        bail!("Nothing to ingest; pass --file, --url or --text");
    }

    let listener = |db_id: &str| tracing::info!(db_id = %db_id, "Knowledge content changed");
    let submitted = session
        .submit(&listener)
        .await
        .map_err(|e| anyhow!(describe_submit_error(&e)))?;
    let Some(report) = submitted else {
        return Ok(());
    };

    if json {
        let items: Vec<_> = report
            .items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "content_id": item.content_id,
                    "name": item.name,
                    "status": item.outcome.status().map(|s| s.to_string()),
                    "cancelled": item.outcome == PollOutcome::Cancelled,
                })
            })
            .collect();
        print_json(&serde_json::json!({ "db_id": report.db_id, "items": items }))?;
    } else {
        print_report(&report);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ClientConfig::from_env().map_err(|e| anyhow!(describe_error(&e)))?;
    let client = ApiClient::from_config(&config).context("Failed to create API client")?;
    let api: Arc<dyn ContentApi> = Arc::new(client.clone());

    match cli.command {
        Commands::Databases => {
            let databases = api.list_databases().await?;
            if cli.json {
                print_json(&databases)?;
            } else {
                println!("\n{:<30} {:<40}", "Database ID", "Name");
                println!("{}", "-".repeat(70));
                for db in &databases {
                    println!("{:<30} {:<40}", truncate_string(&db.db_id, 30), db.display_name);
                }
                println!();
            }
        }
        Commands::List { pending } => {
            let db_id = resolve_db(cli.db, &config, api.as_ref()).await?;
            let mut library = ContentLibrary::new(api, db_id);
            library.refresh().await?;
            let items: Vec<_> = if pending {
                library.pending().collect()
            } else {
                library.items().iter().collect()
            };

            if cli.json {
                print_json(&items)?;
            } else if items.is_empty() {
                println!("\nNo content found.");
            } else {
                println!(
                    "\n{:<36} {:<30} {:<12} {:<18}",
                    "ID", "Name", "Status", "Updated"
                );
                println!("{}", "-".repeat(100));
                for item in items {
                    let status = item
                        .status
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<36} {:<30} {:<12} {:<18}",
                        truncate_string(&item.id, 36),
                        truncate_string(&item.name, 30),
                        status,
                        format_timestamp(item.updated_at)
                    );
                }
                println!();
            }
        }
        Commands::Show { id } => {
            let db_id = resolve_db(cli.db, &config, api.as_ref()).await?;
            let item = client.get_content(&db_id, &id).await?;
            print_json(&item)?;
        }
        Commands::Status { id } => {
            let db_id = resolve_db(cli.db, &config, api.as_ref()).await?;
            let response = api.content_status(&db_id, &id).await?;
            if cli.json {
                print_json(&response)?;
            } else {
                match &response.status_message {
                    Some(message) => println!("{}: {} ({})", id, response.status, message),
                    None => println!("{}: {}", id, response.status),
                }
            }
        }
        Commands::Delete { id } => {
            let db_id = resolve_db(cli.db, &config, api.as_ref()).await?;
            api.delete_content(&db_id, &id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Content {} deleted", id) }),
            )?;
        }
        Commands::Edit {
            id,
            name,
            description,
            meta,
        } => {
            let db_id = resolve_db(cli.db, &config, api.as_ref()).await?;
            let update = ContentUpdate {
                name,
                description,
                metadata: (!meta.is_empty()).then(|| flatten_metadata(&meta)),
            };
            let mut library = ContentLibrary::new(api, db_id);
            let item = library.update(&id, &update).await?;
            print_json(item)?;
        }
        Commands::Ingest {
            files,
            urls,
            texts,
            reader,
            chunker,
            chunk_size,
            chunk_overlap,
            meta,
            description,
        } => {
            let chunking = match chunker {
                Some(kind) => ChunkingConfig::enabled(kind, chunk_size, chunk_overlap),
                None => ChunkingConfig::default(),
            };
            ingest(
                api,
                &config,
                cli.db,
                cli.json,
                files,
                urls,
                texts,
                reader,
                chunking,
                meta,
                description,
            )
            .await?;
        }
    }

    Ok(())
}
