use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glean_config::GleanConfig;
use glean_export::{DirectorySaver, MarkdownExporter};
use glean_llm::openrouter::{ClientIdentity, OpenRouterClient};
use glean_llm::traits::CompletionClient;
use glean_llm::{DEFAULT_MODEL, OPENROUTER_ENDPOINT};
use glean_runtime::StatusBoard;
use glean_store::keys::mask_key;
use glean_store::{FileStore, KeyStore};
use glean_web::{FilePageSource, HttpPageSource, Page, PageSource};
use tokio::io::AsyncReadExt;

use crate::cli::{Command, ExportArgs, KeysCommand, PageArgs, ProcessArgs};
use crate::session::{Session, TextSource};

pub async fn dispatch(command: Command, cfg: GleanConfig) -> Result<()> {
    match command {
        Command::Process(args) => run_process(args, &cfg).await,
        Command::Export(args) => run_export(args, &cfg).await,
        Command::Keys(cmd) => run_keys(cmd, &open_key_store(&cfg)).await,
    }
}

pub fn build_client(cfg: &GleanConfig) -> Result<Arc<dyn CompletionClient>> {
    let defaults = ClientIdentity::default();
    let identity = ClientIdentity {
        referer: cfg.referer.clone().unwrap_or(defaults.referer),
        title: cfg.app_title.clone().unwrap_or(defaults.title),
    };
    let endpoint = cfg.endpoint.as_deref().unwrap_or(OPENROUTER_ENDPOINT);
    let client = OpenRouterClient::new(endpoint, identity)?;
    Ok(Arc::new(client))
}

pub fn open_key_store(cfg: &GleanConfig) -> KeyStore {
    let store = FileStore::new(cfg.storage_path());
    tracing::debug!(path = %store.path().display(), "store.open");
    KeyStore::new(Arc::new(store))
}

pub fn page_source(page: &PageArgs, cfg: &GleanConfig) -> Result<Box<dyn PageSource>> {
    match (&page.url, &page.file) {
        (Some(url), _) => {
            let timeout = Duration::from_secs(cfg.fetch_timeout_secs);
            Ok(Box::new(HttpPageSource::new(url.clone(), timeout)?))
        }
        (None, Some(path)) => Ok(Box::new(FilePageSource::new(path))),
        (None, None) => anyhow::bail!("either --url or --file is required"),
    }
}

async fn load_page(page: &PageArgs, cfg: &GleanConfig) -> Result<Page> {
    let source = page_source(page, cfg)?;
    tracing::info!(source = %source.describe(), "page.load");
    Ok(source.load().await?)
}

fn build_session(cfg: &GleanConfig, model: Option<String>, api_key: Option<String>) -> Result<Session> {
    let model = model
        .or_else(|| cfg.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let exporter = MarkdownExporter::new(Arc::new(DirectorySaver::new(cfg.export_dir())));

    Ok(Session::new(build_client(cfg)?, open_key_store(cfg), exporter, model)
        .with_explicit_key(api_key.or_else(|| cfg.api_key.clone()))
        .with_board(StatusBoard::echoing()))
}

async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("reading stdin")?;
    Ok(buf)
}

async fn run_process(args: ProcessArgs, cfg: &GleanConfig) -> Result<()> {
    let selection = match (args.selection, args.selection_stdin) {
        (Some(text), _) => Some(text),
        (None, true) => Some(read_stdin().await?),
        (None, false) => None,
    };
    // A given selection needs no page unless the result is saved.
    let (page, source) = match selection {
        Some(text) => (Page::from_html(None, "").with_selection(text), TextSource::Selection),
        None => (load_page(&args.page, cfg).await?, TextSource::FullPage),
    };

    let mut session = build_session(cfg, args.model, args.api_key)?;
    let Some(result) = session.process(&page, source, args.action).await? else {
        return Ok(());
    };
    println!("{result}");

    if args.save {
        let page = match source {
            TextSource::Selection => load_page(&args.page, cfg).await?,
            TextSource::FullPage => page,
        };
        let path = session.export(&page).await?;
        eprintln!("{}", path.display());
    }
    Ok(())
}

async fn run_export(args: ExportArgs, cfg: &GleanConfig) -> Result<()> {
    let page = load_page(&args.page, cfg).await?;
    let result_text = match &args.result_file {
        Some(path) => read_result_file(path).await?,
        None => read_stdin().await?,
    };

    let mut session = build_session(cfg, None, None)?;
    let path = session.export_text(&page, result_text.trim_end()).await?;
    println!("{}", path.display());
    Ok(())
}

async fn read_result_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn run_keys(cmd: KeysCommand, keys: &KeyStore) -> Result<()> {
    match cmd {
        KeysCommand::List { reveal } => {
            let selected = keys.selected().await?;
            for key in keys.list().await? {
                let marker = if key == selected { "*" } else { " " };
                let shown = if reveal { key.clone() } else { mask_key(&key) };
                println!("{marker} {shown}");
            }
        }
        KeysCommand::Add { key } => {
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Please enter an API key");
            }
            if keys.add(key).await? {
                eprintln!("API key saved successfully!");
            } else {
                eprintln!("This API key is already saved");
            }
        }
        KeysCommand::Remove { key } => {
            keys.remove(&key).await?;
            eprintln!("API key deleted successfully!");
        }
        KeysCommand::Select { key } => keys.set_selected(&key).await?,
        KeysCommand::Selected => {
            let selected = keys.selected().await?;
            if selected.is_empty() {
                eprintln!("No API key selected");
            } else {
                println!("{}", mask_key(&selected));
            }
        }
        KeysCommand::Legacy { key: Some(key) } => keys.set_legacy_key(&key).await?,
        KeysCommand::Legacy { key: None } => {
            let legacy = keys.legacy_key().await?;
            if !legacy.is_empty() {
                println!("{}", mask_key(&legacy));
            }
        }
        KeysCommand::Migrate => {
            if keys.migrate_legacy().await? {
                eprintln!("Legacy API key added to saved keys");
            } else {
                eprintln!("Nothing to migrate");
            }
        }
    }
    Ok(())
}
