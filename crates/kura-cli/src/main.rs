//! kura - command line front end for the A.R.M site.
//!
//! Reads and edits the persisted site content, talks to the party assistant
//! and drives the offline cache worker against the configured origin.

mod cli;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kura_core::assistant::{Assistant, Conversation, GeminiClient};
use kura_core::intake::{DonationFlow, MembershipApplication};
use kura_core::models::{EventDraft, EventPatch, Language, Member, MemberPatch, NewsDraft, NewsPatch};
use kura_core::offline::{
    CacheStorage, FetchOutcome, HttpNetwork, Network, OfflineWorker, Registration, Request,
};
use kura_core::storage::FileStore;
use kura_core::store::EntityStore;
use kura_core::{AppState, Config, DocumentState};

use cli::{
    CacheCommand, Cli, Command, ConfigCommand, EventCommand, EventFields, MemberCommand, NewsCommand,
};

type Site = AppState<FileStore>;

/// Log file prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "kura.log";

/// Initialize the tracing subscriber. Logs go to stderr, and also to a daily
/// file when a log directory is configured; the returned guard flushes it.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;
    let _guard = init_tracing(config.log_dir.as_deref());
    debug!(command = ?cli.command, "kura starting");

    if cli.command.requires_admin() {
        let code = cli.admin_code.as_deref().unwrap_or_default();
        if !config.check_admin_code(code) {
            bail!("Access denied: invalid admin code");
        }
    }

    run(&config, cli.command).await
}

fn open_site(config: &Config) -> Result<Site> {
    let store = FileStore::new(config.data_dir()?)?;
    Ok(AppState::hydrate(EntityStore::new(store), DocumentState::default()))
}

fn parse_language(code: &str) -> Result<Language> {
    match Language::from_code(code) {
        Some(language) => Ok(language),
        None => bail!("Unknown language '{}' (expected fr, en, es or ar)", code),
    }
}

async fn run(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Show => show(&open_site(config)?),
        Command::Lang { code } => {
            let language = parse_language(&code)?;
            open_site(config)?.set_language(language)?;
            println!("Language: {} ({})", language.french_name(), language.direction().as_attr());
        }
        Command::Bulletin { text } => {
            open_site(config)?.set_bulletin(text)?;
            println!("Bulletin updated");
        }
        Command::Member(command) => member(&mut open_site(config)?, command)?,
        Command::Event(command) => event(&mut open_site(config)?, command)?,
        Command::News(command) => news(&mut open_site(config)?, command)?,
        Command::Reset => {
            open_site(config)?.clear_site_data()?;
            println!("Site data restored to initial content");
        }
        Command::Ask { question } => {
            let language = open_site(config)?.language();
            let assistant = Assistant::new(gemini(config)?);
            let mut conversation = Conversation::new(language);
            if let Some(reply) = conversation.send(&assistant, &question.join(" ")).await {
                println!("{}", reply);
            }
        }
        Command::Studio { mode, prompt } => {
            let language = open_site(config)?.language();
            let assistant = Assistant::new(gemini(config)?);
            if let Some(text) = assistant.compose(mode.into(), &prompt.join(" "), language).await {
                println!("{}", text);
            }
        }
        Command::Cache(command) => run_cache(config, command).await?,
        Command::Config(command) => run_config(config, command)?,
        Command::Join(args) => join(args)?,
        Command::Donate { amount } => donate(amount)?,
    }
    Ok(())
}

// ===== Site content =====

fn gemini(config: &Config) -> Result<GeminiClient> {
    GeminiClient::new(config.api_key(), config.assistant_model.clone())
}

fn show(site: &Site) {
    let language = site.language();
    println!("Language: {} ({})", language.french_name(), language.direction().as_attr());
    println!("Bulletin: {}", site.bulletin());

    println!("\nLeadership:");
    for (index, member) in site.members().iter().enumerate() {
        println!("  [{}] {} - {} ({})", index, member.name, member.role, member.location);
    }

    println!("\nAgenda:");
    for event in site.events() {
        println!("  {} {} - {} @ {}", event.id, event.formatted_date(), event.title, event.location);
    }

    println!("\nNews:");
    for item in site.news() {
        println!("  {} {} - {}", item.id, item.date, item.title);
        println!("      {}", item.summary);
    }
}

fn member(site: &mut Site, command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::Add { name, role, location } => {
            let placeholder = Member::placeholder();
            let member = Member::new(
                name.unwrap_or(placeholder.name),
                role.unwrap_or(placeholder.role),
                location.unwrap_or(placeholder.location),
            );
            site.add_member(member)?;
            println!("Member added at index {}", site.members().len() - 1);
        }
        MemberCommand::Update { index, name, role, location } => {
            let patch = MemberPatch { name, role, location };
            report(site.update_member(index, &patch)?, "Member", &index.to_string());
        }
        MemberCommand::Rm { index } => {
            report(site.remove_member(index)?, "Member", &index.to_string());
        }
    }
    Ok(())
}

fn event(site: &mut Site, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Add(fields) if fields.is_empty() => {
            let id = site.add_placeholder_event()?;
            println!("Event {} created", id);
        }
        EventCommand::Add(fields) => {
            let draft = EventDraft {
                title: fields.title.unwrap_or_default(),
                date: fields.date.unwrap_or_default(),
                description: fields.description.unwrap_or_default(),
                location: fields.location.unwrap_or_default(),
                image: fields.image,
            };
            let id = site.add_event(draft)?;
            println!("Event {} created", id);
        }
        EventCommand::Update { id, fields, no_image } => {
            let patch = event_patch(fields, no_image);
            report(site.update_event(&id, &patch)?, "Event", &id);
        }
        EventCommand::Rm { id } => {
            report(site.remove_event(&id)?, "Event", &id);
        }
    }
    Ok(())
}

fn event_patch(fields: EventFields, no_image: bool) -> EventPatch {
    let image = if no_image { Some(None) } else { fields.image.map(Some) };
    EventPatch {
        title: fields.title,
        date: fields.date,
        description: fields.description,
        location: fields.location,
        image,
    }
}

fn news(site: &mut Site, command: NewsCommand) -> Result<()> {
    match command {
        NewsCommand::Add { title, date, summary, content } => {
            let id = site.add_news(NewsDraft { title, date, summary, content })?;
            println!("News {} created", id);
        }
        NewsCommand::Update { id, title, date, summary, content } => {
            let patch = NewsPatch { title, date, summary, content };
            report(site.update_news(&id, &patch)?, "News", &id);
        }
        NewsCommand::Rm { id } => {
            report(site.remove_news(&id)?, "News", &id);
        }
    }
    Ok(())
}

fn report(changed: bool, kind: &str, key: &str) {
    if changed {
        println!("{} {} saved", kind, key);
    } else {
        println!("{} {} not found, nothing changed", kind, key);
    }
}

// ===== Offline cache =====

async fn run_cache(config: &Config, command: CacheCommand) -> Result<()> {
    let dir = config.offline_dir()?;
    let caches = CacheStorage::load_from(&dir).await?;
    let network = Arc::new(HttpNetwork::new(config.offline.origin.clone())?);
    let worker = || OfflineWorker::new(config.offline.clone(), Arc::clone(&network), caches.clone());

    match command {
        CacheCommand::Install => {
            let registration = Registration::new();
            let installed = registration.register(worker()).await?;
            println!("Cache {} {:?}", installed.version(), installed.state());
        }
        CacheCommand::Fetch { url, navigate } => {
            let registration = Registration::new();
            if registration.resume(worker()).await?.is_none() {
                info!(version = %config.offline.version, "No cached generation found, installing");
                registration.register(worker()).await?;
            }

            let request = if navigate { Request::navigate(url) } else { Request::get(url) };
            let response = match registration.handle_fetch(&request).await? {
                FetchOutcome::Respond { response, source } => {
                    eprintln!("{} ({:?})", response.status, source);
                    response
                }
                FetchOutcome::Passthrough => {
                    let response = network.fetch(&request).await?;
                    eprintln!("{} (passthrough)", response.status);
                    response
                }
            };
            io::stdout().write_all(&response.body)?;
            registration.settle().await;
        }
        CacheCommand::Status => {
            for name in caches.keys().await {
                let marker = if name == config.offline.version { "*" } else { " " };
                println!("{} {}", marker, name);
                for key in caches.open(&name).await.keys().await {
                    println!("    {}", key);
                }
            }
            return Ok(());
        }
    }

    caches.save_to(&dir).await?;
    Ok(())
}

// ===== Configuration =====

fn run_config(config: &Config, command: ConfigCommand) -> Result<()> {
    let path = Config::config_path()?;
    match command {
        ConfigCommand::Show => {
            println!("# {}", path.display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to replace it)", path.display());
            }
            config.save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

// ===== Intake =====

fn join(args: cli::JoinArgs) -> Result<()> {
    let application = MembershipApplication {
        full_name: args.name,
        phone: args.phone,
        region: args.region,
        profession: args.profession,
        accepts_statutes: args.accept_statutes,
    };
    let confirmation = application.submit()?;
    println!("Welcome {} ({}), your application has been received", confirmation.full_name, confirmation.region);
    Ok(())
}

fn donate(amount: Option<u32>) -> Result<()> {
    let mut flow = DonationFlow::new();
    if amount.is_some() {
        flow.set_amount(amount);
    }
    flow.proceed()?;
    let receipt = flow.confirm()?;
    println!(
        "Donation of {} EUR recorded, reference {} ({})",
        receipt.amount,
        receipt.reference,
        receipt.issued_at.format("%d/%m/%Y %H:%M")
    );
    Ok(())
}
