use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};

use souk::config::Config;
use souk::db::Database;
use souk::logging::{self, LogOptions};
use souk::market::{
  AdPackage, Category, ContactMessage, MarketSnapshot, MarketStores, NewContactMessage, NewReport,
  Permission, Report, SubscriptionPlan,
};
use souk::prefs::{Preferences, Theme};
use souk::store::{Resource, Store};

#[derive(Parser, Debug)]
#[command(name = "souk")]
#[command(about = "Query the marketplace API through the client data layer")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./souk.yaml or $XDG_CONFIG_HOME/souk/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Increase log verbosity (-v, -vv, -vvv)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Seed stores from a JSON snapshot before running the command
  #[arg(long)]
  hydrate: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(clap::Args, Debug)]
struct ListArgs {
  /// Bypass the cache
  #[arg(long)]
  refresh: bool,

  /// Print records as JSON
  #[arg(long)]
  json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List categories
  Categories(ListArgs),
  /// List ad promotion packages
  Packages(ListArgs),
  /// List subscription plans
  Plans(ListArgs),
  /// List abuse reports (admin)
  Reports(ListArgs),
  /// List contact messages (admin)
  Contacts(ListArgs),
  /// List the current user's permissions
  Permissions(ListArgs),
  /// File a report against a listing
  Report {
    listing: String,
    reason: String,
    #[arg(long)]
    details: Option<String>,
  },
  /// Send a message through the contact form
  Contact {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    message: String,
  },
  /// Read or change local preferences
  Prefs {
    #[command(subcommand)]
    action: PrefsAction,
  },
  /// Drop every cached response
  ClearCache,
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
  /// Show all preferences
  Get,
  /// Change a preference
  Set { key: PrefKey, value: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PrefKey {
  Language,
  Theme,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(&LogOptions {
    verbosity: args.verbose,
    log_file: args.log_file.clone(),
  })?;

  if let Command::Prefs { action } = &args.command {
    return run_prefs(args.config.as_deref(), action);
  }

  let config = Config::load(args.config.as_deref())?;
  let stores = MarketStores::from_config(&config)?;

  let sweeper = config
    .cache
    .sweep_interval()
    .map(|interval| stores.cache().spawn_sweeper(interval));

  if let Some(path) = &args.hydrate {
    stores.hydrate(MarketSnapshot::from_file(path)?);
  }

  let result = run(&stores, args.command).await;

  if let Some(sweeper) = sweeper {
    sweeper.abort();
  }

  result
}

async fn run(stores: &MarketStores, command: Command) -> Result<()> {
  match command {
    Command::Categories(args) => list(&stores.categories, &args, category_line).await,
    Command::Packages(args) => list(&stores.ad_packages, &args, package_line).await,
    Command::Plans(args) => list(&stores.plans, &args, plan_line).await,
    Command::Reports(args) => list(&stores.reports, &args, report_line).await,
    Command::Contacts(args) => list(&stores.contacts, &args, contact_line).await,
    Command::Permissions(args) => list(&stores.permissions, &args, permission_line).await,
    Command::Report {
      listing,
      reason,
      details,
    } => {
      let input = NewReport {
        listing_id: listing,
        reason,
        details,
      };
      let report = stores
        .reports
        .submit_report(&input)
        .await
        .map_err(|e| eyre!(e.user_message()))?;
      println!("Report {} filed", report.id);
      Ok(())
    }
    Command::Contact {
      name,
      email,
      subject,
      message,
    } => {
      let input = NewContactMessage {
        name,
        email,
        subject,
        message,
      };
      stores
        .contacts
        .submit_contact(&input)
        .await
        .map_err(|e| eyre!(e.user_message()))?;
      println!("Message sent");
      Ok(())
    }
    Command::ClearCache => {
      let before = stores.cache().len();
      stores.cache().clear();
      println!("Dropped {} cached responses", before);
      Ok(())
    }
    Command::Prefs { .. } => Err(eyre!("prefs is handled without an API client")),
  }
}

async fn list<T>(store: &Store<T>, args: &ListArgs, line: fn(&T) -> String) -> Result<()>
where
  T: Resource,
{
  if args.refresh {
    store.fetch_all(true).await;
  } else {
    store.ensure_loaded().await;
  }

  let state = store.snapshot();

  if args.json {
    println!("{}", serde_json::to_string_pretty(&state.entities)?);
  } else {
    for entity in &state.entities {
      println!("{}", line(entity));
    }
  }

  match state.error {
    Some(message) if state.entities.is_empty() => Err(eyre!(message)),
    Some(message) => {
      eprintln!("warning: {} (showing previous data)", message);
      Ok(())
    }
    None => Ok(()),
  }
}

fn run_prefs(config_path: Option<&Path>, action: &PrefsAction) -> Result<()> {
  let data_dir = Config::load_data_dir(config_path)?;
  let prefs = Preferences::new(Database::open(&data_dir)?);

  match action {
    PrefsAction::Get => {
      println!("language: {}", prefs.language()?);
      println!("theme: {}", prefs.theme()?);
    }
    PrefsAction::Set { key, value } => match key {
      PrefKey::Language => prefs.set_language(value)?,
      PrefKey::Theme => prefs.set_theme(value.parse::<Theme>()?)?,
    },
  }

  Ok(())
}

fn category_line(c: &Category) -> String {
  let indent = if c.parent_id.is_some() { "  " } else { "" };
  format!("{}{} ({}) [{} listings]", indent, c.name, c.slug, c.listing_count)
}

fn package_line(p: &AdPackage) -> String {
  let star = if p.is_featured { " *" } else { "" };
  format!(
    "{}{}: {:.2} {} for {} days",
    p.name, star, p.price, p.currency, p.duration_days
  )
}

fn plan_line(p: &SubscriptionPlan) -> String {
  let limit = p
    .max_listings
    .map(|n| format!("{} listings", n))
    .unwrap_or_else(|| "unlimited listings".to_string());
  format!(
    "{}: {:.2} {} / {:?}, {}",
    p.name, p.price, p.currency, p.interval, limit
  )
}

fn report_line(r: &Report) -> String {
  format!(
    "{} {:?} listing={} reason={} ({})",
    r.id,
    r.status,
    r.listing_id,
    r.reason,
    r.created_at.format("%Y-%m-%d %H:%M")
  )
}

fn contact_line(m: &ContactMessage) -> String {
  let flag = if m.is_read { " " } else { "*" };
  format!("{} {} <{}>: {}", flag, m.name, m.email, m.subject)
}

fn permission_line(p: &Permission) -> String {
  match &p.description {
    Some(description) => format!("{} - {}", p.key, description),
    None => p.key.clone(),
  }
}
