//! # fitbell-kiosk
//!
//! Terminal front end for the fitting-room help button.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fitbell-kiosk                                                          │
//! │                                                                         │
//! │  widget <slug>        ──► WidgetHost ──► PublicConfigResolver          │
//! │                                      └─► EventSink (fire-and-forget)    │
//! │  preview --email ...  ──► PreviewDriver (draft only, nothing saved)    │
//! │  register / color /   ──► Dashboard ──► ConfigStore / MerchantDirectory │
//! │  toggle / sizes /                                                       │
//! │  analytics / url                                                        │
//! │                                                                         │
//! │  All commands share one SQLite database (see config.rs for its path).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Log Levels
//! - `RUST_LOG=debug` shows every widget transition
//! - Default: `info,sqlx=warn`
//! - Logs go to stderr; the widget itself is drawn on stdout

mod config;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::KioskConfig;
use fitbell_core::{ConfigPatch, NewSizeEntry, SizeCategory, SizeChart};
use fitbell_db::{Dashboard, Database, DbConfig, DbError, WidgetHost};
use session::PreviewDriver;

/// fitbell: fitting-room help button
#[derive(Parser, Debug)]
#[command(name = "fitbell-kiosk")]
#[command(about = "Fitting-room help button: shopper widget and merchant dashboard", long_about = None)]
struct Cli {
    /// Config file (default: platform config dir / kiosk.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the public widget for a business slug
    Widget {
        slug: String,
    },
    /// Try out unsaved changes in the widget without publishing them
    Preview(PreviewArgs),
    /// Create a merchant account with the default widget
    Register {
        email: String,
        business_name: String,
    },
    /// Print the published configuration
    Show(MerchantArgs),
    /// Change button and/or panel color
    Color(ColorArgs),
    /// Enable or disable a help option
    Toggle {
        #[command(flatten)]
        merchant: MerchantArgs,
        option_id: String,
    },
    /// Manage the size chart
    Sizes {
        #[command(flatten)]
        merchant: MerchantArgs,
        #[command(subcommand)]
        action: SizesAction,
    },
    /// Summarize recorded widget requests
    Analytics(MerchantArgs),
    /// Print the shareable widget link
    Url(MerchantArgs),
}

#[derive(Parser, Debug)]
struct MerchantArgs {
    /// Email of the merchant to act as
    #[arg(long)]
    email: String,
}

#[derive(Parser, Debug)]
struct ColorArgs {
    #[command(flatten)]
    merchant: MerchantArgs,

    #[arg(long)]
    button: Option<String>,

    #[arg(long)]
    panel: Option<String>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    merchant: MerchantArgs,

    #[arg(long)]
    button: Option<String>,

    #[arg(long)]
    panel: Option<String>,

    /// Option ids to flip in the draft
    #[arg(long = "toggle", num_args = 1..)]
    toggles: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum SizesAction {
    /// Print the chart
    List,
    /// Append an entry
    #[command(subcommand)]
    Add(SizeAddArgs),
    /// Remove an entry by id
    Remove { category: SizeCategory, id: String },
}

#[derive(Subcommand, Debug)]
enum SizeAddArgs {
    Footwear {
        #[arg(long)]
        region: String,
        #[arg(long)]
        size: String,
    },
    Tops {
        #[arg(long)]
        size: String,
        #[arg(long)]
        chest: String,
        #[arg(long, default_value = "")]
        waist: String,
    },
    Bottoms {
        #[arg(long)]
        size: String,
        #[arg(long)]
        waist: String,
        #[arg(long, default_value = "")]
        inseam: String,
    },
}

impl From<SizeAddArgs> for NewSizeEntry {
    fn from(args: SizeAddArgs) -> Self {
        match args {
            SizeAddArgs::Footwear { region, size } => NewSizeEntry::Footwear { region, size },
            SizeAddArgs::Tops { size, chest, waist } => NewSizeEntry::Tops { size, chest, waist },
            SizeAddArgs::Bottoms {
                size,
                waist,
                inseam,
            } => NewSizeEntry::Bottoms {
                size,
                waist,
                inseam,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = KioskConfig::load(cli.config).context("Failed to load kiosk config")?;
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    let db_path = config.database_path()?;
    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let db = Arc::new(db);

    let result = run(cli.command, &config, db.clone()).await;

    db.close().await;
    result
}

async fn run(command: Commands, config: &KioskConfig, db: Arc<Database>) -> Result<()> {
    match command {
        Commands::Widget { slug } => {
            let mut host = WidgetHost::open(db, &slug, config.widget_settings()).await;
            if host.resolved().is_fallback() {
                println!("(no business found for '{slug}', showing the default widget)");
            }
            session::run(&mut host).await?;
            host.flush().await;
        }

        Commands::Preview(args) => {
            let dashboard = signed_in(db, &args.merchant).await?;
            let mut editor = dashboard.editor().await?;
            if let Some(color) = args.button {
                editor.set_button_color(color);
            }
            if let Some(color) = args.panel {
                editor.set_panel_color(color);
            }
            for id in &args.toggles {
                if !editor.toggle_option(id) {
                    println!("  ! no option with id '{id}'");
                }
            }

            println!("(preview: changes are not saved)");
            let mut driver = PreviewDriver::new(editor.draft().clone(), config.widget_settings());
            session::run(&mut driver).await?;
        }

        Commands::Register {
            email,
            business_name,
        } => {
            let mut dashboard = Dashboard::new(db);
            let merchant = dashboard.register_merchant(&email, &business_name).await?;
            info!(uid = %merchant.uid, "Registered");
            println!("Registered {} ({})", merchant.business_name, merchant.email);
            println!("Widget: {}", merchant.widget_url(&config.public.base_url));
        }

        Commands::Show(merchant) => {
            let dashboard = signed_in(db, &merchant).await?;
            let current = dashboard.load_config().await?;
            println!("{}", serde_json::to_string_pretty(&current)?);
        }

        Commands::Color(args) => {
            let dashboard = signed_in(db, &args.merchant).await?;
            let patch = ConfigPatch {
                button_color: args.button,
                panel_color: args.panel,
                help_options: None,
            };
            if patch.is_empty() {
                println!("Nothing to change: pass --button and/or --panel");
                return Ok(());
            }
            let saved = dashboard.update_config(&patch).await?;
            println!("button {} · panel {}", saved.button_color, saved.panel_color);
        }

        Commands::Toggle {
            merchant,
            option_id,
        } => {
            let dashboard = signed_in(db, &merchant).await?;
            let saved = match dashboard.toggle_option(&option_id).await {
                Ok(saved) => saved,
                Err(DbError::NotFound { .. }) => {
                    println!("No option with id '{option_id}', nothing changed");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            if let Some(option) = saved.option(&option_id) {
                let state = if option.enabled { "enabled" } else { "disabled" };
                println!("{} is now {}", option.label, state);
            }
        }

        Commands::Sizes { merchant, action } => {
            let dashboard = signed_in(db, &merchant).await?;
            match action {
                SizesAction::List => print_chart(&dashboard.size_chart().await?),
                SizesAction::Add(args) => {
                    let entry = NewSizeEntry::from(args);
                    let category = entry.category();
                    let stored = dashboard.add_size_entry(category, entry).await?;
                    println!("Added {} entry {}", category, stored.id());
                }
                SizesAction::Remove { category, id } => {
                    dashboard.remove_size_entry(category, &id).await?;
                    println!("Removed {} entry {} (if it existed)", category, id);
                }
            }
        }

        Commands::Analytics(merchant) => {
            let dashboard = signed_in(db, &merchant).await?;
            let data = dashboard.analytics().await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Url(merchant) => {
            let dashboard = signed_in(db, &merchant).await?;
            println!("{}", dashboard.widget_url(&config.public.base_url)?);
        }
    }

    Ok(())
}

async fn signed_in(db: Arc<Database>, args: &MerchantArgs) -> Result<Dashboard<Database>> {
    let mut dashboard = Dashboard::new(db);
    dashboard
        .sign_in(&args.email)
        .await
        .with_context(|| format!("Cannot sign in as {}", args.email))?;
    Ok(dashboard)
}

fn print_chart(chart: &SizeChart) {
    if chart.is_empty() {
        println!("(size chart is empty)");
        return;
    }
    for e in &chart.footwear {
        println!("footwear  {:<36} {} {}", e.id, e.region, e.size);
    }
    for e in &chart.tops {
        println!("tops      {:<36} {} chest {} waist {}", e.id, e.size, e.chest, e.waist);
    }
    for e in &chart.bottoms {
        println!("bottoms   {:<36} {} waist {} inseam {}", e.id, e.size, e.waist, e.inseam);
    }
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sizes_add() {
        let cli = Cli::try_parse_from([
            "fitbell-kiosk",
            "sizes",
            "--email",
            "owner@store.test",
            "add",
            "footwear",
            "--region",
            "US",
            "--size",
            "9",
        ])
        .unwrap();

        let Commands::Sizes { action: SizesAction::Add(args), .. } = cli.command else {
            panic!("expected sizes add");
        };
        assert_eq!(
            NewSizeEntry::from(args),
            NewSizeEntry::Footwear {
                region: "US".to_string(),
                size: "9".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_remove_category() {
        let cli = Cli::try_parse_from([
            "fitbell-kiosk",
            "sizes",
            "--email",
            "owner@store.test",
            "remove",
            "tops",
            "t1",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Sizes {
                action: SizesAction::Remove {
                    category: SizeCategory::Tops,
                    ..
                },
                ..
            }
        ));
    }
}
