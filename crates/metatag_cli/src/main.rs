use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use metatag_cli::commands::{self, RenderRequest, parse_key_value};
use metatag_cli::logging::init_logging;
use metatag_core::config::load_engine_config;
use metatag_core::model::SpecialPage;
use metatag_store::SqliteDefaultsStore;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "metatag")]
struct Cli {
    #[arg(long, short = 'c', global = true, default_value = "metatag.yaml")]
    config: PathBuf,
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpecialArg {
    Front,
    #[value(name = "403")]
    Forbidden,
    #[value(name = "404")]
    NotFound,
}

impl From<SpecialArg> for SpecialPage {
    fn from(value: SpecialArg) -> Self {
        match value {
            SpecialArg::Front => SpecialPage::Front,
            SpecialArg::Forbidden => SpecialPage::Forbidden,
            SpecialArg::NotFound => SpecialPage::NotFound,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Write install defaults for records not yet stored.")]
    Seed,
    #[command(about = "List defaults records, global first.")]
    List,
    #[command(about = "Print one defaults record as YAML.")]
    Show { id: String },
    #[command(about = "Reset a protected record to its install defaults.")]
    Revert { id: String },
    #[command(about = "Delete a bundle-level record.")]
    Delete { id: String },
    #[command(about = "Save defaults records from a YAML list.")]
    Import { records: PathBuf },
    #[command(about = "List registered tags by group.")]
    Tags {
        #[arg(long)]
        group: Option<String>,
    },
    #[command(about = "Print head markup for a page.")]
    Render {
        #[arg(long, value_enum, conflicts_with_all = ["entity_type", "bundle"])]
        special: Option<SpecialArg>,
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long, requires = "entity_type")]
        bundle: Option<String>,
        #[arg(long)]
        langcode: Option<String>,
        #[arg(long = "token", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        tokens: Vec<(String, String)>,
        #[arg(long = "override", value_name = "TAG=VALUE", value_parser = parse_key_value)]
        overrides: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_engine_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let store_path = commands::store_path(&cli.config, &config, cli.store.as_deref());
    debug!(path = %store_path.display(), "opening defaults store");
    let mut store = SqliteDefaultsStore::open(&store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;

    let output = match cli.command {
        Command::Seed => commands::seed(&mut store)?,
        Command::List => commands::list(&store, &config)?,
        Command::Show { id } => commands::show(&store, &id)?,
        Command::Revert { id } => commands::revert(&mut store, &config, &id)?,
        Command::Delete { id } => commands::delete(&mut store, &config, &id)?,
        Command::Import { records } => commands::import(&mut store, &records)?,
        Command::Tags { group } => commands::tags(&config, group.as_deref())?,
        Command::Render {
            special,
            entity_type,
            bundle,
            langcode,
            tokens,
            overrides,
        } => {
            let request = RenderRequest {
                special: special.map(SpecialPage::from),
                entity_type,
                bundle,
                langcode,
                tokens,
                overrides,
            };
            commands::render(store, &config, &request)?
        }
    };
    print!("{output}");
    Ok(())
}
