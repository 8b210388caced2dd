use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use kata_core::{
    catalog::{Catalog, CatalogLoader, CatalogStore, HttpSource, LoadHandle},
    config::Config,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{quote, sum, tokens};

#[derive(Parser, Debug)]
#[command(name = "kata", about)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sum 1..=n with all three strategies
    Sum(sum::Sum),

    /// List every token that has a price
    Tokens(tokens::Tokens),

    /// Convert an amount between two tokens
    Quote(quote::Quote),
}

impl Cli {
    pub(crate) async fn run(self, config: Config, shutdown_token: CancellationToken) -> eyre::Result<()> {
        match self.command {
            Commands::Sum(cmd) => cmd.run(),
            Commands::Tokens(cmd) => {
                let catalog = load_catalog(&config, shutdown_token).await?;
                cmd.run(&catalog)
            }
            Commands::Quote(cmd) => {
                let catalog = load_catalog(&config, shutdown_token).await?;
                cmd.run(&catalog)
            }
        }
    }
}

/// Runs one load attempt tied to `shutdown_token`; a shutdown while loading
/// leaves the store empty.
async fn load_catalog(config: &Config, shutdown_token: CancellationToken) -> eyre::Result<Arc<Catalog>> {
    let source = HttpSource::from_config(config)?;
    let loader = Arc::new(CatalogLoader::new(source, config.icon_suffix.as_str()));
    let store = CatalogStore::new();

    info!(icons_url = %config.icons_url, prices_url = %config.prices_url, "loading token catalog");
    let committed = LoadHandle::spawn(loader, store.clone(), shutdown_token.child_token()).await?;
    if !committed {
        warn!("catalog load was cancelled");
    }

    Ok(store.current())
}
