// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketdesk - marketplace back office.
//!
//! Binary entry point: the HTTP server, one-shot syncs, and config checks.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marketdesk_config::model::MarketdeskConfig;

/// Marketdesk - marketplace back office.
#[derive(Parser, Debug)]
#[command(name = "marketdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Run one full sync for a connected marketplace and print the report.
    Sync {
        /// Marketplace to sync.
        #[arg(long)]
        marketplace_id: i64,
        /// User owning the integration. Defaults to `server.default_user_id`.
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Load and validate configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> MarketdeskConfig {
    let loaded = match path {
        Some(path) => marketdesk_config::load_and_validate_path(path),
        None => marketdesk_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            marketdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Sync {
            marketplace_id,
            user_id,
        }) => sync::run_sync(config, marketplace_id, user_id).await,
        Some(Commands::CheckConfig) => {
            eprintln!(
                "marketdesk: config ok (database={}, listen={}:{})",
                config.storage.database_path, config.server.host, config.server.port
            );
            Ok(())
        }
        None => {
            println!("marketdesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = marketdesk_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.app.name, "marketdesk");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn sync_subcommand_parses_ids() {
        let cli = Cli::parse_from([
            "marketdesk",
            "--config",
            "/tmp/marketdesk.toml",
            "sync",
            "--marketplace-id",
            "1",
            "--user-id",
            "7",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/marketdesk.toml")));
        match cli.command {
            Some(Commands::Sync {
                marketplace_id,
                user_id,
            }) => {
                assert_eq!(marketplace_id, 1);
                assert_eq!(user_id, Some(7));
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn sync_requires_marketplace_id() {
        assert!(Cli::try_parse_from(["marketdesk", "sync"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
