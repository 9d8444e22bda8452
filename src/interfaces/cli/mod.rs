//! CLI interface module
//!
//! Every command except `config` opens a `LinkService` from the loaded
//! configuration and closes it before returning.

pub mod commands;

use crate::cli::Commands;
use crate::config::StaticConfig;
use crate::errors::Result;
use crate::services::LinkService;

/// Run one CLI command
pub async fn run_cli(command: Commands, config: &StaticConfig) -> Result<()> {
    if let Commands::Config { output_path, force } = command {
        return commands::generate_config(output_path, force);
    }

    let service = LinkService::from_config(config).await?;
    let result = match command {
        Commands::Save { url, expires } => commands::save_link(&service, url, expires).await,
        Commands::Load { code } => commands::load_link(&service, code).await,
        Commands::Info { code } => commands::link_info(&service, code).await,
        Commands::Stat => commands::show_stat(&service).await,
        Commands::Clean => commands::clean_expired(&service).await,
        Commands::Run => commands::run_until_interrupted().await,
        Commands::Config { .. } => Ok(()),
    };

    // 无论命令成功与否都要按顺序关闭
    let closed = service.close().await;
    result.and(closed)
}
