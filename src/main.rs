use clap::Parser;

use scanty::cli::{Cli, Commands};
use scanty::config::{get_config, init_config_from};
use scanty::interfaces::cli::run_cli;
use scanty::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_config_from(&cli.config) {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    let config = get_config();

    // `config` 只输出示例配置，不初始化日志
    let _guard = match cli.command {
        Commands::Config { .. } => None,
        _ => Some(init_logging(&config.logging)),
    };

    if let Err(e) = run_cli(cli.command, &config).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
