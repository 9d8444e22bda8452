use chrono::Utc;
use colored::Colorize;
use tracing::info;

use crate::config::StaticConfig;
use crate::errors::{Result, ScantyError};
use crate::services::LinkService;
use crate::utils::parse_expires;

pub async fn save_link(service: &LinkService, url: String, expires: Option<String>) -> Result<()> {
    let expires = expires
        .as_deref()
        .map(|raw| parse_expires(raw, Utc::now()))
        .transpose()?;

    let code = service.save(&url, expires).await?;

    match expires {
        Some(at) => println!(
            "{} {} -> {} (expires: {})",
            "✓".bold().green(),
            code.cyan(),
            url.blue().underline(),
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string().yellow()
        ),
        None => println!(
            "{} {} -> {}",
            "✓".bold().green(),
            code.cyan(),
            url.blue().underline()
        ),
    }
    Ok(())
}

pub async fn load_link(service: &LinkService, code: String) -> Result<()> {
    let url = service.load(&code).await?;
    println!("{}", url);
    Ok(())
}

pub async fn link_info(service: &LinkService, code: String) -> Result<()> {
    let item = service.load_info(&code).await?;

    println!("{} {}", "code:".bold(), code.cyan());
    println!("{} {}", "id:".bold(), item.id);
    println!("{} {}", "url:".bold(), item.url.blue().underline());
    match item.expires {
        Some(at) => println!(
            "{} {}",
            "expires:".bold(),
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string().yellow()
        ),
        None => println!("{} {}", "expires:".bold(), "never".dimmed()),
    }
    println!("{} {}", "visits:".bold(), item.visits);
    Ok(())
}

pub async fn show_stat(service: &LinkService) -> Result<()> {
    let stat = service.stat().await?;
    println!("{}", serde_json::to_string_pretty(&stat)?);
    Ok(())
}

pub async fn clean_expired(service: &LinkService) -> Result<()> {
    if !service.backend().capabilities().clean_expired {
        println!(
            "{} {} expires links on its own, nothing to do",
            "ℹ".bold().blue(),
            service.backend().name()
        );
        return Ok(());
    }

    let removed = service.clean_expired().await?;
    println!("{} Removed {} expired links", "✓".bold().green(), removed);
    Ok(())
}

pub async fn run_until_interrupted() -> Result<()> {
    info!("Running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ScantyError::file_operation(format!("等待退出信号失败: {}", e)))?;
    info!("Shutdown signal received");
    Ok(())
}

pub fn generate_config(output_path: Option<String>, force: bool) -> Result<()> {
    let sample = StaticConfig::generate_sample_config();

    let Some(path) = output_path else {
        print!("{}", sample);
        return Ok(());
    };

    if std::path::Path::new(&path).exists() && !force {
        return Err(ScantyError::file_operation(format!(
            "{} already exists, use --force to overwrite",
            path
        )));
    }

    std::fs::write(&path, sample)?;
    println!(
        "{} Configuration written to {}",
        "✓".bold().green(),
        path.blue()
    );
    Ok(())
}
