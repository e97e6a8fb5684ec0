use crate::errors::CliError;
use crate::utils::config::{self, AppConfig};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use modstage_install::FileComparison;

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8PathBuf>) {
    match path {
        Some(p) => {
            let status = if p.as_std_path().is_dir() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", format!("{}:", name).bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

pub fn show_config() -> Result<()> {
    let cfg = config::load_config();
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let load_order_path = cfg
        .load_order_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("  {} {}", "config_file:".bright_white(), config_path);
    print_path_config("source_root", cfg.source_root.as_ref());
    print_path_config("target_root", cfg.target_root.as_ref());
    println!("  {} {}", "load_order_path:".bright_white(), load_order_path);

    let comparison = match cfg.comparison {
        FileComparison::SizeAndMtime => "size and modification time",
        FileComparison::ContentHash => "content hash",
    };
    println!("  {} {}", "comparison:".bright_white(), comparison);

    if cfg.protected_files.is_empty() {
        println!(
            "  {} {}",
            "protected_files:".bright_white(),
            "(none)".dimmed()
        );
    } else {
        println!(
            "  {} {}",
            "protected_files:".bright_white(),
            cfg.protected_files.join(", ")
        );
    }

    println!();
    Ok(())
}

fn update_config(update: impl FnOnce(&mut AppConfig)) -> Result<()> {
    let mut cfg = config::load_config();
    update(&mut cfg);
    config::save_config(&cfg).map_err(CliError::config_save_failed)?;
    Ok(())
}

pub fn set_source_root(path: String) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    if !path.as_std_path().is_dir() {
        return Err(CliError::directory_not_found(path).into());
    }

    update_config(|cfg| cfg.source_root = Some(path.clone()))?;

    println!(
        "{}",
        "✓ Source directory set successfully!".bright_green().bold()
    );
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn set_target_root(path: String) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    if !path.as_std_path().exists() {
        println!(
            "  {}",
            "The directory does not exist yet; it will be created on the first install."
                .bright_yellow()
        );
    }

    update_config(|cfg| cfg.target_root = Some(path.clone()))?;

    println!(
        "{}",
        "✓ Target directory set successfully!".bright_green().bold()
    );
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn reset_config() -> Result<()> {
    let config_path = config::default_config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    config::save_config(&AppConfig::default()).map_err(CliError::config_save_failed)?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), config_path);
    println!();
    println!(
        "  {}",
        "Run 'modstage config set-source <dir>' and 'modstage config set-target <dir>' to get started"
            .bright_cyan()
    );

    Ok(())
}
