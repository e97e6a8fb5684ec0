use crate::commands::Session;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::print_ansi_boxed_lines;
use colored::Colorize;
use miette::Result;
use modstage_install::{FileComparison, InstallProgress, InstallStage, Installer};
use std::io::Write;

pub struct InstallModsArgs {
    /// Compare file contents instead of size and modification time.
    pub hash: bool,
}

fn print_progress(progress: InstallProgress) {
    let line = match progress.stage {
        InstallStage::Preparing => return,
        InstallStage::Cleaning => format!("{}", "🧹 Removing stale files...".bright_yellow()),
        InstallStage::Copying => format!(
            "{} {}/{} {}",
            format!("[{:>3}%]", progress.percentage).bright_cyan(),
            progress.installed_count + 1,
            progress.total,
            progress.current_mod.unwrap_or_default().bright_white()
        ),
        InstallStage::Complete => format!(
            "{} {}/{}",
            format!("[{:>3}%]", progress.percentage).bright_cyan(),
            progress.installed_count,
            progress.total
        ),
    };

    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "\r\x1b[2K    {}", line);
    if progress.stage == InstallStage::Complete {
        let _ = writeln!(stdout);
    }
    let _ = stdout.flush();
}

pub fn install_mods(args: InstallModsArgs) -> Result<()> {
    let session = Session::open()?;
    let target_root = session
        .config
        .target_root
        .clone()
        .ok_or(CliError::TargetRootNotSet)?;

    let comparison = if args.hash {
        FileComparison::ContentHash
    } else {
        session.config.comparison
    };

    println_pad!(
        "{} {}",
        "📦 Installing into".bright_blue().bold(),
        target_root.as_str().bright_cyan()
    );

    let summary = Installer::new(target_root)
        .with_comparison(comparison)
        .with_protected_files(session.config.protected_files.clone())
        .with_progress(print_progress)
        .install(session.mods.entries())
        .map_err(CliError::from)?;

    println!();
    let mut lines = vec![
        format!(
            "{} {}/{}",
            "Mods installed:".bright_white().bold(),
            summary.installed_count,
            summary.total
        ),
        format!(
            "{} {}",
            "Files copied:".bright_white().bold(),
            summary.files_copied.to_string().bright_green()
        ),
        format!(
            "{} {}",
            "Files up to date:".bright_white().bold(),
            summary.files_skipped
        ),
        format!(
            "{} {} directories, {} files",
            "Removed:".bright_white().bold(),
            summary.directories_removed,
            summary.files_removed
        ),
        format!(
            "{} {:.2?}",
            "Elapsed:".bright_white().bold(),
            summary.elapsed
        ),
    ];
    if summary.error_count() > 0 {
        lines.push(format!(
            "{} {}",
            "Errors:".bright_white().bold(),
            summary.error_count().to_string().bright_red().bold()
        ));
    }
    print_ansi_boxed_lines(&lines);

    if summary.error_count() > 0 {
        println!();
        println_pad!("{}", "⚠ Some entries could not be processed:".bright_yellow());
        for failure in &summary.failures {
            println_pad!(
                "   {} {:?} {}: {}",
                "•".bright_red(),
                failure.operation,
                failure.path,
                failure.message.dimmed()
            );
        }
    } else {
        println!();
        println!("{}", "✅ Install complete!".bright_green().bold());
    }

    Ok(())
}
