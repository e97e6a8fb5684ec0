use crate::commands::Session;
use crate::errors::CliError;
use crate::println_pad;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use modstage_core::LoadOrderState;

pub struct ListModsArgs {
    pub json: bool,
}

pub fn list_mods(args: ListModsArgs) -> Result<()> {
    let session = Session::open()?;

    if args.json {
        let state = LoadOrderState::from_list(&session.mods);
        println!("{}", serde_json::to_string_pretty(&state).into_diagnostic()?);
        return Ok(());
    }

    if session.mods.is_empty() {
        println_pad!("{}", "No mods found in the source directory.".bright_yellow());
        return Ok(());
    }

    let enabled = session.mods.iter().filter(|m| m.is_enabled).count();
    println_pad!(
        "{} {}",
        "📚 Load order:".bright_blue().bold(),
        format!("{} mods, {} enabled", session.mods.len(), enabled).dimmed()
    );
    println!();

    for (idx, entry) in session.mods.iter().enumerate() {
        let folder = entry.target_folder_name().map_err(CliError::from)?;
        let state = if entry.is_enabled {
            "●".bright_green()
        } else {
            "○".bright_red()
        };
        let name = if entry.is_enabled {
            folder.bright_white().bold()
        } else {
            folder.dimmed()
        };

        let disabled_files = entry.file_overrides.values().filter(|v| !**v).count();
        if disabled_files > 0 {
            println_pad!(
                "{:>4}. {} {} {}",
                idx + 1,
                state,
                name,
                format!("({} file(s) disabled)", disabled_files).bright_yellow()
            );
        } else {
            println_pad!("{:>4}. {} {}", idx + 1, state, name);
        }
    }

    Ok(())
}
