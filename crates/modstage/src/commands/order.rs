use crate::commands::Session;
use crate::errors::CliError;
use crate::println_pad;
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use modstage_core::import::{self, MatchKind};

pub fn set_mod_enabled(name: String, enabled: bool) -> Result<()> {
    let mut session = Session::open()?;
    session
        .mods
        .set_enabled(&name, enabled)
        .map_err(CliError::from)?;
    session.save()?;

    let verb = if enabled { "enabled" } else { "disabled" };
    println!(
        "{} {}",
        format!("✓ {}", verb).bright_green().bold(),
        name.bright_white()
    );
    Ok(())
}

pub struct MoveModArgs {
    pub name: String,
    /// 1-based position as shown by `list`.
    pub position: usize,
}

pub fn move_mod(args: MoveModArgs) -> Result<()> {
    let mut session = Session::open()?;
    session
        .mods
        .reorder(&args.name, args.position.saturating_sub(1))
        .map_err(CliError::from)?;
    session.save()?;

    let entry = session
        .mods
        .get(&args.name)
        .ok_or_else(|| CliError::from(modstage_core::Error::ModNotFound(args.name.clone())))?;
    let folder = entry.target_folder_name().map_err(CliError::from)?;

    println!(
        "{} {} {}",
        "✓ Moved".bright_green().bold(),
        args.name.bright_white(),
        format!("to position {} ({})", entry.order + 1, folder).dimmed()
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Enable,
    Disable,
    Clear,
}

pub struct SetFileStateArgs {
    pub name: String,
    pub path: String,
    pub action: FileAction,
}

pub fn set_file_state(args: SetFileStateArgs) -> Result<()> {
    let mut session = Session::open()?;
    let rel = modstage_core::normalize_rel_path(&args.path);

    if let Some(entry) = session.mods.get(&args.name) {
        if !entry.source_path.join(&rel).as_std_path().is_file() {
            println!(
                "  {} {}",
                "⚠ No such file in the mod source:".bright_yellow(),
                rel
            );
        }
    }

    let message = match args.action {
        FileAction::Enable => {
            session
                .mods
                .set_file_override(&args.name, &rel, true)
                .map_err(CliError::from)?;
            "enabled"
        }
        FileAction::Disable => {
            session
                .mods
                .set_file_override(&args.name, &rel, false)
                .map_err(CliError::from)?;
            "disabled"
        }
        FileAction::Clear => {
            let existed = session
                .mods
                .clear_file_override(&args.name, &rel)
                .map_err(CliError::from)?;
            if existed {
                "reset to default"
            } else {
                "had no override"
            }
        }
    };
    session.save()?;

    println!(
        "{} {} {}",
        "✓".bright_green().bold(),
        format!("{}/{}", args.name, rel).bright_white(),
        message.dimmed()
    );
    Ok(())
}

pub struct ImportOrderArgs {
    pub file_path: String,
}

pub fn import_order(args: ImportOrderArgs) -> Result<()> {
    let path = Utf8PathBuf::from(args.file_path);
    let text = std::fs::read_to_string(&path).map_err(CliError::from)?;
    let names =
        import::parse_order_file(&text).map_err(|e| CliError::invalid_order_file(path.clone(), e))?;

    let mut session = Session::open()?;
    let result = import::match_names(&names, &session.mods);
    session.mods.apply_import(&result);
    session.save()?;

    println_pad!(
        "{} {}",
        "📥 Imported order from".bright_blue().bold(),
        path.as_str().bright_cyan()
    );
    println!();

    for m in &result.matched {
        let kind = match m.kind {
            MatchKind::Exact => "exact".bright_green(),
            MatchKind::Prefixed => "prefix".bright_cyan(),
            MatchKind::Normalized => "normalized".bright_cyan(),
            MatchKind::Similar => "similar".bright_yellow(),
        };
        if m.imported == m.mod_name {
            println_pad!("   {} {} {}", "•".bright_cyan(), m.mod_name, kind);
        } else {
            println_pad!(
                "   {} {} {} {} {}",
                "•".bright_cyan(),
                m.imported.dimmed(),
                "→".dimmed(),
                m.mod_name,
                kind
            );
        }
    }

    if !result.unmatched.is_empty() {
        println!();
        println_pad!(
            "{}",
            format!("⚠ {} name(s) did not match any mod:", result.unmatched.len()).bright_yellow()
        );
        for name in &result.unmatched {
            println_pad!("   {} {}", "•".bright_red(), name);
        }
    }

    println!();
    println_pad!(
        "{} {}",
        "✓".bright_green().bold(),
        format!(
            "{} of {} mods placed at the front of the load order",
            result.matched.len(),
            session.mods.len()
        )
        .bright_white()
    );
    Ok(())
}
