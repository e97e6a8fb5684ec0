use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{ArgGroup, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    import_order, install_mods, list_mods, move_mod, set_file_state, set_mod_enabled, FileAction,
    ImportOrderArgs, InstallModsArgs, ListModsArgs, MoveModArgs, SetFileStateArgs,
};
use miette::Result;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show the load order
    List {
        /// Print the load order as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enable a mod
    Enable { name: String },
    /// Disable a mod
    Disable { name: String },
    /// Move a mod to a position in the load order (1 = first)
    Move { name: String, position: usize },
    /// Enable, disable or reset a single file of a mod
    #[command(group(ArgGroup::new("action").required(true).args(["enable", "disable", "clear"])))]
    File {
        name: String,
        /// Path of the file relative to the mod folder
        path: String,
        #[arg(long)]
        enable: bool,
        #[arg(long)]
        disable: bool,
        /// Remove the override so the file follows the default
        #[arg(long)]
        clear: bool,
    },
    /// Reorder mods from an exported load order file
    Import {
        /// JSON or plain text file with one mod name per line
        file_path: String,
    },
    /// Install enabled mods into the target directory
    Install {
        /// Compare file contents instead of size and modification time
        #[arg(long)]
        hash: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set the directory that holds one folder per mod
    SetSource { path: String },
    /// Set the directory mods are installed into
    SetTarget { path: String },
    /// Reset the configuration to defaults
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "modstage=info,modstage_install=info,modstage_core=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| miette::miette!("Failed to initialize logging: {}", e))
}

fn main() -> Result<()> {
    init_logging()?;

    let args = parse_args();

    match args.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::show_config(),
            ConfigCommands::SetSource { path } => commands::set_source_root(path),
            ConfigCommands::SetTarget { path } => commands::set_target_root(path),
            ConfigCommands::Reset => commands::reset_config(),
        },
        Commands::List { json } => list_mods(ListModsArgs { json }),
        Commands::Enable { name } => set_mod_enabled(name, true),
        Commands::Disable { name } => set_mod_enabled(name, false),
        Commands::Move { name, position } => move_mod(MoveModArgs { name, position }),
        Commands::File {
            name,
            path,
            enable,
            disable,
            clear: _,
        } => {
            let action = if enable {
                FileAction::Enable
            } else if disable {
                FileAction::Disable
            } else {
                FileAction::Clear
            };
            set_file_state(SetFileStateArgs { name, path, action })
        }
        Commands::Import { file_path } => import_order(ImportOrderArgs { file_path }),
        Commands::Install { hash } => install_mods(InstallModsArgs { hash }),
    }
}
