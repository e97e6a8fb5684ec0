use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Source directory is not configured")]
    #[diagnostic(
        code(config::source_not_set),
        help("Run 'modstage config set-source <dir>' to point at the folder holding your mods")
    )]
    SourceRootNotSet,

    #[error("Target directory is not configured")]
    #[diagnostic(
        code(config::target_not_set),
        help("Run 'modstage config set-target <dir>' to choose where mods are installed")
    )]
    TargetRootNotSet,

    #[error("Load order file location could not be determined")]
    #[diagnostic(
        code(config::load_order_path),
        help("Set load_order_path in config.toml")
    )]
    LoadOrderPathUnknown,

    #[error("Directory not found: {path}")]
    #[diagnostic(
        code(file::directory_missing),
        help("Make sure the directory exists and the path is correct")
    )]
    DirectoryNotFound { path: Utf8PathBuf },

    #[error("Failed to save configuration")]
    #[diagnostic(
        code(config::save_failed),
        help("Check that the folder next to the modstage executable is writable")
    )]
    ConfigSaveFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read order file: {path}")]
    #[diagnostic(
        code(import::invalid_file),
        help("Expected a JSON array of names, a JSON array of objects with a 'name' field, or one name per line")
    )]
    InvalidOrderFile {
        path: Utf8PathBuf,
        #[source]
        source: modstage_core::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(mods::error))]
    Core(#[from] modstage_core::Error),

    #[error(transparent)]
    #[diagnostic(
        code(install::failed),
        help("The target directory may be partially updated; running install again reconciles it")
    )]
    Install(#[from] modstage_install::Error),

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn directory_not_found(path: Utf8PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    pub fn config_save_failed(source: std::io::Error) -> Self {
        Self::ConfigSaveFailed { source }
    }

    pub fn invalid_order_file(path: Utf8PathBuf, source: modstage_core::Error) -> Self {
        Self::InvalidOrderFile { path, source }
    }
}
