//! Tamadex App - Application shell over the catalog and favorites crates.
//!
//! [`AppState`] wires the loaded [`tamadex_catalog::Catalog`], the search
//! service and both favorites stores together. The [`cli`] module exposes
//! them as a command-line tool that prints JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod error;
pub mod state;
pub mod views;

// Re-export commonly used types
pub use cli::{execute, Cli, Command, SearchScope};
pub use error::{AppError, Result};
pub use state::AppState;
pub use views::{CategoryView, CharacterView, EntityRef, ItemView, Stats};

/// Initialize tracing subscriber for logging.
///
/// Output goes to stderr so command output on stdout stays parseable.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tamadex=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
