//! Terminal client for the flashcard library.
//!
//! The binary in `main.rs` parses arguments and hands off to the command
//! handlers in [`commands`]; everything that touches the terminal lives in
//! [`display`] and [`study`].

pub mod commands;
pub mod config;
pub mod db;
pub mod display;
pub mod generate;
pub mod state;
pub mod study;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
