// SPDX-License-Identifier: MIT OR Apache-2.0
//! Terminal dialogue player.
//!
//! Loads a dialogue graph and its language files from a RON configuration
//! and plays the dialogue on stdin/stdout:
//!
//! ```text
//! dialogue_player [path/to/dialogue.ron]
//! ```

mod config;
mod diagnostics;
mod terminal;

use config::{PlayerConfig, DEFAULT_CONFIG_FILE};
use diagnostics::DiagnosticBridge;
use dialogue_runtime::DialogueSession;
use std::path::PathBuf;
use std::sync::mpsc;
use terminal::Terminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    // Logging directives live in the config, so it is read before logging exists
    let config = match PlayerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("dialogue_player: {e}");
            std::process::exit(2);
        }
    };

    let (bridge_layer, diagnostics_rx) = DiagnosticBridge::new();

    let mut env_filter = EnvFilter::from_default_env();
    for directive in &config.log.directives {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("dialogue_player: ignoring log directive '{directive}': {e}"),
        }
    }

    let inline = config.log.inline_diagnostics;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(inline.then_some(bridge_layer))
        .init();

    tracing::info!("Starting dialogue player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&config, inline.then_some(diagnostics_rx)) {
        tracing::error!("Dialogue player failed: {e}");
        std::process::exit(1);
    }
}

fn run(
    config: &PlayerConfig,
    diagnostics: Option<mpsc::Receiver<diagnostics::Diagnostic>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = config.load_graph()?;
    let catalog = config.load_catalog()?;

    let (events_tx, events_rx) = mpsc::channel();
    let mut session = DialogueSession::new(graph, catalog, events_tx);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut terminal = Terminal::new(stdin.lock(), stdout.lock(), events_rx, diagnostics);
    terminal.run(&mut session)?;

    tracing::info!("Dialogue player finished");
    Ok(())
}
