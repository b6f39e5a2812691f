// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagnostics bridge: surfaces runtime warnings and errors next to the dialogue.

use std::fmt;
use std::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::Level;

/// A warning or error captured by the [`DiagnosticBridge`] layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub level: Severity,
    /// Formatted message
    pub message: String,
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Degraded but continuing (missing translations, stale choices)
    Warn,
    /// The traversal or configuration failed
    Error,
}

impl Severity {
    fn from_level(level: &Level) -> Option<Self> {
        match *level {
            Level::WARN => Some(Self::Warn),
            Level::ERROR => Some(Self::Error),
            _ => None,
        }
    }

    /// Short tag shown in the terminal
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.tag(), self.message)
    }
}

/// A `tracing_subscriber::Layer` that forwards warnings and errors over an
/// `mpsc` channel so the player can print them between dialogue beats
pub struct DiagnosticBridge {
    sender: mpsc::Sender<Diagnostic>,
}

impl DiagnosticBridge {
    /// Create a new bridge and return `(layer, receiver)`
    pub fn new() -> (Self, mpsc::Receiver<Diagnostic>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for DiagnosticBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let Some(level) = Severity::from_level(event.metadata().level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let _ = self.sender.send(Diagnostic {
            level,
            message: visitor.message,
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else if self.message.is_empty() {
            self.message = format!("{} = {value:?}", field.name());
        } else {
            self.message.push_str(&format!(", {} = {value:?}", field.name()));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else if self.message.is_empty() {
            self.message = format!("{} = {value}", field.name());
        } else {
            self.message.push_str(&format!(", {} = {value}", field.name()));
        }
    }
}
