// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-based terminal front end.
//!
//! Prints each presentation as a numbered list of choices and reads the
//! player's answer from the input, one command per line.

use crate::diagnostics::Diagnostic;
use dialogue_runtime::{DialogueEvent, DialogueSession, Presentation, TerminationReason};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick the choice at this zero-based index
    Choose(usize),
    /// Switch to the named language
    Language(String),
    /// List available languages
    Languages,
    /// Restart the dialogue from its entry node
    Restart,
    /// Show the command help
    Help,
    /// Leave the player
    Quit,
    /// Anything else
    Unknown(String),
}

impl Command {
    /// Parse one input line
    ///
    /// Choices are accepted as `1`-`4` or `a`-`d`; commands start with `:`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(':') {
            let (name, arg) = match rest.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (rest, ""),
            };
            return match name {
                "lang" | "language" if !arg.is_empty() => Self::Language(arg.to_string()),
                "lang" | "language" | "langs" => Self::Languages,
                "restart" => Self::Restart,
                "help" => Self::Help,
                "quit" | "q" => Self::Quit,
                _ => Self::Unknown(line.to_string()),
            };
        }

        if let Ok(number) = line.parse::<usize>() {
            if number > 0 {
                return Self::Choose(number - 1);
            }
        }

        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some(c @ ('a'..='d' | 'A'..='D')), None) => {
                Self::Choose(usize::from(c.to_ascii_lowercase() as u8 - b'a'))
            }
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "Commands: 1-4 or a-d to choose, :lang <name>, :langs, :restart, :help, :quit";

/// Terminal front end over any line reader and writer
pub struct Terminal<R, W> {
    input: R,
    output: W,
    events: Receiver<DialogueEvent>,
    diagnostics: Option<Receiver<Diagnostic>>,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Create a terminal reading `input` and writing `output`
    pub fn new(
        input: R,
        output: W,
        events: Receiver<DialogueEvent>,
        diagnostics: Option<Receiver<Diagnostic>>,
    ) -> Self {
        Self {
            input,
            output,
            events,
            diagnostics,
        }
    }

    /// Start the session and run until `:quit` or end of input
    pub fn run(&mut self, session: &mut DialogueSession) -> io::Result<()> {
        if let Err(err) = session.start() {
            tracing::debug!("Dialogue did not start: {err}");
        }

        loop {
            self.flush()?;
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(());
            }

            match Command::parse(&line) {
                Command::Choose(index) => self.choose(session, index)?,
                Command::Language(name) => {
                    if let Err(err) = session.set_language(&name) {
                        tracing::debug!("Language switch rejected: {err}");
                    }
                }
                Command::Languages => {
                    let current = session.catalog().current_language().map(|l| l.name.clone());
                    for language in session.catalog().available_languages() {
                        let marker = if Some(&language.name) == current.as_ref() { "*" } else { " " };
                        writeln!(self.output, " {marker} {}", language.name)?;
                    }
                }
                Command::Restart => {
                    session.restart();
                    if let Err(err) = session.start() {
                        tracing::debug!("Dialogue did not restart: {err}");
                    }
                }
                Command::Help => writeln!(self.output, "{HELP}")?,
                Command::Quit => return Ok(()),
                Command::Unknown(text) => writeln!(self.output, "Unknown input '{text}'. {HELP}")?,
            }
        }
    }

    fn choose(&mut self, session: &mut DialogueSession, index: usize) -> io::Result<()> {
        let Some(presentation) = session.presentation() else {
            return writeln!(self.output, "Nothing to choose right now.");
        };
        let Some(choice) = presentation.choices.get(index) else {
            return writeln!(self.output, "There is no choice {}.", index + 1);
        };

        if let Err(err) = session.choose_at(presentation.step, &choice.id) {
            tracing::debug!("Choice '{}' rejected: {err}", choice.id);
        }
        Ok(())
    }

    /// Print pending diagnostics, then pending dialogue events
    fn flush(&mut self) -> io::Result<()> {
        if let Some(diagnostics) = &self.diagnostics {
            for diagnostic in diagnostics.try_iter() {
                writeln!(self.output, "{diagnostic}")?;
            }
        }

        let events: Vec<_> = self.events.try_iter().collect();
        for event in events {
            match event {
                DialogueEvent::PresentationChanged(presentation) => self.present(&presentation)?,
                DialogueEvent::TraversalTerminated(reason) => {
                    writeln!(self.output, "-- {} --", describe(reason))?;
                    writeln!(self.output, "(:restart to play again, :quit to leave)")?;
                }
            }
        }
        Ok(())
    }

    fn present(&mut self, presentation: &Presentation) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", presentation.line)?;
        for (i, choice) in presentation.choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, choice.text)?;
        }
        Ok(())
    }

    /// Give back the writer
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

fn describe(reason: TerminationReason) -> &'static str {
    match reason {
        TerminationReason::NoEntryNode => "This dialogue has no beginning",
        TerminationReason::UnknownNodeKind => "The dialogue cannot continue",
        TerminationReason::NoOutgoingEdge => "End of dialogue",
    }
}
