use colored::Colorize;
use std::fmt::Display;
use std::io::{self, Write};

/// Where human-facing output goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stream {
    #[default]
    Stdout,
    /// Used when stdout carries a document meant to be piped
    Stderr,
}

impl Stream {
    fn line(self, text: impl Display) {
        match self {
            Self::Stdout => {
                println!("{text}");
                let _ = io::stdout().flush();
            }
            Self::Stderr => eprintln!("{text}"),
        }
    }
}

/// Print a status message with a spinner-like indicator
pub fn status_message_to(stream: Stream, message: &str) {
    stream.line(format!("{} {} ... ", "⏳".yellow(), message.bright_white()));
}

/// Print a success message
pub fn success_message(message: &str) {
    success_message_to(Stream::Stdout, message);
}

pub fn success_message_to(stream: Stream, message: &str) {
    stream.line(format!("{} {}", "✅".green(), message.green()));
}

/// Print a warning message
pub fn warning_message(message: &str) {
    warning_message_to(Stream::Stdout, message);
}

pub fn warning_message_to(stream: Stream, message: &str) {
    stream.line(format!("{} {}", "⚠️ ".yellow(), message.yellow()));
}

/// Print an error message
pub fn error_message(message: &str) {
    eprintln!("{} {}", "Error:".bold().red(), message.red());
}

/// Print a section header to separate logical sections of output
pub fn section_header_to(stream: Stream, title: &str) {
    stream.line(format!("\n{}", format!("==== {title} ====").cyan().bold()));
}

/// Print a simple informational message
pub fn info_message(message: &str) {
    println!("{} {}", "ℹ️ ".blue(), message.blue());
}

/// Print an indented detail line, used for verbose output
pub fn detail_message_to(stream: Stream, message: &str) {
    stream.line(format!("   {}", message.dimmed()));
}

/// Print a verbose note on stderr, keeping stdout free for piped output
pub fn note_message(message: &str) {
    eprintln!("{}", message.dimmed());
}
