// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help text and status output.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;
use vigil_core::InstanceStatus;

pub mod codes {
    /// Section headers and ids: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders and secondary text: medium grey
    pub const MUTED: u8 = 245;
    pub const GOOD: u8 = 108;
    pub const BAD: u8 = 167;
    pub const WARN: u8 = 179;
}

/// `NO_COLOR=1` disables, `COLOR=1` forces, otherwise only on a TTY.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Clap help styles in the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    Styles::styled()
        .header(fg(codes::HEADER))
        .literal(fg(codes::LITERAL))
        .placeholder(fg(codes::MUTED))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Color a status label by the supervision state it describes.
pub fn status(label: &str, status: InstanceStatus) -> String {
    let code = match status {
        InstanceStatus::Running => codes::HEADER,
        InstanceStatus::Completed => codes::GOOD,
        InstanceStatus::Failed => codes::BAD,
        InstanceStatus::Cancelled => codes::WARN,
    };
    paint(code, label)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
