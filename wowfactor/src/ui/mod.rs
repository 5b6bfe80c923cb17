//! Terminal presentation: retro header, colours, tables.

pub mod header;
pub mod prompt;
pub mod table;

use console::{Style, Term};

pub const CONSOLE_WIDTH: usize = 80;

pub fn magenta() -> Style {
    Style::new().magenta().bright()
}

pub fn cyan() -> Style {
    Style::new().cyan().bright()
}

pub fn yellow() -> Style {
    Style::new().yellow().bright()
}

pub fn green() -> Style {
    Style::new().green().bright()
}

pub fn red() -> Style {
    Style::new().red()
}

pub fn separator() {
    println!("{}", "-".repeat(CONSOLE_WIDTH));
}

pub fn clear_screen() {
    let term = Term::stdout();
    if term.is_term() {
        let _ = term.clear_screen();
    }
}

/// `text` centred in the console width.
pub fn centered(text: &str) -> String {
    console::pad_str(text, CONSOLE_WIDTH, console::Alignment::Center, None).into_owned()
}
