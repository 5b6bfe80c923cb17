//! Line-oriented questions to the user.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use wowfactor_core::signal::StopSignal;

use super::{cyan, red, separator, yellow};

pub trait Prompt {
    /// One line of input without the newline; `None` once input has ended or
    /// the user interrupted.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Plain stdin, for non-interactive subcommands. Ctrl+C only flips the stop
/// flag while `read_line` blocks, so a line typed after it counts as ended input.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let stop = StopSignal::global();
        stop.reset();
        Ok(read_answer(&mut io::stdin().lock(), stop)?)
    }
}

fn read_answer<R: BufRead>(input: &mut R, stop: &StopSignal) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 || stop.is_set() {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Ask until the answer is `y` or `n`. Ended input counts as no.
pub fn confirm(prompt: &mut dyn Prompt, question: &str) -> Result<bool> {
    let text = yellow().apply_to(format!("{} (y/n): ", question)).to_string();
    loop {
        let Some(answer) = prompt.ask(&text)? else {
            return Ok(false);
        };
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("{}", red().apply_to("Invalid input. Please enter 'y' or 'n'.")),
        }
    }
}

/// Numbered pick from `items`; `None` when the user backs out with `b`.
pub fn choose(prompt: &mut dyn Prompt, items: &[String], item_name: &str) -> Result<Option<usize>> {
    if items.is_empty() {
        println!("{}", yellow().apply_to(format!("No {}s available.", item_name)));
        return Ok(None);
    }
    separator();
    println!("{}", cyan().apply_to(format!("Select a {}:", item_name)));
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }
    let text = cyan()
        .apply_to(format!("Enter choice (1-{}) or 'b' to go back: ", items.len()))
        .to_string();
    loop {
        let Some(answer) = prompt.ask(&text)? else {
            return Ok(None);
        };
        let answer = answer.trim().to_lowercase();
        if answer == "b" {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => return Ok(Some(n - 1)),
            Ok(_) => println!(
                "{}",
                red().apply_to(format!("Please enter a number between 1 and {}.", items.len()))
            ),
            Err(_) => println!("{}", red().apply_to("Invalid input. Please enter a number or 'b'.")),
        }
    }
}
