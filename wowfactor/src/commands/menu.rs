//! The interactive benchmark interface.

use anyhow::Result;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use wowfactor_core::signal::StopSignal;
use wowfactor_env::EnvLayout;

use super::bench::{ask_batch, ask_run_mode, execute_run, run_batch};
use super::scores::{clean_invalid, compare_cpu, show, View};
use super::AppContext;
use crate::ui::header::print_header;
use crate::ui::prompt::Prompt;
use crate::ui::{cyan, green, separator, yellow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RunSingle,
    RunBatch,
    BestPerMachine,
    CompareCpu,
    AllScores,
    ClearInvalid,
    Quit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::RunSingle,
        MenuChoice::RunBatch,
        MenuChoice::BestPerMachine,
        MenuChoice::CompareCpu,
        MenuChoice::AllScores,
        MenuChoice::ClearInvalid,
        MenuChoice::Quit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MenuChoice::RunSingle => "1",
            MenuChoice::RunBatch => "2",
            MenuChoice::BestPerMachine => "3",
            MenuChoice::CompareCpu => "4",
            MenuChoice::AllScores => "5",
            MenuChoice::ClearInvalid => "6",
            MenuChoice::Quit => "q",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuChoice::RunSingle => "Run New Benchmark",
            MenuChoice::RunBatch => "Run Batch Benchmark",
            MenuChoice::BestPerMachine => "View Best Score per Machine",
            MenuChoice::CompareCpu => "Compare a Specific CPU",
            MenuChoice::AllScores => "View All Scores (Full List)",
            MenuChoice::ClearInvalid => "Clear Invalid Scores",
            MenuChoice::Quit => "Quit",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == input)
    }
}

/// Tab-completes menu keys.
struct MenuHelper;

impl Completer for MenuHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let typed = line[..pos].trim_start();
        let start = pos - typed.len();
        let candidates = MenuChoice::ALL
            .iter()
            .map(|c| c.key())
            .filter(|k| k.starts_with(typed))
            .map(String::from)
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for MenuHelper {
    type Hint = String;
}

impl Highlighter for MenuHelper {}

impl Validator for MenuHelper {}

impl Helper for MenuHelper {}

/// rustyline-backed prompt. Remembers whether the user pressed Ctrl+C or
/// Ctrl+D so the menu can end the session.
struct LinePrompt {
    editor: Editor<MenuHelper, DefaultHistory>,
    ended: bool,
}

impl LinePrompt {
    fn new() -> Result<Self> {
        let mut editor = Editor::<MenuHelper, DefaultHistory>::new()
            .map_err(|e| anyhow::anyhow!("Failed to create line editor: {}", e))?;
        editor.set_helper(Some(MenuHelper));
        Ok(Self {
            editor,
            ended: false,
        })
    }
}

impl Prompt for LinePrompt {
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.ended {
            return Ok(None);
        }
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                self.ended = true;
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to read input: {}", e)),
        }
    }
}

fn print_menu() {
    print_header("BENCHMARK INTERFACE");
    for choice in MenuChoice::ALL {
        println!(
            "  {} {}",
            yellow().apply_to(format!("{}.", choice.key())),
            cyan().apply_to(choice.description())
        );
    }
    separator();
}

fn perform(
    ctx: &AppContext,
    env: Option<&EnvLayout>,
    choice: MenuChoice,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let store = ctx.store();
    let stop = StopSignal::global();
    match choice {
        MenuChoice::RunSingle => {
            print_header("RUN NEW BENCHMARK");
            println!(
                "{}",
                cyan().apply_to("This will run a high-speed, automated test of the app's core functions.")
            );
            separator();
            if let Some(mode) = ask_run_mode(prompt)? {
                execute_run(&store, env, mode, stop);
            }
        }
        MenuChoice::RunBatch => {
            print_header("RUN BATCH BENCHMARK");
            println!("{}", cyan().apply_to("Run multiple, consecutive benchmark tests."));
            separator();
            if let Some((runs, secs)) = ask_batch(prompt)? {
                run_batch(&store, env, runs, secs, stop);
            }
        }
        MenuChoice::BestPerMachine => show(&store, &View::BestPerMachine)?,
        MenuChoice::CompareCpu => compare_cpu(&store, prompt)?,
        MenuChoice::AllScores => show(&store, &View::All)?,
        MenuChoice::ClearInvalid => {
            clean_invalid(&store, prompt, false, false)?;
        }
        MenuChoice::Quit => {}
    }
    Ok(())
}

/// `wowfactor` / `wowfactor menu`
pub fn run_menu(ctx: &AppContext, env: Option<&EnvLayout>) -> Result<i32> {
    tracing::info!("==================== Application Session Started ====================");
    let mut prompt = LinePrompt::new()?;
    loop {
        print_menu();
        let Some(input) = prompt.ask(&yellow().apply_to("Awaiting command> ").to_string())? else {
            break;
        };
        let Some(choice) = MenuChoice::parse(&input) else {
            println!("{}", yellow().apply_to("COMMAND NOT RECOGNIZED."));
            std::thread::sleep(std::time::Duration::from_secs(1));
            continue;
        };
        tracing::info!(
            "User chose '{}' from 'Benchmark Interface' menu",
            choice.description()
        );
        if choice == MenuChoice::Quit {
            tracing::info!("==================== Application Session Ended ====================");
            println!("\n{}", green().apply_to("Exiting. Goodbye!"));
            return Ok(0);
        }
        perform(ctx, env, choice, &mut prompt)?;
        if prompt.ended {
            break;
        }
        let back = yellow()
            .apply_to("\nPress Enter to return to Benchmark Interface...")
            .to_string();
        if prompt.ask(&back)?.is_none() {
            break;
        }
    }
    println!("\n\n{}", yellow().apply_to("Application terminated by user."));
    tracing::warn!("Application terminated by user (Ctrl+C)");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_keys() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::RunSingle));
        assert_eq!(MenuChoice::parse(" 6 "), Some(MenuChoice::ClearInvalid));
        assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_menu_keys_are_unique() {
        let mut keys: Vec<&str> = MenuChoice::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), MenuChoice::ALL.len());
    }

    #[test]
    fn test_completion_candidates() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, found) = MenuHelper.complete("  q", 3, &ctx).unwrap();
        assert_eq!(start, 2);
        assert_eq!(found, vec!["q"]);
        let (_, all) = MenuHelper.complete("", 0, &ctx).unwrap();
        assert_eq!(all.len(), 7);
    }
}
