//! Interactive chat loop backed by `rustyline`.
//!
//! Plain lines go to the [`Responder`]; lines starting with `/` are
//! parsed into a [`SlashCommand`] and handled locally.

use anyhow::{Result, bail};
use console::{Style, Term, style};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing::debug;

use super::ask::print_exchange;
use super::truncate;
use crate::responder::Responder;

/// Entries shown by `/history` without an argument.
const DEFAULT_HISTORY: usize = 5;

/// Width of the horizontal rules in banners.
const RULE_WIDTH: usize = 40;

/// Commands available inside the chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Quit,
    Help,
    ClearScreen,
    History(usize),
    Stats,
    Save,
    Forget,
}

impl SlashCommand {
    /// `(usage, description)` rows for `/help`.
    const USAGE: [(&'static str, &'static str); 7] = [
        ("/quit, /q", "leave the chat"),
        ("/help, /?", "show this list"),
        ("/clear", "clear the screen"),
        ("/history [n]", "show the last n turns"),
        ("/stats", "memory statistics"),
        ("/save", "write a snapshot now"),
        ("/forget", "erase all remembered turns"),
    ];

    /// Parse the text after the leading `/`.
    pub fn parse(input: &str) -> Result<Self> {
        let mut words = input.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();

        let command = match name {
            "quit" | "q" | "exit" => Self::Quit,
            "help" | "h" | "?" => Self::Help,
            "clear" | "cls" => Self::ClearScreen,
            "history" => Self::History(match arg {
                Some(n) => n.parse()?,
                None => DEFAULT_HISTORY,
            }),
            "stats" => Self::Stats,
            "save" => Self::Save,
            "forget" => Self::Forget,
            "" => bail!("missing command name after '/'"),
            other => bail!("unknown command /{other}"),
        };
        Ok(command)
    }
}

/// Whether the loop keeps reading after a command.
enum Next {
    Read,
    Stop,
}

/// A chat session over one responder.
pub struct Repl {
    responder: Responder,
    editor: Editor<(), DefaultHistory>,
    verbose: bool,
}

impl Repl {
    pub fn new(responder: Responder, verbose: bool) -> Result<Self> {
        let editor = Editor::with_config(
            Config::builder()
                .auto_add_history(true)
                .history_ignore_space(true)
                .build(),
        )?;
        Ok(Self {
            responder,
            editor,
            verbose,
        })
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Read lines until `/quit`, end of input, or a terminal error.
    pub fn run(&mut self) -> Result<()> {
        self.banner();
        let prompt = format!("{} ", style("you ›").cyan().bold());

        loop {
            let line = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    note("^C ignored, use /quit or Ctrl+D to leave");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    complain(&format!("cannot read input: {e}"));
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let next = match line.strip_prefix('/') {
                Some(command) => match SlashCommand::parse(command) {
                    Ok(command) => self.execute(command).unwrap_or_else(|e| {
                        complain(&e.to_string());
                        Next::Read
                    }),
                    Err(e) => {
                        complain(&format!("{e} (try /help)"));
                        Next::Read
                    }
                },
                None => {
                    self.converse(line);
                    Next::Read
                }
            };

            if let Next::Stop = next {
                break;
            }
        }

        note("Bye.");
        Ok(())
    }

    fn converse(&self, line: &str) {
        match self.responder.respond(line) {
            Ok(exchange) => {
                println!();
                print_exchange(&exchange, self.verbose);
                println!();
            }
            Err(e) => complain(&e.to_string()),
        }
    }

    fn execute(&self, command: SlashCommand) -> Result<Next> {
        debug!(?command, "Slash command");
        let store = self.responder.store();

        match command {
            SlashCommand::Quit => return Ok(Next::Stop),
            SlashCommand::Help => print_usage(),
            SlashCommand::ClearScreen => Term::stdout().clear_screen()?,
            SlashCommand::History(limit) => {
                let page = store.history(None, limit);
                if page.entries.is_empty() {
                    note("Nothing remembered yet.");
                }
                for entry in &page.entries {
                    println!(
                        "{} {}",
                        style(format!("[{}]", entry.topic)).cyan(),
                        truncate(&entry.user_text, 70)
                    );
                    note(&format!("    {}", truncate(&entry.response_preview, 70)));
                }
            }
            SlashCommand::Stats => {
                let stats = store.stats();
                println!(
                    "{}/{} turns · {} topics · context used in {:.0}%",
                    stats.total_turns,
                    stats.capacity,
                    stats.unique_topics,
                    stats.context_usage_ratio * 100.0
                );
            }
            SlashCommand::Save => {
                store.save()?;
                note("Snapshot written.");
            }
            SlashCommand::Forget => {
                store.clear()?;
                note("All turns forgotten.");
            }
        }
        Ok(Next::Read)
    }

    fn banner(&self) {
        println!();
        println!("{}", style("Parley Chat").bold().cyan());
        note(&"─".repeat(RULE_WIDTH));
        note(&format!(
            "Remembering {} earlier turns. /help lists commands.",
            self.responder.store().len()
        ));
        println!();
    }
}

fn print_usage() {
    println!();
    println!("{}", style("Commands").bold());
    note(&"─".repeat(RULE_WIDTH));
    for (usage, description) in SlashCommand::USAGE {
        println!("  {:<14} {}", style(usage).cyan(), description);
    }
    println!();
    note("Ctrl+C cancels the current line, Ctrl+D leaves.");
    println!();
}

fn note(msg: &str) {
    println!("{}", Style::new().dim().apply_to(msg));
}

fn complain(msg: &str) {
    println!("{} {}", Style::new().red().apply_to("✗"), msg);
}
