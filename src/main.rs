use anyhow::{Result, anyhow};
use calloop::EventLoop;
use calloop::channel::{Event, channel};
use clap::{Parser, Subcommand};
use launchpad::config::{Config, load_config, load_config_from};
use launchpad::executor::Executor;
use launchpad::launcher::Launcher;
use launchpad::matcher::{QueryCell, Scorer};
use launchpad::model::Action;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Search once and print the ranked results
    Query {
        text: String,
        /// Activate a result (the first one when no index is given)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "0")]
        activate: Option<usize>,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Rank lines from stdin and print the best match
    Dmenu {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Treat every stdin line as the new search text.
    /// `:open [N]`, `:up`, `:down` and `:quit` are commands.
    Repl {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

struct Ui {
    launcher: Launcher,
    limit: usize,
    updated: bool,
    should_exit: bool,
}

impl Ui {
    fn print_results(&self) {
        let results = self.launcher.results();
        if results.is_empty() {
            println!("(no results)");
        }
        for (i, result) in results.iter().take(self.limit).enumerate() {
            let marker = if i == self.launcher.selected_index() { '>' } else { ' ' };
            match &result.secondary_text {
                Some(secondary) => println!("{marker}{i:>3}  {}  ({secondary})", result.display_text),
                None => println!("{marker}{i:>3}  {}", result.display_text),
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        let Some(command) = line.strip_prefix(':') else {
            self.launcher.on_query_changed(line);
            return;
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("quit"), _) => self.should_exit = true,
            (Some("up"), _) => {
                self.launcher.move_selection(-1);
                self.print_results();
            }
            (Some("down"), _) => {
                self.launcher.move_selection(1);
                self.print_results();
            }
            (Some("open"), index) => {
                let index = index.and_then(|i| i.parse().ok());
                // Failures are already logged by the launcher.
                if self.launcher.on_activate(index).is_ok() {
                    self.should_exit = true;
                }
            }
            _ => eprintln!("unknown command {:?}", line),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match args.mode {
        Mode::Query { text, activate, limit } => run_query(&config, &text, activate, limit),
        Mode::Dmenu { query } => dmenu(&query, config.general.match_generic_name),
        Mode::Repl { limit } => run_repl(&config, limit),
    }
}

/// The event loop standing in for the UI thread, with search results wired in.
fn setup(config: &Config, limit: usize) -> Result<(EventLoop<'static, Ui>, Ui)> {
    let event_loop: EventLoop<Ui> = EventLoop::try_new()?;
    let (tx_results, rx_results) = channel();
    let ui = Ui {
        launcher: Launcher::from_config(config, tx_results),
        limit,
        updated: false,
        should_exit: false,
    };

    event_loop.handle().insert_source(rx_results, |event, _, ui: &mut Ui| {
        if let Event::Msg(outcome) = event {
            if ui.launcher.on_results(outcome) {
                ui.updated = true;
                ui.print_results();
            }
        }
    }).map_err(|e| anyhow!("could not register result channel: {}", e.error))?;

    Ok((event_loop, ui))
}

fn run_query(config: &Config, text: &str, activate: Option<usize>, limit: usize) -> Result<()> {
    let (mut event_loop, mut ui) = setup(config, limit)?;
    ui.launcher.on_query_changed(text);
    while !ui.updated {
        event_loop.dispatch(None, &mut ui)?;
    }
    if let Some(index) = activate {
        ui.launcher.on_activate(Some(index))?;
    }
    Ok(())
}

fn run_repl(config: &Config, limit: usize) -> Result<()> {
    let (mut event_loop, mut ui) = setup(config, limit)?;

    let (tx_lines, rx_lines) = channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx_lines.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("Could not read stdin: {}", e),
            }
        }
    });

    event_loop.handle().insert_source(rx_lines, |event, _, ui: &mut Ui| match event {
        Event::Msg(line) => ui.handle_line(&line),
        Event::Closed => ui.should_exit = true,
    }).map_err(|e| anyhow!("could not register stdin channel: {}", e.error))?;

    while !ui.should_exit {
        event_loop.dispatch(None, &mut ui)?;
    }
    Ok(())
}

/// Ranks stdin lines for `query` and prints the best one, or the query itself
/// when nothing matches.
fn dmenu(query: &str, match_generic_name: bool) -> Result<()> {
    let mut options = Vec::new();
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) => options.push(line),
            Err(e) => log::warn!("Skipping unreadable stdin line: {}", e),
        }
    }

    let scorer = Scorer::new(QueryCell::new(query), match_generic_name);
    let choice = match scorer.rank(&options).first() {
        Some(&best) => options.swap_remove(best),
        None => query.to_string(),
    };
    Executor::default().run(&Action::Print(choice))?;
    Ok(())
}
