use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use vocab_cli::commands;
use vocab_cli::config::AppConfig;
use vocab_cli::feedback::FeedbackScheduler;
use vocab_cli::state::AppState;
use vocab_core::{FlagKind, HomeworkStatus, ImportOutcome, PartOfSpeech, SpellingOutcome};

#[derive(Parser)]
#[command(name = "vocab", about = "Kids vocabulary trainer", version)]
struct Cli {
    /// Data directory (overrides VOCAB_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word
    Add {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        word: String,
        meaning: String,
    },

    /// Edit a word's text or meaning
    Edit {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        word: String,
        meaning: String,
        #[arg(long)]
        new_word: Option<String>,
        #[arg(long)]
        new_meaning: Option<String>,
    },

    /// Delete a word
    Delete {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        word: String,
        meaning: String,
    },

    /// List words for a part of speech
    List {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
    },

    /// Set or clear a favorite/learned/required flag
    Flag {
        #[arg(value_parser = parse_flag)]
        kind: FlagKind,
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        word: String,
        meaning: String,
        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// List words carrying a flag
    Flagged {
        #[arg(value_parser = parse_flag)]
        kind: FlagKind,
    },

    /// Top up a part of speech from the starter deck
    Autofill {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        #[arg(long, default_value_t = 12)]
        target: usize,
    },

    /// Homework cycle
    Homework {
        #[command(subcommand)]
        action: HomeworkAction,
    },

    /// Export this cycle's homework pack
    Export {
        /// Output directory (default: <data-dir>/exports)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Import a homework pack file
    Import { file: PathBuf },

    /// Practice spelling with letter tiles
    Spell {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
        #[arg(long, default_value_t = 5)]
        rounds: usize,
        /// Show a hint if no answer arrives within this many milliseconds
        #[arg(long, default_value_t = 8000)]
        hint_after_ms: u64,
    },
}

#[derive(Subcommand)]
enum HomeworkAction {
    /// Show the current cycle (advancing it if due)
    Show,
    /// Advance if the cycle window has elapsed
    Refresh,
    /// Start the next cycle now
    Advance,
    Active,
    Pause,
    /// Clear the assignment
    Stop,
    History,
    /// Words assigned for one part of speech
    Words {
        #[arg(value_parser = parse_pos)]
        pos: PartOfSpeech,
    },
}

fn parse_pos(s: &str) -> Result<PartOfSpeech, String> {
    match PartOfSpeech::parse_lossy(s) {
        PartOfSpeech::Other if s.trim().to_lowercase() != "other" => {
            Err(format!("unknown part of speech: {s}"))
        }
        pos => Ok(pos),
    }
}

fn parse_flag(s: &str) -> Result<FlagKind, String> {
    FlagKind::ALL
        .into_iter()
        .find(|k| k.as_str() == s.trim().to_lowercase())
        .ok_or_else(|| format!("unknown flag: {s} (favorite, learned, required)"))
}

fn emit<T: Serialize>(json: bool, value: &T, plain: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        plain(value);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vocab_cli::init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().with_data_dir(cli.data_dir.clone());
    let state = vocab_cli::open_state(&config)
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;

    run(cli, &config, state).await
}

async fn run(cli: Cli, config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let json = cli.json;
    let now = Utc::now();

    match cli.command {
        Command::Add { pos, word, meaning } => {
            let added = commands::add_word(&state, pos, &word, &meaning)?;
            emit(json, &added, |added| {
                if *added {
                    println!("added {word} ({pos})");
                } else {
                    println!("{word} is already in the list");
                }
            })?;
        }
        Command::Edit {
            pos,
            word,
            meaning,
            new_word,
            new_meaning,
        } => {
            let updated = commands::edit_word(
                &state,
                pos,
                &word,
                &meaning,
                new_word.as_deref(),
                new_meaning.as_deref(),
            )?;
            emit(json, &updated, |updated| match updated {
                Some(w) => println!("{}: {}", w.word, w.meaning),
                None => println!("nothing to change"),
            })?;
        }
        Command::Delete { pos, word, meaning } => {
            let deleted = commands::delete_word(&state, pos, &word, &meaning)?;
            emit(json, &deleted, |deleted| {
                if *deleted {
                    println!("deleted {word}");
                } else {
                    println!("{word} was not in the list");
                }
            })?;
        }
        Command::List { pos } => {
            let cards = commands::list_words(&state, pos)?;
            emit(json, &cards, |cards| {
                for view in cards {
                    let mut marks = String::new();
                    if view.favorite {
                        marks.push('*');
                    }
                    if view.learned {
                        marks.push('+');
                    }
                    if view.required {
                        marks.push('!');
                    }
                    println!("{:<3} {:<16} {}", marks, view.card.word, view.card.meanings.join(" / "));
                }
            })?;
        }
        Command::Flag {
            kind,
            pos,
            word,
            meaning,
            off,
        } => {
            commands::set_flag(&state, kind, pos, &word, &meaning, !off)?;
            if !json {
                println!("{} {} {}", if off { "cleared" } else { "set" }, kind.as_str(), word);
            }
        }
        Command::Flagged { kind } => {
            let words = commands::flagged_words(&state, kind)?;
            emit(json, &words, |words| {
                for w in words {
                    println!("{:<10} {:<16} {}", w.pos, w.word, w.meaning);
                }
            })?;
        }
        Command::Autofill { pos, target } => {
            let added = commands::autofill(&state, pos, target)?;
            emit(json, &added, |added| println!("added {added} {pos} words"))?;
        }
        Command::Homework { action } => run_homework(&state, action, json)?,
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.export_dir());
            let result = commands::export_pack(&state, &dir)?;
            emit(json, &result, |r| {
                println!("exported {} words to {}", r.total_count, r.path.display())
            })?;
        }
        Command::Import { file } => {
            let outcome = commands::import_pack(&state, &file, now)?;
            emit(json, &outcome, |outcome| match outcome {
                ImportOutcome::AlreadyImported { id } => {
                    println!("{id} is already up to date")
                }
                ImportOutcome::Imported { id, added, items } => {
                    println!("imported {id}: {items} words, {added} new")
                }
            })?;
        }
        Command::Spell {
            pos,
            rounds,
            hint_after_ms,
        } => spell(&state, pos, rounds, Duration::from_millis(hint_after_ms)).await?,
    }

    Ok(())
}

fn run_homework(state: &AppState, action: HomeworkAction, json: bool) -> anyhow::Result<()> {
    let now = Utc::now();
    let print_state = |s: &vocab_core::HomeworkState| {
        println!(
            "{}, cycle {} ({} + {}) since {}",
            s.status.as_str(),
            s.cycle_index,
            s.pair.parts()[0],
            s.pair.parts()[1],
            s.cycle_start.format("%Y-%m-%d")
        )
    };

    match action {
        HomeworkAction::Show | HomeworkAction::Refresh => {
            let overview = commands::get_homework(state, now)?;
            emit(json, &overview, |o| {
                if o.advanced {
                    println!("started a new cycle");
                }
                print_state(&o.state);
                println!("due {}", o.cycle_end.format("%Y-%m-%d"));
                if matches!(action, HomeworkAction::Show) {
                    for a in &o.assignments {
                        let words: Vec<&str> = a.words.iter().map(|w| w.word.as_str()).collect();
                        println!("{}: {}", a.pos, words.join(", "));
                    }
                }
            })?;
        }
        HomeworkAction::Advance => {
            let s = commands::advance_homework(state, now)?;
            emit(json, &s, print_state)?;
        }
        HomeworkAction::Active | HomeworkAction::Pause | HomeworkAction::Stop => {
            let status = match action {
                HomeworkAction::Active => HomeworkStatus::Active,
                HomeworkAction::Pause => HomeworkStatus::Paused,
                _ => HomeworkStatus::Unassigned,
            };
            let s = commands::set_homework_status(state, status, now)?;
            emit(json, &s, print_state)?;
        }
        HomeworkAction::History => {
            let history = commands::homework_history(state)?;
            emit(json, &history, |history| {
                for h in history {
                    println!(
                        "{}  {:<6} cycle {:<3} {} words ({} available)",
                        h.entry.timestamp.format("%Y-%m-%d"),
                        h.entry.status.as_str(),
                        h.entry.cycle_index,
                        h.entry.word_count,
                        h.words.len()
                    );
                }
            })?;
        }
        HomeworkAction::Words { pos } => {
            let words = commands::homework_words(state, pos)?;
            emit(json, &words, |words| {
                for w in words {
                    println!("{:<16} {}", w.word, w.meaning);
                }
            })?;
        }
    }
    Ok(())
}

async fn spell(
    state: &AppState,
    pos: PartOfSpeech,
    rounds: usize,
    hint_after: Duration,
) -> anyhow::Result<()> {
    let scheduler = FeedbackScheduler::new();
    let mut correct = 0;

    for n in 1..=rounds {
        let picked = {
            let mut rng = rand::thread_rng();
            commands::new_round(state, pos, &mut rng)?
        };
        let Some((word, mut round)) = picked else {
            bail!("no {pos} words yet, try `vocab autofill {pos}`");
        };

        let tiles: Vec<String> = round.tiles().iter().map(|t| t.letter.to_string()).collect();
        println!("\n[{n}/{rounds}] {}   tiles: {}", word.meaning, tiles.join(" "));
        print!("> ");
        io::stdout().flush()?;

        if let Some((slot, letter)) = round.hint() {
            let _ = scheduler.schedule(hint_after, move || {
                println!("\nhint: letter {} is '{}'", slot + 1, letter);
            });
        }

        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await??;
        scheduler.supersede();

        round.spell(line.trim());
        match round.check() {
            SpellingOutcome::Correct => {
                correct += 1;
                println!("correct!");
            }
            SpellingOutcome::Incomplete | SpellingOutcome::Incorrect => {
                println!("not quite, it was {}", round.answer());
            }
        }
    }

    println!("\n{correct}/{rounds} correct");
    Ok(())
}
