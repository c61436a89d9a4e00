use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use services::{CueError, CuePlayer, GameEngine, GameSnapshot};
use simon_core::model::{CueId, LevelConfig, LevelId, Phase, Symbol};

//
// ─── AUDIO ─────────────────────────────────────────────────────────────────────
//

/// Stand-in audio backend: a terminal bell plus a fixed cue length.
pub struct TerminalCuePlayer {
    length: Duration,
}

impl Default for TerminalCuePlayer {
    fn default() -> Self {
        Self {
            length: Duration::from_millis(250),
        }
    }
}

#[async_trait]
impl CuePlayer for TerminalCuePlayer {
    async fn play_cue(&self, cue: CueId) -> Result<(), CueError> {
        log::trace!("playing {cue}");
        eprint!("\x07");
        tokio::time::sleep(self.length).await;
        Ok(())
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn board(symbols: u8, lit: Option<Symbol>) -> String {
    (0..symbols)
        .map(|i| {
            if lit == Some(Symbol::new(i)) {
                format!("({i})")
            } else {
                format!(" {i} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(previous: &GameSnapshot, current: &GameSnapshot) -> Option<String> {
    if current.phase != previous.phase {
        return match current.phase {
            Phase::Idle => Some("game stopped".to_owned()),
            Phase::Preparing => None,
            Phase::ComputerTurn => Some(format!("round {}: watch", current.sequence_length)),
            Phase::PlayerTurn => Some(format!(
                "your turn: repeat {} symbol(s)",
                current.sequence_length
            )),
            Phase::RoundComplete => Some(format!("cleared! score {}", current.score)),
            Phase::GameOver => Some(format!(
                "game over: score {} (best {}). r = restart, q = quit",
                current.score, current.best_score
            )),
        };
    }
    None
}

fn spawn_renderer(mut rx: watch::Receiver<GameSnapshot>, symbols: u8) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().clone();
            if let Some(line) = describe(&previous, &current) {
                println!("{line}");
            }
            if current.active_symbol.is_some() && current.active_symbol != previous.active_symbol {
                println!("  {}", board(symbols, current.active_symbol));
            }
            previous = current;
        }
    })
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Press(Symbol),
    Restart,
    Quit,
}

/// Digits are presses, `r` restarts, `q` quits; anything else is skipped.
fn parse_line(line: &str) -> Vec<Input> {
    line.chars()
        .filter_map(|c| match c {
            '0'..='9' => c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .map(|d| Input::Press(Symbol::new(d))),
            'r' | 'R' => Some(Input::Restart),
            'q' | 'Q' => Some(Input::Quit),
            _ => None,
        })
        .collect()
}

/// Interactive game on stdin/stdout.
///
/// # Errors
///
/// Returns an error if the game cannot start or stdin fails.
pub async fn play(engine: &GameEngine, level: LevelId) -> Result<(), Box<dyn std::error::Error>> {
    let symbols = LevelConfig::load(level)?.symbol_count();
    println!("symbols: {}", board(symbols, None));
    println!("type the symbols you saw (e.g. `2 0 3`) and press enter");

    let renderer = spawn_renderer(engine.subscribe(), symbols);
    engine.start_game(level)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    'input: while let Some(line) = lines.next_line().await? {
        for input in parse_line(&line) {
            match input {
                Input::Press(symbol) => {
                    engine.submit_press(symbol);
                }
                Input::Restart => engine.start_game(level)?,
                Input::Quit => break 'input,
            }
        }
    }

    engine.cancel();
    renderer.abort();
    if let Some(summary) = engine.last_summary() {
        println!(
            "last game: {} rounds, score {}, best {}",
            summary.rounds_reached(),
            summary.final_score(),
            summary.best_score()
        );
    }
    Ok(())
}

/// Autopilot: clears `rounds` rounds, then misses on purpose.
///
/// # Errors
///
/// Returns an error if the game cannot start.
pub async fn demo(
    engine: &GameEngine,
    level: LevelId,
    rounds: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbols = LevelConfig::load(level)?.symbol_count();
    let renderer = spawn_renderer(engine.subscribe(), symbols);
    let mut rx = engine.subscribe();
    engine.start_game(level)?;

    for round in 0..=rounds {
        rx.wait_for(|s| s.is_player_turn).await?;
        let sequence = engine.sequence();
        let presses: Vec<Symbol> = if round < rounds {
            sequence
        } else {
            let first = sequence.first().map_or(0, Symbol::value);
            vec![Symbol::new((first + 1) % symbols)]
        };
        for symbol in presses {
            tokio::time::sleep(Duration::from_millis(150)).await;
            println!("  press {symbol}");
            engine.submit_press(symbol);
        }
    }

    rx.wait_for(|s| s.phase == Phase::GameOver).await?;
    // Let the renderer print the final line before shutting it down.
    tokio::time::sleep(Duration::from_millis(50)).await;
    renderer.abort();

    if let Some(summary) = engine.last_summary() {
        println!(
            "demo finished after {} rounds in {}s",
            summary.rounds_reached(),
            summary.duration().num_seconds()
        );
    }
    Ok(())
}
