mod term;

use std::fs::File;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, LevelFilter, WriteLogger};

use web_snake::config;
use web_snake::game::{Board, SnakeGame};
use crate::term::{Command, StatusLine, TermManager, install_panic_hook, translate};

fn main() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_logging()?;

    let mut term = TermManager::new().context("reading terminal size")?;
    let board = term
        .fit_board(config::GRID_SIZE, config::BOARD_CELLS)
        .context("terminal is too small to hold the board")?;

    install_panic_hook();
    term.setup().context("preparing the terminal")?;
    let res = play(&mut term, board);
    term.restore().context("restoring the terminal")?;
    res
}

fn init_logging() -> Result<()> {
    // stdout is the game screen, so log records go to a file.
    if !config::logging_enabled() {
        return Ok(());
    }

    let file = File::create(config::TERM_LOG_FILE)
        .with_context(|| format!("creating {}", config::TERM_LOG_FILE))?;
    WriteLogger::init(LevelFilter::Info, Config::default(), file).context("installing logger")?;
    Ok(())
}

fn play(term: &mut TermManager, board: Board) -> Result<()> {
    info!("starting snake: arrow keys or WASD to move, 'p' to pause, 'n' for a new game");

    term.show_message(&[
        "Arrow keys or WASD to move",
        "P or Esc to pause",
        "N for a new game",
        "CTRL+C to quit",
        "",
        "Press any key to begin",
    ])?;

    if translate(&term.read_key_blocking()?) == Command::Quit {
        return Ok(());
    }

    let mut game = SnakeGame::new(board, StatusLine::default(), StdRng::from_entropy());

    // Fixed delay between ticks; input is handled as it arrives in between.
    loop {
        let deadline = Instant::now() + config::TICK_INTERVAL;
        while let Some(ev) = term.next_key_until(deadline)? {
            match translate(&ev) {
                Command::Quit => {
                    info!("quit with score {}", game.score());
                    return Ok(());
                }
                Command::Key(key) => game.handle_input(&key),
                Command::PauseControl => game.pause_clicked(),
                Command::NewGame => game.new_game(),
                Command::Ignore => {}
            }
        }

        game.update();
        game.render(term)?;
        term.draw_status(game.hud())?;
        term.flush()?;
    }
}
