use std::{io::{Stdout, Write, stdout}, time::{Duration, Instant}};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use web_snake::Pixel;
use web_snake::game::Board;
use web_snake::host::{Hud, Paint, Rect, Surface};

pub type TermInt = u16;

// Each board cell is two characters wide so cells come out roughly square.
const CELL_CHARS: TermInt = 2;

/// What a key press means to the terminal host.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Key(String),
    PauseControl,
    NewGame,
    Quit,
    Ignore,
}

pub fn translate(ev: &KeyEvent) -> Command {
    if ev.modifiers.contains(KeyModifiers::CONTROL) {
        return match ev.code {
            KeyCode::Char('c') => Command::Quit,
            _ => Command::Ignore,
        };
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Command::Key("ArrowUp".to_string()),
        KeyCode::Char('a') | KeyCode::Left => Command::Key("ArrowLeft".to_string()),
        KeyCode::Char('s') | KeyCode::Down => Command::Key("ArrowDown".to_string()),
        KeyCode::Char('d') | KeyCode::Right => Command::Key("ArrowRight".to_string()),
        KeyCode::Char('n') => Command::NewGame,
        KeyCode::Char(c) => Command::Key(c.to_string()),
        KeyCode::Esc => Command::PauseControl,
        _ => Command::Ignore,
    }
}

/// Score and pause label shown under the board.
pub struct StatusLine {
    score: u32,
    label: String,
    paused: bool,
}

impl Default for StatusLine {
    fn default() -> Self {
        StatusLine { score: 0, label: "Pause".to_string(), paused: false }
    }
}

impl Hud for StatusLine {
    fn show_score(&mut self, score: u32) {
        self.score = score;
    }

    fn show_pause(&mut self, label: &str, paused: bool) {
        self.label = label.to_string();
        self.paused = paused;
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    cell: Pixel,
    cols: TermInt,
    rows: TermInt,
}

impl TermManager {
    pub fn new() -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(TermManager { width, height, stdout: stdout(), cell: 1, cols: 0, rows: 0 })
    }

    /// Picks the largest board, up to `max_cells` per side, that fits inside
    /// the border with a status line below. `None` if the terminal is too small.
    pub fn fit_board(&mut self, cell: Pixel, max_cells: Pixel) -> Option<Board> {
        let (cols, rows) = fit_cells(self.width, self.height, max_cells as TermInt)?;
        self.cell = cell;
        self.cols = cols;
        self.rows = rows;
        Board::new(cols as Pixel * cell, rows as Pixel * cell, cell)
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))?;
        self.draw_borders()
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        reset_screen(&mut self.stdout)
    }

    pub fn read_key_blocking(&self) -> crossterm::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Next key press before `deadline`, or `None` once it has passed.
    pub fn next_key_until(&self, deadline: Instant) -> crossterm::Result<Option<KeyEvent>> {
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left == Duration::from_millis(0) || !poll(left)? {
                return Ok(None);
            }
            if let Event::Key(ev) = read()? {
                return Ok(Some(ev));
            }
        }
    }

    pub fn show_message(&mut self, lines: &[&str]) -> crossterm::Result<()> {
        let inner = self.cols * CELL_CHARS;
        let top = 1 + self.rows.saturating_sub(lines.len() as TermInt) / 2;

        queue!(self.stdout, style::SetForegroundColor(Color::White), style::SetBackgroundColor(Color::DarkGrey))?;
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = inner as usize);
            queue!(self.stdout, cursor::MoveTo(1, top + i as TermInt), style::Print(padded_line))?;
        }
        queue!(self.stdout, style::ResetColor)?;

        self.flush()
    }

    pub fn draw_status(&mut self, status: &StatusLine) -> crossterm::Result<()> {
        let pause = if status.paused { format!("[{}]", status.label) } else { format!(" {} ", status.label) };
        let text = format!("Score: {}   {} (Esc)   New Game (n)", status.score, pause);
        let line = format!("{text: <width$}", text = text, width = self.width as usize);

        let status_row = self.rows + 2;
        queue!(self.stdout, cursor::MoveTo(0, status_row), style::Print(line))
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) -> crossterm::Result<()> {
        let width = self.cols * CELL_CHARS + 2;
        let height = self.rows + 2;
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    fn print_at(&mut self, pos: (TermInt, TermInt), ch: char) -> crossterm::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    fn paint_cell(&mut self, col: TermInt, row: TermInt, color: Color) -> crossterm::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(1 + col * CELL_CHARS, 1 + row),
            style::SetBackgroundColor(color),
            style::Print("  "),
            style::ResetColor
        )
    }
}

impl Surface for TermManager {
    type Error = crossterm::ErrorKind;

    fn fill_all(&mut self, paint: Paint) -> crossterm::Result<()> {
        if let Some(color) = term_color(paint) {
            for row in 0..self.rows {
                for col in 0..self.cols {
                    self.paint_cell(col, row, color)?;
                }
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) -> crossterm::Result<()> {
        let color = match term_color(paint) {
            Some(color) => color,
            None => return Ok(()),
        };

        let (cols, rows) = cells_covered(rect, self.cell, self.cols, self.rows);
        for row in rows {
            for col in cols.clone() {
                self.paint_cell(col, row, color)?;
            }
        }
        Ok(())
    }

    // Fonts mean nothing here; the text is centered on the row it lands on.
    fn fill_text(&mut self, text: &str, at: (Pixel, Pixel), _font: &str, paint: Paint) -> crossterm::Result<()> {
        let row = (at.1 / self.cell).clamp(0, self.rows as Pixel - 1) as TermInt;
        let inner = (self.cols * CELL_CHARS) as usize;
        let line = format!("{text: ^width$}", text = text, width = inner);

        queue!(
            self.stdout,
            cursor::MoveTo(1, 1 + row),
            style::SetForegroundColor(term_color(paint).unwrap_or(Color::White)),
            style::SetBackgroundColor(Color::DarkGrey),
            style::Print(line),
            style::ResetColor
        )
    }
}

/// Puts the screen back the way the shell had it: colours, cursor and the
/// main screen buffer.
pub fn reset_screen<W: Write>(out: &mut W) -> crossterm::Result<()> {
    execute!(out, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
}

/// Hands the terminal back before the panic message is printed, whether or
/// not logging is on.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = reset_screen(&mut stdout());
        log::error!("panic: {}", info);
        default_hook(info);
    }));
}

// A terminal has no alpha, so the scrim is skipped and the board stays visible.
fn term_color(paint: Paint) -> Option<Color> {
    match paint {
        Paint::Background => Some(Color::Rgb { r: 0xf0, g: 0xf0, b: 0xf0 }),
        Paint::Snake => Some(Color::Rgb { r: 0x4c, g: 0xaf, b: 0x50 }),
        Paint::Food => Some(Color::Rgb { r: 0xff, g: 0x57, b: 0x22 }),
        Paint::Text => Some(Color::White),
        Paint::Scrim => None,
    }
}

fn fit_cells(width: TermInt, height: TermInt, max_cells: TermInt) -> Option<(TermInt, TermInt)> {
    // Two border columns; border rows top and bottom plus the status line.
    let cols = (width.checked_sub(2)? / CELL_CHARS).min(max_cells);
    let rows = height.checked_sub(3)?.min(max_cells);
    if cols < 2 || rows < 2 {
        return None;
    }
    Some((cols, rows))
}

fn cells_covered(rect: Rect, cell: Pixel, cols: TermInt, rows: TermInt) -> (std::ops::Range<TermInt>, std::ops::Range<TermInt>) {
    let span = |start: Pixel, len: Pixel, limit: TermInt| {
        let first = (start / cell).clamp(0, limit as Pixel);
        let last = ((start + len - 1) / cell + 1).clamp(first, limit as Pixel);
        first as TermInt..last as TermInt
    };
    (span(rect.x, rect.width, cols), span(rect.y, rect.height, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_become_arrow_keys() {
        assert_eq!(translate(&key(KeyCode::Up)), Command::Key("ArrowUp".to_string()));
        assert_eq!(translate(&key(KeyCode::Char('a'))), Command::Key("ArrowLeft".to_string()));
        assert_eq!(translate(&key(KeyCode::Char('s'))), Command::Key("ArrowDown".to_string()));
        assert_eq!(translate(&key(KeyCode::Right)), Command::Key("ArrowRight".to_string()));
    }

    #[test]
    fn controls() {
        assert_eq!(translate(&key(KeyCode::Char('P'))), Command::Key("P".to_string()));
        assert_eq!(translate(&key(KeyCode::Esc)), Command::PauseControl);
        assert_eq!(translate(&key(KeyCode::Char('n'))), Command::NewGame);
        assert_eq!(translate(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Command::Quit);
        assert_eq!(translate(&key(KeyCode::Enter)), Command::Ignore);
    }

    #[test]
    fn board_fits_inside_the_terminal() {
        assert_eq!(fit_cells(80, 24, 20), Some((20, 20)));
        assert_eq!(fit_cells(30, 12, 20), Some((14, 9)));
        assert_eq!(fit_cells(4, 24, 20), None);
        assert_eq!(fit_cells(80, 2, 20), None);
    }

    #[test]
    fn rects_map_to_cells() {
        assert_eq!(cells_covered(Rect::new(40, 60, 19, 19), 20, 20, 20), (2..3, 3..4));
        assert_eq!(cells_covered(Rect::new(0, 0, 400, 400), 20, 10, 10), (0..10, 0..10));
    }

    #[test]
    fn reset_leaves_the_alternate_screen_and_shows_the_cursor() {
        let mut out: Vec<u8> = Vec::new();
        reset_screen(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"));
        assert!(written.contains("\x1b[?25h"));
    }

    #[test]
    fn status_line_tracks_the_hud() {
        let mut status = StatusLine::default();
        status.show_score(3);
        status.show_pause("Resume", true);
        assert_eq!(status.score, 3);
        assert_eq!(status.label, "Resume");
        assert!(status.paused);
    }
}
