use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};

use crate::host::{Hud, Paint, Rect, Surface};
use crate::snake::{Collision, Direction::{self, *}, MoveResult, Point, Snake};
use crate::Pixel;

const OVERLAY_FONT: &str = "30px Arial";

/// Pixel size of the playing field and the grid cell everything snaps to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: Pixel,
    height: Pixel,
    cell: Pixel,
}

impl Board {
    /// `None` unless the board holds at least one whole cell each way.
    pub fn new(width: Pixel, height: Pixel, cell: Pixel) -> Option<Self> {
        if cell <= 0 || width < cell || height < cell {
            return None;
        }
        Some(Board { width, height, cell })
    }

    pub fn width(&self) -> Pixel {
        self.width
    }

    pub fn height(&self) -> Pixel {
        self.height
    }

    pub fn cell(&self) -> Pixel {
        self.cell
    }

    pub fn columns(&self) -> Pixel {
        self.width / self.cell
    }

    pub fn rows(&self) -> Pixel {
        self.height / self.cell
    }

    /// The grid cell nearest the middle of the board.
    pub fn center(&self) -> Point {
        Point::new(self.columns() / 2 * self.cell, self.rows() / 2 * self.cell)
    }

    fn random_cell(&self, rng: &mut impl Rng) -> Point {
        let x = rng.gen_range(0..self.columns()) * self.cell;
        let y = rng.gen_range(0..self.rows()) * self.cell;
        Point::new(x, y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Paused,
    GameOver,
}

/// What a single call to [`SnakeGame::update`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Moved,
    Ate,
    Crashed(Collision),
}

/// A key as the host reports it, e.g. `"ArrowUp"` or `"p"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Key {
    Turn(Direction),
    Pause,
    Other,
}

impl Key {
    fn parse(key: &str) -> Key {
        match key {
            "ArrowUp" => Key::Turn(Up),
            "ArrowDown" => Key::Turn(Down),
            "ArrowLeft" => Key::Turn(Left),
            "ArrowRight" => Key::Turn(Right),
            "p" | "P" => Key::Pause,
            _ => Key::Other,
        }
    }
}

pub struct SnakeGame<H, R = StdRng> {
    board: Board,
    snake: Snake,
    food: Point,
    score: u32,
    status: Status,
    hud: H,
    rng: R,
}

impl<H: Hud, R: Rng> SnakeGame<H, R> {
    pub fn new(board: Board, hud: H, rng: R) -> Self {
        info!(
            "board {}x{} pixels, grid size {}",
            board.width(),
            board.height(),
            board.cell()
        );

        let mut game = SnakeGame {
            board,
            snake: Snake::new(board.center(), Right),
            food: board.center(),
            score: 0,
            status: Status::Running,
            hud,
            rng,
        };
        game.initialize();
        game
    }

    /// Starts a fresh session: one segment in the middle heading right, new
    /// food, zero score.
    pub fn initialize(&mut self) {
        let start = self.board.center();

        self.snake = Snake::new(start, Right);
        self.score = 0;
        self.status = Status::Running;
        self.hud.show_score(self.score);
        self.spawn_food();
        self.refresh_pause_control();

        info!("game initialized, snake at {}", start);
    }

    pub fn update(&mut self) -> Tick {
        if self.status != Status::Running {
            return Tick::Idle;
        }

        let board = self.board;
        match self.snake.move_step(board.cell(), board.width(), board.height()) {
            MoveResult::Crashed { at, cause } => {
                self.status = Status::GameOver;
                warn!("game over: {:?} collision at {}", cause, at);
                Tick::Crashed(cause)
            }
            MoveResult::Moved { new_head } if new_head == self.food => {
                self.score += 1;
                self.snake.grow();
                info!("food eaten, score {}, length {}", self.score, self.snake.len());
                self.spawn_food();
                self.hud.show_score(self.score);
                Tick::Ate
            }
            MoveResult::Moved { .. } => Tick::Moved,
        }
    }

    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let size = self.board.cell() - 1;

        surface.fill_all(Paint::Background)?;

        for seg in self.snake.segments() {
            surface.fill_rect(Rect::new(seg.x, seg.y, size, size), Paint::Snake)?;
        }

        surface.fill_rect(Rect::new(self.food.x, self.food.y, size, size), Paint::Food)?;

        let overlay = match self.status {
            Status::GameOver => Some(("Game Over!", 70)),
            Status::Paused => Some(("Paused", 50)),
            Status::Running => None,
        };

        if let Some((text, half_width)) = overlay {
            let (w, h) = (self.board.width(), self.board.height());
            surface.fill_rect(Rect::new(0, 0, w, h), Paint::Scrim)?;
            surface.fill_text(text, (w / 2 - half_width, h / 2), OVERLAY_FONT, Paint::Text)?;
        }

        Ok(())
    }

    pub fn handle_input(&mut self, key: &str) {
        if self.status == Status::GameOver {
            return;
        }

        match Key::parse(key) {
            Key::Pause => self.toggle_pause(),
            _ if self.status == Status::Paused => {}
            Key::Turn(dir) => {
                if self.snake.set_direction(dir) {
                    debug!("direction changed: {:?}", dir);
                }
            }
            Key::Other => {}
        }
    }

    /// The on-screen pause control. Does nothing once the game is over.
    pub fn pause_clicked(&mut self) {
        if self.status != Status::GameOver {
            self.toggle_pause();
        }
    }

    pub fn new_game(&mut self) {
        info!("new game requested");
        self.initialize();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.status == Status::Paused
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    ///////////////////////////////////////////////////////////////////////////

    fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            Status::GameOver => return,
        };
        self.refresh_pause_control();
        info!("game {}", if self.is_paused() { "paused" } else { "resumed" });
    }

    // Food may land on the snake; there is no exclusion of occupied cells.
    fn spawn_food(&mut self) {
        self.food = self.board.random_cell(&mut self.rng);
        debug!("food spawned at {}", self.food);
    }

    fn refresh_pause_control(&mut self) {
        let paused = self.is_paused();
        let label = if paused { "Resume" } else { "Pause" };
        self.hud.show_pause(label, paused);
    }

    #[cfg(test)]
    fn place(&mut self, snake: Snake, food: Point) {
        self.snake = snake;
        self.food = food;
    }
}
