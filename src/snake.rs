use std::{collections::VecDeque, fmt};

use crate::Pixel;
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Pixel,
    pub y: Pixel,
}

impl Point {
    pub const fn new(x: Pixel, y: Pixel) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: Pixel, dy: Pixel) -> Self {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Movement for one tick, `cell` pixels along the axis of travel.
    pub fn step(self, cell: Pixel) -> (Pixel, Pixel) {
        match self {
            Up => (0, -cell),
            Down => (0, cell),
            Left => (-cell, 0),
            Right => (cell, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Left | Right)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfHit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Point },
    Crashed { at: Point, cause: Collision }
}

pub struct Snake {
    body: VecDeque<Point>,
    direction: Direction,
    grow_next_move: bool,
}

impl Snake {
    pub fn new(pos: Point, direction: Direction) -> Self {
        Snake::from_segments([pos], direction)
    }

    /// Builds a snake from explicit segments, head first.
    pub fn from_segments(segments: impl IntoIterator<Item = Point>, direction: Direction) -> Self {
        let body: VecDeque<Point> = segments.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body, direction, grow_next_move: false }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, pos: Point) -> bool {
        self.body.contains(&pos)
    }

    /// Advances one cell. Leaving `[0, width) x [0, height)` or stepping onto
    /// any current segment, tail included, crashes without moving.
    pub fn move_step(&mut self, cell: Pixel, width: Pixel, height: Pixel) -> MoveResult {
        let (dx, dy) = self.direction.step(cell);
        let new_head = self.head().offset(dx, dy);

        if new_head.x < 0 || new_head.y < 0 || new_head.x >= width || new_head.y >= height {
            return Crashed { at: new_head, cause: Collision::Wall };
        }

        if self.occupies(new_head) {
            return Crashed { at: new_head, cause: Collision::SelfHit };
        }

        self.body.push_front(new_head);

        if self.grow_next_move {
            self.grow_next_move = false;
        } else {
            self.body.pop_back();
        }

        Moved { new_head }
    }

    /// Turns only onto the other axis: a horizontal snake accepts Up/Down,
    /// a vertical one Left/Right. Returns whether the direction changed.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction.is_horizontal() == self.direction.is_horizontal() {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn grow(&mut self) {
        self.grow_next_move = true;
    }

    pub fn is_growing(&self) -> bool {
        self.grow_next_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: Pixel = 20;

    fn body(snake: &Snake) -> Vec<Point> {
        snake.segments().copied().collect()
    }

    #[test]
    fn step_keeps_length_and_drops_tail() {
        let mut snake = Snake::from_segments([Point::new(100, 100), Point::new(80, 100)], Right);
        let res = snake.move_step(CELL, 400, 400);

        assert_eq!(res, Moved { new_head: Point::new(120, 100) });
        assert_eq!(body(&snake), vec![Point::new(120, 100), Point::new(100, 100)]);
    }

    #[test]
    fn growing_keeps_tail_once() {
        let mut snake = Snake::new(Point::new(100, 100), Down);
        snake.grow();

        assert_eq!(snake.move_step(CELL, 400, 400), Moved { new_head: Point::new(100, 120) });
        assert_eq!(body(&snake), vec![Point::new(100, 120), Point::new(100, 100)]);
        assert!(!snake.is_growing());
        assert_eq!(snake.len(), 2);

        snake.move_step(CELL, 400, 400);
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn wall_crash_leaves_body_untouched() {
        let mut snake = Snake::new(Point::new(380, 200), Right);
        let res = snake.move_step(CELL, 400, 400);

        assert_eq!(res, Crashed { at: Point::new(400, 200), cause: Collision::Wall });
        assert_eq!(body(&snake), vec![Point::new(380, 200)]);

        let mut snake = Snake::new(Point::new(0, 0), Up);
        assert!(matches!(snake.move_step(CELL, 400, 400), Crashed { cause: Collision::Wall, .. }));
    }

    #[test]
    fn stepping_onto_the_tail_is_a_crash() {
        // A 2x2 loop: the head would move onto the tail cell that is about to vacate.
        let mut snake = Snake::from_segments(
            [Point::new(20, 0), Point::new(20, 20), Point::new(0, 20), Point::new(0, 0)],
            Left,
        );
        let res = snake.move_step(CELL, 400, 400);
        assert_eq!(res, Crashed { at: Point::new(0, 0), cause: Collision::SelfHit });
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn turns_only_across_the_axis() {
        let mut snake = Snake::new(Point::new(100, 100), Right);
        assert!(!snake.set_direction(Left));
        assert!(!snake.set_direction(Right));
        assert_eq!(snake.get_direction(), Right);

        assert!(snake.set_direction(Up));
        assert!(!snake.set_direction(Down));
        assert!(snake.set_direction(Left));
        assert_eq!(snake.get_direction(), Left);
    }

    #[test]
    fn step_vectors_scale_with_cell() {
        assert_eq!(Right.step(20), (20, 0));
        assert_eq!(Up.step(20), (0, -20));
        assert_eq!(Left.step(10), (-10, 0));
        assert_eq!(Down.step(10), (0, 10));
    }
}
