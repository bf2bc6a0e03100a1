//! What a host environment has to provide for the engine to draw itself and
//! report its score. Coordinates are board pixels.

use crate::Pixel;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: Pixel,
    pub y: Pixel,
    pub width: Pixel,
    pub height: Pixel,
}

impl Rect {
    pub fn new(x: Pixel, y: Pixel, width: Pixel, height: Pixel) -> Self {
        Rect { x, y, width, height }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Paint {
    Background,
    Snake,
    Food,
    Scrim,
    Text,
}

impl Paint {
    pub fn css(self) -> &'static str {
        match self {
            Paint::Background => "#f0f0f0",
            Paint::Snake => "#4CAF50",
            Paint::Food => "#FF5722",
            Paint::Scrim => "rgba(0, 0, 0, 0.5)",
            Paint::Text => "white",
        }
    }
}

pub trait Surface {
    type Error;

    fn fill_all(&mut self, paint: Paint) -> Result<(), Self::Error>;

    fn fill_rect(&mut self, rect: Rect, paint: Paint) -> Result<(), Self::Error>;

    /// `at` is the left end of the text baseline.
    fn fill_text(&mut self, text: &str, at: (Pixel, Pixel), font: &str, paint: Paint) -> Result<(), Self::Error>;
}

/// The score readout and the pause control next to the board.
pub trait Hud {
    fn show_score(&mut self, score: u32);

    fn show_pause(&mut self, label: &str, paused: bool);
}
