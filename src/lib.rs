pub mod config;
pub mod game;
pub mod host;
pub mod snake;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(target_arch = "wasm32")]
mod web;

/// All board coordinates are in pixels, aligned to the grid cell size.
pub type Pixel = i32;
