//! Browser host: draws into the page's canvas, mirrors the score and pause
//! state into the DOM and drives the engine from `keydown`, button clicks and
//! a self-rescheduling `setTimeout` tick.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{rngs::StdRng, SeedableRng};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, Window};

use crate::config;
use crate::game::{Board, SnakeGame};
use crate::host::{Hud, Paint, Rect, Surface};
use crate::Pixel;

type Game = SnakeGame<DomHud, StdRng>;

struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Surface for CanvasSurface {
    type Error = JsValue;

    fn fill_all(&mut self, paint: Paint) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(paint.css());
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(paint.css());
        self.ctx.fill_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
        Ok(())
    }

    fn fill_text(&mut self, text: &str, at: (Pixel, Pixel), font: &str, paint: Paint) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(paint.css());
        self.ctx.set_font(font);
        self.ctx.fill_text(text, at.0 as f64, at.1 as f64)
    }
}

struct DomHud {
    score: HtmlElement,
    pause: HtmlElement,
}

impl Hud for DomHud {
    fn show_score(&mut self, score: u32) {
        self.score.set_inner_text(&score.to_string());
    }

    fn show_pause(&mut self, label: &str, paused: bool) {
        self.pause.set_inner_text(label);
        if let Err(e) = self.pause.class_list().toggle_with_force("paused", paused) {
            log::warn!("could not update pause button style: {:?}", e);
        }
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{} element", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{} has the wrong element type", id)))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if config::logging_enabled() {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger unavailable: {}", e).into());
        }
    }

    log::info!("starting snake: arrow keys to move, 'p' to pause, New Game button to restart");

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = element(&document, "game-canvas")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let board = Board::new(canvas.width() as Pixel, canvas.height() as Pixel, config::GRID_SIZE)
        .ok_or_else(|| JsValue::from_str("canvas is smaller than one grid cell"))?;
    let hud = DomHud {
        score: element(&document, "score-value")?,
        pause: element(&document, "pause-btn")?,
    };

    let game = Rc::new(RefCell::new(SnakeGame::new(board, hud, StdRng::from_entropy())));
    let surface = Rc::new(RefCell::new(CanvasSurface {
        ctx,
        width: canvas.width() as f64,
        height: canvas.height() as f64,
    }));

    listen_keys(&document, &game)?;
    listen_click(&element(&document, "pause-btn")?, &game, |g| g.pause_clicked())?;
    listen_click(&element(&document, "new-game-btn")?, &game, |g| g.new_game())?;

    start_ticks(window, game, surface)?;

    log::info!("game ready");
    Ok(())
}

// Listeners live as long as the page, so their closures are leaked.
fn listen_keys(document: &Document, game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
    let game = game.clone();
    let on_key = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        game.borrow_mut().handle_input(&e.key());
    }) as Box<dyn FnMut(_)>);

    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();
    Ok(())
}

fn listen_click(button: &HtmlElement, game: &Rc<RefCell<Game>>, action: fn(&mut Game)) -> Result<(), JsValue> {
    let game = game.clone();
    let on_click = Closure::wrap(Box::new(move || {
        action(&mut game.borrow_mut());
    }) as Box<dyn FnMut()>);

    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Update then draw, then re-arm the timer. Fixed delay, no catch-up, never
/// cancelled.
fn start_ticks(window: Window, game: Rc<RefCell<Game>>, surface: Rc<RefCell<CanvasSurface>>) -> Result<(), JsValue> {
    let delay = config::TICK_INTERVAL.as_millis() as i32;
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_loop = tick.clone();
    let window_loop = window.clone();

    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let mut game = game.borrow_mut();
        game.update();
        if let Err(e) = game.render(&mut *surface.borrow_mut()) {
            log::error!("render failed: {:?}", e);
        }

        if let Some(next) = tick_loop.borrow().as_ref() {
            if let Err(e) = window_loop
                .set_timeout_with_callback_and_timeout_and_arguments_0(next.as_ref().unchecked_ref(), delay)
            {
                log::error!("could not schedule the next tick: {:?}", e);
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(first) = tick.borrow().as_ref() {
        window.set_timeout_with_callback_and_timeout_and_arguments_0(first.as_ref().unchecked_ref(), delay)?;
    }
    Ok(())
}
