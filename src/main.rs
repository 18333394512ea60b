//! Duel Arcade entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use duel_arcade::audio::WebAudio;
    use duel_arcade::input::PointerTracker;
    use duel_arcade::platform::{LocalStore, NavigatorHaptics};
    use duel_arcade::renderer::Canvas2d;
    use duel_arcade::{Arcade, SessionState};

    /// Everything the browser callbacks share
    struct App {
        arcade: Arcade,
        pointers: PointerTracker,
        canvas: Canvas2d,
        element: HtmlCanvasElement,
    }

    impl App {
        /// Match the backing store to the element size and device pixel
        /// ratio; the game keeps working in CSS pixels.
        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let width = self.element.client_width().max(1) as f64;
            let height = self.element.client_height().max(1) as f64;
            self.element.set_width((width * dpr) as u32);
            self.element.set_height((height * dpr) as u32);
            let _ = self
                .canvas
                .context()
                .set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            self.arcade.resize(width as f32, height as f32);
            self.pointers.clear();
            log::debug!("Canvas {width}x{height} @{dpr}x");
        }
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
        let app = APP.with(|slot| slot.borrow().clone())?;
        let mut app = app.borrow_mut();
        Some(f(&mut app))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Duel Arcade starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let element: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no #gameCanvas element")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = element
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let arcade = Arcade::new(
            Box::new(LocalStore::open()),
            Box::new(WebAudio::new(seed)),
            Box::new(NavigatorHaptics),
            Vec2::new(element.client_width() as f32, element.client_height() as f32),
            seed,
        );
        let app = Rc::new(RefCell::new(App {
            arcade,
            pointers: PointerTracker::new(),
            canvas: Canvas2d::new(ctx),
            element: element.clone(),
        }));
        app.borrow_mut().fit_canvas();
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));
        log::info!("Arcade initialized with seed: {seed}");

        setup_pointer_handlers(&element, app.clone());
        setup_window_handlers(app.clone());

        request_animation_frame(app);
        log::info!("Duel Arcade running!");
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let position = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut()
                    .pointers
                    .pointer_down(event.pointer_id(), position, js_sys::Date::now());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let position = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut()
                    .pointers
                    .pointer_move(event.pointer_id(), position);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release; a short press while the winner banner shows dismisses it
        for name in ["pointerup", "pointercancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut app = app.borrow_mut();
                let id = event.pointer_id();
                let tapped = app.pointers.is_tap(id, js_sys::Date::now());
                app.pointers.pointer_up(id);
                if tapped && app.arcade.state() == SessionState::GameOver {
                    app.arcade.on_tap();
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Escape acts as the back button
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Escape" {
                    app.borrow_mut().arcade.back_action();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Rotation and window resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().fit_canvas();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Auto-pause when the window loses focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut app = app.borrow_mut();
                if app.arcade.state() == SessionState::Playing {
                    app.arcade.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut guard = app.borrow_mut();
            let App {
                arcade,
                pointers,
                canvas,
                ..
            } = &mut *guard;
            arcade.frame(time, &*pointers, canvas);
        }
        request_animation_frame(app);
    }

    // === Commands for the HTML shell ===

    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(name: &str) -> Result<(), JsValue> {
        with_app(|app| {
            app.pointers.clear();
            app.arcade.start_game(name)
        })
        .ok_or("arcade not running")?
        .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = pauseGame)]
    pub fn pause_game() {
        with_app(|app| app.arcade.pause());
    }

    #[wasm_bindgen(js_name = resumeGame)]
    pub fn resume_game() {
        with_app(|app| app.arcade.resume());
    }

    #[wasm_bindgen(js_name = restartGame)]
    pub fn restart_game() {
        with_app(|app| app.arcade.restart());
    }

    #[wasm_bindgen(js_name = endGame)]
    pub fn end_game() {
        with_app(|app| app.arcade.end_game());
    }

    #[wasm_bindgen(js_name = setGameSpeed)]
    pub fn set_game_speed(value: f32) {
        with_app(|app| app.arcade.set_game_speed(value));
    }

    #[wasm_bindgen(js_name = setPaddleSize)]
    pub fn set_paddle_size(value: f32) {
        with_app(|app| app.arcade.set_paddle_size(value));
    }

    #[wasm_bindgen(js_name = setSoundFx)]
    pub fn set_sound_fx(enabled: bool) {
        with_app(|app| app.arcade.set_sound(enabled));
    }

    #[wasm_bindgen(js_name = setVibration)]
    pub fn set_vibration(enabled: bool) {
        with_app(|app| app.arcade.set_vibration(enabled));
    }

    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings() -> Result<(), JsValue> {
        with_app(|app| app.arcade.save_settings())
            .ok_or("arcade not running")?
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// "menu", "playing", "paused" or "gameOver"
    #[wasm_bindgen(js_name = sessionState)]
    pub fn session_state() -> String {
        with_app(|app| app.arcade.state().as_str().to_string()).unwrap_or_default()
    }

    /// `[player one, player two]`
    #[wasm_bindgen]
    pub fn scores() -> Vec<u32> {
        with_app(|app| {
            let s = app.arcade.scores();
            vec![s.player_one, s.player_two]
        })
        .unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Duel Arcade (native) starting...");
    log::info!("Native mode is headless - serve the web build to play");

    let only = std::env::args().nth(1);
    for kind in duel_arcade::GameKind::ALL {
        if only.as_deref().is_some_and(|name| name != kind.as_str()) {
            continue;
        }
        headless_match(kind);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one match with both players holding still, for up to two minutes of
/// simulated time, and report how it went.
#[cfg(not(target_arch = "wasm32"))]
fn headless_match(kind: duel_arcade::GameKind) {
    use duel_arcade::audio::NullAudio;
    use duel_arcade::input::Pointer;
    use duel_arcade::platform::{MemoryStore, NoHaptics};
    use duel_arcade::renderer::CommandBuffer;
    use duel_arcade::{Arcade, SessionState};
    use glam::Vec2;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: usize = 60 * 120;

    let mut arcade = Arcade::new(
        Box::new(MemoryStore::new()),
        Box::<NullAudio>::default(),
        Box::new(NoHaptics),
        Vec2::new(800.0, 600.0),
        kind as u64,
    );
    arcade.start(kind);

    let input: Vec<Pointer> = Vec::new();
    let mut canvas = CommandBuffer::new();
    let mut now = 0.0;
    let mut frames = 0;
    while frames < MAX_FRAMES && arcade.state() == SessionState::Playing {
        canvas.reset();
        now += FRAME_MS;
        arcade.frame(now, &input, &mut canvas);
        frames += 1;
    }
    if !canvas.is_balanced() {
        log::warn!("{kind}: unbalanced save/restore in last frame");
    }

    let scores = arcade.scores();
    match arcade.winner() {
        Some(winner) => log::info!(
            "{kind}: player {} won {}:{} after {frames} frames",
            winner.number(),
            scores.player_one,
            scores.player_two
        ),
        None => log::info!(
            "{kind}: no winner after {frames} frames ({}:{})",
            scores.player_one,
            scores.player_two
        ),
    }
}
