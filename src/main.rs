//! Neon Sky Ace entry point
//!
//! Browser build: DOM start screen and HUD, pointer steering, rAF loop, with
//! the render snapshot handed to the page's scene each frame.
//! Native build: a headless autopilot run, useful for soak-testing the sim.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, PointerEvent, TouchEvent};

    use neon_sky_ace::persistence::LocalStorageStore;
    use neon_sky_ace::sim::{GameEvent, GameStatus, TickInput, Viewport};
    use neon_sky_ace::{Session, Settings, SpeedTier};

    // Scene hook: the page registers `window.neonSkyRender(snapshot)`
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (typeof window.neonSkyRender === 'function') {
                window.neonSkyRender(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorageStore>,
        input: TickInput,
        last_time: f64,
        last_status: GameStatus,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            Self {
                session: Session::new(seed, settings, LocalStorageStore),
                input: TickInput::default(),
                last_time: 0.0,
                last_status: GameStatus::Start,
            }
        }

        /// Begin (or begin again) at the chosen tier and remember it
        fn launch(&mut self, tier: SpeedTier) {
            if let Err(e) = self.session.launch(tier) {
                log::error!("Could not start run: {}", e);
                return;
            }
            if self.session.settings().speed_tier != tier {
                let settings = Settings {
                    speed_tier: tier,
                    ..self.session.settings().clone()
                };
                settings.save();
                self.session.set_settings(settings);
            }
        }

        /// Report the canvas shape; applied on the next tick
        fn resize(&mut self, canvas: &HtmlCanvasElement) {
            let w = canvas.client_width() as f32;
            let h = canvas.client_height() as f32;
            if h > 0.0 {
                self.input.viewport = Some(Viewport::from_aspect(w / h));
            }
        }

        /// Pointer position inside the canvas, normalized to [-1, 1] (+y up)
        fn set_pointer(&mut self, x: f32, y: f32, width: f32, height: f32) {
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            self.input.pointer = Vec2::new(x / width * 2.0 - 1.0, 1.0 - y / height * 2.0);
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            self.input.delta = dt;
            self.input.elapsed = time / 1000.0;
            for event in self.session.tick(&self.input) {
                match event {
                    GameEvent::NewHighScore { score } => log::debug!("High score {}", score),
                    GameEvent::GameOver { score } => log::info!("Game over at {}", score),
                    _ => {}
                }
            }
            self.input.viewport = None;
        }

        fn render(&self) {
            match serde_json::to_string(&self.session.snapshot()) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Snapshot encode failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let hud = self.session.hud();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.high_score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
                el.set_text_content(Some(&"♥".repeat(hud.lives as usize)));
            }

            if hud.status == self.last_status {
                return;
            }
            self.last_status = hud.status;

            set_visible(document, "start-screen", hud.status == GameStatus::Start);
            set_visible(document, "hud", hud.status == GameStatus::Playing);
            set_visible(document, "game-over", hud.status == GameStatus::GameOver);
            if hud.status == GameStatus::GameOver {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&hud.score.to_string()));
                }
                if let Some(el) = document.get_element_by_id("final-best") {
                    el.set_text_content(Some(&hud.high_score.to_string()));
                }
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Neon Sky Ace starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        game.borrow_mut().resize(&canvas);
        setup_resize(&window, &canvas, game.clone())?;
        setup_input_handlers(&canvas, game.clone())?;
        setup_start_buttons(&document, game.clone())?;
        setup_visibility(&document, game.clone())?;

        {
            let mut g = game.borrow_mut();
            g.last_status = GameStatus::GameOver;
            g.update_hud(&document);
        }

        request_animation_frame(game);
        log::info!("Neon Sky Ace running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Pointer move (mouse and pen)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                game.borrow_mut()
                    .set_pointer(event.offset_x() as f32, event.offset_y() as f32, w, h);
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    game.borrow_mut()
                        .set_pointer(x, y, rect.width() as f32, rect.height() as f32);
                }
            });
            canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_resize(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize(&canvas);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Every `[data-speed]` button starts a run at its tier
    fn setup_start_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let buttons = document.query_selector_all("[data-speed]")?;
        for i in 0..buttons.length() {
            let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let tier = button
                .dataset()
                .get("speed")
                .and_then(|s| SpeedTier::from_str(&s))
                .unwrap_or_default();
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().launch(tier);
                log::info!("{} selected", tier.as_str());
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    /// Forget the frame clock while hidden so the first visible frame is not a spike
    fn setup_visibility(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                game.borrow_mut().last_time = 0.0;
            }
        });
        document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::Path;

    use glam::Vec2;
    use neon_sky_ace::consts::CRAFT_Y_OFFSET;
    use neon_sky_ace::persistence::FileStore;
    use neon_sky_ace::sim::{GameEvent, GameState, GameStatus, TickInput};
    use neon_sky_ace::{Session, Settings, SpeedTier};

    const SETTINGS_PATH: &str = "neon_sky_settings.json";
    const HIGH_SCORE_PATH: &str = "neon_sky_highscore.json";
    const FRAME: f32 = 1.0 / 60.0;

    /// Aim at the nearest obstacle still in front of the craft
    fn autopilot(state: &GameState) -> Vec2 {
        let vp = state.viewport;
        state
            .obstacles
            .iter()
            .filter(|o| o.pos.z < 0.0)
            .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
            .map(|o| {
                Vec2::new(
                    o.pos.x / (vp.width / 2.0),
                    (o.pos.y - CRAFT_Y_OFFSET) / (vp.height / 2.0),
                )
            })
            .unwrap_or(Vec2::ZERO)
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let settings_path = Path::new(SETTINGS_PATH);
        let settings = match Settings::load_from(settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring {}: {}", SETTINGS_PATH, e);
                Settings::default()
            }
        };
        if !settings_path.exists() {
            match settings.save_to(settings_path) {
                Ok(()) => log::info!("Wrote default settings to {}", SETTINGS_PATH),
                Err(e) => log::warn!("Could not write {}: {}", SETTINGS_PATH, e),
            }
        }
        let tier = args
            .next()
            .and_then(|s| SpeedTier::from_str(&s))
            .unwrap_or(settings.speed_tier);
        let max_secs: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(180.0);

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut session = Session::new(seed, settings, FileStore::new(HIGH_SCORE_PATH));
        if let Err(e) = session.start_tier(tier) {
            log::error!("Could not start run: {}", e);
            return;
        }

        let mut input = TickInput {
            delta: FRAME,
            ..Default::default()
        };
        let mut frame: u64 = 0;
        let mut kills = 0u32;
        while session.status() == GameStatus::Playing && input.elapsed < max_secs as f64 {
            input.pointer = autopilot(session.state());
            for event in session.tick(&input) {
                match event {
                    GameEvent::ObstacleDestroyed { .. } => kills += 1,
                    GameEvent::CraftHit { lives, .. } => log::info!("Hit! {} lives left", lives),
                    _ => {}
                }
            }
            frame += 1;
            input.elapsed = frame as f64 * FRAME as f64;
        }

        let hud = session.hud();
        log::info!(
            "{} run finished after {:.1}s: score {}, {} kills, best {}",
            tier.as_str(),
            input.elapsed,
            hud.score,
            kills,
            hud.high_score
        );
        println!("score {} (best {})", hud.score, hud.high_score);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neon Sky Ace (native, headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
