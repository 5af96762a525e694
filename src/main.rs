//! Otter Run entry point
//!
//! Native: a headless autopilot run that logs its outcome.
//! Web: wires the canvas, DOM overlay, input and audio, then drives
//! `Game::frame` from requestAnimationFrame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use otter_run::audio::WebAudio;
    use otter_run::platform::InputMapper;
    use otter_run::platform::storage::LocalStorage;
    use otter_run::renderer::CanvasRenderer;
    use otter_run::sim::{GameMode, GamePhase};
    use otter_run::ui::DomUi;
    use otter_run::{Collaborators, Game, GameError, Tuning};

    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    struct App {
        game: Game,
        input: InputMapper,
        listeners: Vec<Listener>,
        running: bool,
    }

    impl App {
        /// Detach every listener and silence audio
        fn shutdown(&mut self) {
            for listener in self.listeners.drain(..) {
                let _ = listener.target.remove_event_listener_with_callback(
                    listener.kind,
                    listener.closure.as_ref().unchecked_ref(),
                );
                // May be the closure currently executing
                listener.closure.forget();
            }
            self.game.cleanup();
            self.running = false;
        }
    }

    type Shared = Rc<RefCell<App>>;

    fn listen(
        app: &Shared,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Could not listen for {}", kind);
            return;
        }
        app.borrow_mut().listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    pub fn run() -> Result<(), GameError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Otter Run starting...");

        let window = web_sys::window().ok_or(GameError::MissingElement("window"))?;
        let document = window
            .document()
            .ok_or(GameError::MissingElement("document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into().ok())
            .ok_or(GameError::MissingElement("canvas"))?;

        let tuning = Tuning::default();
        let renderer = CanvasRenderer::new(&canvas, tuning.canvas_width)?;
        let collaborators = Collaborators {
            storage: Box::new(LocalStorage),
            audio: Box::new(WebAudio::new()),
            achievements: None,
            ui: Box::new(DomUi::new(document.clone())),
            renderer: Box::new(renderer),
        };

        let now = js_sys::Date::now();
        let mut game = Game::with_seed(tuning, collaborators, now as u64)?;
        game.set_calendar_day((now / 86_400_000.0) as u32);

        let app: Shared = Rc::new(RefCell::new(App {
            game,
            input: InputMapper::default(),
            listeners: Vec::new(),
            running: true,
        }));

        setup_input(&app, &window, &canvas);
        setup_buttons(&app, &document);
        setup_lifecycle(&app, &window, &document);

        request_animation_frame(app);
        log::info!("Otter Run running!");
        Ok(())
    }

    fn setup_input(app: &Shared, window: &web_sys::Window, canvas: &HtmlCanvasElement) {
        // Keyboard
        {
            let a = app.clone();
            listen(app, window.as_ref(), "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let mut app = a.borrow_mut();
                if let Some(cmd) = app.input.key(&event.key()) {
                    event.prevent_default();
                    app.game.handle_input(cmd);
                }
            });
        }

        // Click on either half of the canvas
        {
            let a = app.clone();
            let target = canvas.clone();
            listen(app, canvas.as_ref(), "click", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let rect = target.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let mut app = a.borrow_mut();
                let cmd = app.input.click(x, rect.width() as f32);
                app.game.handle_input(cmd);
            });
        }

        // Swipes
        {
            let a = app.clone();
            listen(app, canvas.as_ref(), "touchstart", move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    a.borrow_mut().input.touch_start(touch.client_x() as f32);
                }
            });
        }
        listen(app, canvas.as_ref(), "touchmove", |event| {
            event.prevent_default();
        });
        {
            let a = app.clone();
            listen(app, canvas.as_ref(), "touchend", move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let mut app = a.borrow_mut();
                let cmd = match event.changed_touches().get(0) {
                    Some(touch) => app.input.touch_end(touch.client_x() as f32),
                    None => {
                        app.input.touch_cancel();
                        None
                    }
                };
                if let Some(cmd) = cmd {
                    app.game.handle_input(cmd);
                }
            });
        }
    }

    fn setup_buttons(app: &Shared, document: &web_sys::Document) {
        let buttons: [(&str, fn(&mut Game)); 8] = [
            ("classicButton", |g| {
                g.start(GameMode::Classic);
            }),
            ("timeTrialButton", |g| {
                g.start(GameMode::TimeTrial);
            }),
            ("zenButton", |g| {
                g.start(GameMode::Zen);
            }),
            ("dailyButton", |g| {
                g.start(GameMode::DailyChallenge);
            }),
            ("restartButton", |g| {
                g.restart();
            }),
            ("resumeButton", |g| {
                g.resume();
            }),
            ("menuButton", Game::return_to_menu),
            ("quitButton", Game::return_to_menu),
        ];

        for (id, action) in buttons {
            let Some(el) = document.get_element_by_id(id) else {
                log::warn!("Button #{} not found", id);
                continue;
            };
            let a = app.clone();
            listen(app, el.as_ref(), "click", move |_event| {
                action(&mut a.borrow_mut().game);
            });
        }
    }

    fn setup_lifecycle(app: &Shared, window: &web_sys::Window, document: &web_sys::Document) {
        // Auto-pause when the tab is hidden
        {
            let a = app.clone();
            let doc = document.clone();
            listen(app, document.as_ref(), "visibilitychange", move |_event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut app = a.borrow_mut();
                    if app.game.phase() == GamePhase::Playing {
                        app.game.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
        }

        {
            let a = app.clone();
            listen(app, window.as_ref(), "pagehide", move |_event| {
                a.borrow_mut().shutdown();
            });
        }
    }

    fn request_animation_frame(app: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Shared, time: f64) {
        {
            let mut a = app.borrow_mut();
            if !a.running {
                return;
            }
            a.game.frame(time);
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use otter_run::platform::InputEvent;
    use otter_run::platform::storage::FileStorage;
    use otter_run::sim::{GameMode, GamePhase, GameState};
    use otter_run::{Collaborators, Game, GameError, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// How far ahead of the otter an obstacle counts as a threat
    const LOOKAHEAD: f32 = 220.0;

    /// Steer away from obstacles about to reach the otter's lane
    fn autopilot(state: &GameState) -> Option<InputEvent> {
        let player = &state.player;
        if player.is_moving {
            return None;
        }
        let threatened = |lane: usize| {
            state.generator.obstacles.active().any(|o| {
                o.lane == lane
                    && o.pos.y + o.size.y > player.pos.y - LOOKAHEAD
                    && o.pos.y < player.pos.y + player.size.y
            })
        };

        let lane = player.current_lane;
        if !threatened(lane) {
            return None;
        }
        let left = lane.checked_sub(1).filter(|&l| !threatened(l));
        let right = Some(lane + 1).filter(|&l| l < state.tuning.lane_count && !threatened(l));
        match (left, right) {
            (Some(_), _) => Some(InputEvent::MoveLeft),
            (None, Some(_)) => Some(InputEvent::MoveRight),
            _ => None,
        }
    }

    fn parse_mode(arg: Option<&str>) -> GameMode {
        match arg {
            Some("time-trial") => GameMode::TimeTrial,
            Some("zen") => GameMode::Zen,
            Some("daily") => GameMode::DailyChallenge,
            _ => GameMode::Classic,
        }
    }

    pub fn run() -> Result<(), GameError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mode = parse_mode(args.first().map(String::as_str));
        let seed = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(otter_run::game::DEFAULT_SEED);

        let tuning = match std::env::var("OTTER_RUN_TUNING") {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| GameError::InvalidTuning(format!("{path}: {e}")))?;
                Tuning::from_json(&json)?
            }
            Err(_) => Tuning::default(),
        };

        let save_dir = std::env::temp_dir().join("otter-run");
        let collaborators = Collaborators {
            storage: Box::new(FileStorage::new(&save_dir)),
            ..Collaborators::headless()
        };
        let mut game = Game::with_seed(tuning, collaborators, seed)?;
        log::info!("Save directory: {}", save_dir.display());

        game.start(mode);
        let mut frames = 0;
        while game.phase() == GamePhase::Playing && frames < MAX_FRAMES {
            if let Some(cmd) = autopilot(game.state()) {
                game.handle_input(cmd);
            }
            game.frame(frames as f64 * FRAME_MS);
            frames += 1;
        }
        if game.phase() == GamePhase::Playing {
            game.game_over();
        }

        if let Some(summary) = game.last_summary() {
            let s = &summary.stats;
            log::info!(
                "Run over after {:.1}s: score={} distance={:.0} coins={} gems={} dodged={} power-ups={}",
                frames as f64 * FRAME_MS / 1000.0,
                s.score,
                s.distance,
                s.coins,
                s.gems,
                s.obstacles_avoided,
                s.power_ups_collected
            );
            log::info!(
                "High score {}{}",
                summary.high_score,
                if summary.new_high_score { " (new!)" } else { "" }
            );
        }
        game.cleanup();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Otter Run (native, headless autopilot) starting...");

    if let Err(e) = demo::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
