//! Agenda Breaker entry point
//!
//! Browser: canvas rendering, DOM input, HUD and toasts around the
//! simulation. Native: a headless autoplay run that prints the final
//! snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, HtmlSelectElement,
        KeyboardEvent, MouseEvent,
    };

    use agenda_breaker::data::{DataProvider, DataSource, MockProvider};
    use agenda_breaker::platform::input::InputSampler;
    use agenda_breaker::platform::notify::NotificationSink;
    use agenda_breaker::platform::storage::LocalStore;
    use agenda_breaker::platform::time::{AnimationFrameScheduler, Clock, SystemClock};
    use agenda_breaker::platform::{drive_frame, run_loop};
    use agenda_breaker::sim::{
        BlockCategory, GameEvent, GamePhase, GameState, ParticleKind, PowerTag, Severity,
    };
    use agenda_breaker::Settings;

    /// Toasts in the `#notifications` container
    struct ToastSink {
        document: Document,
    }

    impl NotificationSink for ToastSink {
        fn notify(&mut self, message: &str, severity: Severity, duration_ms: u32) {
            log::info!("Notify [{:?}] {}", severity, message);
            let Some(container) = self.document.get_element_by_id("notifications") else {
                return;
            };
            let Ok(toast) = self.document.create_element("div") else {
                return;
            };
            let class = match severity {
                Severity::Info => "toast info",
                Severity::Success => "toast success",
                Severity::Warning => "toast warning",
                Severity::Error => "toast error",
            };
            toast.set_class_name(class);
            toast.set_text_content(Some(message));
            let _ = container.append_child(&toast);

            let remove = Closure::once(move || toast.remove());
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    remove.as_ref().unchecked_ref(),
                    duration_ms as i32,
                );
            }
            remove.forget();
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        sampler: InputSampler,
        sink: ToastSink,
        settings: Settings,
        clock: SystemClock,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        /// Level-complete screen shows after the celebration
        celebration_until: Option<f64>,
    }

    impl Game {
        fn frame(&mut self, now: f64) -> bool {
            let (events, alive) = drive_frame(&mut self.state, &mut self.sampler, &mut self.sink, now);
            for event in events {
                if let GameEvent::LevelComplete { celebration_ms, .. } = event {
                    self.celebration_until = Some(now + celebration_ms);
                }
            }
            self.render();
            self.update_hud(now);
            alive
        }

        fn now(&self) -> f64 {
            self.clock.now()
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let state = &self.state;
            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_str("#10131a");
            ctx.fill_rect(0.0, 0.0, state.width as f64, state.height as f64);

            for block in &state.blocks {
                let b = &block.bounds;
                let alpha = if block.destroyed {
                    block.destroy_fade
                } else {
                    block.damage_weight()
                };
                ctx.set_global_alpha(alpha as f64);
                let color = match (block.category, block.power_tag) {
                    (_, PowerTag::Beneficial) => "#3ecf8e",
                    (_, PowerTag::Detrimental) => "#e5484d",
                    (BlockCategory::Placeholder, _) => "#5b6478",
                    (BlockCategory::ScheduleItem, _) => "#4f7cff",
                    (BlockCategory::BoardItem, _) => "#b46cff",
                };
                ctx.set_fill_style_str(color);
                ctx.fill_rect(b.x as f64, b.y as f64, b.width as f64, b.height as f64);
                if block.glow || block.hit_flash > 0.0 {
                    ctx.set_stroke_style_str("#ffd166");
                    ctx.stroke_rect(b.x as f64, b.y as f64, b.width as f64, b.height as f64);
                }
                if !block.destroyed && b.height >= 14.0 {
                    ctx.set_fill_style_str("#ffffff");
                    ctx.set_font("11px sans-serif");
                    let _ = ctx.fill_text_with_max_width(
                        &block.source.title,
                        b.x as f64 + 4.0,
                        b.y as f64 + b.height as f64 / 2.0 + 4.0,
                        b.width as f64 - 8.0,
                    );
                }
            }

            for particle in &state.particles {
                ctx.set_global_alpha(particle.life.clamp(0.0, 1.0) as f64);
                let color = format!("hsl({}, 80%, 60%)", particle.hue);
                match particle.kind {
                    ParticleKind::Lightning { to } => {
                        ctx.set_stroke_style_str(&color);
                        ctx.begin_path();
                        ctx.move_to(particle.pos.x as f64, particle.pos.y as f64);
                        ctx.line_to(to.x as f64, to.y as f64);
                        ctx.stroke();
                    }
                    _ => {
                        ctx.set_fill_style_str(&color);
                        let s = particle.size as f64;
                        ctx.fill_rect(particle.pos.x as f64 - s / 2.0, particle.pos.y as f64 - s / 2.0, s, s);
                    }
                }
            }
            ctx.set_global_alpha(1.0);

            let paddle = state.paddle.bounds();
            ctx.set_fill_style_str("#e6e9ef");
            ctx.fill_rect(paddle.x as f64, paddle.y as f64, paddle.width as f64, paddle.height as f64);

            for ball in &state.balls {
                for (i, p) in ball.trail.iter().enumerate() {
                    ctx.set_global_alpha((i + 1) as f64 / (ball.trail.len() + 1) as f64 * 0.4);
                    ctx.begin_path();
                    let _ = ctx.arc(p.x as f64, p.y as f64, ball.radius as f64, 0.0, TAU);
                    ctx.fill();
                }
                ctx.set_global_alpha(1.0);
                ctx.begin_path();
                let _ = ctx.arc(ball.pos.x as f64, ball.pos.y as f64, ball.radius as f64, 0.0, TAU);
                ctx.fill();
            }
        }

        fn update_hud(&mut self, now: f64) {
            let document = &self.sink.document;
            let state = &self.state;
            set_text(document, "hud-score", &state.score.to_string());
            set_text(document, "hud-level", &state.level.to_string());
            set_text(document, "hud-lives", &state.lives.to_string());

            let effects: Vec<String> = state.effects.active.keys().map(|k| format!("{:?}", k)).collect();
            set_text(document, "hud-effects", &effects.join(" "));

            let celebrating = self.celebration_until.is_some_and(|until| now < until);
            if !celebrating {
                self.celebration_until = None;
            }
            set_visible(document, "start-screen", state.phase == GamePhase::Start);
            set_visible(document, "pause-menu", state.phase == GamePhase::Paused);
            set_visible(document, "level-complete", state.phase == GamePhase::LevelComplete && !celebrating);
            set_visible(document, "game-over", state.phase == GamePhase::GameOver);
            set_visible(document, "win-screen", state.phase == GamePhase::Win);
            if state.phase == GamePhase::GameOver || state.phase == GamePhase::Win {
                set_text(document, "final-score", &state.score.to_string());
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Canvas from the page, or a fresh one appended to `<body>`
    fn find_or_create_canvas(document: &Document, width: u32, height: u32) -> HtmlCanvasElement {
        let canvas: HtmlCanvasElement = match document.get_element_by_id("canvas") {
            Some(el) => el.dyn_into().expect("#canvas is not a canvas"),
            None => {
                let el = document.create_element("canvas").expect("create canvas");
                el.set_id("canvas");
                document
                    .body()
                    .expect("no body")
                    .append_child(&el)
                    .expect("append canvas");
                el.dyn_into().expect("not a canvas")
            }
        };
        canvas.set_width(width);
        canvas.set_height(height);
        canvas
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Agenda Breaker starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::new(seed);
        let mut provider = MockProvider::new(seed);
        for source in [DataSource::Schedule, DataSource::Board] {
            state.set_records(source, provider.fetch(source));
        }
        state.switch_data_source(DataSource::Schedule, None, 0.0);

        let settings = Settings::load(&LocalStore);
        settings.apply(&mut state);

        let canvas = find_or_create_canvas(&document, state.width as u32, state.height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            sampler: InputSampler::new(),
            sink: ToastSink {
                document: document.clone(),
            },
            settings,
            clock: SystemClock::new(),
            ctx,
            canvas,
            celebration_until: None,
        }));

        setup_input_handlers(&game);
        setup_buttons(&game);
        setup_settings_controls(&game);
        setup_auto_pause(&game);

        let frame_game = game.clone();
        run_loop(
            Rc::new(AnimationFrameScheduler),
            Rc::new(move |now: f64| frame_game.borrow_mut().frame(now)),
        );

        log::info!("Agenda Breaker running!");
    }

    fn setup_input_handlers(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Document-wide so leaving the canvas margin is noticed
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let rect = g.canvas.get_bounding_client_rect();
                let scale_x = g.state.width as f64 / rect.width().max(1.0);
                let scale_y = g.state.height as f64 / rect.height().max(1.0);
                let x = (event.client_x() as f64 - rect.left()) * scale_x;
                let y = (event.client_y() as f64 - rect.top()) * scale_y;
                g.sampler.pointer_moved(x as f32, y as f32);
            });
            let _ = document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().sampler.pointer_left();
            });
            let _ = document.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let canvas = game.borrow().canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().sampler.click();
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().sampler.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().sampler.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, game: &Rc<RefCell<Game>>, action: fn(&mut Game, f64)) {
        let Some(btn) = document.get_element_by_id(id) else {
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            let now = g.now();
            action(&mut g, now);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: &Rc<RefCell<Game>>) {
        let document = game.borrow().sink.document.clone();
        on_click(&document, "start-btn", game, |g, now| g.state.start_game(now));
        on_click(&document, "restart-btn", game, |g, now| g.state.start_game(now));
        on_click(&document, "win-restart-btn", game, |g, now| g.state.start_game(now));
        on_click(&document, "resume-btn", game, |g, now| g.state.resume_game(now));
        on_click(&document, "next-level-btn", game, |g, now| {
            g.state.proceed_to_next_level();
            g.state.start_next_level(now);
        });
        on_click(&document, "schedule-btn", game, |g, now| {
            g.state.switch_data_source(DataSource::Schedule, None, now)
        });
        on_click(&document, "board-btn", game, |g, now| {
            g.state.switch_data_source(DataSource::Board, None, now)
        });
    }

    fn setup_settings_controls(game: &Rc<RefCell<Game>>) {
        let document = game.borrow().sink.document.clone();

        let toggles: [(&str, fn(&mut Game, bool)); 2] = [
            ("random-blocks-toggle", |g, on| {
                g.settings.random_blocks = on;
                g.state.set_random_blocks_enabled(on);
            }),
            ("power-ups-toggle", |g, on| {
                g.settings.power_ups = on;
                g.state.set_power_ups_enabled(on);
            }),
        ];
        for (id, apply) in toggles {
            let Some(input) = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                continue;
            };
            {
                let g = game.borrow();
                input.set_checked(if id == "power-ups-toggle" {
                    g.settings.power_ups
                } else {
                    g.settings.random_blocks
                });
            }
            let game = game.clone();
            let target = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                apply(&mut g, target.checked());
                let settings = g.settings;
                settings.save(&mut LocalStore);
            });
            let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(select) = document
            .get_element_by_id("difficulty-select")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            let game = game.clone();
            let target = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().state.set_difficulty(&target.value());
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Playing {
                        g.sampler.request_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.sampler.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use agenda_breaker::consts::FRAME_MS;
    use agenda_breaker::data::{DataProvider, DataSource, MockProvider};
    use agenda_breaker::platform::input::InputSampler;
    use agenda_breaker::platform::notify::LogSink;
    use agenda_breaker::platform::storage::MemoryStore;
    use agenda_breaker::platform::time::{Clock, ManualClock, ManualScheduler};
    use agenda_breaker::platform::{drive_frame, run_loop};
    use agenda_breaker::sim::{GameEvent, GamePhase, GameState};
    use agenda_breaker::Settings;

    struct Demo {
        state: GameState,
        sampler: InputSampler,
        sink: LogSink,
        frames_left: u32,
        next_level_at: Option<f64>,
    }

    impl Demo {
        fn frame(&mut self, now: f64) -> bool {
            let (events, alive) = drive_frame(&mut self.state, &mut self.sampler, &mut self.sink, now);
            for event in events {
                match event {
                    GameEvent::LevelComplete { celebration_ms, .. } => {
                        self.next_level_at = Some(now + celebration_ms);
                    }
                    GameEvent::EffectActivated { kind, polarity } => {
                        log::info!("Effect {:?} ({:?})", kind, polarity);
                    }
                    _ => {}
                }
            }

            if self.state.phase == GamePhase::LevelComplete
                && self.next_level_at.is_some_and(|at| now >= at)
            {
                self.next_level_at = None;
                self.state.proceed_to_next_level();
                self.state.start_next_level(now);
            }

            self.frames_left = self.frames_left.saturating_sub(1);
            if self.frames_left == 0 || matches!(self.state.phase, GamePhase::GameOver | GamePhase::Win) {
                self.state.stop();
            }
            alive && self.state.phase.keeps_frame_loop_alive()
        }
    }

    pub fn run(seed: u64, frames: u32) {
        let mut state = GameState::new(seed);
        let mut provider = MockProvider::new(seed);
        for source in [DataSource::Schedule, DataSource::Board] {
            state.set_records(source, provider.fetch(source));
        }
        let store = MemoryStore::default();
        Settings::load(&store).apply(&mut state);
        state.start_game(0.0);

        let mut sampler = InputSampler::new();
        sampler.toggle_idle_mode();

        let demo = Rc::new(RefCell::new(Demo {
            state,
            sampler,
            sink: LogSink,
            frames_left: frames,
            next_level_at: None,
        }));

        let scheduler = Rc::new(ManualScheduler::default());
        let frame_demo = demo.clone();
        run_loop(scheduler.clone(), Rc::new(move |now: f64| frame_demo.borrow_mut().frame(now)));

        let clock = ManualClock::new(0.0);
        while scheduler.has_pending() {
            scheduler.run_frame(clock.advance(FRAME_MS as f64));
        }

        let demo = demo.borrow();
        log::info!("Demo finished after {:.1}s", clock.now() / 1000.0);
        match serde_json::to_string_pretty(&demo.state.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Agenda Breaker (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - build for wasm32 to play in a browser");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60);
    headless::run(seed, frames);
}
