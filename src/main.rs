//! Energy Drift entry point
//!
//! In the browser this hosts the game on a 2D canvas with a DOM HUD.
//! Natively it runs a short headless demo session and prints the final
//! snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, HtmlInputElement,
        KeyboardEvent, MouseEvent, PageTransitionEvent, TouchEvent,
    };

    use energy_drift::GameConfig;
    use energy_drift::platform::input::collect_orb;
    use energy_drift::platform::{Direction, DragAdapter, FrameDriver, KeyboardAdapter, OnScreenPad};
    use energy_drift::sim::{GameEvent, GameState, PlayerId};

    /// How long a toast stays on screen (ms)
    const TOAST_MS: f64 = 2000.0;
    const BACKGROUND: &str = "#0b0b1a";
    const ORB_COLOR: &str = "#FACC15";
    const PROJECTILE_RADIUS: f64 = 5.0;

    struct Toast {
        text: String,
        positive: bool,
        shown_at: Option<f64>,
    }

    /// Game instance holding all host state
    struct Game {
        state: GameState,
        driver: FrameDriver,
        keyboard: KeyboardAdapter,
        drag: DragAdapter,
        pad: OnScreenPad,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        toast: Option<Toast>,
        raf_id: Option<i32>,
        /// Every listener that can reach the session
        listeners: Vec<Listener>,
    }

    /// A DOM listener the host detaches on teardown and reattaches on restore
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Listener {
        fn attach(&self) -> Result<(), JsValue> {
            self.target
                .add_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
        }

        fn detach(&self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    impl Game {
        /// Run one animation frame
        fn frame(&mut self, time: f64) {
            let report = self.driver.on_animation_frame(&mut self.state, time);
            if self.driver.is_initialized() {
                self.keyboard.advance(&mut self.state, report.delta_ms);
                self.pad.advance(&mut self.state, report.delta_ms);
            }

            for event in self.state.drain_events() {
                self.show_toast(&event);
            }

            if let Err(e) = self.draw() {
                log::debug!("draw failed: {e:?}");
            }
            self.update_hud(time);
        }

        fn show_toast(&mut self, event: &GameEvent) {
            log::info!("{event}");
            self.toast = Some(Toast {
                text: event.to_string(),
                positive: event.is_positive(),
                shown_at: None,
            });
        }

        /// Canvas-relative coordinates of a client-space point
        fn to_arena(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                (client_x as f64 - rect.left()) as f32,
                (client_y as f64 - rect.top()) as f32,
            )
        }

        /// Match the canvas backing store to its layout size and tell the driver
        fn resize(&mut self) {
            let w = self.canvas.client_width().max(0);
            let h = self.canvas.client_height().max(0);
            self.canvas.set_width(w as u32);
            self.canvas.set_height(h as u32);
            self.driver.on_resize(&mut self.state, w as f32, h as f32);
        }

        fn press_at(&mut self, point: Vec2, pointer: Option<i32>) {
            if self.drag.pointer_down(&mut self.state, point, pointer).is_some() {
                return;
            }
            let clicked = self
                .state
                .energy_orbs()
                .iter()
                .find(|o| o.position.distance(point) <= o.size / 2.0)
                .map(|o| o.id);
            if let Some(orb) = clicked {
                collect_orb(&mut self.state, orb);
            }
        }

        fn color_of(&self, player: PlayerId) -> &str {
            self.state
                .player(player)
                .map(|p| p.color.as_str())
                .unwrap_or("#ffffff")
        }

        fn circle(&self, center: Vec2, radius: f64) -> Result<(), JsValue> {
            self.ctx.begin_path();
            self.ctx.arc(center.x as f64, center.y as f64, radius, 0.0, TAU)
        }

        /// Draw the arena with plain 2D canvas primitives
        fn draw(&self) -> Result<(), JsValue> {
            let arena = self.state.game_area_size();
            let ctx = &self.ctx;
            ctx.set_fill_style_str(BACKGROUND);
            ctx.fill_rect(0.0, 0.0, arena.width as f64, arena.height as f64);

            for base in self.state.bases() {
                let color = self.color_of(base.player);
                self.circle(base.position, base.size as f64 / 2.0)?;
                ctx.set_global_alpha(0.25);
                ctx.set_fill_style_str(color);
                ctx.fill();
                ctx.set_global_alpha(1.0);
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(3.0);
                ctx.stroke();
            }

            ctx.set_fill_style_str(ORB_COLOR);
            for orb in self.state.energy_orbs() {
                self.circle(orb.position, orb.size as f64 / 2.0)?;
                ctx.fill();
            }

            for projectile in self.state.projectiles() {
                ctx.set_fill_style_str(self.color_of(projectile.owner));
                self.circle(projectile.position, PROJECTILE_RADIUS)?;
                ctx.fill();
            }

            ctx.set_font("12px sans-serif");
            ctx.set_text_align("center");
            for ufo in self.state.ufos() {
                let color = self.color_of(ufo.owner);
                let radius = ufo.radius as f64;
                ctx.save();
                ctx.translate(ufo.position.x as f64, ufo.position.y as f64)?;
                ctx.rotate((ufo.rotation as f64).to_radians())?;

                ctx.begin_path();
                ctx.ellipse(0.0, 0.0, radius, radius * 0.6, 0.0, 0.0, TAU)?;
                ctx.set_fill_style_str(color);
                ctx.fill();

                // Nose marks the firing direction
                ctx.begin_path();
                ctx.move_to(radius * 0.4, 0.0);
                ctx.line_to(radius, 0.0);
                ctx.set_stroke_style_str("#ffffff");
                ctx.set_line_width(if ufo.is_dragging { 4.0 } else { 2.0 });
                ctx.stroke();
                ctx.restore();

                if ufo.collected_energy > 0 {
                    ctx.set_fill_style_str("#ffffff");
                    ctx.fill_text(
                        &ufo.collected_energy.to_string(),
                        ufo.position.x as f64,
                        (ufo.position.y - ufo.radius - 6.0) as f64,
                    )?;
                }
            }
            Ok(())
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, time: f64) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            for (player, selector) in [(PlayerId::ONE, "#hud-p1"), (PlayerId::TWO, "#hud-p2")] {
                let Some(el) = document.query_selector(selector).ok().flatten() else {
                    continue;
                };
                match self.state.player(player) {
                    Some(p) => {
                        let _ = el.set_attribute("class", "hud-item");
                        if let Some(val) = document
                            .query_selector(&format!("{selector} .hud-value"))
                            .ok()
                            .flatten()
                        {
                            let progress = self.state.winning_progress(player);
                            val.set_text_content(Some(&format!(
                                "{} / {} ({progress:.0}%)",
                                p.stored_energy,
                                self.state.winning_score()
                            )));
                        }
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }

            if let Some(el) = document.query_selector("#hud-carried .hud-value").ok().flatten() {
                let carried = self
                    .state
                    .first_ufo_of(PlayerId::ONE)
                    .map(|u| u.collected_energy)
                    .unwrap_or(0);
                el.set_text_content(Some(&carried.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-status") {
                let status = if self.state.players().iter().any(|p| p.is_winner) {
                    "Game over"
                } else if self.state.is_running() {
                    "Running"
                } else {
                    "Paused"
                };
                el.set_text_content(Some(status));
            }

            if let Some(el) = document.get_element_by_id("toast") {
                match self.toast.as_mut() {
                    Some(toast) => {
                        let shown_at = *toast.shown_at.get_or_insert(time);
                        if time - shown_at > TOAST_MS {
                            self.toast = None;
                            let _ = el.set_attribute("class", "hidden");
                        } else {
                            let class = if toast.positive { "toast good" } else { "toast bad" };
                            let _ = el.set_attribute("class", class);
                            el.set_text_content(Some(&toast.text));
                        }
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }

        /// Stop the loop and cut every input path into the session
        fn teardown(&mut self) {
            self.driver.teardown();
            self.drag.cancel(&mut self.state);
            self.keyboard.release_all();
            self.pad.release();
            if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            for listener in &self.listeners {
                listener.detach();
            }
        }

        /// Undo `teardown`; the caller restarts the frame loop
        fn resume(&mut self) {
            for listener in &self.listeners {
                if let Err(e) = listener.attach() {
                    log::warn!("could not reattach {} listener: {e:?}", listener.kind);
                }
            }
            self.driver.resume();
        }
    }

    /// Read balance overrides from `<script id="game-config" type="application/json">`
    fn load_config(document: &Document) -> GameConfig {
        match document
            .get_element_by_id("game-config")
            .and_then(|el| el.text_content())
        {
            Some(json) if !json.trim().is_empty() => GameConfig::from_json_or_default(&json),
            _ => GameConfig::default(),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {e}").into());
        }

        log::info!("Energy Drift starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let config = load_config(&document);
        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(seed, config),
            driver: FrameDriver::new(),
            keyboard: KeyboardAdapter::new(),
            drag: DragAdapter::new(),
            pad: OnScreenPad::new(),
            canvas: canvas.clone(),
            ctx,
            toast: None,
            raf_id: None,
            listeners: Vec::new(),
        }));
        log::info!("Game created with seed: {seed}");

        // May be 0x0 if layout has not happened yet; the first real size wins
        game.borrow_mut().resize();

        let mut listeners = Vec::new();
        setup_pointer_handlers(&mut listeners, &canvas, game.clone())?;
        setup_keyboard_handlers(&mut listeners, &window, game.clone())?;
        setup_controls(&mut listeners, &document, game.clone())?;
        setup_pad(&mut listeners, &document, game.clone())?;
        setup_resize(&mut listeners, &window, game.clone())?;
        game.borrow_mut().listeners = listeners;
        setup_lifecycle(&window, game.clone())?;

        request_animation_frame(game);
        log::info!("Energy Drift running!");
        Ok(())
    }

    /// Attach a session listener and keep it so teardown can remove it
    fn listen(
        listeners: &mut Vec<Listener>,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let listener = Listener {
            target: target.clone(),
            kind,
            closure: Closure::<dyn FnMut(web_sys::Event)>::new(handler),
        };
        listener.attach()?;
        listeners.push(listener);
        Ok(())
    }

    /// Attach a listener for the life of the page
    fn listen_forever(
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_pointer_handlers(
        listeners: &mut Vec<Listener>,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Mouse: press on the canvas, follow and release anywhere
        {
            let game = game.clone();
            listen(listeners, canvas, "mousedown", move |event| {
                let event = event.unchecked_into::<MouseEvent>();
                if event.button() != 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                let point = g.to_arena(event.client_x(), event.client_y());
                g.press_at(point, None);
            })?;
        }
        {
            let game = game.clone();
            listen(listeners, &window, "mousemove", move |event| {
                let event = event.unchecked_into::<MouseEvent>();
                let mut g = game.borrow_mut();
                if g.drag.dragging().is_none() {
                    return;
                }
                let point = g.to_arena(event.client_x(), event.client_y());
                let Game { state, drag, .. } = &mut *g;
                drag.pointer_move(state, point, None);
            })?;
        }
        {
            let game = game.clone();
            listen(listeners, &window, "mouseup", move |_event| {
                let mut g = game.borrow_mut();
                let Game { state, drag, .. } = &mut *g;
                drag.pointer_up(state, None);
            })?;
        }

        // Touch: track the finger that started the drag
        {
            let game = game.clone();
            listen(listeners, canvas, "touchstart", move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                event.prevent_default();
                let mut g = game.borrow_mut();
                let point = g.to_arena(touch.client_x(), touch.client_y());
                g.press_at(point, Some(touch.identifier()));
            })?;
        }
        {
            let game = game.clone();
            listen(listeners, canvas, "touchmove", move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                event.prevent_default();
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let point = g.to_arena(touch.client_x(), touch.client_y());
                        let Game { state, drag, .. } = &mut *g;
                        drag.pointer_move(state, point, Some(touch.identifier()));
                    }
                }
            })?;
        }
        {
            let game = game.clone();
            listen(listeners, canvas, "touchend", move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                let touches = event.changed_touches();
                let mut g = game.borrow_mut();
                let Game { state, drag, .. } = &mut *g;
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        drag.pointer_up(state, Some(touch.identifier()));
                    }
                }
            })?;
        }
        listen(listeners, canvas, "touchcancel", move |_event| {
            let mut g = game.borrow_mut();
            let Game { state, drag, .. } = &mut *g;
            drag.cancel(state);
        })?;
        Ok(())
    }

    fn setup_keyboard_handlers(
        listeners: &mut Vec<Listener>,
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        {
            let game = game.clone();
            listen(listeners, window, "keydown", move |event| {
                let event = event.unchecked_into::<KeyboardEvent>();
                let key = event.key();
                let mut g = game.borrow_mut();
                let Game { state, keyboard, .. } = &mut *g;
                if keyboard.key_down(state, &key) {
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                }
            })?;
        }
        {
            let game = game.clone();
            listen(listeners, window, "keyup", move |event| {
                let event = event.unchecked_into::<KeyboardEvent>();
                game.borrow_mut().keyboard.key_up(&event.key());
            })?;
        }
        listen(listeners, window, "blur", move |_event| {
            game.borrow_mut().keyboard.release_all();
        })
    }

    /// Start / pause / reset / spawn buttons and the two-player toggle
    fn setup_controls(
        listeners: &mut Vec<Listener>,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let buttons: [(&str, fn(&mut GameState)); 4] = [
            ("start-btn", |s| s.start_game()),
            ("pause-btn", |s| s.pause_game()),
            ("reset-btn", |s| s.reset_game()),
            ("spawn-orb-btn", |s| {
                s.spawn_random_orb();
            }),
        ];
        for (id, action) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                log::debug!("no #{id} button");
                continue;
            };
            let game = game.clone();
            listen(listeners, &btn, "click", move |_event| {
                action(&mut game.borrow_mut().state);
            })?;
        }

        if let Some(toggle) = document.get_element_by_id("multiplayer-toggle") {
            let input: HtmlInputElement = toggle.dyn_into()?;
            let checkbox = input.clone();
            listen(listeners, &input, "change", move |_event| {
                let mut g = game.borrow_mut();
                g.state.toggle_multiplayer(checkbox.checked());
                g.state.reset_game();
                log::info!("two-player mode: {}", checkbox.checked());
            })?;
        }
        Ok(())
    }

    /// On-screen direction pad plus GRAB and FIRE
    fn setup_pad(
        listeners: &mut Vec<Listener>,
        document: &Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let directions = [
            ("pad-up", Direction::Up),
            ("pad-down", Direction::Down),
            ("pad-left", Direction::Left),
            ("pad-right", Direction::Right),
        ];
        for (id, direction) in directions {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            for kind in ["mousedown", "touchstart"] {
                let game = game.clone();
                listen(listeners, &btn, kind, move |event| {
                    event.prevent_default();
                    game.borrow_mut().pad.press(direction);
                })?;
            }
            for kind in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
                let game = game.clone();
                listen(listeners, &btn, kind, move |_event| {
                    game.borrow_mut().pad.release();
                })?;
            }
        }

        if let Some(btn) = document.get_element_by_id("pad-grab") {
            let game = game.clone();
            listen(listeners, &btn, "click", move |_event| {
                let mut g = game.borrow_mut();
                let Game { state, pad, .. } = &mut *g;
                pad.grab(state);
            })?;
        }
        if let Some(btn) = document.get_element_by_id("pad-fire") {
            listen(listeners, &btn, "click", move |_event| {
                let mut g = game.borrow_mut();
                let Game { state, pad, .. } = &mut *g;
                pad.fire(state);
            })?;
        }
        Ok(())
    }

    fn setup_resize(
        listeners: &mut Vec<Listener>,
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        listen(listeners, window, "resize", move |_event| {
            game.borrow_mut().resize();
        })
    }

    /// Teardown when the page goes away, restore from the back/forward cache
    fn setup_lifecycle(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            listen_forever(window, "pagehide", move |_event| {
                game.borrow_mut().teardown();
                log::info!("Energy Drift stopped");
            })?;
        }
        listen_forever(window, "pageshow", move |event| {
            let event = event.unchecked_into::<PageTransitionEvent>();
            if !event.persisted() || !game.borrow().driver.is_torn_down() {
                return;
            }
            game.borrow_mut().resume();
            request_animation_frame(game.clone());
            log::info!("Energy Drift restored");
        })
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(handle, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            if g.driver.is_torn_down() {
                return;
            }
            // Layout can land after startup without a resize event
            if !g.driver.is_initialized() {
                g.resize();
            }
            g.frame(time);
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
fn main() {
    env_logger::init();
    log::info!("Energy Drift (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let (snapshot, events) = demo::run(seed, 60 * 60);

    let report = serde_json::json!({ "snapshot": snapshot, "events": events });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("could not serialize demo report: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted two-player session driven through the same adapters a host uses
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use energy_drift::GameConfig;
    use energy_drift::platform::FrameDriver;
    use energy_drift::platform::input::{FRAME_MS, collect_orb, move_ufo_within_arena, release_ufo};
    use energy_drift::sim::collision::{docked_at_base, nearest, within_reach};
    use energy_drift::sim::{EntityId, GameEvent, GameSnapshot, GameState, PlayerId};
    use energy_drift::heading_degrees;

    /// Carried energy at which a pilot heads home
    const RETURN_THRESHOLD: u32 = 40;

    /// Play `frames` frames; returns the final snapshot and every event seen
    pub fn run(seed: u64, frames: u32) -> (GameSnapshot, Vec<GameEvent>) {
        let mut state = GameState::new(seed, GameConfig::default());
        let mut driver = FrameDriver::new();
        state.toggle_multiplayer(true);
        driver.on_resize(&mut state, 800.0, 600.0);
        state.start_game();

        let mut history = Vec::new();
        let mut time = 0.0;
        for frame in 0..frames {
            driver.on_animation_frame(&mut state, time);
            time += FRAME_MS as f64;

            for player in [PlayerId::ONE, PlayerId::TWO] {
                pilot(&mut state, player);
            }
            // Player 2 takes a shot now and then
            if frame % 90 == 0 {
                shoot_at_rival(&mut state, PlayerId::TWO, PlayerId::ONE);
            }

            for event in state.drain_events() {
                log::info!("[{:>6.0} ms] {event}", state.elapsed_ms());
                history.push(event);
            }
            if !state.is_running() {
                break;
            }
        }
        (state.snapshot(), history)
    }

    /// Fly toward the nearest orb, or home when carrying enough
    fn pilot(state: &mut GameState, player: PlayerId) {
        let Some(ufo) = state.first_ufo_of(player) else {
            return;
        };
        let (id, position, radius, carried, speed) =
            (ufo.id, ufo.position, ufo.radius, ufo.collected_energy, ufo.speed);
        let Some(base) = state.base_for(player) else {
            return;
        };
        let (base_pos, base_size) = (base.position, base.size);

        if carried >= RETURN_THRESHOLD {
            if docked_at_base(position, radius, base_pos, base_size) {
                release_ufo(state, id);
            } else {
                step_toward(state, id, position, base_pos, speed);
            }
            return;
        }

        let Some((orb, _)) = nearest(position, state.energy_orbs()) else {
            return;
        };
        let (orb_id, orb_pos) = (orb.id, orb.position);
        if within_reach(position, radius, orb_pos, orb.size) {
            collect_orb(state, orb_id);
        } else {
            step_toward(state, id, position, orb_pos, speed);
        }
    }

    fn step_toward(state: &mut GameState, id: EntityId, from: glam::Vec2, to: glam::Vec2, speed: f32) {
        let delta = to - from;
        let step = delta.clamp_length_max(speed);
        move_ufo_within_arena(state, id, from + step, true);
    }

    fn shoot_at_rival(state: &mut GameState, shooter: PlayerId, target: PlayerId) {
        let (Some(ufo), Some(rival)) = (state.first_ufo_of(shooter), state.first_ufo_of(target)) else {
            return;
        };
        let (id, aim) = (ufo.id, heading_degrees(rival.position - ufo.position));
        if let Err(e) = state.fire_projectile(id, aim) {
            log::debug!("{shooter} holds fire: {e}");
        }
    }
}
