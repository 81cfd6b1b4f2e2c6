//! Task Bubbles entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        HtmlCanvasElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent, PointerEvent,
        WheelEvent,
    };

    use chrono::NaiveDate;
    use task_bubbles::consts::*;
    use task_bubbles::renderer::{BubbleRenderState, Camera};
    use task_bubbles::sim::{BubbleEvent, BubbleWorld, StepClock, TickInput, tick};
    use task_bubbles::{GpuError, Settings, TaskForm, persistence};

    /// Pointer travel (CSS px) below which a press/release counts as a click
    const CLICK_SLOP: f32 = 5.0;
    /// Orbit speed (radians per CSS px dragged)
    const ORBIT_SENSITIVITY: f32 = 0.008;
    /// Zoom per wheel delta unit
    const ZOOM_SENSITIVITY: f32 = 0.01;

    /// Pointer drag in progress
    struct Drag {
        start: (f32, f32),
        last: (f32, f32),
        moved: bool,
    }

    /// App instance holding all state
    struct App {
        world: BubbleWorld,
        settings: Settings,
        camera: Camera,
        render_state: Option<BubbleRenderState>,
        clock: StepClock,
        last_time: f64,
        input: TickInput,
        drag: Option<Drag>,
        /// Canvas size in CSS pixels
        css_size: (f32, f32),
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        fn new(seed: u64, settings: Settings, css_w: f32, css_h: f32) -> Self {
            Self {
                world: BubbleWorld::new(seed),
                settings,
                camera: Camera::new(css_w / css_h.max(1.0)),
                render_state: None,
                clock: StepClock::default(),
                last_time: 0.0,
                input: TickInput::default(),
                drag: None,
                css_size: (css_w, css_h),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            self.world.set_today(today());
            let params = self.settings.sim_params();
            let substeps = self.clock.advance(dt);
            for _ in 0..substeps {
                let input = std::mem::take(&mut self.input);
                tick(&mut self.world, &input, &params, SIM_DT);
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            // Save whenever the set of tasks changed
            let events = self.world.drain_events();
            let mut changed = false;
            for event in &events {
                match event {
                    BubbleEvent::Spawned { .. } => changed = true,
                    BubbleEvent::Dismissed { task, .. } => {
                        log::info!("Task done: {}", task.name);
                        changed = true;
                    }
                    BubbleEvent::Relaunched { .. } => {}
                }
            }
            if changed {
                persistence::save(&self.world.tasks());
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.world, &self.camera, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-count .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.world.len().to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                let class = if self.settings.show_fps { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.fps.to_string()));
            }

            if let Some(el) = document.get_element_by_id("empty-hint") {
                let class = if self.world.is_empty() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }

        /// Queue a pick for the next tick from a click at CSS pixel coords
        fn click(&mut self, x: f32, y: f32) {
            let ray = self.camera.screen_ray(x, y, self.css_size.0, self.css_size.1);
            self.input.pick = Some(ray);
        }
    }

    /// Today's date from the browser clock (local time)
    fn today() -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(
            now.get_full_year() as i32,
            now.get_month() + 1,
            now.get_date(),
        )
        .unwrap_or_default()
    }

    fn input_value(document: &web_sys::Document, id: &str) -> String {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|el| el.value())
            .unwrap_or_default()
    }

    /// Read the input form
    fn read_form(document: &web_sys::Document) -> TaskForm {
        let priority = document
            .get_element_by_id("task-priority")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
            .map(|el| el.value())
            .unwrap_or_default();
        let repeat = document
            .get_element_by_id("task-repeat")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|el| el.checked())
            .unwrap_or(false);

        TaskForm {
            name: input_value(document, "task-name"),
            due: input_value(document, "task-due"),
            priority,
            category: input_value(document, "task-category"),
            repeat,
        }
    }

    fn show_form_error(document: &web_sys::Document, message: Option<&str>) {
        if let Some(el) = document.get_element_by_id("form-error") {
            el.set_text_content(message);
            let _ = el.set_attribute("class", if message.is_some() { "" } else { "hidden" });
        }
    }

    /// Validate the form and spawn a bubble
    fn submit_form(app: &Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let result = read_form(&document)
            .parse()
            .map_err(|e| e.to_string())
            .and_then(|task| {
                app.borrow_mut()
                    .world
                    .spawn(task, today())
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(_) => {
                show_form_error(&document, None);
                if let Some(name) = document
                    .get_element_by_id("task-name")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    name.set_value("");
                    let _ = name.focus();
                }
            }
            Err(message) => {
                log::warn!("Task rejected: {}", message);
                show_form_error(&document, Some(&message));
            }
        }
    }

    fn show_fatal(message: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading"))
        {
            el.set_text_content(Some(message));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Task Bubbles starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("Missing #canvas element");
            show_fatal("Missing #canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = ((client_w as f64 * dpr) as u32).max(1);
        let height = ((client_h as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let app = Rc::new(RefCell::new(App::new(
            seed,
            settings,
            client_w as f32,
            client_h as f32,
        )));
        log::info!("World initialized with seed: {}", seed);

        let mut render_state = match init_gpu(&canvas, width, height).await {
            Ok(state) => state,
            Err(e) => {
                log::error!("Graphics init failed: {}", e);
                show_fatal(&format!("WebGPU unavailable: {e}"));
                return;
            }
        };
        render_state.set_start_time(window.performance().map(|p| p.now()).unwrap_or(0.0));
        app.borrow_mut().render_state = Some(render_state);

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        // Bring back saved tasks
        {
            let mut a = app.borrow_mut();
            let today = today();
            for task in persistence::load() {
                if let Err(e) = a.world.spawn(task, today) {
                    log::warn!("Dropping saved task: {}", e);
                    break;
                }
            }
            // Restoring is not a change worth saving
            a.world.drain_events();
        }

        setup_form(app.clone());
        setup_pointer_handlers(&canvas, app.clone());
        setup_keyboard(app.clone());
        setup_resize(canvas.clone(), app.clone());

        request_animation_frame(app);

        log::info!("Task Bubbles running!");
    }

    async fn init_gpu(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<BubbleRenderState, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        BubbleRenderState::new(surface, &adapter, width, height).await
    }

    fn setup_form(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Add button
        if let Some(btn) = document.get_element_by_id("add-task") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.prevent_default();
                submit_form(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Enter in the name field
        if let Some(name) = document.get_element_by_id("task-name") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    event.prevent_default();
                    submit_form(&app);
                }
            });
            let _ = name.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let doc = document.clone();
        let app_keys = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            // Leave typing in the form alone
            let typing = doc
                .active_element()
                .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "SELECT" | "TEXTAREA"))
                .unwrap_or(false);
            if typing {
                return;
            }

            let mut a = app_keys.borrow_mut();
            match event.key().as_str() {
                "q" | "Q" => {
                    a.settings.quality = a.settings.quality.next();
                    log::info!("Quality: {}", a.settings.quality.as_str());
                }
                "m" | "M" => {
                    a.settings.reduced_motion = !a.settings.reduced_motion;
                    log::info!("Reduced motion: {}", a.settings.reduced_motion);
                }
                "f" | "F" => a.settings.show_fps = !a.settings.show_fps,
                _ => return,
            }
            a.settings.save();
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();

        // Clear button drops every task and the saved list
        if let Some(btn) = document.get_element_by_id("clear-tasks") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                let ids: Vec<u32> = a.world.bubbles.iter().map(|b| b.id).collect();
                for id in ids {
                    a.world.dismiss(id);
                }
                a.world.drain_events();
                persistence::clear();
                log::info!("All tasks cleared");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Press: start a potential click or drag
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                let pos = (event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut().drag = Some(Drag {
                    start: pos,
                    last: pos,
                    moved: false,
                });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Move: orbit once the pointer leaves the click slop
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut guard = app.borrow_mut();
                let a = &mut *guard;
                let pos = (event.offset_x() as f32, event.offset_y() as f32);
                let Some(drag) = a.drag.as_mut() else {
                    return;
                };
                let (dx, dy) = (pos.0 - drag.last.0, pos.1 - drag.last.1);
                drag.last = pos;
                let travel = (pos.0 - drag.start.0).hypot(pos.1 - drag.start.1);
                if travel > CLICK_SLOP {
                    drag.moved = true;
                }
                if drag.moved {
                    a.camera.orbit(-dx * ORBIT_SENSITIVITY, dy * ORBIT_SENSITIVITY);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release: a press without a drag is a click
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut a = app.borrow_mut();
                if let Some(drag) = a.drag.take() {
                    if !drag.moved {
                        a.click(event.offset_x() as f32, event.offset_y() as f32);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Cancel: drop the drag
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().drag = None;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zoom
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                app.borrow_mut()
                    .camera
                    .zoom(event.delta_y() as f32 * ZOOM_SENSITIVITY);
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = ((client_w as f64 * dpr) as u32).max(1);
            let height = ((client_h as f64 * dpr) as u32).max(1);
            canvas.set_width(width);
            canvas.set_height(height);

            let mut a = app.borrow_mut();
            a.css_size = (client_w as f32, client_h as f32);
            a.camera.set_aspect(client_w as f32, client_h as f32);
            if let Some(render_state) = a.render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt, time);
            a.render(time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Task Bubbles (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Spawn a few sample tasks, let them settle, click the middle of the view
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use task_bubbles::consts::{CLUSTER_TARGET, SIM_DT};
    use task_bubbles::renderer::Camera;
    use task_bubbles::sim::{BubbleWorld, TickInput, tick};
    use task_bubbles::{Settings, TaskForm};

    let today = chrono::Local::now().date_naive();
    let settings = Settings::load();
    let params = settings.sim_params();
    let mut world = BubbleWorld::new(2024);

    let samples = [
        ("Pay rent", 2, "5", "home", true),
        ("Finish slides", 5, "4", "work", false),
        ("Book dentist", 20, "2", "health", false),
        ("Call mom", 0, "3", "family", true),
        ("Read paper", 45, "1", "study", false),
    ];
    for (name, days, priority, category, repeat) in samples {
        let form = TaskForm {
            name: name.to_string(),
            due: (today + chrono::Duration::days(days)).format("%Y-%m-%d").to_string(),
            priority: priority.to_string(),
            category: category.to_string(),
            repeat,
        };
        match form.parse().map_err(|e| e.to_string()).and_then(|task| {
            world.spawn(task, today).map_err(|e| e.to_string())
        }) {
            Ok(id) => log::info!("Added '{}' as bubble {}", name, id),
            Err(e) => log::warn!("Skipped '{}': {}", name, e),
        }
    }

    let input = TickInput::default();
    for _ in 0..(5.0 / SIM_DT) as usize {
        tick(&mut world, &input, &params, SIM_DT);
    }

    for bubble in &world.bubbles {
        log::info!(
            "{:>14}: r={:.2} alpha={:.2} rgb=({:.2}, {:.2}, {:.2}) dist={:.2}",
            bubble.task.name,
            bubble.look.radius,
            bubble.look.opacity,
            bubble.look.color[0],
            bubble.look.color[1],
            bubble.look.color[2],
            bubble.body.position.distance(CLUSTER_TARGET),
        );
    }

    let camera = Camera::new(16.0 / 9.0);
    let click = TickInput {
        pick: Some(camera.screen_ray(800.0, 450.0, 1600.0, 900.0)),
    };
    let before = world.len();
    tick(&mut world, &click, &params, SIM_DT);
    for event in world.drain_events() {
        log::info!("Center click: {:?}", event);
    }
    println!(
        "{} bubbles settled; {} left after a click through the center",
        before,
        world.len()
    );
}
