//! Cinema Hall entry point
//!
//! In the browser this wires the canvas, DOM events and the frame loop to the
//! hall. Natively it runs a headless walk-through as a self-check.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_viewer {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use cinema_hall::Settings;
    use cinema_hall::assets::fetch_image;
    use cinema_hall::hall::{FrameInput, HallState, TextureSlot, is_effects_toggle, pick_seat, tick};
    use cinema_hall::hud::{FpsCounter, HudText};
    use cinema_hall::renderer::SceneRenderState;
    use cinema_hall::screen_to_ndc;

    const CANVAS_ID: &str = "main-three-canvas";
    const TOGGLE_BUTTON_ID: &str = "toggleButton";

    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock(id) {
            const canvas = document.getElementById(id);
            if (canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.warn('Pointer lock refused:', e));
                }
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock(id: &str);
    }

    /// Viewer instance shared by the frame loop and event handlers
    struct Viewer {
        state: HallState,
        settings: Settings,
        render_state: Option<SceneRenderState>,
        fps: FpsCounter,
        pointer_locked: bool,
        last_hud: Option<HudText>,
    }

    impl Viewer {
        fn new(settings: Settings) -> Self {
            Self {
                state: HallState::new(&settings),
                settings,
                render_state: None,
                fps: FpsCounter::default(),
                pointer_locked: false,
                last_hud: None,
            }
        }

        /// Advance one frame
        fn update(&mut self, time: f64) {
            self.fps.record(time);
            let input = FrameInput {
                now_ms: js_sys::Date::now(),
            };
            tick(&mut self.state, &input);
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Copy HUD values into the DOM when they change
        fn update_hud(&mut self, document: &Document) {
            let hud = HudText::new(&self.state, self.fps.fps(), self.settings.show_fps);
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            if let Some(fps) = &hud.fps {
                set_hud_value(document, "hud-fps", fps);
            }
            set_hud_value(document, "hud-effects", &hud.effects);
            set_hud_value(document, "hud-picked", &hud.picked);
            self.last_hud = Some(hud);
        }
    }

    fn set_hud_value(document: &Document, item_id: &str, text: &str) {
        let selector = format!("#{} .hud-value", item_id);
        if let Some(el) = document.query_selector(&selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(js_err)?;

        log::info!("Cinema Hall starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let settings = Settings::load();

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or("no canvas")?
            .dyn_into()?;

        // Size the canvas once; later viewport changes are not tracked
        let ratio = settings.pixel_ratio(window.device_pixel_ratio());
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * ratio) as u32;
        let height = (client_h as f64 * ratio) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let render_state = SceneRenderState::from_canvas(
            canvas.clone(),
            width,
            height,
            settings.quality.fan_segments(),
        )
        .await
        .map_err(js_err)?;

        // The device may cap the surface below the requested size
        let (width, height) = render_state.size;
        canvas.set_width(width);
        canvas.set_height(height);

        let viewer = Rc::new(RefCell::new(Viewer::new(settings.clone())));
        viewer
            .borrow_mut()
            .state
            .camera
            .set_aspect(width as f32, height as f32);
        viewer.borrow_mut().render_state = Some(render_state);

        load_textures(viewer.clone(), &settings.asset_root);
        setup_input_handlers(&window, &document, &canvas, viewer.clone());
        setup_toggle_button(&document, viewer.clone());

        request_animation_frame(viewer);

        log::info!(
            "Cinema Hall running ({}x{}, quality {})",
            width,
            height,
            settings.quality.as_str()
        );
        Ok(())
    }

    /// Fetch every surface texture in the background. A failure leaves that
    /// surface untextured.
    fn load_textures(viewer: Rc<RefCell<Viewer>>, asset_root: &str) {
        for slot in TextureSlot::ALL {
            let viewer = viewer.clone();
            let url = slot.url(asset_root);
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_image(&url).await {
                    Ok(image) => {
                        if let Some(render_state) = viewer.borrow_mut().render_state.as_mut() {
                            render_state.set_texture(slot, &image);
                        }
                    }
                    Err(e) => log::warn!("Texture {} unavailable: {}", url, e),
                }
            });
        }
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        viewer: Rc<RefCell<Viewer>>,
    ) {
        // Pointer lock change
        {
            let viewer = viewer.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = doc.pointer_lock_element().is_some();
                let mut v = viewer.borrow_mut();
                v.pointer_locked = locked;
                if locked {
                    log::info!("Pointer lock acquired");
                } else {
                    // Keys released while unlocked never reach us
                    v.state.intent.clear();
                    log::info!("Pointer lock released");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse look while locked
        {
            let viewer = viewer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut v = viewer.borrow_mut();
                if v.pointer_locked {
                    v.state
                        .look(event.movement_x() as f32, event.movement_y() as f32);
                }
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Canvas click: pick, then engage pointer lock
        {
            let viewer = viewer.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut v = viewer.borrow_mut();

                // Locked cursor is hidden at the view center
                let ndc = if v.pointer_locked {
                    glam::Vec2::ZERO
                } else {
                    screen_to_ndc(
                        event.offset_x() as f32,
                        event.offset_y() as f32,
                        canvas_clone.client_width().max(1) as f32,
                        canvas_clone.client_height().max(1) as f32,
                    )
                };
                pick_seat(&mut v.state, ndc);

                if !v.pointer_locked {
                    drop(v);
                    request_pointer_lock(CANVAS_ID);
                }
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let viewer = viewer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut v = viewer.borrow_mut();
                v.state.intent.apply_key(&event.code(), true);
                if is_effects_toggle(&event.key()) {
                    v.state.toggle_effects();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let viewer = viewer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                viewer.borrow_mut().state.intent.apply_key(&event.code(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur swallows keyup events
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut v = viewer.borrow_mut();
                if v.state.intent.any() {
                    v.state.intent.clear();
                    log::info!("Movement cleared (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_toggle_button(document: &Document, viewer: Rc<RefCell<Viewer>>) {
        match document.get_element_by_id(TOGGLE_BUTTON_ID) {
            Some(btn) => {
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    viewer.borrow_mut().state.toggle_effects();
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            None => log::warn!("No #{} on the page", TOGGLE_BUTTON_ID),
        }
    }

    fn request_animation_frame(viewer: Rc<RefCell<Viewer>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(viewer, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(viewer: Rc<RefCell<Viewer>>, time: f64) {
        {
            let mut v = viewer.borrow_mut();
            v.update(time);
            v.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                v.update_hud(&document);
            }
        }

        request_animation_frame(viewer);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    let result = wasm_viewer::run().await;
    if let Err(ref e) = result {
        log::error!("Startup failed: {:?}", e);
    }
    result
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cinema Hall (native) starting...");
    log::info!("Rendering needs a browser canvas - build for wasm32 and serve index.html");

    match self_check::run() {
        Ok(summary) => println!("✓ {}", summary),
        Err(e) => {
            eprintln!("✗ self-check failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless walk-through: builds the hall, walks to the back rows, picks a seat
#[cfg(not(target_arch = "wasm32"))]
mod self_check {
    use cinema_hall::Settings;
    use cinema_hall::hall::{
        FrameInput, HallState, RoomBounds, draw_list, pick_seat, seat_position, tick,
    };

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() -> Result<String, String> {
        let settings = Settings::load();
        let mut state = HallState::new(&settings);
        let mut now_ms = 0.0;
        let mut step = |state: &mut HallState, frames: usize| {
            for _ in 0..frames {
                now_ms += FRAME_MS;
                tick(state, &FrameInput { now_ms });
            }
        };

        // Turn around and walk back toward the seats
        state.camera.yaw = std::f32::consts::PI;
        state.intent.apply_key("KeyW", true);
        step(&mut state, 120);
        state.intent.apply_key("KeyW", false);
        log::info!("Walked to {:?}", state.camera.position);

        if !RoomBounds::room().contains(state.camera.position) {
            return Err(format!("camera left the room at {:?}", state.camera.position));
        }

        let spin = state.fans[0].blade_angle;
        state.toggle_effects();
        step(&mut state, 30);
        if state.fans[0].blade_angle != spin {
            return Err("fans kept spinning with effects off".to_string());
        }
        state.toggle_effects();
        step(&mut state, 1);

        // Look down at seat 42 from above its row and pick through the view center
        state.camera.position = glam::Vec3::new(-3.0, 3.0, 10.6);
        state.camera.look_toward(seat_position(42));
        let hit = pick_seat(&mut state, glam::Vec2::ZERO)
            .ok_or_else(|| "pick through view center missed".to_string())?;
        if hit.seat != 42 {
            return Err(format!("picked seat {} instead of 42", hit.seat));
        }

        Ok(format!(
            "{} frames, {} draws, seat {} highlighted at {:.2}",
            state.frame_count,
            draw_list(&state).len(),
            hit.seat,
            hit.distance
        ))
    }
}
