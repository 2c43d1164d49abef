//! Spiral Walker entry point
//!
//! The browser build drives a session from `requestAnimationFrame` and mirrors
//! each frame into the page. The native build runs a headless walk and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use glam::DVec2;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        MouseEvent, Request, RequestInit, Response, WheelEvent,
    };

    use spiral_walker::geo::{GeoPoint, Projection, WebMercatorViewport};
    use spiral_walker::geodata::{FetchTicket, OVERPASS_URL};
    use spiral_walker::render::spiral_trace;
    use spiral_walker::sim::EventKind;
    use spiral_walker::{Config, ConfigPatch, FetchError, FrameOutput, Session};

    /// Page elements the walker writes to
    struct Page {
        overlay: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        sprite: HtmlElement,
        event_bubble: HtmlElement,
        event_sprite: HtmlElement,
        water_status: HtmlElement,
    }

    struct App {
        session: Session<WebMercatorViewport>,
        page: Page,
    }

    const MIN_ZOOM: f64 = 3.0;
    const MAX_ZOOM: f64 = 19.0;

    fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
        document.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    impl App {
        fn render(&self, frame: &FrameOutput) {
            let page = &self.page;
            set_px(&page.sprite, "left", frame.marker_pixel.x);
            set_px(&page.sprite, "top", frame.marker_pixel.y);
            set_px(&page.sprite, "width", frame.sprite_size);
            set_px(&page.sprite, "height", frame.sprite_size);
            let _ = page.sprite.class_list().toggle_with_force("scuba", frame.submerged);

            match (frame.active_event_category, frame.companion_pixel) {
                (Some(kind), Some(companion)) => {
                    page.event_bubble.set_text_content(frame.active_event_label);
                    let _ = page.event_bubble.class_list().remove_1("hidden");
                    let classes = page.event_sprite.class_list();
                    let _ = classes.remove_1("hidden");
                    for other in EventKind::ALL {
                        let _ = classes.remove_1(other.id());
                    }
                    let _ = classes.add_1(kind.id());
                    let _ = classes.toggle_with_force("water", frame.companion_in_water);
                    set_px(&page.event_sprite, "left", companion.x);
                    set_px(&page.event_sprite, "top", companion.y);
                }
                _ => {
                    let _ = page.event_bubble.class_list().add_1("hidden");
                    let _ = page.event_sprite.class_list().add_1("hidden");
                }
            }

            self.draw_trace(frame.spiral_trace_enabled);
        }

        fn draw_trace(&self, enabled: bool) {
            let page = &self.page;
            let size = self.session.projection().size();
            page.ctx.clear_rect(0.0, 0.0, size.x, size.y);
            if !enabled {
                return;
            }

            let viewport = self.session.projection();
            let center = viewport.to_container(viewport.project(viewport.center()));
            let points = spiral_trace(center, self.session.config().spacing, size.x, size.y);
            page.ctx.set_stroke_style_str("rgba(124, 197, 255, 0.9)");
            page.ctx.set_line_width(1.6);
            page.ctx.begin_path();
            for (i, p) in points.iter().enumerate() {
                if i == 0 {
                    page.ctx.move_to(p.x, p.y);
                } else {
                    page.ctx.line_to(p.x, p.y);
                }
            }
            page.ctx.stroke();
        }

        fn show_status(&self) {
            let message = self.session.water_status().message();
            self.page.water_status.set_text_content(Some(&message));
        }

        fn resize(&mut self, width: f64, height: f64) {
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            self.page.overlay.set_width((width * dpr).round() as u32);
            self.page.overlay.set_height((height * dpr).round() as u32);
            let _ = self.page.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            self.session.projection_mut().resize(width, height);
        }

        /// Drag the map; content follows the pointer
        fn pan(&mut self, dx: f64, dy: f64) {
            self.session.projection_mut().pan_by(DVec2::new(-dx, -dy));
        }

        /// Zoom one level in (`steps > 0`) or out around the current center
        fn zoom_by(&mut self, steps: f64) {
            let viewport = self.session.projection_mut();
            let zoom = (viewport.zoom() + steps).clamp(MIN_ZOOM, MAX_ZOOM);
            if zoom != viewport.zoom() {
                let center = viewport.center();
                viewport.set_view(center, zoom);
                log::debug!("Zoom level {}", zoom);
            }
        }
    }

    fn set_px(el: &HtmlElement, property: &str, value: f64) {
        let _ = el.style().set_property(property, &format!("{}px", value));
    }

    fn js_error(value: JsValue) -> FetchError {
        FetchError::Transport(format!("{:?}", value))
    }

    async fn fetch_overpass(query: &str) -> Result<String, FetchError> {
        let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".to_string()))?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&JsValue::from_str(query));
        let request = Request::new_with_str_and_init(OVERPASS_URL, &init).map_err(js_error)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;
        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }

        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        text.as_string()
            .ok_or_else(|| FetchError::Transport("response body is not text".to_string()))
    }

    fn refresh_water(app: Rc<RefCell<App>>) {
        let ticket: FetchTicket = {
            let mut a = app.borrow_mut();
            let ticket = a.session.trigger_refetch_view();
            a.show_status();
            ticket
        };
        wasm_bindgen_futures::spawn_local(async move {
            let body = fetch_overpass(&ticket.query).await;
            let mut a = app.borrow_mut();
            a.session.complete_refetch_overpass(&ticket, body);
            a.show_status();
        });
    }

    /// Read every control into a patch
    fn read_controls(document: &Document) -> ConfigPatch {
        let number = |id: &str| element::<HtmlInputElement>(document, id).map(|i| i.value_as_number());
        let checked = |id: &str| element::<HtmlInputElement>(document, id).map(|i| i.checked());
        ConfigPatch {
            spacing: number("spacing"),
            speed_factor: number("speed"),
            draw_spiral: checked("drawSpiral"),
            sprite_size: number("spriteSize"),
            allow_water_crossing: checked("allowWater"),
            event_frequency_base: number("eventFrequency"),
            picnic: checked("eventPicnic"),
            monster: checked("eventMonster"),
            chat: checked("eventChat"),
        }
    }

    /// Wire one control; `pick` keeps only the field that control owns
    fn bind_control(app: &Rc<RefCell<App>>, document: &Document, id: &str, event: &str, pick: fn(ConfigPatch) -> ConfigPatch) {
        let Some(input) = element::<HtmlInputElement>(document, id) else {
            log::warn!("Control #{} missing", id);
            return;
        };
        let app = app.clone();
        let document = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let patch = pick(read_controls(&document));
            app.borrow_mut().session.update_configuration(&patch);
        });
        let _ = input.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_controls(app: &Rc<RefCell<App>>, document: &Document) {
        bind_control(app, document, "spacing", "input", |p| ConfigPatch { spacing: p.spacing, ..Default::default() });
        bind_control(app, document, "speed", "input", |p| ConfigPatch { speed_factor: p.speed_factor, ..Default::default() });
        bind_control(app, document, "drawSpiral", "change", |p| ConfigPatch { draw_spiral: p.draw_spiral, ..Default::default() });
        bind_control(app, document, "spriteSize", "input", |p| ConfigPatch { sprite_size: p.sprite_size, ..Default::default() });
        bind_control(app, document, "allowWater", "change", |p| ConfigPatch {
            allow_water_crossing: p.allow_water_crossing,
            ..Default::default()
        });
        bind_control(app, document, "eventFrequency", "input", |p| ConfigPatch {
            event_frequency_base: p.event_frequency_base,
            ..Default::default()
        });
        bind_control(app, document, "eventPicnic", "change", |p| ConfigPatch { picnic: p.picnic, ..Default::default() });
        bind_control(app, document, "eventMonster", "change", |p| ConfigPatch { monster: p.monster, ..Default::default() });
        bind_control(app, document, "eventChat", "change", |p| ConfigPatch { chat: p.chat, ..Default::default() });

        if let Some(button) = document.get_element_by_id("refreshWater") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                refresh_water(app.clone());
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        setup_map_input(app);

        let window = web_sys::window().unwrap();
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            app.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Drag to pan and wheel to zoom on the overlay canvas
    fn setup_map_input(app: &Rc<RefCell<App>>) {
        let canvas = app.borrow().page.overlay.clone();

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // Primary button held
                if event.buttons() & 1 != 0 {
                    app.borrow_mut()
                        .pan(event.movement_x() as f64, event.movement_y() as f64);
                }
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                let steps = if event.delta_y() < 0.0 { 1.0 } else { -1.0 };
                app.borrow_mut().zoom_by(steps);
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            walk_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn walk_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let frame = a.session.tick(time);
            a.render(&frame);
        }
        request_animation_frame(app);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Spiral Walker starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let page = Page {
            overlay: element(&document, "overlay").expect("no overlay canvas"),
            ctx: element::<HtmlCanvasElement>(&document, "overlay")
                .and_then(|c| c.get_context("2d").ok().flatten())
                .and_then(|ctx| ctx.dyn_into().ok())
                .expect("no 2d context"),
            sprite: element(&document, "sprite").expect("no sprite"),
            event_bubble: element(&document, "eventBubble").expect("no event bubble"),
            event_sprite: element(&document, "eventSprite").expect("no event sprite"),
            water_status: element(&document, "waterStatus").expect("no water status"),
        };

        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        let viewport = WebMercatorViewport::new(GeoPoint::new(40.7128, -74.006), 12.0, width, height);

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(viewport, Config::default(), seed);
        session.update_configuration(&read_controls(&document));
        log::info!("Session initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App { session, page }));
        app.borrow_mut().resize(width, height);

        setup_controls(&app, &document);
        refresh_water(app.clone());
        request_animation_frame(app);

        log::info!("Spiral Walker running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use spiral_walker::geo::{GeoPoint, WebMercatorViewport};
    use spiral_walker::geodata::geojson::parse_feature_collection;
    use spiral_walker::{Config, Session};

    env_logger::init();
    log::info!("Spiral Walker (native) starting...");

    let viewport = WebMercatorViewport::new(GeoPoint::new(40.7128, -74.006), 12.0, 800.0, 600.0);
    let mut session = Session::new(viewport, Config::default(), 2024);

    // Optional GeoJSON water file as the first argument
    if let Some(path) = std::env::args().nth(1) {
        let ticket = session.trigger_refetch_view();
        let result = std::fs::read_to_string(&path)
            .map_err(|err| spiral_walker::FetchError::Transport(err.to_string()))
            .and_then(|body| parse_feature_collection(&body));
        session.complete_refetch(&ticket, result);
        log::info!("{}", session.water_status().message());
    }

    // 30 seconds at 60 fps
    let frame_ms = 1000.0 / 60.0;
    for frame in 0..=1800u32 {
        let now = frame as f64 * frame_ms;
        let out = session.tick(now);
        if frame % 60 == 0 {
            log::info!(
                "t={:5.2} marker=({:.5}, {:.5}) px=({:.1}, {:.1}){}{}",
                session.spiral_t(),
                out.marker_geo.lat,
                out.marker_geo.lng,
                out.marker_pixel.x,
                out.marker_pixel.y,
                if out.submerged { " [scuba]" } else { "" },
                out.active_event_label.map(|l| format!(" [{}]", l)).unwrap_or_default(),
            );
        }
    }
}
