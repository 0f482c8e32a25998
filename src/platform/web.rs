//! Browser bridge
//!
//! The page owns the renderer and the XR session and calls `frame(dt)` once
//! per rendered frame (requestAnimationFrame normally, the XR frame loop while
//! immersive) with the measured frame time. Platform events are queued here
//! and applied at the start of the next tick. Touches go straight to the
//! tracker since the browser needs an answer before the listener returns.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, TouchEvent};

use crate::input::{Key, TouchPhase, TouchResponse, TouchSample, pose_from_components};
use crate::platform::Snapshot;
use crate::settings::Settings;
use crate::sim::{
    GameState, Handedness, Pose, SessionEvent, SessionMode, TickInput, frame_dt, instance_bytes, tick,
};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Saber Slash module loaded");
}

struct Bridge {
    state: GameState,
    input: TickInput,
    head: Pose,
}

impl Bridge {
    fn key_down(&mut self, key: &str) -> bool {
        match Key::from_web_key(key) {
            Some(key) => {
                self.input.keys.push(key);
                true
            }
            None => false,
        }
    }

    fn touch(&mut self, phase: TouchPhase, id: i32, x: f32, y: f32) -> TouchResponse {
        self.state.touch.record(TouchSample { id, x, y, phase })
    }

    fn session(&mut self, event: SessionEvent) {
        self.input.session_events.push(event);
    }

    fn controller_pose(&mut self, hand: Handedness, pose: Pose) {
        let poses = &mut self.input.controller_poses;
        match poses.iter_mut().find(|(h, _)| *h == hand) {
            Some(entry) => entry.1 = pose,
            None => poses.push((hand, pose)),
        }
    }
}

/// Game handle exported to the page
#[wasm_bindgen]
pub struct WebGame {
    bridge: Rc<RefCell<Bridge>>,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game. `settings_json` may override any tuning value.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> WebGame {
        let settings = Settings::from_json_or_default(settings_json.as_deref());
        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(seed, settings, detect_mode());
        WebGame {
            bridge: Rc::new(RefCell::new(Bridge {
                state,
                input: TickInput::default(),
                head: Pose::IDENTITY,
            })),
        }
    }

    /// Queue a key press. Returns false for keys the game ignores.
    pub fn key_down(&self, key: &str) -> bool {
        self.bridge.borrow_mut().key_down(key)
    }

    /// Record a touch sample. Returns true if the page should suppress the
    /// event's default action.
    pub fn touch(&self, event_type: &str, id: i32, x: f32, y: f32) -> bool {
        match TouchPhase::from_event_type(event_type) {
            Some(phase) => self.bridge.borrow_mut().touch(phase, id, x, y) == TouchResponse::Consumed,
            None => false,
        }
    }

    pub fn session_started(&self) {
        self.bridge.borrow_mut().session(SessionEvent::ImmersiveStarted);
    }

    pub fn session_ended(&self) {
        self.bridge.borrow_mut().session(SessionEvent::ImmersiveEnded);
    }

    /// `handedness` is the XRInputSource field ("left" / "right")
    pub fn controller_connected(&self, handedness: &str) {
        if let Some(hand) = Handedness::from_str(handedness) {
            self.bridge
                .borrow_mut()
                .session(SessionEvent::ControllerConnected(hand));
        }
    }

    pub fn controller_disconnected(&self, handedness: &str) {
        if let Some(hand) = Handedness::from_str(handedness) {
            self.bridge
                .borrow_mut()
                .session(SessionEvent::ControllerDisconnected(hand));
        }
    }

    /// Latest grip pose of a tracked controller
    #[allow(clippy::too_many_arguments)]
    pub fn set_controller_pose(
        &self,
        handedness: &str,
        px: f32,
        py: f32,
        pz: f32,
        qx: f32,
        qy: f32,
        qz: f32,
        qw: f32,
    ) {
        let Some(hand) = Handedness::from_str(handedness) else {
            return;
        };
        if let Some(pose) = pose_from_components([px, py, pz], [qx, qy, qz, qw]) {
            self.bridge.borrow_mut().controller_pose(hand, pose);
        }
    }

    /// Viewer pose, used to place the score label while immersive
    #[allow(clippy::too_many_arguments)]
    pub fn set_head_pose(&self, px: f32, py: f32, pz: f32, qx: f32, qy: f32, qz: f32, qw: f32) {
        if let Some(pose) = pose_from_components([px, py, pz], [qx, qy, qz, qw]) {
            self.bridge.borrow_mut().head = pose;
        }
    }

    /// Run exactly one tick covering `dt_secs` of real time and return the
    /// events it produced as JSON
    pub fn frame(&self, dt_secs: f32) -> String {
        let mut b = self.bridge.borrow_mut();
        let input = std::mem::take(&mut b.input);
        tick(&mut b.state, &input, frame_dt(dt_secs));
        let events = b.state.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Event serialization failed: {e}");
            String::from("[]")
        })
    }

    /// Poses of everything to draw, as JSON
    pub fn snapshot(&self) -> String {
        let b = self.bridge.borrow();
        Snapshot::capture(&b.state, &b.head).to_json()
    }

    /// Particle instance buffer (position, size, rgba per particle)
    pub fn particle_bytes(&self) -> Vec<u8> {
        instance_bytes(&self.bridge.borrow().state.effects)
    }

    pub fn score(&self) -> f64 {
        self.bridge.borrow().state.score as f64
    }

    /// Listen for keys on the window and touches on the element `canvas_id`
    pub fn attach_input_listeners(&self, canvas_id: &str) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Keyboard
        {
            let bridge = self.bridge.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if bridge.borrow_mut().key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let Some(canvas) = document.get_element_by_id(canvas_id) else {
            log::warn!("No element #{canvas_id}, touch input disabled");
            return Ok(());
        };

        // Consumed touches keep the page from scrolling or zooming
        for event_type in ["touchstart", "touchmove", "touchend", "touchcancel"] {
            let Some(phase) = TouchPhase::from_event_type(event_type) else {
                continue;
            };
            let bridge = self.bridge.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let touches = event.changed_touches();
                let mut consumed = false;
                let mut b = bridge.borrow_mut();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let response = b.touch(
                            phase,
                            touch.identifier(),
                            touch.client_x() as f32,
                            touch.client_y() as f32,
                        );
                        consumed |= response == TouchResponse::Consumed;
                    }
                }
                if consumed {
                    event.prevent_default();
                }
            });
            canvas.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

/// Touch-capable devices start in mobile mode
fn detect_mode() -> SessionMode {
    let touch_points = web_sys::window()
        .map(|w| w.navigator().max_touch_points())
        .unwrap_or(0);
    if touch_points > 0 {
        SessionMode::Mobile
    } else {
        SessionMode::Desktop
    }
}
