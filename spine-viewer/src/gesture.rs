//! Turns raw pointer input into the viewer's gesture vocabulary.
//!
//! Timing follows the usual mobile gesture detector: a press that stays inside the tap
//! square is a tap on release, or a long press once held long enough; leaving the square
//! turns the press into a pan. Mouse wheels have no pinch, so wheel steps drive a virtual
//! two-finger distance and the pinch ends after a short idle period.

use glam::Vec2;

/// Virtual finger distance a wheel pinch starts from.
const WHEEL_BASE_DISTANCE: f32 = 100.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gesture {
    Tap { x: f32, y: f32 },
    LongPress { x: f32, y: f32 },
    Pan { x: f32, y: f32, delta_x: f32, delta_y: f32 },
    PanStop { x: f32, y: f32 },
    Zoom { initial_distance: f32, distance: f32 },
    PinchStop,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureSettings {
    /// Side length of the square a press may wander in and still count as a tap.
    pub tap_square_size: f32,
    pub long_press_seconds: f64,
    /// Relative change of the virtual pinch distance per wheel line.
    pub wheel_zoom_step: f32,
    pub pinch_idle_seconds: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            tap_square_size: 20.0,
            long_press_seconds: 1.1,
            wheel_zoom_step: 0.1,
            pinch_idle_seconds: 0.25,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Press {
    origin: Vec2,
    last: Vec2,
    started_at: f64,
    panning: bool,
    long_press_fired: bool,
}

#[derive(Copy, Clone, Debug)]
struct WheelPinch {
    distance: f32,
    last_event_at: f64,
}

#[derive(Clone, Debug, Default)]
pub struct GestureDetector {
    settings: GestureSettings,
    press: Option<Press>,
    wheel: Option<WheelPinch>,
}

impl GestureDetector {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            press: None,
            wheel: None,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn touch_down(&mut self, x: f32, y: f32, now: f64) {
        let at = Vec2::new(x, y);
        self.press = Some(Press {
            origin: at,
            last: at,
            started_at: now,
            panning: false,
            long_press_fired: false,
        });
    }

    pub fn touch_dragged(&mut self, x: f32, y: f32, _now: f64) -> Option<Gesture> {
        let half = self.settings.tap_square_size * 0.5;
        let press = self.press.as_mut()?;
        if press.long_press_fired {
            return None;
        }
        let at = Vec2::new(x, y);
        if !press.panning {
            let offset = (at - press.origin).abs();
            if offset.x <= half && offset.y <= half {
                return None;
            }
            press.panning = true;
        }
        let delta = at - press.last;
        press.last = at;
        Some(Gesture::Pan {
            x,
            y,
            delta_x: delta.x,
            delta_y: delta.y,
        })
    }

    pub fn touch_up(&mut self, x: f32, y: f32, _now: f64) -> Option<Gesture> {
        let press = self.press.take()?;
        if press.long_press_fired {
            return None;
        }
        if press.panning {
            return Some(Gesture::PanStop { x, y });
        }
        Some(Gesture::Tap { x, y })
    }

    /// Cancels the current press without emitting anything (pointer left the window).
    pub fn cancel(&mut self) {
        self.press = None;
    }

    /// `lines` > 0 zooms in.
    pub fn scrolled(&mut self, lines: f32, now: f64) -> Option<Gesture> {
        if lines == 0.0 || !lines.is_finite() {
            return None;
        }
        let factor = (1.0 + self.settings.wheel_zoom_step).powf(lines);
        let wheel = self.wheel.get_or_insert(WheelPinch {
            distance: WHEEL_BASE_DISTANCE,
            last_event_at: now,
        });
        wheel.distance *= factor;
        wheel.last_event_at = now;
        Some(Gesture::Zoom {
            initial_distance: WHEEL_BASE_DISTANCE,
            distance: wheel.distance,
        })
    }

    /// Emits time-driven gestures: long presses and the end of a wheel pinch.
    pub fn update(&mut self, now: f64) -> Vec<Gesture> {
        let mut out = Vec::new();

        if let Some(press) = self.press.as_mut() {
            if !press.panning
                && !press.long_press_fired
                && now - press.started_at >= self.settings.long_press_seconds
            {
                press.long_press_fired = true;
                out.push(Gesture::LongPress {
                    x: press.last.x,
                    y: press.last.y,
                });
            }
        }

        if let Some(wheel) = self.wheel {
            if now - wheel.last_event_at >= self.settings.pinch_idle_seconds {
                self.wheel = None;
                out.push(Gesture::PinchStop);
            }
        }

        out
    }
}
