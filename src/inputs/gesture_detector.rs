//! Single-pointer gesture recognition: down, show-press, long-press,
//! single tap, scroll and fling.
//!
//! Timed callbacks (show-press, long-press) fire when a later event or a
//! [`GestureDetector::poll`] call observes that their deadline has passed.

use log::trace;

use super::GestureConfig;
use super::motion::{MotionAction, MotionEvent};
use super::velocity::VelocityTracker;

/// Receiver of recognized gestures.
///
/// The boolean results mirror the usual "consumed" convention; the detector
/// does not change its behavior based on them except for `on_down`.
pub trait OnGestureListener {
    fn on_down(&mut self, e: &MotionEvent) -> bool;
    fn on_show_press(&mut self, e: &MotionEvent);
    fn on_single_tap_up(&mut self, e: &MotionEvent) -> bool;
    /// `distance_x`/`distance_y` are the focus movement since the previous
    /// scroll callback, positive when the finger moved left/up.
    fn on_scroll(
        &mut self,
        down: &MotionEvent,
        current: &MotionEvent,
        distance_x: f32,
        distance_y: f32,
    ) -> bool;
    fn on_long_press(&mut self, e: &MotionEvent);
    /// Velocities are finger velocities in px/s.
    fn on_fling(
        &mut self,
        down: &MotionEvent,
        up: &MotionEvent,
        velocity_x: f32,
        velocity_y: f32,
    ) -> bool;
}

#[derive(Debug)]
pub struct GestureDetector {
    config: GestureConfig,
    velocity: VelocityTracker,

    current_down: Option<MotionEvent>,
    down_focus_x: f32,
    down_focus_y: f32,
    last_focus_x: f32,
    last_focus_y: f32,

    still_down: bool,
    in_long_press: bool,
    always_in_tap_region: bool,

    show_press_at: Option<u64>,
    long_press_at: Option<u64>,
}

impl GestureDetector {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            velocity: VelocityTracker::new(),
            current_down: None,
            down_focus_x: 0.0,
            down_focus_y: 0.0,
            last_focus_x: 0.0,
            last_focus_y: 0.0,
            still_down: false,
            in_long_press: false,
            always_in_tap_region: false,
            show_press_at: None,
            long_press_at: None,
        }
    }

    #[must_use]
    pub fn is_long_press_active(&self) -> bool {
        self.in_long_press
    }

    /// Fire any timed callbacks whose deadline is at or before `now_ms`
    pub fn poll<L: OnGestureListener + ?Sized>(&mut self, now_ms: u64, listener: &mut L) {
        let Some(down) = self.current_down.clone() else {
            return;
        };

        if self.show_press_at.is_some_and(|at| now_ms >= at) {
            self.show_press_at = None;
            trace!("show press at {now_ms}ms");
            listener.on_show_press(&down);
        }

        if self.long_press_at.is_some_and(|at| now_ms >= at) {
            self.long_press_at = None;
            self.in_long_press = true;
            self.always_in_tap_region = false;
            trace!("long press at {now_ms}ms");
            listener.on_long_press(&down);
        }
    }

    pub fn on_touch_event<L: OnGestureListener + ?Sized>(
        &mut self,
        ev: &MotionEvent,
        listener: &mut L,
    ) -> bool {
        if ev.action != MotionAction::Down {
            self.poll(ev.time_ms, listener);
        }

        if ev.action == MotionAction::Down {
            self.velocity.clear();
        }
        self.velocity.add_movement(ev);

        let skip = match ev.action {
            MotionAction::PointerUp(idx) => Some(idx),
            _ => None,
        };
        let (focus_x, focus_y) = ev.focus(skip);

        match ev.action {
            MotionAction::PointerDown(_) => {
                self.down_focus_x = focus_x;
                self.last_focus_x = focus_x;
                self.down_focus_y = focus_y;
                self.last_focus_y = focus_y;
                self.cancel_taps();
                false
            }

            MotionAction::PointerUp(_) => {
                self.down_focus_x = focus_x;
                self.last_focus_x = focus_x;
                self.down_focus_y = focus_y;
                self.last_focus_y = focus_y;
                false
            }

            MotionAction::Down => {
                self.down_focus_x = focus_x;
                self.last_focus_x = focus_x;
                self.down_focus_y = focus_y;
                self.last_focus_y = focus_y;
                self.current_down = Some(ev.clone());
                self.always_in_tap_region = true;
                self.still_down = true;
                self.in_long_press = false;
                self.show_press_at = Some(ev.time_ms + self.config.tap_timeout_ms);
                self.long_press_at = Some(ev.time_ms + self.config.long_press_timeout_ms);
                listener.on_down(ev)
            }

            MotionAction::Move => {
                if self.in_long_press {
                    return false;
                }
                let Some(down) = self.current_down.clone() else {
                    return false;
                };
                let scroll_x = self.last_focus_x - focus_x;
                let scroll_y = self.last_focus_y - focus_y;

                if self.always_in_tap_region {
                    let dx = focus_x - self.down_focus_x;
                    let dy = focus_y - self.down_focus_y;
                    let slop = self.config.touch_slop;
                    if dx * dx + dy * dy > slop * slop {
                        self.last_focus_x = focus_x;
                        self.last_focus_y = focus_y;
                        self.always_in_tap_region = false;
                        self.show_press_at = None;
                        self.long_press_at = None;
                        return listener.on_scroll(&down, ev, scroll_x, scroll_y);
                    }
                    false
                } else if scroll_x.abs() >= 1.0 || scroll_y.abs() >= 1.0 {
                    self.last_focus_x = focus_x;
                    self.last_focus_y = focus_y;
                    listener.on_scroll(&down, ev, scroll_x, scroll_y)
                } else {
                    false
                }
            }

            MotionAction::Up => {
                self.still_down = false;
                let handled = match self.current_down.clone() {
                    _ if self.in_long_press => {
                        self.in_long_press = false;
                        false
                    }
                    Some(_) if self.always_in_tap_region => listener.on_single_tap_up(ev),
                    Some(down) => {
                        let id = ev.pointers.first().map_or(0, |p| p.id);
                        let (vx, vy) = self.velocity.velocity(id, self.config.max_fling_velocity);
                        let min = self.config.min_fling_velocity;
                        if vx.abs() > min || vy.abs() > min {
                            listener.on_fling(&down, ev, vx, vy)
                        } else {
                            false
                        }
                    }
                    None => false,
                };
                self.velocity.clear();
                self.show_press_at = None;
                self.long_press_at = None;
                handled
            }

            MotionAction::Cancel => {
                self.cancel();
                false
            }
        }
    }

    fn cancel_taps(&mut self) {
        self.show_press_at = None;
        self.long_press_at = None;
        self.always_in_tap_region = false;
        self.in_long_press = false;
    }

    fn cancel(&mut self) {
        self.cancel_taps();
        self.velocity.clear();
        self.still_down = false;
        self.current_down = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::motion::Pointer;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Down,
        ShowPress,
        Tap(f32, f32),
        Scroll(f32, f32),
        LongPress,
        Fling(f32, f32),
    }

    #[derive(Default)]
    struct Recorder(Vec<Seen>);

    impl OnGestureListener for Recorder {
        fn on_down(&mut self, _: &MotionEvent) -> bool {
            self.0.push(Seen::Down);
            true
        }
        fn on_show_press(&mut self, _: &MotionEvent) {
            self.0.push(Seen::ShowPress);
        }
        fn on_single_tap_up(&mut self, e: &MotionEvent) -> bool {
            self.0.push(Seen::Tap(e.x(), e.y()));
            true
        }
        fn on_scroll(&mut self, _: &MotionEvent, _: &MotionEvent, dx: f32, dy: f32) -> bool {
            self.0.push(Seen::Scroll(dx, dy));
            true
        }
        fn on_long_press(&mut self, _: &MotionEvent) {
            self.0.push(Seen::LongPress);
        }
        fn on_fling(&mut self, _: &MotionEvent, _: &MotionEvent, vx: f32, vy: f32) -> bool {
            self.0.push(Seen::Fling(vx, vy));
            true
        }
    }

    fn ev(action: MotionAction, t: u64, x: f32, y: f32) -> MotionEvent {
        MotionEvent::single(action, t, x, y)
    }

    fn detector() -> GestureDetector {
        GestureDetector::new(GestureConfig::default())
    }

    #[test]
    fn quick_tap_is_single_tap() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 50.0, 60.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 30, 52.0, 61.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Up, 60, 52.0, 61.0), &mut rec);
        assert_eq!(rec.0, vec![Seen::Down, Seen::Tap(52.0, 61.0)]);
    }

    #[test]
    fn slow_tap_reports_show_press_first() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 50.0, 60.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Up, 200, 50.0, 60.0), &mut rec);
        assert_eq!(
            rec.0,
            vec![Seen::Down, Seen::ShowPress, Seen::Tap(50.0, 60.0)]
        );
    }

    #[test]
    fn drag_beyond_slop_scrolls_with_inverted_distance() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 100.0, 100.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 50, 100.0, 80.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 400, 90.0, 70.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Up, 900, 90.0, 70.0), &mut rec);
        assert_eq!(
            rec.0,
            vec![Seen::Down, Seen::Scroll(0.0, 20.0), Seen::Scroll(10.0, 10.0)]
        );
    }

    #[test]
    fn movement_within_slop_is_not_a_scroll() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 100.0, 100.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 20, 104.0, 103.0), &mut rec);
        assert_eq!(rec.0, vec![Seen::Down]);
    }

    #[test]
    fn held_press_becomes_long_press_and_swallows_tap() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 10.0, 10.0), &mut rec);
        d.poll(1_000, &mut rec);
        assert!(d.is_long_press_active());
        d.on_touch_event(&ev(MotionAction::Move, 1_100, 200.0, 200.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Up, 1_200, 200.0, 200.0), &mut rec);
        assert_eq!(rec.0, vec![Seen::Down, Seen::ShowPress, Seen::LongPress]);
    }

    #[test]
    fn fast_release_flings() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 300.0, 500.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 10, 300.0, 480.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 20, 300.0, 440.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Up, 30, 300.0, 400.0), &mut rec);
        let Some(Seen::Fling(vx, vy)) = rec.0.last() else {
            panic!("expected a fling, got {:?}", rec.0);
        };
        assert_eq!(*vx, 0.0);
        assert!(*vy < -3000.0);
    }

    #[test]
    fn second_pointer_cancels_tap() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 10.0, 10.0), &mut rec);
        d.on_touch_event(
            &MotionEvent::new(
                MotionAction::PointerDown(1),
                10,
                vec![Pointer::new(0, 10.0, 10.0), Pointer::new(1, 50.0, 50.0)],
            ),
            &mut rec,
        );
        d.on_touch_event(
            &MotionEvent::new(
                MotionAction::PointerUp(1),
                20,
                vec![Pointer::new(0, 10.0, 10.0), Pointer::new(1, 50.0, 50.0)],
            ),
            &mut rec,
        );
        d.on_touch_event(&ev(MotionAction::Up, 30, 10.0, 10.0), &mut rec);
        d.poll(5_000, &mut rec);
        assert!(!rec.0.iter().any(|s| matches!(s, Seen::Tap(..) | Seen::LongPress)));
    }

    #[test]
    fn cancel_resets_stream() {
        let mut d = detector();
        let mut rec = Recorder::default();
        d.on_touch_event(&ev(MotionAction::Down, 0, 10.0, 10.0), &mut rec);
        d.on_touch_event(&ev(MotionAction::Cancel, 10, 10.0, 10.0), &mut rec);
        d.poll(5_000, &mut rec);
        d.on_touch_event(&ev(MotionAction::Move, 5_010, 100.0, 100.0), &mut rec);
        assert_eq!(rec.0, vec![Seen::Down]);
    }
}
