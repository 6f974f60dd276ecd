use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::filter::ViewMode;
use super::layout::LayoutAlgorithm;

pub const MIN_ZOOM_PERCENT: f32 = 1.0;
pub const MAX_ZOOM_PERCENT: f32 = 400.0;
pub const DEFAULT_ZOOM_PERCENT: f32 = 100.0;

const FIT_PADDING: f32 = 48.0;
const WHEEL_SETTLE_SECS: f64 = 0.25;
const AUTO_FIT_DEBOUNCE_SECS: f64 = 0.12;

/// One affine transform from graph space to screen space. `pan` is the
/// graph-space point shown at the canvas center; `zoom_percent` stays in
/// `[MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub pan: Vec2,
    pub zoom_percent: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom_percent: DEFAULT_ZOOM_PERCENT,
        }
    }
}

impl ViewportState {
    pub fn scale(self) -> f32 {
        self.zoom_percent / 100.0
    }

    pub fn clamp_zoom(&mut self) {
        self.zoom_percent = self.zoom_percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);
    }

    pub fn world_to_screen(self, canvas: Rect, world: Vec2) -> Pos2 {
        canvas.center() + (world - self.pan) * self.scale()
    }

    pub fn screen_to_world(self, canvas: Rect, screen: Pos2) -> Vec2 {
        (screen - canvas.center()) / self.scale() + self.pan
    }

    /// Shift the view so content follows the pointer: a screen-space drag
    /// of `(dx, dy)` moves `pan` by `(-dx, -dy) / scale` in graph units.
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.pan -= screen_delta / self.scale();
    }

    /// Cursor-anchored zoom: the graph-space point under `cursor` stays at
    /// the same screen position across the scale change.
    pub fn zoom_at(&mut self, canvas: Rect, cursor: Pos2, factor: f32) {
        let world_before = self.screen_to_world(canvas, cursor);
        self.zoom_percent *= factor;
        self.clamp_zoom();
        self.pan = world_before - (cursor - canvas.center()) / self.scale();
    }

    /// Largest zoom ≤ 100% that fits the padded bounding box of
    /// `positions` in both axes, centered on the box. Zero positions
    /// degrade to the default centered view.
    pub fn fit_to_bounds(positions: impl Iterator<Item = Vec2>, canvas_size: Vec2) -> Self {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut any = false;

        for position in positions {
            if !position.x.is_finite() || !position.y.is_finite() {
                continue;
            }
            any = true;
            min.x = min.x.min(position.x);
            min.y = min.y.min(position.y);
            max.x = max.x.max(position.x);
            max.y = max.y.max(position.y);
        }

        if !any {
            return Self::default();
        }

        let width = (max.x - min.x) + FIT_PADDING * 2.0;
        let height = (max.y - min.y) + FIT_PADDING * 2.0;
        let scale = (canvas_size.x.max(1.0) / width)
            .min(canvas_size.y.max(1.0) / height)
            .min(1.0);

        let mut state = Self {
            pan: (min + max) * 0.5,
            zoom_percent: scale * 100.0,
        };
        state.clamp_zoom();
        state
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Drag,
    Wheel { last_event: f64 },
}

/// Dual-path viewport updates: `committed` is the authoritative state the
/// pipeline sees; `live` exists only while a pan/zoom gesture is active and
/// is applied straight to the render pass. The live value folds back into
/// `committed` exactly once when the gesture settles, and the first
/// reconciliation after that commit is skipped so a stale propagation
/// cannot undo it.
#[derive(Debug, Default)]
pub struct ViewportController {
    committed: ViewportState,
    live: Option<ViewportState>,
    gesture: Gesture,
    skip_reconcile: bool,
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}

impl ViewportController {
    pub fn committed(&self) -> ViewportState {
        self.committed
    }

    /// The transform to render with this frame.
    pub fn effective(&self) -> ViewportState {
        self.live.unwrap_or(self.committed)
    }

    pub fn gesture_active(&self) -> bool {
        self.live.is_some()
    }

    pub fn drag_by(&mut self, screen_delta: Vec2) {
        let mut state = self.live.unwrap_or(self.committed);
        state.pan_by(screen_delta);
        self.live = Some(state);
        self.gesture = Gesture::Drag;
    }

    pub fn wheel_zoom(&mut self, canvas: Rect, cursor: Pos2, factor: f32, now: f64) {
        let mut state = self.live.unwrap_or(self.committed);
        state.zoom_at(canvas, cursor, factor);
        self.live = Some(state);
        if self.gesture != Gesture::Drag {
            self.gesture = Gesture::Wheel { last_event: now };
        }
    }

    /// Called once per frame; commits the live transform when the gesture
    /// has ended (pointer released, or wheel idle past the debounce).
    /// Returns true on the frame the commit happens.
    pub fn settle(&mut self, pointer_down: bool, now: f64) -> bool {
        let done = match self.gesture {
            Gesture::Idle => false,
            Gesture::Drag => !pointer_down,
            Gesture::Wheel { last_event } => {
                !pointer_down && now - last_event >= WHEEL_SETTLE_SECS
            }
        };

        if !done {
            return false;
        }

        if let Some(live) = self.live.take() {
            self.committed = live;
            self.skip_reconcile = true;
        }
        self.gesture = Gesture::Idle;
        self.live.is_none()
    }

    /// Pipeline-side state propagation (auto-fit and similar). Ignored
    /// while a gesture is in flight, and swallowed exactly once right
    /// after a gesture commit.
    pub fn reconcile(&mut self, state: ViewportState) -> bool {
        if self.skip_reconcile {
            self.skip_reconcile = false;
            return false;
        }
        if self.live.is_some() {
            return false;
        }
        self.committed = state;
        true
    }

    /// Imperative user action (fit button, reset): always wins.
    pub fn apply(&mut self, state: ViewportState) {
        self.committed = state;
        self.live = None;
        self.gesture = Gesture::Idle;
        self.skip_reconcile = false;
    }
}

/// Identity of one laid-out graph state, used to fire auto-fit at most
/// once per distinct state rather than on every simulation tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitKey {
    pub view_mode: ViewMode,
    pub node_count: usize,
    pub algorithm: LayoutAlgorithm,
    pub position_checksum: u64,
}

#[derive(Debug, Default)]
pub struct AutoFitTracker {
    pending: Option<(FitKey, f64)>,
    last_fired: Option<FitKey>,
}

impl AutoFitTracker {
    /// Record the current graph state. A changed key restarts the debounce
    /// window, so intermediate force-simulation commits keep pushing the
    /// fit out until positions hold still.
    pub fn observe(&mut self, key: FitKey, now: f64) {
        if self.last_fired == Some(key) {
            self.pending = None;
            return;
        }
        match self.pending {
            Some((pending_key, _)) if pending_key == key => {}
            _ => self.pending = Some((key, now)),
        }
    }

    pub fn pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due(&mut self, now: f64) -> Option<FitKey> {
        let (key, since) = self.pending?;
        if now - since < AUTO_FIT_DEBOUNCE_SECS {
            return None;
        }
        self.pending = None;
        self.last_fired = Some(key);
        Some(key)
    }
}

pub fn position_checksum(positions: impl Iterator<Item = Vec2>) -> u64 {
    let mut checksum = 0xcbf2_9ce4_8422_2325u64;
    for position in positions {
        checksum ^= position.x.to_bits() as u64;
        checksum = checksum.wrapping_mul(0x1000_0000_01b3);
        checksum ^= position.y.to_bits() as u64;
        checksum = checksum.wrapping_mul(0x1000_0000_01b3);
    }
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(200.0, 200.0))
    }

    #[test]
    fn zoom_at_keeps_the_cursor_point_anchored() {
        let mut state = ViewportState {
            pan: vec2(40.0, -25.0),
            zoom_percent: 100.0,
        };
        let cursor = pos2(150.0, 60.0);
        let before = state.screen_to_world(canvas(), cursor);

        state.zoom_at(canvas(), cursor, 1.3);
        let after = state.screen_to_world(canvas(), cursor);

        assert!((before - after).length() < 1e-3);
        assert!((state.zoom_percent - 130.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut state = ViewportState::default();
        state.zoom_at(canvas(), pos2(100.0, 100.0), 1000.0);
        assert_eq!(state.zoom_percent, MAX_ZOOM_PERCENT);
        state.zoom_at(canvas(), pos2(100.0, 100.0), 1e-6);
        assert_eq!(state.zoom_percent, MIN_ZOOM_PERCENT);
    }

    #[test]
    fn fit_with_zero_nodes_returns_default_view() {
        let state = ViewportState::fit_to_bounds(std::iter::empty(), vec2(200.0, 200.0));
        assert_eq!(state.zoom_percent, DEFAULT_ZOOM_PERCENT);
        assert_eq!(state.pan, Vec2::ZERO);
    }

    #[test]
    fn fit_two_nodes_centers_between_them_at_most_100_percent() {
        let positions = [vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let state = ViewportState::fit_to_bounds(positions.into_iter(), vec2(200.0, 200.0));
        assert!(state.zoom_percent <= 100.0);
        assert!((state.pan - vec2(50.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn drag_at_full_zoom_moves_pan_one_to_one() {
        let mut state = ViewportState::default();
        state.pan_by(vec2(10.0, 10.0));
        assert_eq!(state.pan, vec2(-10.0, -10.0));
    }

    #[test]
    fn gesture_commits_once_and_skips_one_reconcile() {
        let mut controller = ViewportController::default();
        controller.drag_by(vec2(30.0, 0.0));
        assert!(controller.gesture_active());
        assert_eq!(controller.committed().pan, Vec2::ZERO);

        // Pointer still down: nothing commits.
        assert!(!controller.settle(true, 0.0));
        // Pointer released: the live transform folds into committed.
        assert!(controller.settle(false, 0.1));
        assert_eq!(controller.committed().pan, vec2(-30.0, 0.0));

        // The next pipeline propagation is stale and must be swallowed.
        let stale = ViewportState::default();
        assert!(!controller.reconcile(stale));
        assert_eq!(controller.committed().pan, vec2(-30.0, 0.0));

        // After that, reconciliation applies normally.
        assert!(controller.reconcile(stale));
        assert_eq!(controller.committed().pan, Vec2::ZERO);
    }

    #[test]
    fn wheel_gesture_settles_after_idle_debounce() {
        let mut controller = ViewportController::default();
        controller.wheel_zoom(canvas(), pos2(100.0, 100.0), 1.2, 1.0);
        assert!(!controller.settle(false, 1.1));
        assert!(controller.gesture_active());
        assert!(controller.settle(false, 1.0 + WHEEL_SETTLE_SECS));
        assert!(!controller.gesture_active());
    }

    #[test]
    fn auto_fit_fires_once_per_graph_state() {
        let key = FitKey {
            view_mode: ViewMode::File,
            node_count: 4,
            algorithm: LayoutAlgorithm::ForceDirected,
            position_checksum: 42,
        };
        let mut tracker = AutoFitTracker::default();

        tracker.observe(key, 0.0);
        assert_eq!(tracker.due(0.05), None);
        assert_eq!(tracker.due(0.2), Some(key));

        // Same state never fires again.
        tracker.observe(key, 0.3);
        assert_eq!(tracker.due(1.0), None);

        // A moving checksum keeps pushing the debounce window out.
        let moving = FitKey {
            position_checksum: 43,
            ..key
        };
        tracker.observe(moving, 2.0);
        let moving_again = FitKey {
            position_checksum: 44,
            ..key
        };
        tracker.observe(moving_again, 2.1);
        assert_eq!(tracker.due(2.2), None);
        assert_eq!(tracker.due(2.3), Some(moving_again));
    }
}
