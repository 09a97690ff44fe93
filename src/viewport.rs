//! Viewport ownership: center/zoom, gesture tracking, settle debounce

use std::time::Duration;

use crate::config::MapConfig;
use crate::geo::Coordinate;
use crate::timer::Debounce;

/// The map's current center and zoom. Value snapshot; the authoritative copy
/// lives in [`ViewportController`] and nothing else mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
}

/// Whether a user drag/zoom gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    UserActive,
}

/// Owns the authoritative viewport and arbitrates between user gestures and
/// programmatic moves.
///
/// Gestures put the controller in `UserActive`; it returns to `Idle` only
/// after a move-end followed by a full quiet period with no new move-start.
/// Center changes are batched: consumers hear about a gesture exactly once,
/// when it settles. Programmatic moves are silently dropped while a gesture
/// is active so the engine never fights the user's hand.
pub struct ViewportController {
    viewport: Viewport,
    mode: InteractionMode,
    /// Gesture result waiting out the quiet period
    pending: Option<Viewport>,
    quiet_timer: Debounce,
    quiet_period: Duration,
    /// Settle messages older than this are from cancelled timers
    settle_generation: u64,
    center_tolerance: f64,
    zoom_tolerance: f64,
    zoom_range: (f64, f64),
}

impl ViewportController {
    pub fn new(config: &MapConfig, zoom_range: (f64, f64)) -> Self {
        let zoom = config.default_zoom.clamp(zoom_range.0, zoom_range.1);
        Self {
            viewport: Viewport {
                center: config.default_center,
                zoom,
            },
            mode: InteractionMode::Idle,
            pending: None,
            quiet_timer: Debounce::new(),
            quiet_period: config.move_quiet_period(),
            settle_generation: 0,
            center_tolerance: config.center_tolerance_deg,
            zoom_tolerance: config.zoom_tolerance,
            zoom_range,
        }
    }

    pub fn snapshot(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// A drag or zoom gesture started on the surface. Cancels any pending
    /// settle so an earlier move-end never fires mid-gesture.
    pub fn move_start(&mut self) {
        self.mode = InteractionMode::UserActive;
        self.quiet_timer.cancel();
        self.settle_generation += 1;
        self.pending = None;
    }

    /// The gesture paused at `center`/`zoom`. Schedules the quiet-period
    /// timer; when it elapses `notify` receives the generation to pass back
    /// into [`ViewportController::settle`]. A new move-start before then
    /// aborts the timer.
    pub fn move_end<F>(&mut self, center: Coordinate, zoom: f64, notify: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.mode = InteractionMode::UserActive;
        self.settle_generation += 1;
        let generation = self.settle_generation;
        self.pending = Some(Viewport {
            center,
            zoom: zoom.clamp(self.zoom_range.0, self.zoom_range.1),
        });
        self.quiet_timer
            .schedule(self.quiet_period, async move { notify(generation) });
    }

    /// The quiet period elapsed. Returns the settled viewport to broadcast,
    /// or `None` for a stale generation (a newer gesture superseded it).
    pub fn settle(&mut self, generation: u64) -> Option<Viewport> {
        if generation != self.settle_generation {
            log::debug!("dropping stale viewport settle (gen {generation})");
            return None;
        }
        let settled = self.pending.take()?;
        self.viewport = settled;
        self.mode = InteractionMode::Idle;
        Some(settled)
    }

    /// Programmatic move from search, geolocation, or a suggestion pick.
    ///
    /// Ignored while a gesture is active, and a no-op when the change is
    /// within tolerance of the current view. Returns whether the viewport
    /// actually changed (callers push applied changes to the surface).
    pub fn set_view(&mut self, center: Coordinate, zoom: f64) -> bool {
        if self.mode == InteractionMode::UserActive {
            log::debug!("suppressing programmatic move during user gesture");
            return false;
        }
        let zoom = zoom.clamp(self.zoom_range.0, self.zoom_range.1);
        let meaningful = !self.viewport.center.within(center, self.center_tolerance)
            || (self.viewport.zoom - zoom).abs() > self.zoom_tolerance;
        if !meaningful {
            return false;
        }
        self.viewport = Viewport { center, zoom };
        true
    }
}

impl Drop for ViewportController {
    fn drop(&mut self) {
        // Debounce aborts its task on drop; nothing fires after teardown
        self.quiet_timer.cancel();
    }
}
