//! Auto-hide timer for the playback controls overlay.
//!
//! Timestamps are milliseconds on any monotonic clock (see
//! `syncview_common::SessionClock`). The timer only runs while the group is
//! playing; pausing shows the controls and disarms it.

#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    hide_delay_ms: u64,
    visible: bool,
    hide_at_ms: Option<u64>,
}

impl ControlsVisibility {
    pub fn new(hide_delay_ms: u64) -> Self {
        Self {
            hide_delay_ms,
            visible: true,
            hide_at_ms: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_armed(&self) -> bool {
        self.hide_at_ms.is_some()
    }

    /// Pointer moved over the player: show controls and restart the delay.
    pub fn on_pointer_move(&mut self, now_ms: u64, is_playing: bool) {
        self.visible = true;
        self.hide_at_ms = is_playing.then(|| now_ms.saturating_add(self.hide_delay_ms));
    }

    /// Periodic tick. Returns whether the controls are visible afterwards.
    pub fn tick(&mut self, now_ms: u64, is_playing: bool) -> bool {
        if !is_playing {
            self.visible = true;
            self.hide_at_ms = None;
            return self.visible;
        }
        match self.hide_at_ms {
            None if self.visible => {
                self.hide_at_ms = Some(now_ms.saturating_add(self.hide_delay_ms));
            }
            Some(deadline) if now_ms >= deadline => {
                self.visible = false;
                self.hide_at_ms = None;
                tracing::trace!(now_ms, "Controls hidden");
            }
            _ => {}
        }
        self.visible
    }

    /// Clear any pending deadline so nothing fires after the player closes.
    pub fn teardown(&mut self) {
        self.hide_at_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_after_delay_while_playing() {
        let mut controls = ControlsVisibility::new(3000);
        assert!(controls.tick(0, true));
        assert!(controls.is_armed());
        assert!(controls.tick(2999, true));
        assert!(!controls.tick(3000, true));
        assert!(!controls.is_armed());
    }

    #[test]
    fn pointer_movement_restarts_delay() {
        let mut controls = ControlsVisibility::new(3000);
        controls.tick(0, true);
        controls.on_pointer_move(2500, true);
        assert!(controls.tick(3500, true));
        assert!(!controls.tick(5500, true));

        controls.on_pointer_move(6000, true);
        assert!(controls.is_visible());
        assert!(controls.is_armed());
    }

    #[test]
    fn never_hides_while_paused() {
        let mut controls = ControlsVisibility::new(3000);
        controls.on_pointer_move(0, false);
        assert!(!controls.is_armed());
        assert!(controls.tick(10_000, false));
    }

    #[test]
    fn pausing_reveals_hidden_controls() {
        let mut controls = ControlsVisibility::new(100);
        controls.tick(0, true);
        assert!(!controls.tick(100, true));
        assert!(controls.tick(150, false));
        assert!(!controls.is_armed());
    }

    #[test]
    fn hidden_controls_stay_hidden_until_pointer_moves() {
        let mut controls = ControlsVisibility::new(100);
        controls.tick(0, true);
        controls.tick(100, true);
        assert!(!controls.tick(5000, true));
        assert!(!controls.is_armed());
    }

    #[test]
    fn teardown_disarms() {
        let mut controls = ControlsVisibility::new(3000);
        controls.on_pointer_move(0, true);
        controls.teardown();
        assert!(!controls.is_armed());
    }
}
