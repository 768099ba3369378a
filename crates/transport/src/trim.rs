//! In/out point selection on the shared timeline.
//!
//! Leaving trim mode keeps the marks on screen; only [`TrimSelector::reset`]
//! (or a completed trimmed export) clears them.

use syncview_session_model::{TrimPhase, TrimState};

#[derive(Debug, Clone, Default)]
pub struct TrimSelector {
    state: TrimState,
}

impl TrimSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrimState {
        &self.state
    }

    pub fn phase(&self) -> TrimPhase {
        self.state.phase()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_trim_mode
    }

    /// Both marks, ordered, once the selection is complete.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.state.range()
    }

    /// Length of the selected range in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.state.selected_secs()
    }

    /// Enter or leave trim mode.
    ///
    /// Entering seeds the in-point with `current_time` and clears the
    /// out-point, so the returned phase is `AwaitingEnd`. Leaving only drops
    /// the mode flag and returns `Idle`.
    pub fn toggle_mode(&mut self, current_time: f64) -> TrimPhase {
        if self.state.is_trim_mode {
            self.state.is_trim_mode = false;
        } else {
            self.state = TrimState {
                is_trim_mode: true,
                trim_start: Some(current_time),
                trim_end: None,
            };
        }
        tracing::debug!(
            trim_mode = self.state.is_trim_mode,
            start = ?self.state.trim_start,
            end = ?self.state.trim_end,
            "Trim mode toggled"
        );
        self.phase()
    }

    /// Feed a timeline click at `time` into the selection.
    ///
    /// Ignored outside trim mode; the caller seeks instead.
    pub fn handle_click(&mut self, time: f64) -> TrimPhase {
        if !self.state.is_trim_mode {
            return TrimPhase::Idle;
        }

        match (self.state.trim_start, self.state.trim_end) {
            (None, _) => {
                self.state.trim_start = Some(time);
            }
            (Some(start), None) if time < start => {
                self.state.trim_start = Some(time);
                self.state.trim_end = Some(start);
            }
            (Some(_), None) => {
                self.state.trim_end = Some(time);
            }
            (Some(_), Some(_)) => {
                self.state.trim_start = Some(time);
                self.state.trim_end = None;
            }
        }

        let phase = self.phase();
        tracing::debug!(
            time,
            start = ?self.state.trim_start,
            end = ?self.state.trim_end,
            ?phase,
            "Trim mark placed"
        );
        phase
    }

    /// Clear both marks and leave trim mode, from any state.
    pub fn reset(&mut self) {
        self.state = TrimState::default();
        tracing::debug!("Trim reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_seeds_start_from_playhead() {
        let mut trim = TrimSelector::new();
        assert_eq!(trim.phase(), TrimPhase::Idle);

        let phase = trim.toggle_mode(42.0);
        assert_eq!(phase, TrimPhase::AwaitingEnd);
        assert_eq!(trim.state().trim_start, Some(42.0));
        assert_eq!(trim.state().trim_end, None);
    }

    #[test]
    fn seeded_in_point_reports_awaiting_end_and_first_click_can_precede_it() {
        let mut trim = TrimSelector::new();
        assert_eq!(trim.toggle_mode(50.0), TrimPhase::AwaitingEnd);

        assert_eq!(trim.handle_click(20.0), TrimPhase::Complete);
        assert_eq!(trim.range(), Some((20.0, 50.0)));

        assert_eq!(trim.toggle_mode(0.0), TrimPhase::Idle);
        assert_eq!(trim.range(), Some((20.0, 50.0)));
    }

    #[test]
    fn click_sequence_swaps_then_restarts() {
        let mut trim = TrimSelector::new();
        trim.toggle_mode(0.0);
        trim.state.trim_start = None;
        assert_eq!(trim.phase(), TrimPhase::AwaitingStart);

        assert_eq!(trim.handle_click(70.0), TrimPhase::AwaitingEnd);
        assert_eq!(trim.state().trim_start, Some(70.0));
        assert_eq!(trim.state().trim_end, None);

        assert_eq!(trim.handle_click(30.0), TrimPhase::Complete);
        assert_eq!(trim.range(), Some((30.0, 70.0)));

        assert_eq!(trim.handle_click(50.0), TrimPhase::AwaitingEnd);
        assert_eq!(trim.state().trim_start, Some(50.0));
        assert_eq!(trim.state().trim_end, None);
    }

    #[test]
    fn forward_click_sets_end() {
        let mut trim = TrimSelector::new();
        trim.toggle_mode(10.0);
        assert_eq!(trim.handle_click(25.0), TrimPhase::Complete);
        assert_eq!(trim.range(), Some((10.0, 25.0)));
        assert_eq!(trim.duration(), Some(15.0));
    }

    #[test]
    fn click_equal_to_start_does_not_swap() {
        let mut trim = TrimSelector::new();
        trim.toggle_mode(10.0);
        trim.handle_click(10.0);
        assert_eq!(trim.range(), Some((10.0, 10.0)));
    }

    #[test]
    fn toggling_off_keeps_marks() {
        let mut trim = TrimSelector::new();
        trim.toggle_mode(10.0);
        trim.handle_click(20.0);

        assert_eq!(trim.toggle_mode(99.0), TrimPhase::Idle);
        assert!(!trim.is_active());
        assert_eq!(trim.range(), Some((10.0, 20.0)));
    }

    #[test]
    fn toggling_back_on_reseeds() {
        let mut trim = TrimSelector::new();
        trim.toggle_mode(10.0);
        trim.handle_click(20.0);
        trim.toggle_mode(0.0);

        trim.toggle_mode(33.0);
        assert_eq!(trim.state().trim_start, Some(33.0));
        assert_eq!(trim.state().trim_end, None);
    }

    #[test]
    fn clicks_outside_trim_mode_are_ignored() {
        let mut trim = TrimSelector::new();
        assert_eq!(trim.handle_click(5.0), TrimPhase::Idle);
        assert_eq!(*trim.state(), TrimState::default());
    }

    #[test]
    fn reset_from_every_phase() {
        let setups: [fn(&mut TrimSelector); 4] = [
            |_| {},
            |t| {
                t.toggle_mode(1.0);
            },
            |t| {
                t.toggle_mode(1.0);
                t.handle_click(2.0);
            },
            |t| {
                t.toggle_mode(1.0);
                t.handle_click(2.0);
                t.toggle_mode(0.0);
            },
        ];
        for setup in setups {
            let mut trim = TrimSelector::new();
            setup(&mut trim);
            trim.reset();
            assert_eq!(*trim.state(), TrimState::default());
            assert_eq!(trim.phase(), TrimPhase::Idle);
        }
    }
}
