// Playback state machine

/// Where a controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackStatus {
    /// No clip selected
    #[default]
    Idle,
    /// A clip is active and still advancing
    Playing,
    /// A non-looping clip ran past its last frame
    Finished,
}

impl PlaybackStatus {
    /// Check if ticks advance the frame in this status
    pub fn is_advancing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Per-character playback position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    clip: Option<String>,
    position: usize,
    ticks: u32,
    finished: bool,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current status
    pub fn status(&self) -> PlaybackStatus {
        match (&self.clip, self.finished) {
            (None, _) => PlaybackStatus::Idle,
            (Some(_), false) => PlaybackStatus::Playing,
            (Some(_), true) => PlaybackStatus::Finished,
        }
    }

    /// Name of the selected clip
    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    /// Zero-based position within the clip's frame sequence
    pub fn position(&self) -> usize {
        self.position
    }

    /// Ticks spent on the current frame
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Select a clip and rewind to its first frame
    pub fn start(&mut self, name: &str) {
        self.clip = Some(name.to_string());
        self.rewind();
    }

    /// Rewind the selected clip to its first frame
    pub fn rewind(&mut self) {
        self.position = 0;
        self.ticks = 0;
        self.finished = false;
    }

    /// Deselect the clip
    pub fn clear(&mut self) {
        self.clip = None;
        self.rewind();
    }

    /// Advance by one tick
    ///
    /// `frame_count` and `speed` describe the selected clip. Returns true when
    /// the displayed position changed.
    pub fn tick(&mut self, frame_count: usize, speed: u32, looping: bool) -> bool {
        if !self.status().is_advancing() || frame_count == 0 {
            return false;
        }

        self.ticks += 1;
        if self.ticks < speed {
            return false;
        }
        self.ticks = 0;

        let previous = self.position;
        self.position += 1;

        if self.position >= frame_count {
            if looping {
                self.position = 0;
            } else {
                // Stay on last frame
                self.position = frame_count - 1;
                self.finished = true;
            }
        }

        self.position != previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::new();
        assert_eq!(state.status(), PlaybackStatus::Idle);
        assert_eq!(state.clip(), None);
        assert_eq!(state.position(), 0);
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn test_idle_ignores_ticks() {
        let mut state = PlaybackState::new();
        assert!(!state.tick(4, 1, true));
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn test_start_transition() {
        let mut state = PlaybackState::new();
        state.start("walk");
        assert_eq!(state.status(), PlaybackStatus::Playing);
        assert_eq!(state.clip(), Some("walk"));
    }

    #[test]
    fn test_tick_holds_for_speed() {
        let mut state = PlaybackState::new();
        state.start("walk");

        assert!(!state.tick(4, 3, true));
        assert!(!state.tick(4, 3, true));
        assert_eq!(state.position(), 0);
        assert_eq!(state.ticks(), 2);

        assert!(state.tick(4, 3, true));
        assert_eq!(state.position(), 1);
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn test_looping_wraps() {
        let mut state = PlaybackState::new();
        state.start("walk");

        for _ in 0..3 {
            state.tick(3, 1, true);
        }
        assert_eq!(state.position(), 0);
        assert_eq!(state.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_one_shot_finishes() {
        let mut state = PlaybackState::new();
        state.start("hit");

        for _ in 0..10 {
            state.tick(3, 1, false);
        }
        assert_eq!(state.position(), 2);
        assert_eq!(state.status(), PlaybackStatus::Finished);
        assert!(state.is_finished());

        // Finished state ignores further ticks
        assert!(!state.tick(3, 1, false));
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn test_single_frame_one_shot() {
        let mut state = PlaybackState::new();
        state.start("pose");

        assert!(!state.tick(1, 2, false));
        // Position stays at 0 but the clip completes
        assert!(!state.tick(1, 2, false));
        assert!(state.is_finished());
    }

    #[test]
    fn test_rewind_and_clear() {
        let mut state = PlaybackState::new();
        state.start("hit");
        for _ in 0..5 {
            state.tick(2, 1, false);
        }
        assert!(state.is_finished());

        state.rewind();
        assert_eq!(state.status(), PlaybackStatus::Playing);
        assert_eq!(state.position(), 0);

        state.clear();
        assert_eq!(state.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_status_helpers() {
        assert!(PlaybackStatus::Playing.is_advancing());
        assert!(!PlaybackStatus::Finished.is_advancing());
    }
}
