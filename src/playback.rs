use log::debug;

/// Drives frame advancement while playing. The app calls [`tick`] every UI
/// pass with the current wall clock; the controller answers with the next
/// frame to show once a full frame interval has elapsed.
///
/// [`tick`]: PlaybackController::tick
pub struct PlaybackController {
    playing: bool,
    last_tick: f64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            playing: false,
            last_tick: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self, now: f64) {
        self.playing = true;
        self.last_tick = now;
        debug!("playback start");
    }

    pub fn stop(&mut self) {
        if self.playing {
            debug!("playback stop");
        }
        self.playing = false;
    }

    pub fn toggle(&mut self, now: f64) {
        if self.playing {
            self.stop();
        } else {
            self.play(now);
        }
    }

    /// Seconds between frames at `fps`.
    pub fn frame_interval(fps: f32) -> f64 {
        1.0 / f64::from(fps.max(0.1))
    }

    /// Seconds until the next advance is due. Drives repaint scheduling
    /// while playing.
    pub fn time_to_next(&self, now: f64, fps: f32) -> f64 {
        (self.last_tick + Self::frame_interval(fps) - now).max(0.0)
    }

    /// Advances at the configured cadence. Returns the frame to switch to,
    /// or `None` when it is not yet time. At the last frame, playback
    /// either wraps to the first frame or stops there, depending on
    /// `looping`.
    pub fn tick(
        &mut self,
        now: f64,
        fps: f32,
        looping: bool,
        current: usize,
        frame_count: usize,
    ) -> Option<usize> {
        if !self.playing || frame_count == 0 {
            return None;
        }
        let interval = Self::frame_interval(fps);
        if now - self.last_tick < interval {
            return None;
        }
        self.last_tick += interval;
        // After a stall, resync to the wall clock rather than replaying
        // the missed intervals as a burst of frames.
        if now - self.last_tick >= interval {
            self.last_tick = now;
        }
        let last = frame_count - 1;
        if current < last {
            Some(current + 1)
        } else if looping {
            Some(0)
        } else {
            self.stop();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_a_full_interval_between_frames() {
        let mut playback = PlaybackController::new();
        playback.play(0.0);
        // 10 fps -> 0.1 s per frame.
        assert_eq!(playback.tick(0.05, 10.0, true, 0, 4), None);
        assert_eq!(playback.tick(0.11, 10.0, true, 0, 4), Some(1));
        assert_eq!(playback.tick(0.15, 10.0, true, 1, 4), None);
        assert_eq!(playback.tick(0.21, 10.0, true, 1, 4), Some(2));
    }

    #[test]
    fn loops_back_to_the_first_frame() {
        let mut playback = PlaybackController::new();
        playback.play(0.0);
        assert_eq!(playback.tick(1.0, 10.0, true, 3, 4), Some(0));
        assert!(playback.is_playing());
    }

    #[test]
    fn stops_at_the_last_frame_without_looping() {
        let mut playback = PlaybackController::new();
        playback.play(0.0);
        assert_eq!(playback.tick(1.0, 10.0, false, 3, 4), None);
        assert!(!playback.is_playing());
    }

    #[test]
    fn resyncs_after_a_stall() {
        let mut playback = PlaybackController::new();
        playback.play(0.0);
        // Two whole intervals late; one frame advances and the clock
        // resyncs rather than queueing another immediate advance.
        assert_eq!(playback.tick(0.35, 10.0, true, 0, 4), Some(1));
        assert_eq!(playback.tick(0.36, 10.0, true, 1, 4), None);
    }
}
