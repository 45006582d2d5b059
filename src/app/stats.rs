use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use winit::window::Window;

/// Shared handle to the stats widget embedded in the Performance
/// section of the settings panel.
pub type SharedStats = Rc<RefCell<FrameStats>>;

/// Frame-rate measurement: per-frame dt plus a windowed fps/frame-ms
/// sample refreshed every half second (also pushed into the window
/// title).
pub struct FrameStats {
    base_title: String,
    last_frame_time: Option<Instant>,
    last_sample_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    fps: f32,
    frame_ms: f32,
    visible: bool,
}

impl FrameStats {
    pub fn new(base_title: String) -> Self {
        Self {
            base_title,
            last_frame_time: None,
            last_sample_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            fps: 0.0,
            frame_ms: 0.0,
            visible: false,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn update(&mut self, window: Option<&Window>, now: Instant) {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            std::time::Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_sample_time);
        if elapsed.as_secs_f32() >= 0.5 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_ms = (self.frame_dt * 1000.0).max(0.0);
            if let Some(window) = window {
                window.set_title(&format!(
                    "{} - {:.1} fps ({:.2} ms)",
                    self.base_title, self.fps, self.frame_ms
                ));
            }
            self.frame_count = 0;
            self.last_sample_time = now;
        }
    }

    pub fn summary(&self) -> String {
        format!("{:.1} fps / {:.2} ms", self.fps, self.frame_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_samples_after_half_second_window() {
        let mut stats = FrameStats::new("test".to_string());
        let start = Instant::now();
        stats.update(None, start);
        stats.update(None, start + Duration::from_millis(600));
        assert!(stats.fps > 0.0);
        assert!(stats.frame_ms > 0.0);
        assert!(stats.summary().contains("fps"));
    }

    #[test]
    fn test_visibility_flag_starts_hidden() {
        let mut stats = FrameStats::new("test".to_string());
        assert!(!stats.is_visible());
        stats.set_visible(true);
        assert!(stats.is_visible());
    }
}
