/// Linear cross-fade between the previous and the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    progress: f32,
    running: bool,
    duration: f32,
}

impl Fade {
    pub fn new(duration: f32) -> Self {
        Self {
            progress: 0.0,
            running: false,
            duration,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    /// Back to idle at zero; used at the start of every display setup.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.running = false;
    }

    pub fn start(&mut self) {
        self.progress = 0.0;
        self.running = true;
    }

    /// Advances progress by `dt` seconds, landing exactly on 1.0.
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        if self.duration <= 0.0 {
            self.progress = 1.0;
            return;
        }
        self.progress = (self.progress + dt.max(0.0) / self.duration).min(1.0);
    }

    /// Called after a frame was painted. The fade turns idle once the frame
    /// at full progress is on screen; returns whether another frame is needed.
    pub fn frame_painted(&mut self) -> bool {
        if self.running && self.progress >= 1.0 {
            self.running = false;
        }
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_ends_at_one() {
        let mut fade = Fade::new(1.0);
        fade.start();

        let mut last = fade.progress();
        let mut frames = 0;
        while fade.frame_painted() {
            fade.update(1.0 / 60.0);
            assert!(fade.progress() >= last);
            last = fade.progress();
            frames += 1;
            assert!(frames < 1000);
        }

        assert_eq!(fade.progress(), 1.0);
        assert!(!fade.is_running());
    }

    #[test]
    fn stays_running_until_the_final_frame_is_painted() {
        let mut fade = Fade::new(0.5);
        fade.start();
        fade.update(2.0);
        assert_eq!(fade.progress(), 1.0);
        assert!(fade.is_running());
        assert!(!fade.frame_painted());
        assert!(!fade.is_running());
    }

    #[test]
    fn idle_fade_ignores_updates() {
        let mut fade = Fade::new(1.0);
        fade.update(0.3);
        assert_eq!(fade.progress(), 0.0);
        assert!(!fade.frame_painted());
    }

    #[test]
    fn zero_duration_completes_at_once() {
        let mut fade = Fade::new(0.0);
        fade.start();
        fade.update(0.0);
        assert_eq!(fade.progress(), 1.0);
    }
}
