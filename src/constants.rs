use std::time::Duration;

pub const FPS: u32 = 60;                          // Target frames per second while fading
pub const IDLE_FPS: u32 = 10;                     // Target frames per second otherwise
pub const DEFAULT_WINDOW_WIDTH: i32 = 1280;       // Initial window width before the first resize
pub const DEFAULT_WINDOW_HEIGHT: i32 = 720;       // Initial window height before the first resize

pub const DISABLED_IMAGE: &str = "none";          // `image` value that turns the background off
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 150;  // Seconds between two slideshow steps
pub const DEFAULT_FADE_DURATION: f32 = 1.0;       // Duration of a cross-fade (seconds)

pub const CONFIG_DEBOUNCE: Duration = Duration::from_millis(200); // Editors emit bursts of events per save
pub const CONFIG_DIR_NAME: &str = "backdrop";
pub const CONFIG_FILE_NAME: &str = "config.toml";
