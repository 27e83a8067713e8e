//! Wallpaper slideshow background.
//!
//! The [`cycler::WallpaperCycler`] shows a single image, or cycles through
//! a directory with a linear cross-fade. It is independent of any toolkit:
//! hosts implement [`loader::ImageLoader`] and [`render::Canvas`] and drive
//! it from their own event loop.

pub mod config;
pub mod constants;
pub mod cycler;
pub mod error;
pub mod fade;
pub mod loader;
pub mod render;
pub mod scan;
pub mod state;
pub mod timer;
pub mod watcher;

pub use config::{BackgroundConfig, ConfigNotifier};
pub use cycler::WallpaperCycler;
pub use error::BackgroundError;
