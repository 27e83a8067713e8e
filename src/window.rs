use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use raylib::prelude::*;
use tracing::{info, warn};

use backdrop::config::{load_config, ConfigOverrides};
use backdrop::constants::*;
use backdrop::error::{BackgroundError, Result as BackgroundResult};
use backdrop::loader::{extension_hint, read_orientation, ImageLoader, Orientation};
use backdrop::render::Canvas;
use backdrop::watcher::ConfigWatcher;
use backdrop::{BackgroundConfig, ConfigNotifier, WallpaperCycler};

/// Decodes with raylib and uploads scaled images as textures.
pub struct RaylibLoader<'a> {
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
}

impl<'a> RaylibLoader<'a> {
    pub fn new(rl: &'a mut RaylibHandle, thread: &'a RaylibThread) -> Self {
        Self { rl, thread }
    }
}

impl ImageLoader for RaylibLoader<'_> {
    type Decoded = Image;
    type Frame = Texture2D;

    fn decode(&mut self, path: &Path) -> BackgroundResult<Image> {
        let bytes = fs::read(path).map_err(|e| BackgroundError::decode(path, e))?;
        let orientation = read_orientation(path, &bytes);

        let mut image = Image::load_image_from_mem(&extension_hint(path), &bytes)
            .map_err(|e| BackgroundError::decode(path, e))?;

        match orientation {
            Orientation::Rotate180 => {
                image.rotate_cw();
                image.rotate_cw();
            }
            Orientation::Rotate90Cw => image.rotate_cw(),
            Orientation::Rotate90Ccw => image.rotate_ccw(),
            Orientation::Normal => {}
        }
        Ok(image)
    }

    fn scale(&mut self, mut image: Image, width: u32, height: u32) -> BackgroundResult<Texture2D> {
        image.resize(width as i32, height as i32);
        self.rl
            .load_texture_from_image(self.thread, &image)
            .map_err(|e| BackgroundError::Frame(e.to_string()))
    }
}

/// Stretches textures over the whole window.
pub struct RaylibCanvas<'a, 'b> {
    d: &'a mut RaylibDrawHandle<'b>,
    width: f32,
    height: f32,
}

impl Canvas<Texture2D> for RaylibCanvas<'_, '_> {
    fn paint(&mut self, texture: &Texture2D, alpha: f32) {
        let tint = Color::new(255, 255, 255, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8);
        self.d.draw_texture_pro(
            texture,
            Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
            Rectangle::new(0.0, 0.0, self.width, self.height),
            Vector2::new(0.0, 0.0),
            0.0,
            tint,
        );
    }
}

pub struct WindowOptions {
    pub width: i32,
    pub height: i32,
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

fn read_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Option<BackgroundConfig> {
    let config = match path {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}");
                return None;
            }
        },
        None => BackgroundConfig::default(),
    };
    Some(overrides.apply(config))
}

pub fn run(options: WindowOptions) -> Result<()> {
    anyhow::ensure!(
        options.width > 0 && options.height > 0,
        "window size must be positive, got {}x{}",
        options.width,
        options.height
    );

    let (mut rl, thread) = raylib::init()
        .size(options.width, options.height)
        .title("backdrop")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(IDLE_FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let config_path = options.config_path.as_deref();
    let initial = read_config(config_path, &options.overrides).unwrap_or_else(|| {
        options.overrides.apply(BackgroundConfig::default())
    });
    let mut notifier = ConfigNotifier::new(initial);

    let mut watcher = config_path.and_then(|path| match ConfigWatcher::new(path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Not watching {} for changes: {e}", path.display());
            None
        }
    });

    // Textures must be unloaded before the window closes, so the cycler is
    // declared after the handle and dropped first.
    let mut cycler: WallpaperCycler<Texture2D> = WallpaperCycler::new(&mut notifier);
    cycler.apply_config(&mut RaylibLoader::new(&mut rl, &thread));

    while !rl.window_should_close() {
        let dt = Duration::from_secs_f32(rl.get_frame_time().max(0.0));
        let width = rl.get_screen_width().max(1) as u32;
        let height = rl.get_screen_height().max(1) as u32;
        let scale = rl.get_window_scale_dpi().x.max(1.0);

        if watcher.as_mut().is_some_and(ConfigWatcher::poll) {
            info!("Reloading config");
            if let Some(config) = read_config(config_path, &options.overrides) {
                notifier.update(config);
            }
        }

        {
            let mut loader = RaylibLoader::new(&mut rl, &thread);
            cycler.pump_config(&mut loader);
            cycler.resize(&mut loader, width, height, scale);
            cycler.update(&mut loader, dt);
        }

        let fading = {
            let mut d = rl.begin_drawing(&thread);
            d.clear_background(Color::BLACK);
            let mut canvas = RaylibCanvas {
                d: &mut d,
                width: width as f32,
                height: height as f32,
            };
            cycler.render_frame(&mut canvas)
        };
        rl.set_target_fps(if fading { FPS } else { IDLE_FPS });
    }

    Ok(())
}
