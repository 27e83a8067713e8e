//! The wallpaper cycler: a static background image, or a slideshow over a
//! directory with a linear cross-fade between consecutive images.
//!
//! The cycler never talks to a toolkit directly. The host feeds it output
//! geometry and frame time, hands in an [`ImageLoader`] whenever images may
//! need decoding, and a [`Canvas`] when a frame is painted.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ConfigEvent, ConfigNotifier, Subscription};
use crate::constants::DISABLED_IMAGE;
use crate::error::{BackgroundError, Result};
use crate::fade::Fade;
use crate::loader::ImageLoader;
use crate::render::{Canvas, blend_weights};
use crate::scan::{self, Target};
use crate::state::DisplayState;
use crate::timer::CycleTimer;

/// Logical size and scale factor of the output the background covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl OutputGeometry {
    /// Size in physical pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.scale).round() as u32,
            (self.height as f32 * self.scale).round() as u32,
        )
    }
}

/// Result of a slideshow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A fade is still running; try again on the next timer fire.
    Busy,
    /// Nothing to cycle through.
    Inactive,
    /// The next image is loaded and a fade has started.
    Started,
    /// No image in the set could be decoded; the background is gone.
    TornDown,
}

struct FramePair<F> {
    current: F,
    previous: Option<F>,
}

pub struct WallpaperCycler<F> {
    image: String,
    cycle_interval: Duration,
    shuffle: bool,

    images: Vec<PathBuf>,
    current: usize,
    previous: usize,

    fade: Fade,
    frames: Option<FramePair<F>>,
    geometry: Option<OutputGeometry>,
    timer: Option<CycleTimer>,
    state: DisplayState,

    subscription: Subscription,
}

impl<F> WallpaperCycler<F> {
    /// Subscribes to `notifier` for the cycler's whole lifetime. Nothing is
    /// loaded until [`apply_config`](Self::apply_config) or
    /// [`configure`](Self::configure) is called.
    pub fn new(notifier: &mut ConfigNotifier) -> Self {
        let config = notifier.current().clone();
        Self {
            image: config.image.clone(),
            cycle_interval: config.cycle_interval(),
            shuffle: config.shuffle,
            images: Vec::new(),
            current: 0,
            previous: 0,
            fade: Fade::new(config.fade_duration),
            frames: None,
            geometry: None,
            timer: None,
            state: DisplayState::NoSurface,
            subscription: notifier.subscribe(),
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    /// `(current, previous)` indices into [`images`](Self::images).
    pub fn cycle_state(&self) -> (usize, usize) {
        (self.current, self.previous)
    }

    pub fn fade(&self) -> &Fade {
        &self.fade
    }

    /// Interval of the armed cycle timer, if any.
    pub fn cycle_timer(&self) -> Option<Duration> {
        self.timer.as_ref().map(CycleTimer::interval)
    }

    /// Applies the options the cycler was last given.
    pub fn apply_config<L>(&mut self, loader: &mut L)
    where
        L: ImageLoader<Frame = F>,
    {
        let image = self.image.clone();
        self.configure(loader, &image, self.cycle_interval);
    }

    /// Loads `path` (a directory to cycle through, or a single image) and
    /// arms the cycle timer when there is more than one image.
    pub fn configure<L>(&mut self, loader: &mut L, path: &str, cycle_interval: Duration)
    where
        L: ImageLoader<Frame = F>,
    {
        self.image = path.to_string();
        self.cycle_interval = cycle_interval;
        self.reset();

        if path == DISABLED_IMAGE {
            info!("Background disabled");
            return;
        }

        match self.load(loader) {
            Ok(()) => info!("Loaded {}", self.images[self.current].display()),
            Err(e) => {
                if self.images.len() > 1 {
                    error!("Failed to load background images from {path}: {e}");
                } else {
                    error!("Failed to load background image {path}: {e}");
                }
                self.reset();
            }
        }
    }

    fn reset(&mut self) {
        self.images.clear();
        self.current = 0;
        self.previous = 0;
        self.fade.reset();
        self.frames = None;
        self.timer = None;
        self.state = DisplayState::NoSurface;
    }

    fn load<L>(&mut self, loader: &mut L) -> Result<()>
    where
        L: ImageLoader<Frame = F>,
    {
        self.images = match scan::resolve(&self.image) {
            Target::Directory(dir) => match scan::scan_images(&dir) {
                Ok(images) => images,
                Err(e) => {
                    warn!("{e}");
                    Vec::new()
                }
            },
            Target::File(file) => vec![file],
        };
        if self.images.is_empty() {
            return Err(BackgroundError::ConfigInvalid(self.image.clone()));
        }
        if self.shuffle {
            scan::shuffle(&mut self.images);
        }
        debug!("Found {} background images", self.images.len());

        let (index, decoded) = self
            .find_decodable(loader, 0)
            .ok_or_else(|| BackgroundError::ConfigInvalid(self.image.clone()))?;
        self.current = index;
        self.previous = index;
        self.frames = match self.geometry {
            Some(geometry) => Some(FramePair {
                current: scale_to(loader, decoded, geometry)?,
                previous: None,
            }),
            None => None,
        };

        if self.images.len() > 1 {
            self.timer = Some(CycleTimer::new(self.cycle_interval));
            self.state = DisplayState::Cycling;
        } else {
            self.state = DisplayState::Static;
        }
        Ok(())
    }

    /// Tries every image once, starting at `start` and wrapping around.
    fn find_decodable<L>(&self, loader: &mut L, start: usize) -> Option<(usize, L::Decoded)>
    where
        L: ImageLoader<Frame = F>,
    {
        let count = self.images.len();
        (0..count)
            .map(|offset| (start + offset) % count)
            .find_map(|index| match loader.decode(&self.images[index]) {
                Ok(decoded) => Some((index, decoded)),
                Err(e) => {
                    warn!("{e}");
                    None
                }
            })
    }

    /// Rearms the cycle timer without touching the loaded images.
    pub fn reset_cycle_timeout(&mut self, cycle_interval: Duration) {
        self.cycle_interval = cycle_interval;
        if self.state == DisplayState::Cycling {
            self.timer = Some(CycleTimer::new(cycle_interval));
        }
    }

    /// Handles an output geometry change. Identical repeats are ignored; a
    /// new scale factor rebuilds everything.
    pub fn resize<L>(&mut self, loader: &mut L, width: u32, height: u32, scale: f32)
    where
        L: ImageLoader<Frame = F>,
    {
        let geometry = OutputGeometry { width, height, scale };
        if self.geometry == Some(geometry) {
            return;
        }
        let scale_changed = self.geometry.is_some_and(|g| g.scale != scale);
        self.geometry = Some(geometry);
        debug!("Output resized to {width}x{height} at scale {scale}");

        if scale_changed {
            self.apply_config(loader);
            return;
        }
        if self.state == DisplayState::NoSurface {
            return;
        }
        if let Err(e) = self.reload_frames(loader, geometry) {
            warn!("{e}");
            self.apply_config(loader);
        }
    }

    fn reload_frames<L>(&mut self, loader: &mut L, geometry: OutputGeometry) -> Result<()>
    where
        L: ImageLoader<Frame = F>,
    {
        let decoded = loader.decode(&self.images[self.current])?;
        let current = scale_to(loader, decoded, geometry)?;

        // The previous image only matters while it is fading out.
        let previous = if self.fade.is_running() && self.previous != self.current {
            loader
                .decode(&self.images[self.previous])
                .and_then(|decoded| scale_to(loader, decoded, geometry))
                .inspect_err(|e| warn!("{e}"))
                .ok()
        } else {
            None
        };

        self.frames = Some(FramePair { current, previous });
        Ok(())
    }

    /// Moves the slideshow to the next decodable image and starts a fade.
    pub fn advance_cycle<L>(&mut self, loader: &mut L) -> Advance
    where
        L: ImageLoader<Frame = F>,
    {
        if self.fade.is_running() {
            return Advance::Busy;
        }
        if self.images.is_empty() || self.state == DisplayState::NoSurface {
            return Advance::Inactive;
        }

        self.previous = self.current;
        let start = (self.current + 1) % self.images.len();
        let Some((index, decoded)) = self.find_decodable(loader, start) else {
            error!("Failed to load background images from {}", self.image);
            self.reset();
            return Advance::TornDown;
        };
        self.current = index;
        info!("Loaded {}", self.images[index].display());

        // Without an output there is nothing to fade; the first resize
        // loads the new current image.
        let Some(geometry) = self.geometry else {
            return Advance::Started;
        };
        match self.scale_pair(loader, decoded, geometry) {
            Ok(frames) => self.frames = Some(frames),
            Err(e) => {
                error!("Failed to load background images from {}: {e}", self.image);
                self.reset();
                return Advance::TornDown;
            }
        }

        self.fade.start();
        Advance::Started
    }

    fn scale_pair<L>(
        &self,
        loader: &mut L,
        decoded: L::Decoded,
        geometry: OutputGeometry,
    ) -> Result<FramePair<F>>
    where
        L: ImageLoader<Frame = F>,
    {
        let current = scale_to(loader, decoded, geometry)?;
        let previous = if self.previous != self.current {
            // Losing the outgoing image only costs the fade.
            loader
                .decode(&self.images[self.previous])
                .and_then(|decoded| scale_to(loader, decoded, geometry))
                .inspect_err(|e| warn!("{e}"))
                .ok()
        } else {
            None
        };
        Ok(FramePair { current, previous })
    }

    /// Frame driver: advances the fade and the cycle timer by `dt`.
    pub fn update<L>(&mut self, loader: &mut L, dt: Duration)
    where
        L: ImageLoader<Frame = F>,
    {
        self.fade.update(dt.as_secs_f32());

        let fire = self.timer.as_mut().is_some_and(|timer| timer.tick(dt));
        if fire && self.advance_cycle(loader) == Advance::Busy {
            debug!("Fade still running, skipping this cycle");
        }
    }

    /// Paints the current frame. Returns true while a fade is running and
    /// another frame must be requested.
    pub fn render_frame<C>(&mut self, canvas: &mut C) -> bool
    where
        C: Canvas<F>,
    {
        let Some(frames) = &mut self.frames else {
            return false;
        };

        match &frames.previous {
            Some(previous) if self.fade.is_running() => {
                let weights = blend_weights(self.fade.progress());
                canvas.paint(previous, weights.previous);
                canvas.paint(&frames.current, weights.current);
            }
            _ => canvas.paint(&frames.current, 1.0),
        }

        let more = self.fade.frame_painted();
        if !more {
            frames.previous = None;
        }
        more
    }

    /// Applies pending configuration changes.
    pub fn pump_config<L>(&mut self, loader: &mut L)
    where
        L: ImageLoader<Frame = F>,
    {
        let mut reconfigure = false;
        for event in self.subscription.drain() {
            debug!("Config changed: {event:?}");
            match event {
                ConfigEvent::Image(image) => {
                    self.image = image;
                    reconfigure = true;
                }
                ConfigEvent::Shuffle(shuffle) => {
                    self.shuffle = shuffle;
                    reconfigure = true;
                }
                ConfigEvent::CycleTimeout(secs) => {
                    self.reset_cycle_timeout(Duration::from_secs(secs));
                }
                ConfigEvent::FadeDuration(duration) => self.fade.set_duration(duration),
            }
        }

        if reconfigure {
            self.apply_config(loader);
        }
    }
}

fn scale_to<L>(loader: &mut L, decoded: L::Decoded, geometry: OutputGeometry) -> Result<L::Frame>
where
    L: ImageLoader,
{
    let (width, height) = geometry.pixel_size();
    loader.scale(decoded, width, height)
}
