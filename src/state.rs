#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DisplayState {
    NoSurface, // Disabled, or nothing could be loaded
    Static,    // A single image, no cycle timer
    Cycling,   // Slideshow with an armed cycle timer
}
