/// Paint target supplied by the host for one frame.
pub trait Canvas<F> {
    /// Paints `frame` over the whole output with the given opacity.
    fn paint(&mut self, frame: &F, alpha: f32);
}

/// Opacities of the two images at a given fade progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub previous: f32,
    pub current: f32,
}

pub fn blend_weights(progress: f32) -> BlendWeights {
    let current = progress.clamp(0.0, 1.0);
    BlendWeights {
        previous: 1.0 - current,
        current,
    }
}
