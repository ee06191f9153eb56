use bevy_turborand::prelude::*;

/// Source of uniform randomness for scatter positions and daily picks.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "cannot pick from an empty range");
        ((self.unit() * n as f32) as usize).min(n - 1)
    }
}

impl RandomSource for GlobalRng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }
}

impl RandomSource for RngComponent {
    fn unit(&mut self) -> f32 {
        self.f32()
    }
}
