//! Terrain geometry and shading data.
//!
//! This module provides:
//! - [`GridMesh`] - parametric grid builder with triangulated indices
//! - [`HeightField`] - the static vs procedural height strategy
//! - [`compute_tangents`] - per-triangle tangents for normal mapping
//! - [`COLOR_RAMP`] - the 256-entry height color table

pub mod colors;
pub mod grid;
pub mod noise;
pub mod tangent;

pub use colors::COLOR_RAMP;
pub use grid::{GridMesh, GridVertex, LitMesh, LitVertex, WaterQuad};
pub use tangent::compute_tangents;

/// Multiplier applied to the static terrain's single noise octave before the
/// elevation divisor, matching the static scene's shader.
pub const STATIC_TURBULENCE: f32 = 3.0;

/// Which height function displaces the terrain grid.
///
/// Both terrain scenes share one pipeline layout and one grid; only the
/// height strategy (and its color-ramp site constants) differ. The actual
/// evaluation happens in the vertex shader; the methods here are the CPU
/// mirrors used by tests and debug readouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightField {
    /// Single-octave value noise, colored with the x255 ramp site.
    Static,
    /// 20-octave fBm, colored with the x200 ramp site, used by the water
    /// compositing scene.
    #[default]
    Procedural,
}

impl HeightField {
    /// Height at a parametric position for a given elevation divisor.
    pub fn sample(&self, p: glam::Vec2, elevation: f32) -> f32 {
        match self {
            HeightField::Static => noise::noise(p) * STATIC_TURBULENCE / elevation,
            HeightField::Procedural => noise::height(p, noise::FBM_OCTAVES, elevation),
        }
    }

    /// Ramp color for a height produced by [`Self::sample`].
    pub fn color(&self, h: f32) -> [f32; 4] {
        match self {
            HeightField::Static => colors::static_color(h),
            HeightField::Procedural => colors::dynamic_color(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_static_sample_is_scaled_noise() {
        let p = Vec2::new(0.3, 0.7);
        let h = HeightField::Static.sample(p, 5.0);
        assert!((h - noise::noise(p) * 3.0 / 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_procedural_sample_is_scaled_fbm() {
        let p = Vec2::new(0.3, 0.7);
        let h = HeightField::Procedural.sample(p, 5.0);
        assert!((h - noise::fbm(p, noise::FBM_OCTAVES) / 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_strategies_use_their_own_ramp_site() {
        // 0.5 hits index 128 on the static site, 100 on the dynamic one.
        assert_eq!(HeightField::Static.color(0.5), COLOR_RAMP[128]);
        assert_eq!(HeightField::Procedural.color(0.5), COLOR_RAMP[100]);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let p = Vec2::new(0.11, 0.93);
        for field in [HeightField::Static, HeightField::Procedural] {
            assert_eq!(field.sample(p, 4.0), field.sample(p, 4.0));
        }
    }
}
