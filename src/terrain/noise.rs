//! Value noise and fractal Brownian motion.
//!
//! These are the CPU mirrors of the functions in `shaders/terrain_fbm.wgsl`
//! and `shaders/terrain_static.wgsl`. The shader evaluates them per vertex /
//! per fragment; this module evaluates them for tests and for anything that
//! needs a height on the CPU side (camera framing, debug readouts). The two
//! must stay formula-for-formula identical.

use glam::Vec2;

/// Number of fBm octaves used by the dynamic terrain.
pub const FBM_OCTAVES: u32 = 20;

/// Hash a 2D position into [0, 1).
///
/// The classic `fract(sin(dot(p, k)) * C)` one-liner. The constants are part
/// of the terrain's identity: changing them changes every landscape.
pub fn rand(p: Vec2) -> f32 {
    let v = p.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.5453123;
    // GLSL fract: x - floor(x), always in [0, 1) even for negative x.
    v - v.floor()
}

/// Smoothstep easing `3t^2 - 2t^3` for t in [0, 1].
fn ease(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// 2D value noise: bilinear interpolation of `rand` at the four surrounding
/// lattice corners, with smoothstep easing on both axes.
///
/// At an exact lattice point this reduces to `rand` of that point.
pub fn noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;

    let a = rand(i);
    let b = rand(i + Vec2::new(1.0, 0.0));
    let c = rand(i + Vec2::new(0.0, 1.0));
    let d = rand(i + Vec2::new(1.0, 1.0));

    let ux = ease(f.x);
    let uy = ease(f.y);

    let ab = a + (b - a) * ux;
    let cd = c + (d - c) * ux;
    ab + (cd - ab) * uy
}

/// Fractal Brownian motion: `octaves` layers of value noise, frequency
/// doubling and amplitude halving each layer (first layer weight 0.5).
///
/// Pure function of its inputs; identical `(p, octaves)` always yields the
/// identical scalar.
pub fn fbm(p: Vec2, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut q = p;
    for _ in 0..octaves {
        value += amplitude * noise(q);
        q *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// Terrain height at a planar position: fBm scaled down by the elevation
/// divisor (larger divisor, flatter terrain).
pub fn height(p: Vec2, octaves: u32, elevation: f32) -> f32 {
    fbm(p, octaves) / elevation
}

/// Fold a height about the water plane: `h - 2(h - water) = 2*water - h`.
///
/// Used by the reflection pass to render the terrain as seen through a
/// mirror lying at the water surface.
pub fn fold(h: f32, water_height: f32) -> f32 {
    h - 2.0 * (h - water_height)
}

/// Estimate the terrain surface normal at `p` by central finite differencing
/// of the height field at four neighboring samples.
///
/// `offset` is the planar sampling distance, `grid_size / grid_precision` at
/// the call sites. The normal is never derived from mesh topology.
pub fn surface_normal(p: Vec2, offset: f32, octaves: u32, elevation: f32) -> glam::Vec3 {
    let hl = height(p - Vec2::new(offset, 0.0), octaves, elevation);
    let hr = height(p + Vec2::new(offset, 0.0), octaves, elevation);
    let hd = height(p - Vec2::new(0.0, offset), octaves, elevation);
    let hu = height(p + Vec2::new(0.0, offset), octaves, elevation);
    glam::Vec3::new(hl - hr, 2.0 * offset, hd - hu).normalize()
}

/// Refraction-pass discard rule: fragments above the water line (plus a
/// small margin) do not belong under water.
pub fn refraction_discards(h: f32, water_height: f32) -> bool {
    h >= water_height + 0.1
}

/// Reflection-pass discard rule: fragments at or below the water line (minus
/// a small margin) do not belong in the mirror image.
pub fn reflection_discards(h: f32, water_height: f32) -> bool {
    h <= water_height - 0.004
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_in_unit_range() {
        for &(x, y) in &[(0.0, 0.0), (0.5, 0.25), (-3.7, 12.1), (100.0, -42.0)] {
            let v = rand(Vec2::new(x, y));
            assert!((0.0..1.0).contains(&v), "rand({x},{y}) = {v} out of range");
        }
    }

    #[test]
    fn test_noise_equals_rand_at_lattice_points() {
        for &(x, y) in &[(0.0, 0.0), (1.0, 0.0), (3.0, 7.0), (-2.0, 5.0)] {
            let p = Vec2::new(x, y);
            let n = noise(p);
            let r = rand(p);
            assert!((n - r).abs() < 1e-6, "noise({p}) = {n}, rand = {r}");
        }
    }

    #[test]
    fn test_fbm_deterministic() {
        let p = Vec2::new(1.37, -0.42);
        let a = fbm(p, FBM_OCTAVES);
        let b = fbm(p, FBM_OCTAVES);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fbm_single_octave_is_half_noise() {
        for &(x, y) in &[(0.3, 0.8), (2.5, 1.5), (0.0, 0.0)] {
            let p = Vec2::new(x, y);
            assert!((fbm(p, 1) - 0.5 * noise(p)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_height_scales_with_elevation() {
        let p = Vec2::new(0.6, 0.6);
        let h1 = height(p, 4, 1.0);
        let h2 = height(p, 4, 2.0);
        assert!((h2 - h1 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fold_is_mirror_about_water() {
        for &(h, w) in &[(0.7, 0.4), (0.0, 0.4), (0.4, 0.4), (1.3, 0.25)] {
            let folded = fold(h, w);
            assert!((folded - (2.0 * w - h)).abs() < 1e-6);
            // Folding twice is the identity.
            assert!((fold(folded, w) - h).abs() < 1e-6);
        }
        // The water plane is a fixed point.
        assert_eq!(fold(0.4, 0.4), 0.4);
    }

    #[test]
    fn test_surface_normal_points_up_on_flat_field() {
        // A huge elevation divisor flattens the field, so the normal must be
        // nearly vertical.
        let n = surface_normal(Vec2::new(0.5, 0.5), 0.01, 4, 1.0e6);
        assert!(n.y > 0.999, "normal {n} not vertical");
    }

    #[test]
    fn test_surface_normal_is_unit_length() {
        let n = surface_normal(Vec2::new(0.21, 0.87), 0.02, FBM_OCTAVES, 5.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_refraction_discard_boundary() {
        // water at 0.4: anything at or above 0.5 is rejected
        assert!(refraction_discards(0.5, 0.4));
        assert!(refraction_discards(0.9, 0.4));
        assert!(!refraction_discards(0.49, 0.4));
        assert!(!refraction_discards(0.0, 0.4));
    }

    #[test]
    fn test_reflection_discard_boundary() {
        assert!(reflection_discards(0.395, 0.4));
        assert!(reflection_discards(0.0, 0.4));
        assert!(!reflection_discards(0.397, 0.4));
        assert!(!reflection_discards(0.9, 0.4));
    }
}
