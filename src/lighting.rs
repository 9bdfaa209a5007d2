//! Reflectance model shared by the terrain, water, and lit-object shaders.
//!
//! The WGSL shaders are the authority at runtime; these functions are the
//! same math on the CPU so the blend weights and normalization terms can be
//! pinned down by tests.

use glam::{Vec3, Vec4};
use std::f32::consts::PI;

/// Ambient / diffuse weights for the terrain scenes.
pub const TERRAIN_AMBIENT: f32 = 0.5;
pub const TERRAIN_DIFFUSE: f32 = 0.5;

/// Ambient / diffuse / specular weights for the water surface.
pub const WATER_AMBIENT: f32 = 0.3;
pub const WATER_DIFFUSE: f32 = 0.3;
pub const WATER_SPECULAR: f32 = 0.3;

/// Blinn half-vector exponent for the water highlight.
pub const WATER_SHININESS: f32 = 60.0;

/// Single-scatter Lambertian term, normalized by pi:
/// `intensity * albedo * max(0, dot(n, l)) / pi`.
pub fn lambert(intensity: f32, albedo: Vec3, normal: Vec3, light_dir: Vec3) -> Vec3 {
    intensity * albedo * normal.dot(light_dir).max(0.0) / PI
}

/// Flat ambient term: `intensity * albedo`.
pub fn ambient(intensity: f32, albedo: Vec3) -> Vec3 {
    intensity * albedo
}

/// Normalized Blinn specular term, only evaluated when the surface actually
/// faces the light (`diffuse > 0`); a backlit surface gets no highlight.
pub fn blinn_specular(
    intensity: f32,
    normal: Vec3,
    light_dir: Vec3,
    view_dir: Vec3,
    shininess: f32,
) -> f32 {
    if normal.dot(light_dir) <= 0.0 {
        return 0.0;
    }
    let half = (light_dir + view_dir).normalize();
    let norm = (shininess + 2.0) / (2.0 * PI);
    intensity * norm * normal.dot(half).max(0.0).powf(shininess)
}

/// View-angle reflectance weight: `1 - dot(view, normal)`, clamped to [0, 1].
pub fn fresnel(view_dir: Vec3, normal: Vec3) -> f32 {
    (1.0 - view_dir.dot(normal)).clamp(0.0, 1.0)
}

/// Blend the two offscreen targets by the Fresnel weight: 0 is pure
/// refraction (looking straight down), 1 is pure reflection (grazing).
pub fn fresnel_blend(refraction: Vec4, reflection: Vec4, f: f32) -> Vec4 {
    refraction.lerp(reflection, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambert_pi_normalization() {
        // Head-on light on a white surface: intensity / pi.
        let c = lambert(1.0, Vec3::ONE, Vec3::Y, Vec3::Y);
        assert!((c.x - 1.0 / PI).abs() < 1e-6);
    }

    #[test]
    fn test_lambert_clamps_backlit() {
        let c = lambert(5.0, Vec3::ONE, Vec3::Y, -Vec3::Y);
        assert_eq!(c, Vec3::ZERO);
    }

    #[test]
    fn test_specular_zero_when_backlit() {
        // Light behind the surface but view in front: the half vector alone
        // would still produce a highlight, the diffuse guard must kill it.
        let s = blinn_specular(1.0, Vec3::Y, -Vec3::Y, Vec3::Y, WATER_SHININESS);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_specular_normalization_at_peak() {
        // Light, view, and normal all aligned: term is (n+2)/(2*pi).
        let s = blinn_specular(1.0, Vec3::Y, Vec3::Y, Vec3::Y, WATER_SHININESS);
        assert!((s - (WATER_SHININESS + 2.0) / (2.0 * PI)).abs() < 1e-4);
    }

    #[test]
    fn test_fresnel_zero_at_normal_incidence() {
        assert_eq!(fresnel(Vec3::Y, Vec3::Y), 0.0);
    }

    #[test]
    fn test_fresnel_clamped_at_grazing() {
        // dot = -1 would give 2; the clamp caps it at 1.
        assert_eq!(fresnel(-Vec3::Y, Vec3::Y), 1.0);
    }

    #[test]
    fn test_blend_endpoints() {
        let refr = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let refl = Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(fresnel_blend(refr, refl, 0.0), refr);
        assert_eq!(fresnel_blend(refr, refl, 1.0), refl);
        let mid = fresnel_blend(refr, refl, 0.5);
        assert!((mid.x - 0.5).abs() < 1e-6 && (mid.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_water_weights_sum_below_one() {
        assert!(WATER_AMBIENT + WATER_DIFFUSE + WATER_SPECULAR <= 1.0 + 1e-6);
    }
}
