//! Directional lights and diffuse intensity

use crate::color::Color;
use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// A directional light. `direction` points *from* the light toward the
/// scene, so a surface is lit when its normal opposes the direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Light {
    pub direction: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize(),
            color: Color::WHITE,
            intensity,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -1.0, -1.0).normalize(),
            color: Color::WHITE,
            intensity: 0.7,
        }
    }
}

/// Diffuse intensity for a unit normal: ambient plus the summed light
/// contributions, clamped to 1.0.
pub fn shade_intensity(normal: Vec3, lights: &[Light], ambient: f32) -> f32 {
    let mut total = ambient;
    for light in lights {
        total += (-normal.dot(light.direction)).max(0.0) * light.intensity;
    }
    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_light_is_fully_lit() {
        let light = Light::new(Vec3::new(0.0, 0.0, -1.0), 1.0);
        let i = shade_intensity(Vec3::new(0.0, 0.0, 1.0), &[light], 0.0);
        assert!((i - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_back_side_gets_only_ambient() {
        let light = Light::new(Vec3::new(0.0, 0.0, -1.0), 1.0);
        let i = shade_intensity(Vec3::new(0.0, 0.0, -1.0), &[light], 0.3);
        assert!((i - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_contributions_sum_and_clamp() {
        let lights = [
            Light::new(Vec3::new(0.0, 0.0, -1.0), 0.8),
            Light::new(Vec3::new(0.0, 0.0, -1.0), 0.8),
        ];
        let i = shade_intensity(Vec3::new(0.0, 0.0, 1.0), &lights, 0.2);
        assert_eq!(i, 1.0);
    }
}
