use serde::{Deserialize, Serialize};

/// How a brush dab combines its paint value with the weight already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Mix,
    Add,
    Subtract,
    Multiply,
    Lighten,
    Darken,
}

impl BlendMode {
    /// Blends `paint` over `current` at strength `alpha`, clamped to [0, 1].
    pub fn blend(self, current: f32, paint: f32, alpha: f32) -> f32 {
        let value = match self {
            BlendMode::Mix => current + (paint - current) * alpha,
            BlendMode::Add => current + paint * alpha,
            BlendMode::Subtract => current - paint * alpha,
            BlendMode::Multiply => current * (1.0 + (paint - 1.0) * alpha),
            BlendMode::Lighten => {
                if paint > current {
                    current + (paint - current) * alpha
                } else {
                    current
                }
            }
            BlendMode::Darken => {
                if paint < current {
                    current + (paint - current) * alpha
                } else {
                    current
                }
            }
        };
        value.clamp(0.0, 1.0)
    }
}

/// Smoothstep falloff from a dab center: 1 at the center, 0 at the radius
/// and beyond.
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let t = 1.0 - distance / radius;
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_mix() {
        assert_near(BlendMode::Mix.blend(0.2, 1.0, 0.5), 0.6);
        assert_near(BlendMode::Mix.blend(0.2, 1.0, 0.0), 0.2);
    }

    #[test]
    fn test_add_clamps() {
        assert_near(BlendMode::Add.blend(0.5, 0.5, 1.0), 1.0);
        assert_near(BlendMode::Add.blend(0.9, 0.5, 1.0), 1.0);
    }

    #[test]
    fn test_subtract_clamps() {
        assert_near(BlendMode::Subtract.blend(0.5, 0.3, 1.0), 0.2);
        assert_near(BlendMode::Subtract.blend(0.1, 0.5, 1.0), 0.0);
    }

    #[test]
    fn test_multiply() {
        assert_near(BlendMode::Multiply.blend(0.8, 0.5, 1.0), 0.4);
        // Zero alpha leaves the weight alone.
        assert_near(BlendMode::Multiply.blend(0.8, 0.5, 0.0), 0.8);
    }

    #[test]
    fn test_lighten_darken_one_sided() {
        assert_near(BlendMode::Lighten.blend(0.5, 0.3, 1.0), 0.5);
        assert_near(BlendMode::Lighten.blend(0.3, 0.5, 1.0), 0.5);
        assert_near(BlendMode::Darken.blend(0.5, 0.3, 1.0), 0.3);
        assert_near(BlendMode::Darken.blend(0.3, 0.5, 1.0), 0.3);
    }

    #[test]
    fn test_falloff_profile() {
        assert_near(falloff(0.0, 2.0), 1.0);
        assert_near(falloff(1.0, 2.0), 0.5);
        assert_near(falloff(2.0, 2.0), 0.0);
        assert_near(falloff(3.0, 2.0), 0.0);
        assert_near(falloff(1.0, 0.0), 0.0);
    }
}
