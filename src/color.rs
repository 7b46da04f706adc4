/// An RGBA color with floating-point components (0.0–255.0 range).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 255.0 }
    }
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Byte channels, as in `Color::u_rgb(0x33, 0x66, 0x99)`.
    pub const fn u_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32, g as f32, b as f32)
    }
    pub const fn u_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32, g as f32, b as f32, a as f32)
    }

    /// Component-wise blend. `t` outside `0..=1` extrapolates; the renderer
    /// clamps on conversion.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: f32, b: f32| (a as f64 + (b as f64 - a as f64) * t) as f32;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::u_rgb(r, g, b)
    }
}

/// `0xRRGGBB`, fully opaque.
impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Color::u_rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_conversion() {
        let color: Color = 0x336699u32.into();
        assert_eq!(color, Color::u_rgb(0x33, 0x66, 0x99));
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Color::rgba(0.0, 100.0, 200.0, 0.0).lerp(Color::rgba(100.0, 100.0, 0.0, 255.0), 0.5);
        assert_eq!(mid, Color::rgba(50.0, 100.0, 100.0, 127.5));
    }
}
