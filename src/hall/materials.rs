//! Surface materials and scene lighting

use glam::{Vec2, Vec3};

use crate::consts::{SCREEN_Y, SCREEN_Z};

/// Textures the hall uses. Each may fail to load independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Floor,
    Wall,
    Screen,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Floor, TextureSlot::Wall, TextureSlot::Screen];

    pub fn file_name(&self) -> &'static str {
        match self {
            TextureSlot::Floor => "floor.jpg",
            TextureSlot::Wall => "wall.jpg",
            TextureSlot::Screen => "screen.jpg",
        }
    }

    /// URL under the configured asset root
    pub fn url(&self, asset_root: &str) -> String {
        format!("{}/{}", asset_root.trim_end_matches('/'), self.file_name())
    }
}

/// Colors for hall elements (sRGB hex)
pub mod colors {
    pub const SEAT: u32 = 0x1e3a8a;
    pub const FLOOR: u32 = 0x222222;
    pub const WALL: u32 = 0x333333;
    pub const SCREEN: u32 = 0xffffff;
    pub const SCREEN_FRAME: u32 = 0x111111;
    pub const FAN_HOUSING: u32 = 0x888888;
    pub const FAN_BLADE: u32 = 0xcccccc;
    pub const AMBIENT: u32 = 0x404040;
    pub const WHITE: u32 = 0xffffff;
}

/// Lit surface description. The texture, when loaded, multiplies the color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: u32,
    pub texture: Option<TextureSlot>,
    pub uv_repeat: Vec2,
    pub roughness: f32,
    pub metalness: f32,
    pub double_sided: bool,
}

impl Material {
    pub const fn solid(color: u32) -> Self {
        Self {
            color,
            texture: None,
            uv_repeat: Vec2::ONE,
            roughness: 1.0,
            metalness: 0.0,
            double_sided: false,
        }
    }

    pub const fn textured(mut self, slot: TextureSlot, repeat: Vec2) -> Self {
        self.texture = Some(slot);
        self.uv_repeat = repeat;
        self
    }

    pub const fn pbr(mut self, roughness: f32, metalness: f32) -> Self {
        self.roughness = roughness;
        self.metalness = metalness;
        self
    }

    pub const fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub const fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Light position; it shines toward the origin
    pub position: Vec3,
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: u32,
    pub intensity: f32,
    /// Half-angle of the cone (radians)
    pub angle: f32,
}

/// Fixed scene lighting
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    /// Main light and rim light
    pub directional: [DirectionalLight; 2],
    /// Spot aimed at the screen
    pub spot: SpotLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: colors::AMBIENT,
            ambient_intensity: 0.3,
            directional: [
                DirectionalLight {
                    position: Vec3::new(5.0, 10.0, 5.0),
                    color: colors::WHITE,
                    intensity: 1.5,
                },
                DirectionalLight {
                    position: Vec3::new(-5.0, 3.0, 2.0),
                    color: colors::WHITE,
                    intensity: 0.6,
                },
            ],
            spot: SpotLight {
                position: Vec3::new(0.0, 5.0, 5.0),
                target: Vec3::new(0.0, SCREEN_Y, SCREEN_Z),
                color: colors::WHITE,
                intensity: 2.0,
                angle: std::f32::consts::FRAC_PI_3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_urls() {
        assert_eq!(TextureSlot::Floor.url("textures"), "textures/floor.jpg");
        assert_eq!(TextureSlot::Screen.url("/cdn/hall/"), "/cdn/hall/screen.jpg");
    }

    #[test]
    fn test_material_builders() {
        let m = Material::solid(colors::WALL)
            .textured(TextureSlot::Wall, Vec2::splat(6.0))
            .double_sided();
        assert_eq!(m.texture, Some(TextureSlot::Wall));
        assert_eq!(m.uv_repeat, Vec2::splat(6.0));
        assert!(m.double_sided);
        assert_eq!(m.with_color(0xff0000).color, 0xff0000);
    }
}
