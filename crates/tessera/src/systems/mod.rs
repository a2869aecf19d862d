//! Built-in systems for a top-down tile game.
//!
//! Each system finds its entities by child name on the scene root, so the
//! usual setup is:
//!
//! ```text
//! scene
//!   ├─ "camera"  Transform (rect = world size, scale)
//!   ├─ "player"  Transform, Sprite, Animator
//!   └─ "tiles"   children: Transform + Sprite each
//! ```

mod animation;
mod camera;
mod movement;
mod sprite_draw;

pub use animation::{AnimateMoveSystem, AnimationSystem};
pub use camera::CameraSystem;
pub use movement::MovementSystem;
pub use sprite_draw::SpriteDrawSystem;

#[cfg(test)]
pub(crate) mod testing {
    use crate::assets::{ImageData, ShaderSources};
    use crate::components::{Material, Shader, Texture};
    use crate::config::EngineConfig;
    use crate::ecs::{Entity, System, UpdateContext};
    use crate::input::Input;
    use crate::render::{Gpu, HeadlessBackend, TextureParams};
    use crate::time::Time;

    /// Run one update of `system` against `scene`.
    pub fn update(system: &mut dyn System, scene: &mut Entity, input: &Input, time: &Time) {
        let config = EngineConfig::default();
        let mut ctx = UpdateContext {
            scene,
            input,
            time,
            config: &config,
        };
        system.update(&mut ctx);
    }

    /// A material over a 64×64 texture. The texture and shader are leaked
    /// so the handles stay valid for the whole test.
    pub fn material() -> Material {
        let gpu = Gpu::from_backend(HeadlessBackend::new());
        let texture = Texture::from_image(&gpu, &ImageData::solid(64, 64, [255; 4]), TextureParams::default());
        let shader = Shader::from_sources(&gpu, &ShaderSources::inline("v", "f")).unwrap();
        let material = Material::new(&texture, &shader, 0);
        std::mem::forget(texture);
        std::mem::forget(shader);
        material
    }
}
