//! Headless tile map: builds a grass field with a walking player, runs a few
//! frames against the recording backend and prints what reached the GPU.
//!
//! ```text
//! cargo run -p tessera --example tilemap
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tessera::prelude::*;

const WORLD_COLUMNS: u32 = 40;
const WORLD_ROWS: u32 = 24;

fn shader_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("shaders")
        .join(name)
}

fn walk_cycle(row: f32) -> Vec<Rect> {
    (0..4).map(|i| Rect::new(i as f32 * 16.0, row * 16.0, 16.0, 16.0)).collect()
}

fn build_scene(game: &mut Game, grass: Material, hero: Material) {
    let tile = game.config().tile_size as f32;
    let scene = game.scene_mut();

    scene.add_named_child(
        "camera",
        Entity::new().with(Transform::from_rect(
            0.0,
            0.0,
            WORLD_COLUMNS as f32 * tile,
            WORLD_ROWS as f32 * tile,
        )),
    );

    let tiles = scene.spawn_child("tiles");
    for row in 0..WORLD_ROWS {
        for column in 0..WORLD_COLUMNS {
            tiles.push_child(
                Entity::new()
                    .with(Transform::from_rect(column as f32 * tile, row as f32 * tile, tile, tile))
                    .with(Sprite::full(grass)),
            );
        }
    }

    let mut animator = Animator::new(Duration::from_millis(120));
    for (row, facing) in ["down", "up", "left", "right"].into_iter().enumerate() {
        animator.add_clip(&format!("idle {facing}"), walk_cycle(row as f32)[..1].to_vec());
        animator.add_clip(&format!("walk {facing}"), walk_cycle(row as f32));
    }
    scene.add_named_child(
        "player",
        Entity::new()
            .with(Transform::new(Rect::new(640.0, 384.0, 16.0, 16.0), 4.0))
            .with(Sprite::new(Rect::new(0.0, 0.0, 16.0, 16.0), hero))
            .with(animator),
    );
}

fn main() {
    if let Err(err) = tessera::logger::init(&LogTarget::Console) {
        eprintln!("logger: {err}");
    }

    let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
    let gpu = Gpu::new(backend.clone());
    let config = EngineConfig::default();

    let shader = Shader::load(&gpu, shader_path("sprite.vert.wgsl"), shader_path("sprite.frag.wgsl"));
    shader.set_mat4(
        "projection",
        Mat4::orthographic_rh(0.0, config.width as f32, config.height as f32, 0.0, -1.0, 1.0),
    );
    let grass_texture = Texture::from_image(&gpu, &ImageData::solid(64, 64, [60, 160, 60, 255]), TextureParams::default());
    let hero_texture = Texture::from_image(&gpu, &ImageData::solid(64, 64, [200, 80, 40, 255]), TextureParams::default());
    let grass = Material::new(&grass_texture, &shader, 0);
    let hero = Material::new(&hero_texture, &shader, 0);

    let mut game = Game::new(gpu, config)
        .add_system(MovementSystem::new("player", Keyboard::default()))
        .add_system(AnimateMoveSystem::new("player", Keyboard::default()))
        .add_system(AnimationSystem::new("player"))
        .add_system(CameraSystem::new("player", "camera"))
        .add_system(SpriteDrawSystem::with_camera("camera"));
    build_scene(&mut game, grass, hero);

    for frame in 0..8 {
        let held: &[Key] = if frame < 5 { &[Key::Right, Key::Down] } else { &[] };
        game.input_mut().refresh(held);
        backend.borrow_mut().clear_commands();
        game.step(Duration::from_millis(16));

        let stats = game.stats();
        let position = game
            .scene_mut()
            .named_child("player")
            .component::<Transform>()
            .position();
        log::info!(
            "frame {frame}: {} sprites, {} draw calls, {} uploads, player at ({:.1}, {:.1})",
            stats.sprites,
            stats.draw_calls,
            backend.borrow().uploads(),
            position.x,
            position.y
        );
    }

    let census = game.shutdown();
    drop((grass_texture, hero_texture, shader));
    log::info!(
        "census after shutdown: {} entities, {} components; {} GPU resources alive",
        census.entities,
        census.components,
        backend.borrow().live_resources()
    );
}
