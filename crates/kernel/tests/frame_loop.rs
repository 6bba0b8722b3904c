//! Full frame loop over a small scene: headless platform, simulated clock,
//! reference physics.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use cadence_assets::{AssetStore, MeshPhysicsKind};
use cadence_common::{ObjectId, PhysicsCategory, Transform};
use cadence_input::Key;
use cadence_kernel::{
    Behavior, EngineConfig, Environment, HeadlessPlatform, ManualClock, MeshRenderer,
    PhysicsEntity, Scene, SceneNode, SceneObject, Scheduler,
};
use cadence_physics::{BodyDesc, SimpleWorld};
use cadence_render::Material;
use glam::Vec3;

/// Records the highest z its owner reaches after each update.
struct PeakHeight(Rc<Cell<f32>>);

impl Behavior for PeakHeight {
    fn update(&mut self, _delta: f32, transform: &mut Transform, _env: &mut Environment) {
        if transform.position.z > self.0.get() {
            self.0.set(transform.position.z);
        }
    }
}

struct World {
    scene: Scene,
    env: Environment,
    player: ObjectId,
    peak: Rc<Cell<f32>>,
}

fn build(config: &EngineConfig) -> World {
    let mut env = Environment::new(Box::new(SimpleWorld::with_settings(config.physics)));
    let mut assets = AssetStore::new();
    let mut scene = Scene::new();
    let white = assets.builtin_white();

    let ground_body = env.physics.add_body(&BodyDesc::fixed(
        Vec3::new(0.0, 0.0, -0.5),
        Vec3::new(50.0, 50.0, 0.5),
    ));
    let mut ground = SceneObject::new(Transform::from_position(Vec3::new(0.0, 0.0, -0.5)))
        .with_category(PhysicsCategory::Terrain);
    ground.add_component(MeshRenderer::new(
        assets.builtin_cube(MeshPhysicsKind::Terrain),
        Material::new(white),
    ));
    env.track_body(ground_body, ground.id());
    scene.add(ground);

    let body = env
        .physics
        .add_body(&BodyDesc::dynamic(Vec3::new(0.0, 0.0, 0.5), Vec3::splat(0.5)));
    let renderer = MeshRenderer::new(
        assets.builtin_cube(MeshPhysicsKind::Entity),
        Material::new(white),
    );
    let mut player = PhysicsEntity::new(renderer, Some(body), true, &mut env)
        .with_tuning(config.entity)
        .with_bindings(config.bindings.clone());
    let peak = Rc::new(Cell::new(f32::MIN));
    player.object_mut().add_component(PeakHeight(peak.clone()));
    let player = scene.add(player);

    World {
        scene,
        env,
        player,
        peak,
    }
}

fn run(world: &mut World, config: &EngineConfig, polls: u64) -> HeadlessPlatform {
    let clock = ManualClock::new();
    let platform = HeadlessPlatform::new()
        .simulated(clock.clone(), Duration::from_millis(20))
        .close_after(polls);
    let mut scheduler = Scheduler::with_clock(platform, clock, config.scheduler);
    scheduler
        .start(&mut world.scene, &mut world.env)
        .expect("headless run");
    assert_eq!(scheduler.platform().shutdowns(), 1);
    std::mem::take(scheduler.platform_mut())
}

fn player_position(world: &World) -> Vec3 {
    world
        .scene
        .get(world.player)
        .map(|n| n.object().transform.position)
        .expect("player in scene")
}

#[test]
fn idle_player_rests_on_the_ground() {
    let config = EngineConfig::default();
    let mut world = build(&config);
    let platform = run(&mut world, &config, 60);

    let p = player_position(&world);
    assert!((p.z - 0.5).abs() < 1e-3, "player z = {}", p.z);
    assert!(platform.presented() > 0);
    assert!(platform.last_frame().contains("2 draws"));
}

#[test]
fn held_forward_key_walks_along_plus_y_within_speed_limit() {
    let config = EngineConfig::default();
    let mut world = build(&config);
    world.env.input.press(Key::W);
    run(&mut world, &config, 120);

    let p = player_position(&world);
    assert!(p.y > 1.0, "player y = {}", p.y);
    assert!(p.x.abs() < 1e-4);

    let (body, _) = world
        .env
        .tracked_bodies()
        .find(|(_, owner)| *owner == world.player)
        .expect("player body tracked");
    let v = world.env.physics.linear_velocity(body).expect("body exists");
    assert!(Vec3::new(v.x, v.y, 0.0).length() <= config.entity.max_lateral_speed + 1e-4);
}

#[test]
fn held_jump_leaves_the_ground_and_lands_again() {
    let config = EngineConfig::default();
    let mut world = build(&config);
    world.env.input.press(Key::Space);
    run(&mut world, &config, 90);

    assert!(world.peak.get() > 0.5 + 1e-3, "peak z = {}", world.peak.get());
    assert!(player_position(&world).z >= 0.5 - 1e-3);
}

#[test]
fn config_rebinds_forward() {
    let config = EngineConfig::from_json(r#"{"bindings":{"MoveForward":"Up"}}"#).unwrap();
    let mut world = build(&config);
    world.env.input.press(Key::W);
    run(&mut world, &config, 30);
    assert!(player_position(&world).y.abs() < 1e-4);

    world.env.input.press(Key::Up);
    run(&mut world, &config, 30);
    assert!(player_position(&world).y > 0.0);
}
