//! Sample scene used by the CLI and the desktop app.
//!
//! Builds against any [`PhysicsBackend`] already placed in the environment,
//! so the same scene runs on the reference integrator and on rapier.
//!
//! [`PhysicsBackend`]: cadence_physics::PhysicsBackend

use cadence_assets::{AssetStore, MeshPhysicsKind};
use cadence_common::{ObjectId, PhysicsCategory, Transform};
use cadence_kernel::{
    Behavior, EngineConfig, Environment, MeshRenderer, PhysicsEntity, Scene, SceneNode,
    SceneObject,
};
use cadence_physics::BodyDesc;
use cadence_render::{Material, Specular};
use glam::Vec3;

/// Half extents of the ground slab. Its top face is the z = 0 plane.
pub const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(40.0, 40.0, 0.5);

/// Where the player body starts.
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 0.0, 0.5);

const PROPS: [Vec3; 3] = [
    Vec3::new(4.0, 6.0, 0.5),
    Vec3::new(-5.0, 3.0, 0.5),
    Vec3::new(2.0, -7.0, 0.5),
];

/// Keeps the environment camera trailing its owner and its aspect ratio in
/// step with the window.
#[derive(Debug, Clone, Copy)]
pub struct FollowCamera {
    pub offset: Vec3,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, -8.0, 4.0),
        }
    }
}

impl Behavior for FollowCamera {
    fn update(&mut self, _delta: f32, transform: &mut Transform, env: &mut Environment) {
        if env.window.take_resized() {
            let (w, h) = (env.window.width, env.window.height);
            env.camera.set_viewport(w, h);
        }
        env.camera.target = transform.position;
        env.camera.eye = transform.position + self.offset;
    }
}

/// Ids of the interesting objects in the built scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playground {
    pub ground: ObjectId,
    pub player: ObjectId,
    pub light: ObjectId,
    pub props: [ObjectId; 3],
}

/// Populate `scene` and `env` with the sample level.
pub fn build(
    scene: &mut Scene,
    env: &mut Environment,
    assets: &mut AssetStore,
    config: &EngineConfig,
) -> Playground {
    let white = assets.builtin_white();
    let terrain_mesh = assets.builtin_cube(MeshPhysicsKind::Terrain);
    let entity_mesh = assets.builtin_cube(MeshPhysicsKind::Entity);
    let prop_mesh = assets.builtin_cube(MeshPhysicsKind::None);

    let ground_center = Vec3::new(0.0, 0.0, -GROUND_HALF_EXTENTS.z);
    let ground_body = env
        .physics
        .add_body(&BodyDesc::fixed(ground_center, GROUND_HALF_EXTENTS));
    let mut ground = SceneObject::new(
        Transform::from_position(ground_center).with_scale(GROUND_HALF_EXTENTS * 2.0),
    )
    .with_category(PhysicsCategory::Terrain);
    ground.add_component(MeshRenderer::new(
        terrain_mesh,
        Material::new(white).with_tint([0.35, 0.55, 0.3, 1.0]),
    ));
    env.track_body(ground_body, ground.id());
    let ground = scene.add(ground);

    let mut props = [ground; 3];
    for (slot, position) in props.iter_mut().zip(PROPS) {
        let body = env
            .physics
            .add_body(&BodyDesc::fixed(position, Vec3::splat(0.5)));
        let mut prop = SceneObject::new(Transform::from_position(position));
        prop.add_component(MeshRenderer::new(
            prop_mesh,
            Material::new(white).with_tint([0.6, 0.4, 0.2, 1.0]),
        ));
        env.track_body(body, prop.id());
        *slot = scene.add(prop);
    }

    let player_body = env
        .physics
        .add_body(&BodyDesc::dynamic(PLAYER_SPAWN, Vec3::splat(0.5)));
    let material = Material::new(white)
        .with_tint([0.2, 0.4, 0.9, 1.0])
        .with_specular(Specular {
            intensity: 0.0,
            exponent: 0.0,
        });
    let mut player = PhysicsEntity::new(
        MeshRenderer::new(entity_mesh, material),
        Some(player_body),
        true,
        env,
    )
    .with_tuning(config.entity)
    .with_bindings(config.bindings.clone());
    player.object_mut().add_component(FollowCamera::default());
    let player = scene.add(player);

    let light = scene.add(SceneObject::new(Transform::from_position(Vec3::new(
        10.0, -10.0, 20.0,
    ))));
    env.add_light(light);
    env.active_light = Some(light);

    tracing::info!(
        objects = scene.len(),
        bodies = env.physics.body_count(),
        "playground built"
    );

    Playground {
        ground,
        player,
        light,
        props,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_kernel::Game;
    use cadence_physics::SimpleWorld;
    use cadence_render::DrawList;

    fn built() -> (Scene, Environment, Playground) {
        let config = EngineConfig::default();
        let mut env = Environment::new(Box::new(SimpleWorld::with_settings(config.physics)));
        let mut scene = Scene::new();
        let mut assets = AssetStore::new();
        let ids = build(&mut scene, &mut env, &mut assets, &config);
        (scene, env, ids)
    }

    #[test]
    fn builds_expected_objects() {
        let (scene, env, ids) = built();
        assert_eq!(scene.len(), 6);
        assert_eq!(env.physics.body_count(), 5);
        assert_eq!(env.tracked_bodies().count(), 5);
        assert!(env.lights().contains(&ids.light));
        assert_eq!(env.active_light, Some(ids.light));
        assert_eq!(
            scene.get(ids.ground).map(|n| n.category()),
            Some(PhysicsCategory::Terrain)
        );
        assert_eq!(
            scene.get(ids.player).map(|n| n.category()),
            Some(PhysicsCategory::Person)
        );
    }

    #[test]
    fn camera_follows_player() {
        let (mut scene, mut env, ids) = built();
        scene.input(1.0 / 60.0, &mut env);
        scene.update(1.0 / 60.0, &mut env);
        let player = scene.get(ids.player).map(|n| n.object().transform.position);
        assert_eq!(Some(env.camera.target), player);
        assert_eq!(env.camera.eye, env.camera.target + FollowCamera::default().offset);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let (mut scene, mut env, _) = built();
        env.window.resize(1000, 500);
        scene.update(1.0 / 60.0, &mut env);
        assert_eq!(env.camera.aspect, 2.0);
        assert!(!env.window.resized);
    }

    #[test]
    fn light_has_nothing_to_draw() {
        let (scene, env, _) = built();
        let mut draw = DrawList::new();
        scene.render(&env, &mut draw);
        assert_eq!(draw.len(), 5);
    }
}
