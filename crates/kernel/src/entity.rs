use std::path::Path;

use cadence_assets::{AssetError, AssetStore, MeshPhysicsKind};
use cadence_common::{PhysicsCategory, Transform};
use cadence_input::{Action, KeyBindings};
use cadence_physics::BodyId;
use cadence_render::{DrawList, Material, Specular};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{CollisionInfo, Environment, MeshRenderer, SceneNode, SceneObject};

/// Movement constants for a physics-backed entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTuning {
    /// Impulse per second of held movement key.
    pub impulse: f32,
    pub jump_impulse: f32,
    pub max_lateral_speed: f32,
    pub max_vertical_speed: f32,
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            impulse: 10.0,
            jump_impulse: 1.0,
            max_lateral_speed: 7.5,
            max_vertical_speed: 5.0,
        }
    }
}

/// Limit horizontal speed to `max_lateral` keeping its direction.
///
/// Upward speed is capped at `max_vertical` only while the horizontal speed
/// is over its limit; a velocity within the lateral limit comes back
/// unchanged. Falling speed is never touched.
pub fn clamp_velocity(velocity: Vec3, max_lateral: f32, max_vertical: f32) -> Vec3 {
    let mut v = velocity;
    let lateral = (v.x * v.x + v.y * v.y).sqrt();
    if lateral > max_lateral {
        let scale = max_lateral / lateral;
        v.x *= scale;
        v.y *= scale;
        v.z = v.z.min(max_vertical);
    }
    v
}

/// A scene object whose position comes from a rigid body.
///
/// Movement is applied as impulses; the body's velocity is clamped and its
/// position copied into the transform every update. Without a body the
/// entity is visual only and every physics operation is a no-op.
pub struct PhysicsEntity {
    object: SceneObject,
    body: Option<BodyId>,
    tuning: EntityTuning,
    bindings: KeyBindings,
    on_ground: bool,
    player: bool,
}

impl PhysicsEntity {
    pub fn new(
        renderer: MeshRenderer,
        body: Option<BodyId>,
        player: bool,
        env: &mut Environment,
    ) -> Self {
        let mut transform = Transform::default();
        if let Some(position) = body.and_then(|b| env.physics.translation(b)) {
            transform.position = position;
        }

        let mut object = SceneObject::new(transform).with_category(PhysicsCategory::Person);
        object.add_component(renderer);

        if let Some(body) = body {
            env.track_body(body, object.id());
        }

        Self {
            object,
            body,
            tuning: EntityTuning::default(),
            bindings: KeyBindings::default(),
            on_ground: false,
            player,
        }
    }

    /// Load the entity's mesh and diffuse texture and build it around `body`.
    pub fn load(
        assets: &mut AssetStore,
        env: &mut Environment,
        mesh_path: impl AsRef<Path>,
        diffuse_path: impl AsRef<Path>,
        player: bool,
        body: Option<BodyId>,
    ) -> Result<Self, AssetError> {
        let mesh = assets.load_mesh(mesh_path, MeshPhysicsKind::Entity)?;
        let diffuse = assets.load_texture(diffuse_path)?;
        let material = Material::new(diffuse).with_specular(Specular {
            intensity: 0.0,
            exponent: 0.0,
        });
        Ok(Self::new(MeshRenderer::new(mesh, material), body, player, env))
    }

    pub fn with_tuning(mut self, tuning: EntityTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    pub fn tuning(&self) -> &EntityTuning {
        &self.tuning
    }

    pub fn is_player(&self) -> bool {
        self.player
    }

    /// Whether ground was touched during the last physics step.
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn transform(&self) -> &Transform {
        &self.object.transform
    }

    /// Push the body along `direction` with `direction * amount` as impulse.
    pub fn move_along(&self, direction: Vec3, amount: f32, env: &mut Environment) {
        if let Some(body) = self.body {
            env.physics.apply_central_impulse(body, direction * amount);
        }
    }

    fn sync_from_body(&mut self, env: &mut Environment) {
        let Some(body) = self.body else {
            return;
        };
        if let Some(velocity) = env.physics.linear_velocity(body) {
            let clamped = clamp_velocity(
                velocity,
                self.tuning.max_lateral_speed,
                self.tuning.max_vertical_speed,
            );
            if clamped != velocity {
                env.physics.set_linear_velocity(body, clamped);
            }
        }
        if let Some(position) = env.physics.translation(body) {
            self.object.transform.position = position;
        }
    }
}

impl SceneNode for PhysicsEntity {
    fn object(&self) -> &SceneObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut SceneObject {
        &mut self.object
    }

    fn input(&mut self, delta: f32, env: &mut Environment) {
        if self.player {
            let t = self.object.transform;
            let step = self.tuning.impulse * delta;
            let moves = [
                (Action::MoveForward, t.forward()),
                (Action::MoveLeft, t.left()),
                (Action::MoveBackward, t.backward()),
                (Action::MoveRight, t.right()),
            ];
            for (action, direction) in moves {
                if self.bindings.is_active(action, &env.input) {
                    self.move_along(direction, step, env);
                }
            }
            if self.on_ground && self.bindings.is_active(Action::Jump, &env.input) {
                self.move_along(t.up(), self.tuning.jump_impulse, env);
            }
        }
        self.on_ground = false;
        self.object.input(delta, env);
    }

    fn update(&mut self, delta: f32, env: &mut Environment) {
        self.sync_from_body(env);
        self.object.update(delta, env);
    }

    fn render(&self, draw: &mut DrawList) {
        self.object.render(draw);
    }

    fn handle_collision(&mut self, contact: CollisionInfo) {
        match contact.category {
            PhysicsCategory::Terrain => self.on_ground = true,
            PhysicsCategory::Person | PhysicsCategory::Unclassified => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_assets::{AssetId, MeshHandle, TextureHandle};
    use cadence_common::ObjectId;
    use cadence_input::Key;
    use cadence_physics::{BodyDesc, PhysicsSettings, SimpleWorld};

    fn env() -> Environment {
        let settings = PhysicsSettings {
            gravity: Vec3::ZERO,
            ..PhysicsSettings::default()
        };
        Environment::new(Box::new(SimpleWorld::with_settings(settings)))
    }

    fn renderer() -> MeshRenderer {
        MeshRenderer::new(
            MeshHandle(AssetId(1)),
            Material::new(TextureHandle(AssetId(2))),
        )
    }

    fn player(env: &mut Environment) -> PhysicsEntity {
        let body = env.physics.add_body(&BodyDesc::dynamic(Vec3::ZERO, Vec3::splat(0.5)));
        PhysicsEntity::new(renderer(), Some(body), true, env)
    }

    fn velocity(entity: &PhysicsEntity, env: &Environment) -> Vec3 {
        entity
            .body()
            .and_then(|b| env.physics.linear_velocity(b))
            .unwrap_or_default()
    }

    fn terrain_contact() -> CollisionInfo {
        CollisionInfo {
            other: ObjectId::new(),
            category: PhysicsCategory::Terrain,
        }
    }

    #[test]
    fn clamp_rescales_lateral_and_caps_vertical() {
        let v = clamp_velocity(Vec3::new(6.0, 6.0, 8.0), 7.5, 5.0);
        assert!((v.x - 5.303).abs() < 1e-3);
        assert!((v.y - 5.303).abs() < 1e-3);
        assert_eq!(v.z, 5.0);
        assert!(((v.x * v.x + v.y * v.y).sqrt() - 7.5).abs() < 1e-4);
    }

    #[test]
    fn clamp_preserves_lateral_direction() {
        let v = clamp_velocity(Vec3::new(-30.0, 40.0, 0.0), 7.5, 5.0);
        assert!((v.x - -4.5).abs() < 1e-4);
        assert!((v.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn clamp_leaves_in_range_velocity_alone() {
        let v = Vec3::new(3.0, -2.0, 4.0);
        assert_eq!(clamp_velocity(v, 7.5, 5.0), v);
        let once = clamp_velocity(Vec3::new(9.0, 9.0, 9.0), 7.5, 5.0);
        assert_eq!(clamp_velocity(once, 7.5, 5.0), once);
    }

    #[test]
    fn clamp_keeps_fast_rise_when_lateral_is_slow() {
        let v = Vec3::new(1.0, 0.0, 12.0);
        assert_eq!(clamp_velocity(v, 7.5, 5.0), v);
    }

    #[test]
    fn clamp_never_slows_a_fall() {
        let v = clamp_velocity(Vec3::new(0.0, 0.0, -40.0), 7.5, 5.0);
        assert_eq!(v.z, -40.0);
    }

    #[test]
    fn construction_tracks_body_and_sets_person() {
        let mut env = env();
        let entity = player(&mut env);
        let body = entity.body().unwrap();
        assert_eq!(env.body_owner(body), Some(entity.id()));
        assert_eq!(entity.category(), PhysicsCategory::Person);
        assert_eq!(entity.object().component_count(), 1);
    }

    #[test]
    fn update_clamps_velocity_and_syncs_position() {
        let mut env = env();
        let mut entity = player(&mut env);
        let body = entity.body().unwrap();
        env.physics.set_linear_velocity(body, Vec3::new(6.0, 6.0, 8.0));
        env.physics.set_translation(body, Vec3::new(4.0, -2.0, 1.5));

        entity.update(1.0 / 60.0, &mut env);

        let v = velocity(&entity, &env);
        assert!((v.x - 5.303).abs() < 1e-3);
        assert_eq!(v.z, 5.0);
        assert_eq!(entity.transform().position, Vec3::new(4.0, -2.0, 1.5));
    }

    #[test]
    fn update_keeps_straight_launch_speed() {
        let mut env = env();
        let mut entity = player(&mut env);
        let body = entity.body().unwrap();
        env.physics.set_linear_velocity(body, Vec3::new(1.0, 0.0, 12.0));

        entity.update(1.0 / 60.0, &mut env);

        assert_eq!(velocity(&entity, &env), Vec3::new(1.0, 0.0, 12.0));
    }

    #[test]
    fn set_position_round_trips_through_update() {
        let mut env = env();
        let mut entity = player(&mut env);
        let target = Vec3::new(-7.0, 3.25, 0.5);
        env.physics.set_translation(entity.body().unwrap(), target);
        entity.update(0.0, &mut env);
        assert_eq!(entity.transform().position, target);
    }

    #[test]
    fn held_forward_applies_scaled_impulse() {
        let mut env = env();
        let mut entity = player(&mut env);
        env.input.press(Key::W);
        entity.input(0.1, &mut env);
        let v = velocity(&entity, &env);
        assert!((v.y - 1.0).abs() < 1e-5);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut env = env();
        let mut entity = player(&mut env);
        env.input.press(Key::A);
        env.input.press(Key::D);
        entity.input(0.1, &mut env);
        assert!(velocity(&entity, &env).length() < 1e-6);
    }

    #[test]
    fn rebound_keys_drive_movement() {
        let mut env = env();
        let mut bindings = KeyBindings::default();
        bindings.bind(Action::MoveRight, Key::Right);
        let mut entity = player(&mut env).with_bindings(bindings);
        env.input.press(Key::D);
        entity.input(0.1, &mut env);
        assert_eq!(velocity(&entity, &env), Vec3::ZERO);
        env.input.press(Key::Right);
        entity.input(0.1, &mut env);
        assert!(velocity(&entity, &env).x > 0.0);
    }

    #[test]
    fn jump_requires_ground_contact() {
        let mut env = env();
        let mut entity = player(&mut env);
        env.input.press(Key::Space);

        entity.input(0.1, &mut env);
        assert_eq!(velocity(&entity, &env).z, 0.0);

        entity.handle_collision(terrain_contact());
        assert!(entity.on_ground());
        entity.input(0.1, &mut env);
        assert!((velocity(&entity, &env).z - 1.0).abs() < 1e-5);
        assert!(!entity.on_ground());
    }

    #[test]
    fn on_ground_resets_after_every_input_phase() {
        let mut env = env();
        let mut entity = player(&mut env);
        entity.handle_collision(terrain_contact());
        entity.handle_collision(terrain_contact());
        assert!(entity.on_ground());
        entity.input(0.1, &mut env);
        assert!(!entity.on_ground());
    }

    #[test]
    fn non_terrain_contacts_are_ignored() {
        let mut env = env();
        let mut entity = player(&mut env);
        for category in [PhysicsCategory::Person, PhysicsCategory::Unclassified] {
            entity.handle_collision(CollisionInfo {
                other: ObjectId::new(),
                category,
            });
        }
        assert!(!entity.on_ground());
        entity.input(0.0, &mut env);
    }

    #[test]
    fn non_player_ignores_keys_but_still_resets_ground() {
        let mut env = env();
        let body = env.physics.add_body(&BodyDesc::dynamic(Vec3::ZERO, Vec3::splat(0.5)));
        let mut npc = PhysicsEntity::new(renderer(), Some(body), false, &mut env);
        env.input.press(Key::W);
        env.input.press(Key::Space);
        npc.handle_collision(terrain_contact());
        npc.input(0.1, &mut env);
        assert_eq!(velocity(&npc, &env), Vec3::ZERO);
        assert!(!npc.on_ground());
    }

    #[test]
    fn bodiless_entity_degrades_to_visual_only() {
        let mut env = env();
        let mut entity = PhysicsEntity::new(renderer(), None, true, &mut env);
        env.input.press(Key::W);

        entity.move_along(Vec3::X, 100.0, &mut env);
        entity.input(0.1, &mut env);
        entity.update(0.1, &mut env);
        assert_eq!(entity.transform().position, Vec3::ZERO);
        assert_eq!(env.tracked_bodies().count(), 0);

        let mut draw = DrawList::new();
        entity.render(&mut draw);
        assert_eq!(draw.len(), 1);
    }

    #[test]
    fn move_along_does_not_normalize() {
        let mut env = env();
        let entity = player(&mut env);
        entity.move_along(Vec3::new(2.0, 0.0, 0.0), 3.0, &mut env);
        assert_eq!(velocity(&entity, &env), Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn load_reads_mesh_and_texture_files() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = dir.path().join("player.obj");
        let tex = dir.path().join("player.png");
        std::fs::write(&mesh, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        std::fs::write(&tex, b"\x89PNG\r\n\x1a\nrest").unwrap();

        let mut assets = AssetStore::new();
        let mut env = env();
        let entity =
            PhysicsEntity::load(&mut assets, &mut env, &mesh, &tex, true, None).unwrap();
        assert!(entity.is_player());
        assert_eq!(assets.len(), 2);

        let mut draw = DrawList::new();
        entity.render(&mut draw);
        assert_eq!(draw.calls()[0].material.specular, Specular::default());
    }

    #[test]
    fn load_fails_on_missing_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let mut assets = AssetStore::new();
        let mut env = env();
        let result = PhysicsEntity::load(
            &mut assets,
            &mut env,
            dir.path().join("nope.obj"),
            dir.path().join("nope.png"),
            true,
            None,
        );
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }
}
