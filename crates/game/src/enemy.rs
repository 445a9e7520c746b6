//! Enemy wander AI.
//!
//! Each enemy walks a random heading on the ground plane, re-picking it
//! after a random hold time. Overlaps with obstacles or other enemies push
//! it away (steering only, brief interpenetration is allowed).

use engine_core::{Transform, Vec3, Velocity};
use hecs::Entity;
use physics::{Aabb, Collider, SpatialWorld};
use rand::Rng;

use crate::config::EnemyTunables;
use crate::events::SimEvent;
use crate::registry::EntityRegistry;

/// Wander state carried by every enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wander {
    /// Unit heading on the XZ plane.
    pub heading: Vec3,
    /// Seconds until the next heading change.
    pub change_timer: f32,
    /// This enemy's walking speed.
    pub speed: f32,
}

impl Wander {
    pub fn random(rng: &mut impl Rng, tunables: &EnemyTunables) -> Self {
        let v = tunables.speed_variation.abs();
        Self {
            heading: random_heading(rng),
            change_timer: hold_time(rng, tunables),
            speed: tunables.speed * rng.gen_range(1.0 - v..=1.0 + v),
        }
    }
}

fn random_heading(rng: &mut impl Rng) -> Vec3 {
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

fn hold_time(rng: &mut impl Rng, tunables: &EnemyTunables) -> f32 {
    rng.gen_range(tunables.min_dir_change_time..=tunables.max_dir_change_time)
}

/// Result of one AI pass.
#[derive(Debug, Default)]
pub struct WanderReport {
    /// Enemies with a non-finite pose that need a fresh position.
    pub invalid: Vec<Entity>,
    /// Enemies that walked past the despawn margin.
    pub escaped: Vec<Entity>,
}

/// Advance every active enemy by `dt`.
///
/// `rest_y` pins enemies to the ground plane. Consumed and dead enemies
/// are skipped.
pub fn update_enemies(
    registry: &mut EntityRegistry,
    world: &SpatialWorld,
    tunables: &EnemyTunables,
    rest_y: f32,
    rng: &mut impl Rng,
    dt: f32,
) -> WanderReport {
    let mut report = WanderReport::default();

    // Snapshot boxes first so every enemy steers against the same frame.
    let boxes: Vec<(Entity, Aabb)> = registry
        .active_enemies()
        .into_iter()
        .filter_map(|e| registry.aabb(e).map(|b| (e, b)))
        .collect();

    for &(entity, aabb) in &boxes {
        let (push, hit_obstacle) = repulsion(entity, &aabb, &boxes, world);

        let Ok((transform, velocity, wander)) = registry
            .world_mut()
            .query_one_mut::<(&mut Transform, &mut Velocity, &mut Wander)>(entity)
        else {
            continue;
        };

        wander.change_timer -= dt;
        if hit_obstacle && push.length_squared() > 0.0 {
            wander.heading = push;
            wander.change_timer = hold_time(rng, tunables);
            log::debug!("Enemy {:?} turned away from obstacle", entity);
        } else if wander.change_timer <= 0.0 {
            wander.heading = random_heading(rng);
            wander.change_timer = hold_time(rng, tunables);
            log::debug!("Enemy {:?} new heading {:?}", entity, wander.heading);
        }

        velocity.linear = wander.heading * wander.speed + push * tunables.repulsion;
        velocity.linear.y = 0.0;
        transform.position += velocity.linear * dt;
        transform.position.y = rest_y;
        if wander.heading.length_squared() > 0.0 {
            transform.set_yaw(wander.heading.x.atan2(wander.heading.z));
        }

        if !transform.is_finite() {
            report.invalid.push(entity);
            continue;
        }

        let limit = world.boundary() + tunables.despawn_margin;
        if transform.position.x.abs() > limit || transform.position.z.abs() > limit {
            report.escaped.push(entity);
        }
    }

    report
}

/// Unit push away from everything `aabb` overlaps, and whether an
/// obstacle was among them.
fn repulsion(entity: Entity, aabb: &Aabb, enemies: &[(Entity, Aabb)], world: &SpatialWorld) -> (Vec3, bool) {
    let centre = aabb.center();
    let mut push = Vec3::ZERO;
    let mut hit_obstacle = false;

    for obstacle in world.intersecting(aabb) {
        push += away(centre, obstacle.aabb.center());
        hit_obstacle = true;
    }
    for (other, other_box) in enemies {
        if *other != entity && other_box.intersects(aabb) {
            push += away(centre, other_box.center());
        }
    }

    (push.normalize_or_zero(), hit_obstacle)
}

fn away(from: Vec3, other: Vec3) -> Vec3 {
    Vec3::new(from.x - other.x, 0.0, from.z - other.z).normalize_or_zero()
}

/// Give a freshly spawned enemy its wander state.
pub fn attach_wander(registry: &mut EntityRegistry, entity: Entity, rng: &mut impl Rng, tunables: &EnemyTunables) {
    let wander = Wander::random(rng, tunables);
    if let Ok(mut t) = registry.world_mut().get::<&mut Transform>(entity) {
        t.set_yaw(wander.heading.x.atan2(wander.heading.z));
    }
    let _ = registry.world_mut().insert_one(entity, wander);
}

/// Put an enemy with a broken pose back at `position`, standing still, with
/// a freshly drawn wander state so the broken one cannot recur.
pub fn reset_enemy(
    registry: &mut EntityRegistry,
    entity: Entity,
    position: Vec3,
    rng: &mut impl Rng,
    tunables: &EnemyTunables,
    events: &mut Vec<SimEvent>,
) {
    log::warn!("Enemy {:?} had a non-finite pose, resetting to {:?}", entity, position);
    let fresh = Wander::random(rng, tunables);
    let Ok((transform, velocity, wander)) = registry
        .world_mut()
        .query_one_mut::<(&mut Transform, &mut Velocity, &mut Wander)>(entity)
    else {
        return;
    };
    *transform = Transform::from_position(position);
    transform.set_yaw(fresh.heading.x.atan2(fresh.heading.z));
    velocity.linear = Vec3::ZERO;
    *wander = fresh;
    events.push(SimEvent::PositionReset {
        entity: Some(entity),
        kind: engine_core::EntityKind::Enemy,
    });
}

/// Enemy collider for the configured size.
pub fn enemy_collider(tunables: &EnemyTunables) -> Collider {
    Collider::cube(tunables.size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{BeingConsumed, EntityKind, Vec2};
    use physics::ObstacleSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const REST: f32 = 0.6;

    fn open_world() -> SpatialWorld {
        SpatialWorld::build(&[], &[], 1.0, 25.0)
    }

    fn spawn(reg: &mut EntityRegistry, pos: Vec3, heading: Vec3, speed: f32) -> Entity {
        let e = reg.spawn(EntityKind::Enemy, pos, Collider::cube(1.2));
        reg.world_mut()
            .insert_one(e, Wander { heading, change_timer: 100.0, speed })
            .unwrap();
        e
    }

    #[test]
    fn walks_along_heading_on_the_ground() {
        let mut reg = EntityRegistry::new();
        let e = spawn(&mut reg, Vec3::new(0.0, 3.0, 0.0), Vec3::X, 2.0);
        let mut rng = StdRng::seed_from_u64(1);
        update_enemies(&mut reg, &open_world(), &EnemyTunables::default(), REST, &mut rng, 0.5);
        let p = reg.position(e).unwrap();
        assert!((p.x - 1.0).abs() < 1e-5);
        assert_eq!(p.y, REST);
    }

    #[test]
    fn heading_repicked_after_hold_time() {
        let mut reg = EntityRegistry::new();
        let e = spawn(&mut reg, Vec3::new(0.0, REST, 0.0), Vec3::X, 2.0);
        reg.world_mut().get::<&mut Wander>(e).unwrap().change_timer = 0.01;
        let tunables = EnemyTunables::default();
        let mut rng = StdRng::seed_from_u64(9);
        update_enemies(&mut reg, &open_world(), &tunables, REST, &mut rng, 0.1);
        let w = *reg.world().get::<&Wander>(e).unwrap();
        assert!(w.change_timer >= tunables.min_dir_change_time && w.change_timer <= tunables.max_dir_change_time);
        assert!((w.heading.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn overlapping_enemies_push_apart() {
        let mut reg = EntityRegistry::new();
        let a = spawn(&mut reg, Vec3::new(-0.3, REST, 0.0), Vec3::ZERO, 0.0);
        let b = spawn(&mut reg, Vec3::new(0.3, REST, 0.0), Vec3::ZERO, 0.0);
        let mut rng = StdRng::seed_from_u64(2);
        update_enemies(&mut reg, &open_world(), &EnemyTunables::default(), REST, &mut rng, 0.1);
        assert!(reg.position(a).unwrap().x < -0.3);
        assert!(reg.position(b).unwrap().x > 0.3);
    }

    #[test]
    fn obstacle_contact_turns_enemy_away() {
        let tree = ObstacleSpec { base: Vec3::new(1.0, 0.0, 0.0), footprint: Vec2::ONE, height: 5.0 };
        let world = SpatialWorld::build(&[], &[tree], 1.0, 25.0);
        let mut reg = EntityRegistry::new();
        let e = spawn(&mut reg, Vec3::new(0.2, REST, 0.0), Vec3::X, 2.0);
        let mut rng = StdRng::seed_from_u64(4);
        update_enemies(&mut reg, &world, &EnemyTunables::default(), REST, &mut rng, 0.1);
        let w = *reg.world().get::<&Wander>(e).unwrap();
        assert!(w.heading.x < 0.0);
    }

    #[test]
    fn consumed_enemies_are_frozen() {
        let mut reg = EntityRegistry::new();
        let e = spawn(&mut reg, Vec3::new(0.0, REST, 0.0), Vec3::X, 2.0);
        reg.world_mut().insert_one(e, BeingConsumed).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        update_enemies(&mut reg, &open_world(), &EnemyTunables::default(), REST, &mut rng, 0.5);
        assert_eq!(reg.position(e).unwrap().x, 0.0);
    }

    #[test]
    fn reports_escaped_and_invalid() {
        let mut reg = EntityRegistry::new();
        let out = spawn(&mut reg, Vec3::new(25.9, REST, 0.0), Vec3::X, 2.0);
        let broken = spawn(&mut reg, Vec3::new(0.0, REST, 0.0), Vec3::new(f32::NAN, 0.0, 0.0), 2.0);
        let mut rng = StdRng::seed_from_u64(1);
        let report = update_enemies(&mut reg, &open_world(), &EnemyTunables::default(), REST, &mut rng, 0.1);
        assert_eq!(report.escaped, vec![out]);
        assert_eq!(report.invalid, vec![broken]);
    }

    #[test]
    fn reset_replaces_broken_wander_state() {
        let mut reg = EntityRegistry::new();
        let e = spawn(&mut reg, Vec3::new(0.0, REST, 0.0), Vec3::new(f32::NAN, 0.0, 0.0), f32::NAN);
        let tunables = EnemyTunables::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = Vec::new();

        let report = update_enemies(&mut reg, &open_world(), &tunables, REST, &mut rng, 0.1);
        assert_eq!(report.invalid, vec![e]);
        reset_enemy(&mut reg, e, Vec3::new(8.0, REST, 0.0), &mut rng, &tunables, &mut events);

        let w = *reg.world().get::<&Wander>(e).unwrap();
        assert!(w.heading.is_finite() && w.speed.is_finite() && w.change_timer.is_finite());
        assert_eq!(reg.velocity(e), Some(Vec3::ZERO));
        assert_eq!(events.len(), 1);

        for _ in 0..30 {
            let report = update_enemies(&mut reg, &open_world(), &tunables, REST, &mut rng, 0.1);
            assert!(report.invalid.is_empty());
        }
        assert!(reg.position(e).unwrap().is_finite());
    }
}
