//! Ground items: pickup, held attachment, throwing and the single bounce.

use engine_core::{EntityKind, Held, PowerKind, Thrown, Transform, Vec3, Velocity};
use hecs::Entity;
use physics::{resolve, Aabb, Collider, SpatialWorld, VerticalLimits};

use crate::config::ItemTunables;
use crate::events::SimEvent;
use crate::registry::EntityRegistry;

/// The power currently carried and the entity carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldPower {
    pub power: PowerKind,
    pub item: Entity,
}

/// Collider for an item kind.
pub fn item_collider(kind: EntityKind, tunables: &ItemTunables) -> Collider {
    match kind {
        EntityKind::ItemHelmet => Collider::new(tunables.helmet_half_extents),
        _ => Collider::new(tunables.sword_half_extents),
    }
}

/// Try to pick up the first resting item touching `player_box`.
///
/// The box is grown by the pickup leniency. While a power is already held
/// the first touching item is rejected and the scan stops there, so at
/// most one power is ever held.
pub fn try_pickup(
    registry: &mut EntityRegistry,
    player_box: &Aabb,
    held: &mut Option<HeldPower>,
    tunables: &ItemTunables,
    events: &mut Vec<SimEvent>,
) {
    let reach = player_box.expand(tunables.pickup_leniency);
    let touching = registry
        .resting_items()
        .into_iter()
        .find(|&e| registry.aabb(e).map_or(false, |b| b.intersects(&reach)));
    let Some(item) = touching else {
        return;
    };

    if held.is_some() {
        log::debug!("Pickup of {:?} rejected: already holding a power", item);
        events.push(SimEvent::PickupRejected { item });
        return;
    }
    let Some(power) = registry.kind(item).and_then(|k| k.power()) else {
        return;
    };

    if registry
        .world_mut()
        .insert_one(item, Held { offset: power.held_offset() })
        .is_err()
    {
        return;
    }
    registry.set_velocity(item, Vec3::ZERO);
    *held = Some(HeldPower { power, item });
    log::info!("Picked up {}", power.item_kind().name());
    events.push(SimEvent::PickedUp { item, power });
}

/// Keep every held item attached to `holder`.
pub fn follow_holder(registry: &mut EntityRegistry, holder: &Transform) {
    for (_, (transform, held)) in registry.world_mut().query_mut::<(&mut Transform, &Held)>() {
        transform.position = holder.local_to_world(held.offset);
        transform.rotation = holder.rotation;
    }
}

/// Launch the held item forward and up from `holder`. Clears `held`.
///
/// A held item that no longer exists is simply forgotten.
pub fn throw_held(
    registry: &mut EntityRegistry,
    holder: &Transform,
    held: &mut Option<HeldPower>,
    tunables: &ItemTunables,
    events: &mut Vec<SimEvent>,
) {
    let Some(HeldPower { power, item }) = held.take() else {
        return;
    };
    if !registry.is_live(item) {
        log::warn!("Held {:?} vanished before it was thrown", item);
        return;
    }
    let world = registry.world_mut();
    let _ = world.remove_one::<Held>(item);
    let _ = world.insert_one(item, Thrown::default());

    let velocity = holder.forward() * tunables.throw_speed + Vec3::Y * tunables.throw_lift;
    registry.set_velocity(item, velocity);
    log::info!("Threw {}", power.item_kind().name());
    events.push(SimEvent::Thrown { item, power });
}

/// Result of one thrown-item pass.
#[derive(Debug, Default)]
pub struct ThrownReport {
    /// Items with a non-finite pose that need a fresh resting spot.
    pub invalid: Vec<Entity>,
    /// Items that left the arena.
    pub lost: Vec<Entity>,
}

/// Integrate thrown items for one step.
///
/// Horizontal motion is resolved against the arena and the other free
/// items. The first ground contact faster than `min_bounce_speed` bounces;
/// the next contact (or a slow one) brings the item to rest.
pub fn update_thrown(
    registry: &mut EntityRegistry,
    world: &SpatialWorld,
    tunables: &ItemTunables,
    gravity: f32,
    ground_y: f32,
    dt: f32,
    events: &mut Vec<SimEvent>,
) -> ThrownReport {
    let mut report = ThrownReport::default();
    let thrown: Vec<Entity> = registry
        .order()
        .iter()
        .copied()
        .filter(|&e| registry.is_live(e) && registry.has::<Thrown>(e))
        .collect();

    for item in thrown {
        let others: Vec<Aabb> = registry
            .order()
            .iter()
            .copied()
            .filter(|&e| {
                e != item
                    && registry.is_live(e)
                    && registry.kind(e).map_or(false, |k| k.is_item())
                    && !registry.has::<Held>(e)
            })
            .filter_map(|e| registry.aabb(e))
            .collect();

        let Ok((transform, velocity, collider, flight)) = registry
            .world_mut()
            .query_one_mut::<(&mut Transform, &mut Velocity, &Collider, &mut Thrown)>(item)
        else {
            continue;
        };

        velocity.linear.y += gravity * dt;
        let falling_speed = -velocity.linear.y;
        let aabb = collider.aabb_at(transform.position);
        let limits = VerticalLimits::ground(ground_y + collider.rest_height());
        let res = resolve(&aabb, transform.position.y, velocity.linear * dt, world, &others, limits);
        res.apply(&mut transform.position, &mut velocity.linear);

        let mut landed = false;
        if res.grounded {
            if !flight.bounced && falling_speed > tunables.min_bounce_speed {
                velocity.linear.y = falling_speed * tunables.bounce_damping;
                flight.bounced = true;
                log::debug!("{:?} bounced at {:.2} m/s", item, velocity.linear.y);
            } else {
                velocity.linear = Vec3::ZERO;
                landed = true;
            }
        }

        if !transform.is_finite() {
            report.invalid.push(item);
            continue;
        }
        if world.is_out_of_bounds(transform.position) {
            report.lost.push(item);
            continue;
        }
        if landed {
            let _ = registry.world_mut().remove_one::<Thrown>(item);
            log::debug!("{:?} came to rest", item);
            events.push(SimEvent::Landed { item });
        }
    }

    report
}

/// Put an item with a broken pose back on the ground at `position`,
/// at rest.
pub fn reset_item(registry: &mut EntityRegistry, item: Entity, position: Vec3, events: &mut Vec<SimEvent>) {
    let Some(kind) = registry.kind(item) else {
        return;
    };
    log::warn!("{} {:?} had a non-finite pose, resetting to {:?}", kind.name(), item, position);
    let world = registry.world_mut();
    if let Ok((transform, velocity)) = world.query_one_mut::<(&mut Transform, &mut Velocity)>(item) {
        let yaw = transform.yaw();
        *transform = Transform::from_position(position);
        if yaw.is_finite() {
            transform.set_yaw(yaw);
        }
        velocity.linear = Vec3::ZERO;
    }
    let _ = world.remove_one::<Thrown>(item);
    events.push(SimEvent::PositionReset { entity: Some(item), kind });
}
