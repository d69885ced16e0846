//! Fixed timestep simulation tick
//!
//! One tick runs four phases in order: Integrate (controllers, gravity and
//! movement), Resolve (broad-phase pairs through the narrow-phase resolver),
//! Flush (purge the kill list) and Derive (camera follow).

use std::collections::HashMap;

use glam::Vec2;

use super::body::{Body, BodyId, Role};
use super::broadphase::ColliderRef;
use super::collision::{self, Resolution};
use super::state::{SimEvent, Spawn, TickPhase, World};
use crate::settings::PlayerTuning;
use crate::{SimError, direction_to, sign};

/// Intent for one controllable body
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Control {
    /// Horizontal direction: -1, 0 or 1
    pub direction: i8,
    pub jump: bool,
    /// Drop through one-way platforms
    pub fall_through: bool,
    /// Trigger held
    pub fire: bool,
    /// Aim target in world space
    pub aim: Option<Vec2>,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub player: Control,
    /// Per-body overrides; enemies without one chase the player
    pub controls: HashMap<BodyId, Control>,
}

impl TickInput {
    pub fn player(control: Control) -> Self {
        Self {
            player: control,
            ..Self::default()
        }
    }
}

/// Advance the world by one tick of `elapsed` seconds
///
/// Negative or non-finite elapsed time is treated as zero.
pub fn tick(world: &mut World, input: &TickInput, elapsed: f32) {
    let dt = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
    world.time_ticks += 1;

    world.phase = TickPhase::Integrate;
    integrate(world, input, dt);

    world.phase = TickPhase::Resolve;
    resolve(world);

    world.phase = TickPhase::Flush;
    world.flush();

    world.phase = TickPhase::Derive;
    derive(world);

    world.phase = TickPhase::Idle;
}

fn integrate(world: &mut World, input: &TickInput, dt: f32) {
    world.room.advance(dt);
    let tuning = world.settings.player;
    let player_position = world.player().map(|p| p.position);

    let mut expired = Vec::new();
    let mut shots = Vec::new();
    let World { room, bodies, .. } = world;

    for body in bodies.iter_mut().filter(|b| b.room == room.id) {
        let control = input.controls.get(&body.id).copied();
        match body.role {
            Role::Player(_) => {
                let control = control.unwrap_or(input.player);
                steer(body, &control, room.params.air_friction);
                if let Some(shot) = player_actions(body, &control, &tuning, dt) {
                    shots.push(shot);
                }
            }
            Role::Enemy => {
                let control = control.unwrap_or_else(|| chase(body, player_position));
                steer(body, &control, room.params.air_friction);
            }
            Role::Projectile(_) => {
                if age_projectile(body, dt) {
                    expired.push(body.id);
                }
            }
        }

        body.integrate(&room.params, dt);

        if !body.is_player() && !room.contains(body.position) {
            expired.push(body.id);
        }
    }

    for id in expired {
        world.queue_removal(id);
    }
    // Spawns requested during integration join after every body has moved
    for (position, direction) in shots {
        world.spawn(
            Spawn::Projectile {
                direction,
                params: tuning.bullet,
            },
            position,
        );
    }
}

/// Horizontal movement: full control on the ground, air friction otherwise
fn steer(body: &mut Body, control: &Control, air_friction: f32) {
    let direction = control.direction.clamp(-1, 1) as f32;
    if body.grounded {
        body.velocity.x = body.speed * direction * body.speed_multiplier;
    } else {
        body.velocity.x = (body.velocity.x + air_friction * direction).clamp(-body.speed, body.speed);
    }
    body.falls_through = control.fall_through;
}

/// Jump and fire. Returns the muzzle position and direction of a new shot.
fn player_actions(
    body: &mut Body,
    control: &Control,
    tuning: &PlayerTuning,
    dt: f32,
) -> Option<(Vec2, Vec2)> {
    let Role::Player(mut state) = body.role else {
        return None;
    };

    if body.grounded {
        state.jump_count = 0;
    }
    if control.jump && body.time_in_air <= tuning.jump_grace && state.jump_count < tuning.max_jumps {
        body.velocity.y = tuning.jump_force;
        body.grounded = false;
        state.jump_count += 1;
    }

    let mut shot = None;
    if control.fire {
        state.fire_cooldown -= dt;
        if state.fire_cooldown <= 0.0 {
            let center = body.bounds().center();
            if let Some(aim) = control.aim {
                let direction = direction_to(center, aim);
                if direction != Vec2::ZERO {
                    shot = Some((center + direction * tuning.muzzle_offset, direction));
                }
            }
            state.fire_cooldown = tuning.fire_cooldown;
        }
    } else {
        state.fire_cooldown = (state.fire_cooldown - dt).max(0.0);
    }

    body.role = Role::Player(state);
    shot
}

/// Walk toward the player and drop through platforms when the player is below
fn chase(body: &Body, player: Option<Vec2>) -> Control {
    match player {
        Some(target) => Control {
            direction: sign(target.x - body.position.x),
            fall_through: target.y > body.position.y,
            ..Control::default()
        },
        None => Control::default(),
    }
}

/// Age a projectile and apply horizontal drag. Returns true once it has expired.
fn age_projectile(body: &mut Body, dt: f32) -> bool {
    let Role::Projectile(mut projectile) = body.role else {
        return false;
    };
    if !body.flying {
        body.velocity.x *= projectile.params.speed_factor;
    }
    projectile.age += dt;
    body.role = Role::Projectile(projectile);
    projectile.age >= projectile.params.lifetime
}

fn resolve(world: &mut World) {
    let room_id = world.room.id;
    for body in world.bodies.iter().filter(|b| b.room == room_id) {
        world.index.update(ColliderRef::Body(body.id), body.bounds());
    }

    for (a, b) in world.index.query_pairs() {
        let resolution = match (a, b) {
            (ColliderRef::Static(_), ColliderRef::Static(_)) => continue,
            (ColliderRef::Static(index), ColliderRef::Body(id))
            | (ColliderRef::Body(id), ColliderRef::Static(index)) => {
                resolve_static_pair(world, index, id)
            }
            (ColliderRef::Body(x), ColliderRef::Body(y)) => resolve_body_pair(world, x, y),
        };
        apply(world, resolution);
    }

    let mut killed = Vec::new();
    for body in world
        .bodies
        .iter_mut()
        .filter(|b| b.room == room_id && b.health <= 0)
    {
        match &mut body.role {
            Role::Enemy => killed.push(body.id),
            Role::Player(state) if !state.defeated => {
                state.defeated = true;
                log::info!("Player {} defeated", body.id);
                world.events.push(SimEvent::PlayerDefeated { id: body.id });
            }
            _ => {}
        }
    }
    for id in killed {
        if !world.is_pending_removal(id) {
            log::debug!("Enemy {id} killed");
            world.queue_removal(id);
            world.events.push(SimEvent::Killed { id });
        }
    }
}

fn resolve_static_pair(world: &mut World, index: usize, id: BodyId) -> Resolution {
    if world.is_pending_removal(id) {
        return Resolution::none();
    }
    let Some(i) = world.find(id) else {
        log::warn!("Pair skipped: {}", SimError::UnknownColliderReference(id));
        return Resolution::none();
    };
    let Some(collider) = world.room.colliders.get(index) else {
        log::warn!("Pair skipped: no static collider {index} in room {}", world.room.id.0);
        return Resolution::none();
    };
    collision::resolve_static(&mut world.bodies[i], collider)
}

fn resolve_body_pair(world: &mut World, x: BodyId, y: BodyId) -> Resolution {
    if world.is_pending_removal(x) || world.is_pending_removal(y) {
        return Resolution::none();
    }
    match world.pair_mut(x, y) {
        Some((a, b)) => collision::resolve_bodies(a, b),
        None => {
            log::warn!("Pair skipped: {x} or {y} is not live");
            Resolution::none()
        }
    }
}

fn apply(world: &mut World, resolution: Resolution) {
    if let Some(hit) = resolution.hit {
        log::debug!(
            "Projectile {} hit {} for {}",
            hit.projectile,
            hit.target,
            hit.damage
        );
        world.events.push(SimEvent::Hit(hit));
    }
    if let Some(id) = resolution.despawn {
        world.queue_removal(id);
    }
}

fn derive(world: &mut World) {
    let room_id = world.room.id;
    let Some(target) = world
        .player()
        .filter(|p| p.room == room_id)
        .map(|p| p.bounds().center())
    else {
        return;
    };
    let room_size = Vec2::new(world.room.width, world.room.height);
    world.camera.follow(target, room_size);
}
