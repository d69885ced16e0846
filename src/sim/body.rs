//! Dynamic bodies: players, enemies and projectiles
//!
//! Position is the single source of truth; the collision shape is always
//! derived from `position` plus the body's shape offset.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{RoomId, RoomParams};
use super::shape::{Circle, Rect, Shape};
use crate::consts::*;
use crate::sign;

/// Unique body identifier, never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing body ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> BodyId {
        let id = BodyId(self.next);
        self.next += 1;
        id
    }
}

/// Collision shape relative to the body's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Rectangle whose top-left corner sits at `position + offset`
    Box { offset: Vec2, size: Vec2 },
    /// Circle centred on the position
    Circle { radius: f32 },
}

/// Projectile configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileParams {
    pub radius: f32,
    /// Fired by the player (damages everything but the player)
    pub from_player: bool,
    pub damage: i32,
    /// Launch speed in pixels per second
    pub speed: f32,
    /// Seconds before the projectile expires
    pub lifetime: f32,
    /// Whether gravity applies
    pub gravity: bool,
    /// Horizontal velocity scale applied every tick to gravity projectiles
    pub speed_factor: f32,
    pub bounces: bool,
    pub bounce_factor: f32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            radius: BULLET_RADIUS,
            from_player: true,
            damage: 1,
            speed: BULLET_SPEED,
            lifetime: BULLET_LIFETIME,
            gravity: true,
            speed_factor: BULLET_SPEED_FACTOR,
            bounces: true,
            bounce_factor: BULLET_BOUNCE_FACTOR,
        }
    }
}

/// Tunables for walking actors (player and enemies)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorParams {
    pub speed: f32,
    pub health: i32,
    pub offset: Vec2,
    pub size: Vec2,
    pub climb_margin: f32,
    /// Whether the actor blocks other collidable bodies
    pub collidable: bool,
}

impl ActorParams {
    pub fn player() -> Self {
        Self {
            speed: PLAYER_SPEED,
            health: PLAYER_HEALTH,
            offset: Vec2::new(-ACTOR_WIDTH / 2.0, -ACTOR_HEIGHT),
            size: Vec2::new(ACTOR_WIDTH, ACTOR_HEIGHT),
            climb_margin: CLIMB_MARGIN,
            collidable: false,
        }
    }

    pub fn enemy() -> Self {
        Self {
            speed: ENEMY_SPEED,
            health: ENEMY_HEALTH,
            ..Self::player()
        }
    }
}

/// Player-only controller state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub jump_count: u32,
    /// Seconds until the weapon may fire again
    pub fire_cooldown: f32,
    /// Set once health has run out
    pub defeated: bool,
}

/// Projectile runtime state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub params: ProjectileParams,
    /// Seconds since launch
    pub age: f32,
}

/// What a body is, with its role-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Role {
    Player(PlayerState),
    Enemy,
    Projectile(Projectile),
}

/// Role tag without state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Enemy,
    Projectile,
}

/// A movable physics body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub room: RoomId,
    pub role: Role,
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: BodyShape,

    /// Gravity exempt
    pub flying: bool,
    pub grounded: bool,
    /// Side of the last wall contact: -1 left, 0 none, +1 right
    pub wall: i8,
    /// Explicit intent to drop through one-way platforms
    pub falls_through: bool,
    /// Participates in body-vs-body blocking
    pub collidable: bool,
    /// Set by the resolver, consumed by the next integration
    pub has_collided: bool,

    pub speed: f32,
    pub climb_margin: f32,
    /// Temporary slowdown from standing on a slope
    pub speed_multiplier: f32,
    pub time_in_air: f32,
    /// Clamp downward velocity at the room's gravity cap
    pub gravity_capped: bool,
    pub health: i32,
}

impl Body {
    fn base(id: BodyId, room: RoomId, role: Role, position: Vec2, shape: BodyShape) -> Self {
        Self {
            id,
            room,
            role,
            position,
            velocity: Vec2::ZERO,
            shape,
            flying: false,
            grounded: false,
            wall: 0,
            falls_through: false,
            collidable: true,
            has_collided: false,
            speed: 0.0,
            climb_margin: 0.0,
            speed_multiplier: 1.0,
            time_in_air: 0.0,
            gravity_capped: true,
            health: 1,
        }
    }

    /// A walking actor whose position is the centre of its feet
    pub fn actor(id: BodyId, room: RoomId, role: Role, position: Vec2, params: &ActorParams) -> Self {
        let mut body = Self::base(
            id,
            room,
            role,
            position,
            BodyShape::Box {
                offset: params.offset,
                size: params.size,
            },
        );
        body.speed = params.speed;
        body.health = params.health;
        body.climb_margin = params.climb_margin;
        body.collidable = params.collidable;
        body
    }

    pub fn player(id: BodyId, room: RoomId, position: Vec2, params: &ActorParams) -> Self {
        Self::actor(id, room, Role::Player(PlayerState::default()), position, params)
    }

    pub fn enemy(id: BodyId, room: RoomId, position: Vec2, params: &ActorParams) -> Self {
        Self::actor(id, room, Role::Enemy, position, params)
    }

    /// A projectile centred on `position`, launched along `direction`
    pub fn projectile(
        id: BodyId,
        room: RoomId,
        position: Vec2,
        direction: Vec2,
        params: ProjectileParams,
    ) -> Self {
        let mut body = Self::base(
            id,
            room,
            Role::Projectile(Projectile { params, age: 0.0 }),
            position,
            BodyShape::Circle {
                radius: params.radius,
            },
        );
        body.velocity = direction.normalize_or_zero() * params.speed;
        body.speed = params.speed;
        body.flying = !params.gravity;
        body.gravity_capped = false;
        body
    }

    pub fn kind(&self) -> BodyKind {
        match self.role {
            Role::Player(_) => BodyKind::Player,
            Role::Enemy => BodyKind::Enemy,
            Role::Projectile(_) => BodyKind::Projectile,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self.role, Role::Projectile(_))
    }

    pub fn projectile_params(&self) -> Option<&ProjectileParams> {
        match &self.role {
            Role::Projectile(p) => Some(&p.params),
            _ => None,
        }
    }

    /// World-space collision shape
    pub fn collision_shape(&self) -> Shape {
        match self.shape {
            BodyShape::Box { offset, size } => Shape::Rect(Rect::from_pos_size(self.position + offset, size)),
            BodyShape::Circle { radius } => Shape::Circle(Circle::new(self.position, radius)),
        }
    }

    /// Axis-aligned bounds of the collision shape
    pub fn bounds(&self) -> Rect {
        self.collision_shape().bounds()
    }

    /// Advance velocity and position by one tick
    ///
    /// Gravity is added per tick (not per second). A body touching a wall in
    /// the direction it moves does not move horizontally, and a grounded body
    /// does not sink.
    pub fn integrate(&mut self, params: &RoomParams, dt: f32) {
        if !self.grounded && !self.flying {
            self.time_in_air += dt;
            if !self.gravity_capped {
                self.velocity.y += params.gravity_strength;
            } else if self.velocity.y < params.gravity_cap {
                self.velocity.y = (self.velocity.y + params.gravity_strength).min(params.gravity_cap);
            }
        }

        if !self.has_collided && !self.flying {
            self.grounded = false;
        }

        let movement = self.velocity * dt;
        if self.flying {
            self.position += movement;
        } else {
            let blocked = self.has_collided && self.wall != 0 && self.wall == sign(movement.x);
            let dx = if blocked { 0.0 } else { movement.x };
            let dy = if self.grounded && movement.y > 0.0 { 0.0 } else { movement.y };
            self.position += Vec2::new(dx, dy);
        }

        self.has_collided = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Body {
        Body::enemy(BodyId(1), RoomId(0), Vec2::new(100.0, 100.0), &ActorParams::enemy())
    }

    #[test]
    fn test_id_allocator_increases() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
        assert_eq!(a, BodyId(1));
    }

    #[test]
    fn test_bounds_follow_position() {
        let mut body = walker();
        assert_eq!(body.bounds(), Rect::new(92.0, 76.0, 16.0, 24.0));
        body.position += Vec2::new(10.0, -5.0);
        assert_eq!(body.bounds(), Rect::new(102.0, 71.0, 16.0, 24.0));
    }

    #[test]
    fn test_projectile_circle_bounds() {
        let body = Body::projectile(
            BodyId(2),
            RoomId(0),
            Vec2::new(50.0, 50.0),
            Vec2::new(3.0, 4.0),
            ProjectileParams::default(),
        );
        assert_eq!(body.bounds(), Rect::new(46.0, 46.0, 8.0, 8.0));
        assert!((body.velocity.length() - BULLET_SPEED).abs() < 1e-3);
        assert!(!body.gravity_capped);
    }

    #[test]
    fn test_gravity_saturates_at_cap() {
        let params = RoomParams::default();
        let mut body = walker();
        for _ in 0..40 {
            body.integrate(&params, SIM_DT);
            assert!(body.velocity.y <= params.gravity_cap);
        }
        assert_eq!(body.velocity.y, params.gravity_cap);
        assert!(body.time_in_air > 0.0);
    }

    #[test]
    fn test_uncapped_body_exceeds_cap() {
        let params = RoomParams::default();
        let mut body = walker();
        body.gravity_capped = false;
        for _ in 0..40 {
            body.integrate(&params, SIM_DT);
        }
        assert_eq!(body.velocity.y, 40.0 * params.gravity_strength);
    }

    #[test]
    fn test_flying_body_ignores_gravity() {
        let params = RoomParams::default();
        let mut body = walker();
        body.flying = true;
        body.velocity = Vec2::new(60.0, 0.0);
        body.integrate(&params, 1.0);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.position, Vec2::new(160.0, 100.0));
    }

    #[test]
    fn test_wall_contact_blocks_horizontal_movement() {
        let params = RoomParams::default();
        let mut body = walker();
        body.grounded = true;
        body.has_collided = true;
        body.wall = 1;
        body.velocity = Vec2::new(32.0, 0.0);
        body.integrate(&params, 1.0);
        assert_eq!(body.position.x, 100.0);
        assert!(!body.has_collided);

        // Moving away from the wall is allowed
        body.has_collided = true;
        body.velocity = Vec2::new(-32.0, 0.0);
        body.integrate(&params, 1.0);
        assert_eq!(body.position.x, 68.0);
    }

    #[test]
    fn test_grounded_body_does_not_sink() {
        let params = RoomParams::default();
        let mut body = walker();
        body.grounded = true;
        body.has_collided = true;
        body.velocity = Vec2::new(0.0, 50.0);
        body.integrate(&params, 1.0);
        assert_eq!(body.position.y, 100.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_grounded_lost_without_contact() {
        let params = RoomParams::default();
        let mut body = walker();
        body.grounded = true;
        body.has_collided = false;
        body.integrate(&params, SIM_DT);
        assert!(!body.grounded);
    }
}
