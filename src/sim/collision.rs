//! Narrow-phase collision response
//!
//! The resolver owns no state. Given one candidate pair it checks for a
//! genuine overlap, picks the response for the collider kind and mutates the
//! dynamic participants in place. It never removes bodies; projectiles that
//! are used up are reported through [`Resolution::despawn`] and the tick
//! driver queues them.

use glam::Vec2;

use super::body::{Body, BodyId, ProjectileParams};
use super::level::{ColliderKind, Slope, StaticCollider};
use super::shape::{Rect, Side, penetration, side_of};

/// Slack when comparing a body's resting edge with a platform top
const EDGE_EPSILON: f32 = 0.01;

/// Damage dealt by a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub projectile: BodyId,
    pub target: BodyId,
    pub damage: i32,
}

/// Outcome of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// A response was applied
    pub contact: bool,
    /// Body to queue for removal
    pub despawn: Option<BodyId>,
    pub hit: Option<Hit>,
}

impl Resolution {
    pub fn none() -> Self {
        Self::default()
    }

    fn contact() -> Self {
        Self {
            contact: true,
            ..Self::default()
        }
    }

    fn despawn(id: BodyId) -> Self {
        Self {
            contact: true,
            despawn: Some(id),
            hit: None,
        }
    }
}

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Resolve a dynamic body against a static collider
pub fn resolve_static(body: &mut Body, collider: &StaticCollider) -> Resolution {
    let rect = &collider.rect;
    if !body.collision_shape().overlaps_rect(rect) {
        if !body.is_projectile() && supports(body, collider) {
            return Resolution::contact();
        }
        return Resolution::none();
    }

    if let Some(params) = body.projectile_params().copied() {
        return projectile_vs_static(body, collider, &params);
    }

    match collider.kind {
        ColliderKind::Solid => {
            let p = penetration(&body.bounds(), rect);
            resolved(block(body, rect, p))
        }
        ColliderKind::OneWay => {
            let p = penetration(&body.bounds(), rect);
            if one_way_passes(body, rect, p) {
                Resolution::none()
            } else {
                resolved(block(body, rect, p))
            }
        }
        ColliderKind::ActorClip => {
            if body.is_player() {
                let p = penetration(&body.bounds(), rect);
                resolved(block(body, rect, p))
            } else {
                Resolution::none()
            }
        }
        ColliderKind::Slope(slope) => resolved(rest_on_slope(body, rect, &slope)),
    }
}

/// Resolve two dynamic bodies against each other
pub fn resolve_bodies(a: &mut Body, b: &mut Body) -> Resolution {
    if !a.collision_shape().overlaps(&b.collision_shape()) {
        return Resolution::none();
    }

    match (a.is_projectile(), b.is_projectile()) {
        (true, true) => Resolution::none(),
        (true, false) => projectile_vs_body(a, b),
        (false, true) => projectile_vs_body(b, a),
        (false, false) => {
            if !(a.collidable && b.collidable) {
                return Resolution::none();
            }
            let (rect_a, rect_b) = (a.bounds(), b.bounds());
            let p = penetration(&rect_a, &rect_b);
            if p == Vec2::ZERO {
                return Resolution::none();
            }
            // Each side backs off half the overlap so the pair separates once
            block(a, &rect_b, p * 0.5);
            block(b, &rect_a, -p * 0.5);
            Resolution::contact()
        }
    }
}

fn resolved(applied: bool) -> Resolution {
    if applied {
        Resolution::contact()
    } else {
        Resolution::none()
    }
}

/// Solid push-out response. Returns false when there is nothing to correct.
fn block(body: &mut Body, obstacle: &Rect, penetration: Vec2) -> bool {
    let Some(side) = side_of(penetration) else {
        return false;
    };
    let own = body.bounds();

    body.has_collided = true;
    body.wall = match side {
        Side::Left => -1,
        Side::Right => 1,
        Side::Up | Side::Down => 0,
    };

    if side.is_horizontal() {
        let gap = (obstacle.top() - own.bottom()).abs();
        let ratio = gap / own.height();
        if ratio <= body.climb_margin {
            // Step assist
            body.position.y -= gap;
            body.velocity.x *= ratio;
        } else {
            body.velocity.x = 0.0;
        }
    }

    body.position -= penetration;
    body.grounded = side == Side::Up;

    if matches!(side, Side::Up | Side::Down) {
        body.speed_multiplier = 1.0;
        body.velocity.y = 0.0;
        body.time_in_air = 0.0;
    }
    true
}

/// A grounded body standing exactly on a floor edge keeps its contact
fn supports(body: &mut Body, collider: &StaticCollider) -> bool {
    let blocks = match collider.kind {
        ColliderKind::Solid => true,
        ColliderKind::OneWay => !body.falls_through,
        ColliderKind::ActorClip => body.is_player(),
        ColliderKind::Slope(_) => false,
    };
    let own = body.bounds();
    let rect = &collider.rect;
    if !blocks
        || !body.grounded
        || (own.bottom() - rect.top()).abs() > EDGE_EPSILON
        || own.right() <= rect.left()
        || own.left() >= rect.right()
    {
        return false;
    }
    body.has_collided = true;
    true
}

/// One-way platforms only catch bodies falling onto their top edge
fn one_way_passes(body: &Body, platform: &Rect, penetration: Vec2) -> bool {
    body.velocity.y < 0.0
        || body.falls_through
        || body.bounds().bottom() - penetration.y > platform.top() + EDGE_EPSILON
}

/// Height under the body's leading edge, if the body is over the ramp
fn slope_surface(own: &Rect, rect: &Rect, slope: &Slope) -> Option<f32> {
    let rise = slope.rise_at(rect, own.left(), own.right());
    if (0.0..=1.0).contains(&rise) {
        Some(Slope::surface_y(rect, rise))
    } else {
        None
    }
}

fn rest_on_slope(body: &mut Body, rect: &Rect, slope: &Slope) -> bool {
    let own = body.bounds();
    let Some(surface) = slope_surface(&own, rect, slope) else {
        return false;
    };

    if own.bottom() >= surface {
        body.has_collided = true;
        body.position.y += surface - own.bottom();
        body.grounded = true;
        body.velocity.y = 0.0;
        body.time_in_air = 0.0;
        body.speed_multiplier = Slope::speed_multiplier(rect);
        true
    } else {
        body.grounded = false;
        false
    }
}

fn projectile_vs_static(
    projectile: &mut Body,
    collider: &StaticCollider,
    params: &ProjectileParams,
) -> Resolution {
    let rect = &collider.rect;
    match collider.kind {
        ColliderKind::ActorClip => Resolution::none(),
        ColliderKind::Solid => {
            let p = penetration(&projectile.bounds(), rect);
            strike(projectile, p, params)
        }
        ColliderKind::OneWay => {
            let p = penetration(&projectile.bounds(), rect);
            if one_way_passes(projectile, rect, p) {
                Resolution::none()
            } else {
                strike(projectile, p, params)
            }
        }
        ColliderKind::Slope(slope) => {
            let own = projectile.bounds();
            let Some(surface) = slope_surface(&own, rect, &slope) else {
                return Resolution::none();
            };
            if own.bottom() < surface {
                return Resolution::none();
            }
            projectile.has_collided = true;
            projectile.position.y += surface - own.bottom();
            if !params.bounces {
                return Resolution::despawn(projectile.id);
            }
            projectile.velocity =
                reflect_velocity(projectile.velocity, slope.normal) * params.bounce_factor;
            Resolution::contact()
        }
    }
}

/// Push a projectile out of an axis-aligned obstacle and bounce or spend it
fn strike(projectile: &mut Body, penetration: Vec2, params: &ProjectileParams) -> Resolution {
    let Some(side) = side_of(penetration) else {
        return Resolution::none();
    };
    let incoming = projectile.velocity;
    projectile.position -= penetration;
    projectile.has_collided = true;

    if !params.bounces {
        return Resolution::despawn(projectile.id);
    }

    // Only the component along the contact axis flips
    let f = params.bounce_factor;
    if side.is_horizontal() {
        projectile.velocity.x = -incoming.x * f;
    } else {
        projectile.velocity.y = -incoming.y * f;
    }
    Resolution::contact()
}

fn projectile_vs_body(projectile: &mut Body, target: &mut Body) -> Resolution {
    let Some(params) = projectile.projectile_params().copied() else {
        return Resolution::none();
    };

    let mut resolution = Resolution::none();
    if projectile.collidable && target.collidable {
        let p = penetration(&projectile.bounds(), &target.bounds());
        resolution = strike(projectile, p, &params);
    }

    let damage = if params.from_player && !target.is_player() {
        Some(params.damage)
    } else if !params.from_player && target.is_player() {
        Some(1)
    } else {
        None
    };

    if let Some(damage) = damage {
        target.health -= damage;
        resolution.contact = true;
        resolution.despawn = Some(projectile.id);
        resolution.hit = Some(Hit {
            projectile: projectile.id,
            target: target.id,
            damage,
        });
    }
    resolution
}
