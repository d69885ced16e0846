//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (bodies by id, pairs sorted)
//! - No rendering or platform dependencies

pub mod body;
pub mod broadphase;
pub mod camera;
pub mod collision;
pub mod level;
pub mod shape;
pub mod state;
pub mod tick;

pub use body::{ActorParams, Body, BodyId, BodyKind, BodyShape, ProjectileParams, Role};
pub use broadphase::{ColliderRef, SpatialHash};
pub use camera::Camera;
pub use collision::{Hit, Resolution, resolve_bodies, resolve_static};
pub use level::{
    ColliderKind, LevelDesc, Room, RoomId, RoomParams, Slope, SlopeDesc, SlopeDirection,
    StaticCollider,
};
pub use shape::{Circle, Rect, Shape, Side, penetration};
pub use state::{BodySnapshot, SimEvent, Spawn, TickPhase, World};
pub use tick::{Control, TickInput, tick};
