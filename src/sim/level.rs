//! Static level geometry
//!
//! A room owns its immovable colliders for its whole lifetime. Colliders are
//! validated once when the room loads and never change afterwards.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Rect;
use crate::SimError;
use crate::consts::*;

/// Identifier of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// Which way a slope rises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlopeDirection {
    /// High corner on the left, low corner on the right
    Left,
    /// Low corner on the left, high corner on the right
    #[default]
    Right,
}

/// Ramp data derived from the collider rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slope {
    pub direction: SlopeDirection,
    /// Unit surface normal, pointing out of the solid side
    pub normal: Vec2,
}

impl Slope {
    /// Build a slope spanning the diagonal of `rect`
    pub fn new(rect: &Rect, direction: SlopeDirection) -> Self {
        let (low, high) = match direction {
            SlopeDirection::Right => (rect.bottom_left(), rect.top_right()),
            SlopeDirection::Left => (rect.bottom_right(), rect.top_left()),
        };
        let along = high - low;
        // Rotate the surface direction so the normal faces up (negative y)
        let mut normal = Vec2::new(along.y, -along.x).normalize_or_zero();
        if normal.y > 0.0 {
            normal = -normal;
        }
        Self { direction, normal }
    }

    /// How far up the ramp a body spanning `[left, right]` stands, in [0, 1]
    /// when over the ramp (0 at the low corner, 1 at the high corner)
    pub fn rise_at(&self, rect: &Rect, left: f32, right: f32) -> f32 {
        match self.direction {
            SlopeDirection::Right => (right - rect.left()) / rect.width(),
            SlopeDirection::Left => (rect.right() - left) / rect.width(),
        }
    }

    /// Surface height (y) at the given rise fraction
    pub fn surface_y(rect: &Rect, rise: f32) -> f32 {
        rect.bottom() - rise * rect.height()
    }

    /// Horizontal speed multiplier for bodies standing on this ramp
    ///
    /// `1 - angle / 90°`, with the angle measured from the horizontal, so a
    /// 45° ramp halves speed and a nearly flat one leaves it untouched.
    pub fn speed_multiplier(rect: &Rect) -> f32 {
        let angle = (rect.height() / rect.width()).atan().to_degrees();
        1.0 - angle / 90.0
    }
}

/// Collider behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderKind {
    /// Blocks every body from every direction
    Solid,
    /// Blocks only bodies landing on top while moving down
    OneWay,
    /// Blocks only the player
    ActorClip,
    /// Ramp
    Slope(Slope),
}

/// An immovable collider belonging to a room
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCollider {
    /// Owning room (read-only back-reference by id)
    pub room: RoomId,
    pub rect: Rect,
    pub kind: ColliderKind,
}

/// Per-room physics parameters shared by every body in the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomParams {
    /// Maximum downward velocity for gravity-capped bodies
    pub gravity_cap: f32,
    /// Added to vertical velocity every tick while airborne
    pub gravity_strength: f32,
    /// Horizontal acceleration available to steering bodies while airborne
    pub air_friction: f32,
}

impl Default for RoomParams {
    fn default() -> Self {
        Self {
            gravity_cap: DEFAULT_GRAVITY_CAP,
            gravity_strength: DEFAULT_GRAVITY_STRENGTH,
            air_friction: DEFAULT_AIR_FRICTION,
        }
    }
}

/// A slope as described by a level file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeDesc {
    pub rect: Rect,
    #[serde(default)]
    pub direction: SlopeDirection,
}

/// Level description handed over by the level loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Room size in pixels
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub params: RoomParams,
    #[serde(default)]
    pub solids: Vec<Rect>,
    #[serde(default)]
    pub one_way: Vec<Rect>,
    #[serde(default)]
    pub actor_clip: Vec<Rect>,
    #[serde(default)]
    pub slopes: Vec<SlopeDesc>,
    /// Where the player appears when the room is entered
    #[serde(default)]
    pub spawn: Option<Vec2>,
}

impl LevelDesc {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// A loaded room: dimensions, physics parameters and static colliders
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub width: f32,
    pub height: f32,
    pub params: RoomParams,
    pub colliders: Vec<StaticCollider>,
    pub spawn: Option<Vec2>,
    /// Seconds the room has been simulated
    pub time: f32,
}

impl Room {
    /// Build a room from a level description, rejecting malformed geometry
    pub fn load(id: RoomId, desc: &LevelDesc) -> Result<Self, SimError> {
        if !(desc.width.is_finite() && desc.height.is_finite())
            || desc.width <= 0.0
            || desc.height <= 0.0
        {
            return Err(SimError::geometry(
                format!("room {}", id.0),
                format!("dimensions {}x{} must be positive", desc.width, desc.height),
            ));
        }

        let mut colliders = Vec::with_capacity(
            desc.solids.len() + desc.one_way.len() + desc.actor_clip.len() + desc.slopes.len(),
        );

        let flat = [
            ("solid", &desc.solids, ColliderKind::Solid),
            ("one-way", &desc.one_way, ColliderKind::OneWay),
            ("actor-clip", &desc.actor_clip, ColliderKind::ActorClip),
        ];
        for (label, rects, kind) in flat {
            for (i, rect) in rects.iter().enumerate() {
                check_rect(label, i, rect)?;
                colliders.push(StaticCollider {
                    room: id,
                    rect: *rect,
                    kind,
                });
            }
        }

        for (i, slope) in desc.slopes.iter().enumerate() {
            check_rect("slope", i, &slope.rect)?;
            colliders.push(StaticCollider {
                room: id,
                rect: slope.rect,
                kind: ColliderKind::Slope(Slope::new(&slope.rect, slope.direction)),
            });
        }

        log::info!(
            "Room {} loaded: {}x{} px, {} solid, {} one-way, {} actor-clip, {} slopes",
            id.0,
            desc.width,
            desc.height,
            desc.solids.len(),
            desc.one_way.len(),
            desc.actor_clip.len(),
            desc.slopes.len()
        );

        Ok(Self {
            id,
            width: desc.width,
            height: desc.height,
            params: desc.params,
            colliders,
            spawn: desc.spawn,
            time: 0.0,
        })
    }

    /// Logical bounds check: inside all four half-planes
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0 && position.x < self.width && position.y >= 0.0 && position.y < self.height
    }

    /// Advance room-level timers
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
    }
}

fn check_rect(label: &str, index: usize, rect: &Rect) -> Result<(), SimError> {
    if rect.is_well_formed() {
        Ok(())
    } else {
        Err(SimError::geometry(
            format!("{label} collider #{index}"),
            format!("size {}x{} is degenerate", rect.width(), rect.height()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> LevelDesc {
        LevelDesc {
            width: 640.0,
            height: 360.0,
            solids: vec![Rect::new(0.0, 300.0, 640.0, 60.0)],
            one_way: vec![Rect::new(100.0, 200.0, 64.0, 8.0)],
            actor_clip: vec![Rect::new(320.0, 0.0, 8.0, 300.0)],
            slopes: vec![SlopeDesc {
                rect: Rect::new(400.0, 268.0, 32.0, 32.0),
                direction: SlopeDirection::Right,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_room_load_tags_colliders() {
        let room = Room::load(RoomId(1), &desc()).unwrap();
        assert_eq!(room.colliders.len(), 4);
        assert_eq!(room.colliders[0].kind, ColliderKind::Solid);
        assert_eq!(room.colliders[1].kind, ColliderKind::OneWay);
        assert_eq!(room.colliders[2].kind, ColliderKind::ActorClip);
        assert!(matches!(room.colliders[3].kind, ColliderKind::Slope(_)));
        assert!(room.colliders.iter().all(|c| c.room == RoomId(1)));
        assert_eq!(room.params, RoomParams::default());
    }

    #[test]
    fn test_zero_size_collider_rejected() {
        let mut bad = desc();
        bad.solids.push(Rect::new(0.0, 0.0, 0.0, 10.0));
        let err = Room::load(RoomId(1), &bad).unwrap_err();
        assert!(matches!(err, SimError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_degenerate_slope_rejected() {
        let mut bad = desc();
        bad.slopes.push(SlopeDesc {
            rect: Rect::new(0.0, 0.0, 32.0, 0.0),
            direction: SlopeDirection::Left,
        });
        assert!(matches!(
            Room::load(RoomId(1), &bad),
            Err(SimError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_bad_room_dimensions_rejected() {
        let mut bad = desc();
        bad.width = 0.0;
        assert!(Room::load(RoomId(1), &bad).is_err());
    }

    #[test]
    fn test_contains_is_conjunction() {
        let room = Room::load(RoomId(1), &desc()).unwrap();
        assert!(room.contains(Vec2::new(10.0, 10.0)));
        assert!(!room.contains(Vec2::new(-1.0, 10.0)));
        assert!(!room.contains(Vec2::new(10.0, 360.0)));
        assert!(!room.contains(Vec2::new(640.0, 10.0)));
        assert!(!room.contains(Vec2::new(10.0, -0.5)));
    }

    #[test]
    fn test_slope_normals_face_up() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        let right = Slope::new(&rect, SlopeDirection::Right);
        let left = Slope::new(&rect, SlopeDirection::Left);
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!((right.normal - Vec2::new(-s, -s)).length() < 1e-5);
        assert!((left.normal - Vec2::new(s, -s)).length() < 1e-5);
    }

    #[test]
    fn test_slope_speed_multiplier() {
        let steep = Slope::speed_multiplier(&Rect::new(0.0, 0.0, 32.0, 32.0));
        assert!((steep - 0.5).abs() < 1e-5);
        let flat = Slope::speed_multiplier(&Rect::new(0.0, 0.0, 320.0, 1.0));
        assert!(flat > 0.99 && flat <= 1.0);
        let steeper = Slope::speed_multiplier(&Rect::new(0.0, 0.0, 16.0, 32.0));
        assert!(steeper < steep);
    }

    #[test]
    fn test_level_desc_from_json() {
        let json = r#"{
            "width": 320, "height": 180,
            "params": { "gravity_cap": 200, "gravity_strength": 10, "air_friction": 20 },
            "solids": [ { "pos": [0, 160], "size": [320, 20] } ],
            "slopes": [ { "rect": { "pos": [64, 128], "size": [32, 32] }, "direction": "Left" } ]
        }"#;
        let desc = LevelDesc::from_json(json).unwrap();
        assert_eq!(desc.solids.len(), 1);
        assert_eq!(desc.slopes[0].direction, SlopeDirection::Left);
        assert_eq!(desc.params.gravity_cap, 200.0);
        assert!(desc.one_way.is_empty());

        assert!(matches!(
            LevelDesc::from_json("{ not json"),
            Err(SimError::Parse(_))
        ));
    }
}
