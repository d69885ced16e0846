//! World state: the current room, live bodies and the broad-phase index
//!
//! Bodies are kept sorted by id (ids only grow, so spawning appends). Removal
//! is always deferred: `mark_for_removal` queues the id on the kill list and
//! the tick driver purges it at the Flush phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind, IdAllocator, ProjectileParams, Role};
use super::broadphase::{ColliderRef, SpatialHash};
use super::camera::Camera;
use super::collision::Hit;
use super::level::{LevelDesc, Room, RoomId};
use super::shape::Rect;
use super::tick::{TickInput, tick};
use crate::{Settings, SimError};

/// What to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    /// The distinguished player body (replaces any previous player)
    Player,
    Enemy,
    Projectile {
        direction: Vec2,
        params: ProjectileParams,
    },
}

/// Something that happened during a tick, for collaborators (audio, HUD, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Hit(Hit),
    /// An enemy ran out of health
    Killed { id: BodyId },
    /// The player ran out of health
    PlayerDefeated { id: BodyId },
    /// A body was purged at Flush
    Despawned { id: BodyId },
}

/// Which phase of a tick is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickPhase {
    #[default]
    Idle,
    Integrate,
    Resolve,
    Flush,
    Derive,
}

/// Read-only view of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub kind: BodyKind,
    pub room: RoomId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub bounds: Rect,
    pub flying: bool,
    pub grounded: bool,
    pub wall: i8,
    pub falls_through: bool,
    pub health: i32,
    /// Queued on the kill list, still live until the next Flush
    pub pending_removal: bool,
}

/// The simulation world
#[derive(Debug, Clone)]
pub struct World {
    pub room: Room,
    pub settings: Settings,
    pub camera: Camera,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: TickPhase,
    pub(super) bodies: Vec<Body>,
    pub(super) index: SpatialHash,
    pub(super) kill_list: Vec<BodyId>,
    pub(super) events: Vec<SimEvent>,
    ids: IdAllocator,
    player: Option<BodyId>,
}

impl World {
    pub fn new(room: Room, settings: Settings) -> Self {
        let mut world = Self {
            camera: Camera::new(settings.view),
            index: SpatialHash::new(settings.cell_size),
            room,
            settings,
            time_ticks: 0,
            phase: TickPhase::Idle,
            bodies: Vec::new(),
            kill_list: Vec::new(),
            events: Vec::new(),
            ids: IdAllocator::new(),
            player: None,
        };
        world.rebuild_index();
        world
    }

    /// Load a level description as room 0
    pub fn from_level(desc: &LevelDesc, settings: Settings) -> Result<Self, SimError> {
        let room = Room::load(RoomId(0), desc)?;
        Ok(Self::new(room, settings))
    }

    /// Replace the current room; bodies of other rooms stay dormant
    pub fn load_room(&mut self, room: Room) {
        self.room = room;
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        let room_id = self.room.id;
        let statics = self
            .room
            .colliders
            .iter()
            .enumerate()
            .map(|(i, c)| (ColliderRef::Static(i), c.rect));
        let bodies = self
            .bodies
            .iter()
            .filter(|b| b.room == room_id)
            .map(|b| (ColliderRef::Body(b.id), b.bounds()));
        self.index.rebuild(statics.chain(bodies));
    }

    /// Create a body in the current room
    pub fn spawn(&mut self, kind: Spawn, position: Vec2) -> BodyId {
        let id = self.ids.allocate();
        let room = self.room.id;
        let body = match kind {
            Spawn::Player => {
                if let Some(previous) = self.player {
                    log::warn!("Player {previous} replaced by {id}");
                    // The old body stays live as an ordinary actor
                    if let Some(old) = self.body_mut(previous) {
                        old.role = Role::Enemy;
                    }
                }
                self.player = Some(id);
                Body::player(id, room, position, &self.settings.player.actor)
            }
            Spawn::Enemy => Body::enemy(id, room, position, &self.settings.enemy),
            Spawn::Projectile { direction, params } => {
                Body::projectile(id, room, position, direction, params)
            }
        };
        log::debug!(
            "Spawned {:?} {} at ({:.1}, {:.1})",
            body.kind(),
            id,
            position.x,
            position.y
        );
        self.index.insert(ColliderRef::Body(id), body.bounds());
        self.bodies.push(body);
        id
    }

    /// Queue a live body for removal at the next Flush
    pub fn mark_for_removal(&mut self, id: BodyId) -> Result<(), SimError> {
        if self.find(id).is_none() {
            let err = SimError::UnknownColliderReference(id);
            log::warn!("mark_for_removal ignored: {err}");
            return Err(err);
        }
        self.queue_removal(id);
        Ok(())
    }

    /// Move a body to another room, registering or unregistering it with the index
    pub fn set_body_room(&mut self, id: BodyId, room: RoomId) -> Result<(), SimError> {
        let Some(i) = self.find(id) else {
            return Err(SimError::UnknownColliderReference(id));
        };
        self.bodies[i].room = room;
        if room == self.room.id {
            self.index.insert(ColliderRef::Body(id), self.bodies[i].bounds());
        } else {
            self.index.remove(ColliderRef::Body(id));
        }
        Ok(())
    }

    pub fn query_body(&self, id: BodyId) -> Option<BodySnapshot> {
        let body = self.body(id)?;
        Some(BodySnapshot {
            id: body.id,
            kind: body.kind(),
            room: body.room,
            position: body.position,
            velocity: body.velocity,
            bounds: body.bounds(),
            flying: body.flying,
            grounded: body.grounded,
            wall: body.wall,
            falls_through: body.falls_through,
            health: body.health,
            pending_removal: self.is_pending_removal(id),
        })
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self, input: &TickInput, elapsed: f32) {
        tick(self, input, elapsed);
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.find(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.find(id).map(|i| &mut self.bodies[i])
    }

    /// Live bodies, sorted by id
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn player_id(&self) -> Option<BodyId> {
        self.player
    }

    pub fn player(&self) -> Option<&Body> {
        self.player.and_then(|id| self.body(id))
    }

    pub fn is_indexed(&self, id: BodyId) -> bool {
        self.index.contains(ColliderRef::Body(id))
    }

    pub fn is_pending_removal(&self, id: BodyId) -> bool {
        self.kill_list.contains(&id)
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn find(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub(super) fn queue_removal(&mut self, id: BodyId) {
        if !self.kill_list.contains(&id) {
            self.kill_list.push(id);
        }
    }

    /// Two distinct live bodies, mutably
    pub(super) fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        let i = self.find(a)?;
        let j = self.find(b)?;
        if i == j {
            return None;
        }
        Some(if i < j {
            let (lo, hi) = self.bodies.split_at_mut(j);
            (&mut lo[i], &mut hi[0])
        } else {
            let (lo, hi) = self.bodies.split_at_mut(i);
            (&mut hi[0], &mut lo[j])
        })
    }

    /// Purge every queued body from the live list and the index
    pub(super) fn flush(&mut self) {
        if self.kill_list.is_empty() {
            return;
        }
        let mut doomed = std::mem::take(&mut self.kill_list);
        doomed.sort_unstable();

        for id in doomed {
            let Some(i) = self.find(id) else {
                log::warn!("Flush skipped: {}", SimError::UnknownColliderReference(id));
                continue;
            };
            self.bodies.remove(i);
            self.index.remove(ColliderRef::Body(id));
            if self.player == Some(id) {
                self.player = None;
            }
            log::debug!("Despawned {id}");
            self.events.push(SimEvent::Despawned { id });
        }
    }
}
