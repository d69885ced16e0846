//! Camera follow, derived once per tick from the player's position

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Centre of the view in world space
    pub center: Vec2,
    /// View size in pixels
    pub view: Vec2,
}

impl Camera {
    pub fn new(view: Vec2) -> Self {
        Self {
            center: view * 0.5,
            view,
        }
    }

    /// Centre on `target`, keeping the view inside a room of the given size.
    /// A room smaller than the view on some axis is centred on that axis.
    pub fn follow(&mut self, target: Vec2, room_size: Vec2) {
        self.center = Vec2::new(
            clamp_axis(target.x, self.view.x, room_size.x),
            clamp_axis(target.y, self.view.y, room_size.y),
        );
    }

    /// The visible world rectangle
    pub fn visible(&self) -> Rect {
        Rect::from_pos_size(self.center - self.view * 0.5, self.view)
    }
}

fn clamp_axis(target: f32, view: f32, room: f32) -> f32 {
    let half = view * 0.5;
    if room <= view {
        room * 0.5
    } else {
        target.clamp(half, room - half)
    }
}
