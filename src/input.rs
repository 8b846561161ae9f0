//! Player input as the simulation sees it, plus the frame-based key hold
//! tracker the terminal front end uses to turn key events into held state.

use std::collections::HashMap;
use std::hash::Hash;

use crate::entities::{Arena, Vec2};

/// Held controls sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Aim point in world coordinates.
    pub aim: Vec2,
    pub firing: bool,
}

impl InputState {
    /// Unnormalized movement direction from the held keys.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f64::from(i8::from(pos) - i8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }

    /// Aim straight at a world point, e.g. a mouse click.
    pub fn aim_absolute(&mut self, point: Vec2) {
        self.aim = point;
    }

    /// Nudge the aim point by a raw pointer delta scaled by `sensitivity`,
    /// keeping it inside the arena.
    pub fn aim_relative(&mut self, delta: Vec2, sensitivity: f64, arena: &Arena) {
        let next = self.aim + delta * sensitivity;
        self.aim = Vec2::new(
            next.x.clamp(0.0, arena.width),
            next.y.clamp(0.0, arena.height),
        );
    }

    /// Release every held control. The aim point stays where it was.
    pub fn clear(&mut self) {
        self.up = false;
        self.down = false;
        self.left = false;
        self.right = false;
        self.firing = false;
    }
}

/// A key counts as held if its last press or repeat arrived within this
/// many frames. Terminals without release events stay held while the OS
/// key repeat keeps refreshing them.
pub const HOLD_WINDOW: u64 = 4;

/// Remembers the frame each key was last seen on.
///
/// Works with terminals that report `Press`/`Repeat`/`Release` (keys drop on
/// release) and with classic ones that only repeat `Press` (keys expire
/// after `HOLD_WINDOW` silent frames).
#[derive(Debug)]
pub struct KeyTracker<K> {
    last_seen: HashMap<K, u64>,
    frame: u64,
}

impl<K: Hash + Eq> Default for KeyTracker<K> {
    fn default() -> Self {
        KeyTracker {
            last_seen: HashMap::new(),
            frame: 0,
        }
    }
}

impl<K: Hash + Eq> KeyTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame. Call once per loop iteration before feeding
    /// events.
    pub fn next_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Record a press or repeat.
    pub fn press(&mut self, key: K) {
        self.last_seen.insert(key, self.frame);
    }

    pub fn release(&mut self, key: &K) {
        self.last_seen.remove(key);
    }

    pub fn is_held(&self, key: &K) -> bool {
        self.last_seen
            .get(key)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// Forget every key, e.g. after focus is lost.
    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}
