//! Per-actor animation state machine.
//!
//! States are `None` (idle, commands may execute) and one active state per
//! [`AnimationKind`]. [`AnimationState::start`] is only legal from `None`.
//! Each [`AnimationState::advance`] moves progress forward by one tick;
//! once progress reaches the duration the machine returns to `None`.
//!
//! While an animation is playing the actor's command queue is inhibited, so
//! per actor at most one command or one animation step happens per tick.
//!
//! # Presentation
//!
//! [`AnimationState::fraction`] interpolates between the previous and the
//! current progress using the sub-tick fraction. The render offset, visual
//! yaw and tool swing angle are derived from it.
//!
//! # Entity pushing
//!
//! Movement animations sweep a shrinking volume on the actor's new cell and
//! nudge every entity inside by one `duration`-th of a block per tick (see
//! [`push_volume`] and [`push_entities`]).

use core::f64::consts::PI;

use rover_types::{Aabb, AnimationKind, BlockPos, Direction, Location, Side, Vec3};
use rover_world::World;
use tracing::trace;

use crate::error::BrainError;

/// Slack added to the pushing volume so entities flush with the moving face
/// are still caught.
const PUSH_EPSILON: f64 = 0.0125;

/// Animation progress of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    kind: AnimationKind,
    progress: u32,
    last_progress: u32,
    duration: u32,
}

impl AnimationState {
    /// An idle machine whose animations last `duration` ticks.
    pub const fn new(duration: u32) -> Self {
        Self {
            kind: AnimationKind::None,
            progress: 0,
            last_progress: 0,
            duration,
        }
    }

    /// The animation currently playing.
    pub const fn kind(&self) -> AnimationKind {
        self.kind
    }

    /// Ticks elapsed in the current animation.
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Progress before the most recent advance.
    pub const fn last_progress(&self) -> u32 {
        self.last_progress
    }

    /// Length of every animation in ticks.
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether no animation is playing.
    pub const fn is_idle(&self) -> bool {
        matches!(self.kind, AnimationKind::None)
    }

    /// Progress a freshly started `kind` begins at.
    const fn start_progress(&self, kind: AnimationKind) -> u32 {
        if matches!(kind, AnimationKind::ShortWait) {
            self.duration / 2
        } else {
            0
        }
    }

    /// Start playing `kind`.
    ///
    /// Starting `None` is a no-op. `ShortWait` begins half-way through the
    /// duration.
    pub fn start(&mut self, kind: AnimationKind) -> Result<(), BrainError> {
        if !self.is_idle() {
            return Err(BrainError::AnimationBusy { current: self.kind });
        }
        if matches!(kind, AnimationKind::None) {
            return Ok(());
        }
        let progress = self.start_progress(kind);
        self.kind = kind;
        self.progress = progress;
        self.last_progress = progress;
        Ok(())
    }

    /// Advance one tick. Returns `true` when the animation just finished.
    ///
    /// Idle machines do not change.
    pub fn advance(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        self.last_progress = self.progress;
        self.progress = self.progress.saturating_add(1);
        trace!(kind = ?self.kind, progress = self.progress, "animation advanced");
        if self.progress >= self.duration {
            self.reset();
            return true;
        }
        false
    }

    /// Return to `None` immediately.
    pub const fn reset(&mut self) {
        self.kind = AnimationKind::None;
        self.progress = 0;
        self.last_progress = 0;
    }

    /// Apply an animation received from the authoritative actor.
    ///
    /// Mirrors only pick up a remote animation when it differs from the local
    /// one and is not a pause or `None`; pauses are never replayed. A picked
    /// up animation plays from its start, whatever the remote progress.
    pub fn sync_from_description(&mut self, kind: AnimationKind) {
        if kind == self.kind || kind.is_wait() || matches!(kind, AnimationKind::None) {
            return;
        }
        let progress = self.start_progress(kind);
        self.kind = kind;
        self.progress = progress;
        self.last_progress = progress;
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    /// Interpolated progress in `[0, 1]` for a sub-tick fraction `partial`.
    pub fn fraction(&self, partial: f64) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        let duration = f64::from(self.duration);
        let previous = f64::from(self.last_progress) / duration;
        let next = f64::from(self.progress) / duration;
        (next - previous).mul_add(partial, previous)
    }

    /// Visual displacement of an actor facing `facing` relative to its cell.
    ///
    /// Movement slides from one block behind the destination to zero.
    pub fn render_offset(&self, facing: Direction, partial: f64) -> Vec3 {
        self.kind.movement_direction(facing).map_or(Vec3::ZERO, |dir| {
            Vec3::along(dir, -1.0 + self.fraction(partial))
        })
    }

    /// Yaw in degrees for rendering, sweeping 90 degrees during turns.
    pub fn visual_yaw(&self, facing: Direction, partial: f64) -> f64 {
        let yaw = f64::from(facing.yaw_degrees());
        let sweep = 90.0 * (1.0 - self.fraction(partial));
        match self.kind {
            AnimationKind::TurnLeft => {
                let yaw = yaw + sweep;
                if yaw >= 360.0 { yaw - 360.0 } else { yaw }
            }
            AnimationKind::TurnRight => {
                let yaw = yaw - sweep;
                if yaw < 0.0 { yaw + 360.0 } else { yaw }
            }
            _ => yaw,
        }
    }

    /// Swing angle in degrees of the tool on `side`.
    pub fn tool_angle(&self, side: Side, partial: f64) -> f64 {
        let swinging = matches!(
            (side, self.kind),
            (Side::Left, AnimationKind::SwingLeftTool) | (Side::Right, AnimationKind::SwingRightTool)
        );
        if swinging {
            45.0 * (self.fraction(partial) * PI).sin()
        } else {
            0.0
        }
    }
}

/// Volume swept at `progress` by an actor that moved into `pos` along `dir`.
///
/// The unit cell is trimmed on the face the actor is moving towards by
/// `max(1 - (progress + 1) / duration + 0.0125, 0)` blocks.
pub fn push_volume(pos: BlockPos, dir: Direction, progress: u32, duration: u32) -> Aabb {
    let mut volume = Aabb::block(pos);
    if duration == 0 {
        return volume;
    }
    let remaining = 1.0 - f64::from(progress.saturating_add(1)) / f64::from(duration);
    let push = (remaining + PUSH_EPSILON).max(0.0);
    let (dx, dy, dz) = dir.offset();
    trim_axis(&mut volume.min.x, &mut volume.max.x, dx, push);
    trim_axis(&mut volume.min.y, &mut volume.max.y, dy, push);
    trim_axis(&mut volume.min.z, &mut volume.max.z, dz, push);
    volume
}

fn trim_axis(min: &mut f64, max: &mut f64, step: i32, push: f64) {
    let step = f64::from(step);
    if step < 0.0 {
        *min -= step * push;
    } else {
        *max -= step * push;
    }
}

/// Displace every entity inside the push volume by `dir / duration`.
///
/// Returns the number of entities moved.
pub fn push_entities(
    world: &mut dyn World,
    location: Location,
    dir: Direction,
    progress: u32,
    duration: u32,
) -> usize {
    if duration == 0 {
        return 0;
    }
    let volume = push_volume(location.pos, dir, progress, duration);
    let entities = world.entities_in(location.dimension, &volume);
    let step = Vec3::along(dir, 1.0 / f64::from(duration));
    for entity in &entities {
        world.displace_entity(*entity, step);
    }
    if !entities.is_empty() {
        trace!(location = %location, moved = entities.len(), "pushed entities");
    }
    entities.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ticks_until_idle(state: &mut AnimationState) -> u32 {
        let mut ticks = 0_u32;
        while !state.is_idle() {
            state.advance();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn full_animations_last_the_duration() {
        for kind in AnimationKind::ALL {
            if matches!(kind, AnimationKind::None | AnimationKind::ShortWait) {
                continue;
            }
            let mut state = AnimationState::new(8);
            state.start(kind).unwrap();
            assert_eq!(ticks_until_idle(&mut state), 8, "{kind:?}");
        }
    }

    #[test]
    fn short_wait_lasts_half() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::ShortWait).unwrap();
        assert_eq!(state.progress(), 4);
        assert_eq!(ticks_until_idle(&mut state), 4);
    }

    #[test]
    fn start_only_from_idle() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::Wait).unwrap();
        let busy = state.start(AnimationKind::TurnLeft);
        assert_eq!(
            busy,
            Err(BrainError::AnimationBusy {
                current: AnimationKind::Wait
            })
        );
        assert_eq!(state.kind(), AnimationKind::Wait);
    }

    #[test]
    fn finishing_resets_everything() {
        let mut state = AnimationState::new(2);
        state.start(AnimationKind::MoveUp).unwrap();
        assert!(!state.advance());
        assert_eq!(state.last_progress(), 0);
        assert_eq!(state.progress(), 1);
        assert!(state.advance());
        assert_eq!(state, AnimationState::new(2));
        assert!(!state.advance());
    }

    #[test]
    fn fraction_interpolates() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::MoveForward).unwrap();
        state.advance();
        state.advance();
        // last = 1, progress = 2
        assert!((state.fraction(0.0) - 0.125).abs() < 1e-9);
        assert!((state.fraction(0.5) - 0.1875).abs() < 1e-9);
        assert!((state.fraction(1.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn render_offset_slides_into_cell() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::MoveForward).unwrap();
        let start = state.render_offset(Direction::East, 0.0);
        assert!((start.x + 1.0).abs() < 1e-9);
        assert!(start.y.abs() < 1e-9);

        let idle = AnimationState::new(8);
        assert_eq!(idle.render_offset(Direction::East, 0.5), Vec3::ZERO);
    }

    #[test]
    fn turning_sweeps_yaw() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::TurnLeft).unwrap();
        // Facing east (270) having just turned left from south: starts at 360 -> 0.
        assert!(state.visual_yaw(Direction::East, 0.0).abs() < 1e-9);

        let mut right = AnimationState::new(8);
        right.start(AnimationKind::TurnRight).unwrap();
        assert!((right.visual_yaw(Direction::South, 0.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn tool_angle_peaks_mid_swing() {
        let mut state = AnimationState::new(8);
        state.start(AnimationKind::SwingRightTool).unwrap();
        for _ in 0..4 {
            state.advance();
        }
        assert!((state.tool_angle(Side::Right, 1.0) - 45.0).abs() < 1e-9);
        assert!(state.tool_angle(Side::Left, 1.0).abs() < 1e-9);
    }

    #[test]
    fn mirrors_ignore_pauses_and_repeats() {
        let mut state = AnimationState::new(8);
        state.sync_from_description(AnimationKind::Wait);
        assert!(state.is_idle());
        state.sync_from_description(AnimationKind::MoveUp);
        assert_eq!(state.kind(), AnimationKind::MoveUp);
        assert_eq!(state.progress(), 0);
        state.advance();
        state.sync_from_description(AnimationKind::MoveUp);
        assert_eq!(state.progress(), 1);

        state.sync_from_description(AnimationKind::TurnLeft);
        assert_eq!(state.kind(), AnimationKind::TurnLeft);
        assert_eq!(state.progress(), 0);
        assert_eq!(state.last_progress(), 0);
    }

    #[test]
    fn push_volume_grows_with_progress() {
        let pos = BlockPos::new(0, 0, 0);
        let early = push_volume(pos, Direction::East, 0, 8);
        assert!((early.max.x - 0.1125).abs() < 1e-9);
        assert!(early.min.x.abs() < 1e-9);

        let late = push_volume(pos, Direction::East, 7, 8);
        assert!((late.max.x - 0.9875).abs() < 1e-9);

        let down = push_volume(pos, Direction::Down, 0, 8);
        assert!((down.min.y - 0.8875).abs() < 1e-9);
        assert!((down.max.y - 1.0).abs() < 1e-9);
    }
}
