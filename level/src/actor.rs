use std::time::Duration;

use froggit_core::{ActorOverlay, Direction, Rect};
use glam::Vec2;

/// Player-controlled actor hopping across the lanes.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    start: Vec2,
    position: Vec2,
    heading: Direction,
    visible: bool,
    overlay: ActorOverlay,
    cooldown: Duration,
}

impl Actor {
    /// Places a visible actor facing north on the provided start position.
    pub(crate) fn new(start: Vec2, cooldown: Duration) -> Self {
        Self {
            start,
            position: start,
            heading: Direction::North,
            visible: true,
            overlay: ActorOverlay::None,
            cooldown,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn heading(&self) -> Direction {
        self.heading
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn overlay(&self) -> ActorOverlay {
        self.overlay
    }

    /// Square box of one cell centered on the actor.
    pub(crate) fn bounds(&self, cell_size: f32) -> Rect {
        Rect::from_center_size(self.position, Vec2::splat(cell_size))
    }

    pub(crate) fn cool_down(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_sub(dt);
    }

    pub(crate) fn ready_to_move(&self) -> bool {
        self.cooldown.is_zero()
    }

    pub(crate) fn restart_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    /// Moves the actor to `target` and turns it toward `direction`.
    pub(crate) fn hop(&mut self, direction: Direction, target: Vec2) {
        self.position = target;
        self.heading = direction;
    }

    pub(crate) fn shift_x(&mut self, delta: f32) {
        self.position.x += delta;
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.position.y = y;
    }

    /// Hides the actor behind the provided overlay.
    ///
    /// Returns `false` when the actor was already hidden.
    pub(crate) fn hide(&mut self, overlay: ActorOverlay) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        self.overlay = overlay;
        true
    }

    /// Returns the actor to its start cell, visible and facing north.
    pub(crate) fn restore(&mut self) -> Vec2 {
        self.position = self.start;
        self.heading = Direction::North;
        self.visible = true;
        self.overlay = ActorOverlay::None;
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use froggit_core::DeathCause;

    #[test]
    fn hiding_twice_reports_only_the_first_transition() {
        let mut actor = Actor::new(Vec2::new(32.0, 32.0), Duration::ZERO);
        assert!(actor.hide(ActorOverlay::Dead(DeathCause::Vehicle)));
        assert!(!actor.hide(ActorOverlay::Dead(DeathCause::Drowned)));
        assert_eq!(actor.overlay(), ActorOverlay::Dead(DeathCause::Vehicle));
    }

    #[test]
    fn restore_clears_overlay_and_heading() {
        let start = Vec2::new(96.0, 32.0);
        let mut actor = Actor::new(start, Duration::ZERO);
        actor.hop(Direction::East, Vec2::new(160.0, 32.0));
        let _ = actor.hide(ActorOverlay::Rescued);

        assert_eq!(actor.restore(), start);
        assert!(actor.is_visible());
        assert_eq!(actor.heading(), Direction::North);
        assert_eq!(actor.overlay(), ActorOverlay::None);
    }

    #[test]
    fn cooldown_counts_down_to_zero() {
        let mut actor = Actor::new(Vec2::ZERO, Duration::from_millis(250));
        actor.cool_down(Duration::from_millis(100));
        assert!(!actor.ready_to_move());
        actor.cool_down(Duration::from_millis(200));
        assert!(actor.ready_to_move());
    }
}
