#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Froggit.
//!
//! The level owns the actor, the lanes and the lives counter. It is mutated
//! exclusively through [`apply`] and observed through the [`query`] module and
//! [`draw`].

mod actor;
mod hedge;
mod lane;

use std::time::Duration;

use froggit_core::{
    ActorOverlay, CellCoord, Command, DeathCause, DrawSurface, Drawable, Event, Grid, KeySet,
    LaneKind, LevelDescription, LevelError, Rect, DEFAULT_CELL_SIZE, DEFAULT_MOVE_COOLDOWN,
    STARTING_LIVES,
};
use glam::Vec2;

use crate::actor::Actor;
use crate::hedge::{marker_bounds, HedgeContact};

pub use crate::hedge::Hedge;
pub use crate::lane::{Lane, Obstacle};

/// Tunable parameters applied when a level is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelConfig {
    cell_size: f32,
    move_cooldown: Duration,
}

impl LevelConfig {
    /// Creates a configuration with the provided cell size and move cooldown.
    #[must_use]
    pub const fn new(cell_size: f32, move_cooldown: Duration) -> Self {
        Self {
            cell_size,
            move_cooldown,
        }
    }

    /// Side length of a grid cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Minimum time between two accepted moves.
    #[must_use]
    pub const fn move_cooldown(&self) -> Duration {
        self.move_cooldown
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE, DEFAULT_MOVE_COOLDOWN)
    }
}

/// Flags accumulated over the lanes during one tick and resolved afterwards.
#[derive(Clone, Copy, Debug, Default)]
struct TickFlags {
    struck_by_vehicle: bool,
    in_water: bool,
    on_log: bool,
    touching_hedge: bool,
    colliding_with_exit: bool,
    just_claimed: bool,
}

/// Represents one loaded Froggit level.
#[derive(Debug)]
pub struct Level {
    grid: Grid,
    config: LevelConfig,
    width: f32,
    height: f32,
    actor: Actor,
    lanes: Vec<Lane>,
    lives: u8,
    won: bool,
    flags: TickFlags,
}

impl Level {
    /// Builds a level from a parsed description.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] when the description cannot produce a
    /// playable level.
    pub fn new(description: &LevelDescription, config: LevelConfig) -> Result<Self, LevelError> {
        description.validate()?;

        let grid = Grid::new(description.columns(), description.rows(), config.cell_size());
        let lanes: Vec<Lane> = description
            .lanes
            .iter()
            .zip(0..)
            .map(|(record, row)| Lane::from_record(row, record, &grid, description.offscreen))
            .collect();

        let [column, row] = description.start;
        let start = grid.cell_center(CellCoord::new(column, row));

        log::debug!(
            "built {}x{} level with {} exit slots",
            grid.columns(),
            grid.rows(),
            lanes
                .iter()
                .filter_map(Lane::hedge)
                .map(Hedge::slot_count)
                .sum::<usize>()
        );

        Ok(Self {
            width: grid.width(),
            height: grid.lanes_height() + config.cell_size(),
            actor: Actor::new(start, config.move_cooldown()),
            grid,
            config,
            lanes,
            lives: STARTING_LIVES,
            won: false,
            flags: TickFlags::default(),
        })
    }

    fn tick(&mut self, dt: Duration, keys: KeySet, out_events: &mut Vec<Event>) {
        if !self.actor.is_visible() || self.won {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt });

        if self.flags.just_claimed {
            self.actor.restart_cooldown(self.config.move_cooldown());
        }
        self.flags = TickFlags::default();
        self.actor.cool_down(dt);

        let settled = self.actor.position();
        self.evaluate_lanes(dt, settled, out_events);

        if self.flags.struck_by_vehicle {
            self.kill(DeathCause::Vehicle, out_events);
        }
        if !self.actor.is_visible() {
            return;
        }

        if self.actor.ready_to_move() && !self.flags.colliding_with_exit {
            self.resolve_input(keys, out_events);
        }

        if self.flags.touching_hedge && !self.flags.colliding_with_exit {
            self.actor.set_y(settled.y - self.grid.cell_size());
            self.flags.touching_hedge = false;
            let position = self.actor.position();
            log::debug!("hedge pushed actor back to {position}");
            out_events.push(Event::ActorPushedBack { position });
        }

        if self.flags.in_water && !self.flags.on_log {
            self.kill(DeathCause::Drowned, out_events);
        }
    }

    /// Advances every lane and accumulates the actor's contacts with it.
    fn evaluate_lanes(&mut self, dt: Duration, settled: Vec2, out_events: &mut Vec<Event>) {
        let Self {
            grid,
            width,
            actor,
            lanes,
            won,
            flags,
            ..
        } = self;
        let cell_size = grid.cell_size();
        let seconds = dt.as_secs_f32();

        for lane in lanes.iter_mut() {
            lane.advance(seconds, *width);
            let actor_bounds = actor.bounds(cell_size);

            match lane.kind() {
                LaneKind::Road => {
                    if lane.vehicle_overlaps(&actor_bounds) {
                        flags.struck_by_vehicle = true;
                    }
                }
                LaneKind::Water => {
                    if lane.strip().overlaps(&actor_bounds) {
                        flags.in_water = true;
                        if lane.log_contains(settled) {
                            flags.on_log = true;
                            let delta = lane.speed().unwrap_or_default() * seconds;
                            actor.shift_x(delta);
                            out_events.push(Event::ActorCarried { delta });
                        }
                    }
                }
                LaneKind::Hedge => {
                    let strip = lane.strip();
                    if let Some((hedge, obstacles)) = lane.hedge_parts_mut() {
                        if strip.overlaps(&actor_bounds) {
                            flags.touching_hedge = true;
                        }
                        let settled_markers = hedge.claimed().len();
                        for contact in hedge.contacts(obstacles, settled) {
                            match contact {
                                HedgeContact::FreeExit(_) if flags.just_claimed => {}
                                HedgeContact::FreeExit(slot) => {
                                    hedge.claim(slot, settled);
                                    let _ = actor.hide(ActorOverlay::Rescued);
                                    flags.colliding_with_exit = true;
                                    flags.just_claimed = true;
                                    log::info!(
                                        "exit slot {slot} claimed ({}/{})",
                                        hedge.claimed().len(),
                                        hedge.slot_count()
                                    );
                                    out_events.push(Event::ExitClaimed {
                                        slot,
                                        position: settled,
                                    });
                                }
                                HedgeContact::Open => {
                                    flags.colliding_with_exit = false;
                                    flags.touching_hedge = false;
                                }
                            }
                        }
                        if hedge.markers_block(settled_markers, &actor_bounds, cell_size) {
                            flags.touching_hedge = true;
                            flags.colliding_with_exit = false;
                        }
                        if hedge.is_complete() && !*won {
                            *won = true;
                            log::info!("all {} exit slots claimed", hedge.slot_count());
                            out_events.push(Event::LevelWon);
                        }
                    }
                }
                LaneKind::Grass => {}
            }
        }
    }

    fn resolve_input(&mut self, keys: KeySet, out_events: &mut Vec<Event>) {
        let Some(direction) = keys.resolve_direction() else {
            return;
        };
        self.actor.restart_cooldown(self.config.move_cooldown());

        let cell_size = self.grid.cell_size();
        let (dx, dy) = direction.cell_offset();
        let target = self.actor.position() + Vec2::new(dx as f32, dy as f32) * cell_size;
        let inside = target.x >= 0.0
            && target.x <= self.width
            && target.y >= 0.0
            && target.y <= self.height - cell_size;
        if !inside {
            return;
        }

        self.actor.hop(direction, target);
        log::trace!("actor hopped {direction:?} to {target}");
        out_events.push(Event::ActorMoved {
            direction,
            position: target,
        });
    }

    fn kill(&mut self, cause: DeathCause, out_events: &mut Vec<Event>) {
        if !self.actor.hide(ActorOverlay::Dead(cause)) {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        log::info!("actor killed by {cause:?}, {} lives left", self.lives);
        out_events.push(Event::ActorKilled {
            cause,
            lives_remaining: self.lives,
        });
    }

    fn lives_anchor(&self) -> Vec2 {
        let cell = self.grid.cell_size();
        Vec2::new(
            self.width - f32::from(STARTING_LIVES) * cell,
            self.height - cell / 2.0,
        )
    }
}

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, keys } => level.tick(dt, keys, out_events),
        Command::RestoreActor => {
            let position = level.actor.restore();
            level.flags.touching_hedge = false;
            level.flags.colliding_with_exit = false;
            log::debug!("actor restored at {position}");
            out_events.push(Event::ActorRestored { position });
        }
    }
}

/// Emits the level's drawables back to front.
///
/// Each lane's strip is followed by its obstacles, then come the actor or
/// the overlay that replaced it, the lives display and finally the occupied
/// exit markers.
pub fn draw<S: DrawSurface + ?Sized>(level: &Level, surface: &mut S) {
    let cell = level.grid.cell_size();

    for lane in &level.lanes {
        surface.emit(Drawable::LaneStrip {
            kind: lane.kind(),
            bounds: lane.strip(),
        });
        for obstacle in lane.obstacles() {
            surface.emit(Drawable::Obstacle {
                kind: obstacle.kind().clone(),
                bounds: obstacle.bounds(),
                facing: obstacle.facing(),
            });
        }
    }

    let actor_bounds = level.actor.bounds(cell);
    if level.actor.is_visible() {
        surface.emit(Drawable::Actor {
            bounds: actor_bounds,
            heading: level.actor.heading(),
        });
    } else if let ActorOverlay::Dead(_) = level.actor.overlay() {
        surface.emit(Drawable::ActorRemains {
            bounds: actor_bounds,
            overlay: level.actor.overlay(),
        });
    }

    let anchor = level.lives_anchor();
    surface.emit(Drawable::LivesLabel { anchor });
    for life in 0..level.lives {
        let center = Vec2::new(anchor.x + (f32::from(life) + 0.5) * cell, anchor.y);
        surface.emit(Drawable::LifeGlyph {
            bounds: Rect::from_center_size(center, Vec2::splat(cell)),
        });
    }

    for hedge in level.lanes.iter().filter_map(Lane::hedge) {
        for claim in hedge.claimed() {
            surface.emit(Drawable::ClaimedExit {
                bounds: marker_bounds(*claim, cell),
            });
        }
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use froggit_core::{ActorOverlay, Direction, Grid, LevelStatus};
    use glam::Vec2;

    use super::{Hedge, Lane, Level};

    /// Reports whether the actor is currently visible.
    #[must_use]
    pub fn actor_visible(level: &Level) -> bool {
        level.actor.is_visible()
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(level: &Level) -> u8 {
        level.lives
    }

    /// Reports whether every exit slot has been claimed.
    #[must_use]
    pub fn won(level: &Level) -> bool {
        level.won
    }

    /// Reports whether the last tick ended with the actor on a free exit.
    #[must_use]
    pub fn colliding_with_exit(level: &Level) -> bool {
        level.flags.colliding_with_exit
    }

    /// Width of the level in pixels.
    #[must_use]
    pub fn width(level: &Level) -> f32 {
        level.width
    }

    /// Height of the level in pixels, including the lives row.
    #[must_use]
    pub fn height(level: &Level) -> f32 {
        level.height
    }

    /// Cell layout of the level.
    #[must_use]
    pub fn grid(level: &Level) -> &Grid {
        &level.grid
    }

    /// Current actor position in pixels.
    #[must_use]
    pub fn actor_position(level: &Level) -> Vec2 {
        level.actor.position()
    }

    /// Direction the actor faces.
    #[must_use]
    pub fn actor_heading(level: &Level) -> Direction {
        level.actor.heading()
    }

    /// Overlay shown while the actor is hidden.
    #[must_use]
    pub fn actor_overlay(level: &Level) -> ActorOverlay {
        level.actor.overlay()
    }

    /// Snapshot of the values the outer shell reacts to.
    #[must_use]
    pub fn status(level: &Level) -> LevelStatus {
        LevelStatus {
            actor_visible: level.actor.is_visible(),
            lives: level.lives,
            won: level.won,
        }
    }

    /// Lanes ordered from the bottom row upward.
    #[must_use]
    pub fn lanes(level: &Level) -> &[Lane] {
        &level.lanes
    }

    /// Positions of every occupied exit marker.
    #[must_use]
    pub fn claimed_exits(level: &Level) -> Vec<Vec2> {
        level
            .lanes
            .iter()
            .filter_map(Lane::hedge)
            .flat_map(|hedge| hedge.claimed().iter().copied())
            .collect()
    }

    /// Number of exit slots across every hedge lane.
    #[must_use]
    pub fn exit_slots(level: &Level) -> usize {
        level
            .lanes
            .iter()
            .filter_map(Lane::hedge)
            .map(Hedge::slot_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use froggit_core::{Direction, MoveKey};

    const COOLDOWN: Duration = Duration::from_millis(250);

    fn level(source: &str) -> Level {
        let description = LevelDescription::from_json_str(source).expect("valid level");
        Level::new(&description, LevelConfig::default()).expect("level builds")
    }

    fn tick(level: &mut Level, dt: Duration, keys: &[MoveKey]) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            level,
            Command::Tick {
                dt,
                keys: KeySet::from_keys(keys.iter().copied()),
            },
            &mut events,
        );
        events
    }

    const MEADOW: &str = r#"{
        "size": [5, 3], "start": [2, 0], "offscreen": 1,
        "lanes": [{"type": "grass"}, {"type": "grass"}, {"type": "grass"}]
    }"#;

    #[test]
    fn dimensions_include_the_lives_row() {
        let level = level(MEADOW);
        assert_eq!(query::width(&level), 320.0);
        assert_eq!(query::height(&level), 256.0);
        assert_eq!(query::actor_position(&level), Vec2::new(160.0, 32.0));
        assert_eq!(query::lives(&level), STARTING_LIVES);
    }

    #[test]
    fn first_move_waits_for_the_initial_cooldown() {
        let mut level = level(MEADOW);
        let events = tick(&mut level, Duration::from_millis(100), &[MoveKey::W]);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ActorMoved { .. })));

        let events = tick(&mut level, Duration::from_millis(150), &[MoveKey::W]);
        assert!(events.contains(&Event::ActorMoved {
            direction: Direction::North,
            position: Vec2::new(160.0, 96.0),
        }));
    }

    #[test]
    fn holding_a_key_moves_once_per_cooldown() {
        let mut level = level(MEADOW);
        let _ = tick(&mut level, COOLDOWN, &[MoveKey::Right]);
        assert_eq!(query::actor_position(&level).x, 224.0);

        let _ = tick(&mut level, Duration::from_millis(100), &[MoveKey::Right]);
        assert_eq!(query::actor_position(&level).x, 224.0);

        let _ = tick(&mut level, Duration::from_millis(150), &[MoveKey::Right]);
        assert_eq!(query::actor_position(&level).x, 288.0);
        assert_eq!(query::actor_heading(&level), Direction::East);
    }

    #[test]
    fn moves_never_leave_the_grid() {
        let mut level = level(MEADOW);
        let _ = tick(&mut level, COOLDOWN, &[MoveKey::Down]);
        assert_eq!(query::actor_position(&level), Vec2::new(160.0, 32.0));
        assert_eq!(query::actor_heading(&level), Direction::North);

        for _ in 0..4 {
            let _ = tick(&mut level, COOLDOWN, &[MoveKey::Up]);
        }
        assert_eq!(query::actor_position(&level).y, 160.0);
    }

    #[test]
    fn draw_emits_lanes_actor_and_lives_in_order() {
        let level = level(MEADOW);
        let mut drawables: Vec<Drawable> = Vec::new();
        draw(&level, &mut drawables);

        assert_eq!(drawables.len(), 3 + 1 + 1 + 3);
        assert!(matches!(drawables[0], Drawable::LaneStrip { .. }));
        assert!(matches!(drawables[3], Drawable::Actor { .. }));
        assert!(matches!(drawables[4], Drawable::LivesLabel { .. }));
        let Drawable::LifeGlyph { bounds } = drawables[7] else {
            panic!("expected the last life glyph");
        };
        assert_eq!(bounds.center(), Vec2::new(288.0, 224.0));
    }

    #[test]
    fn restore_returns_to_the_start_cell() {
        let mut level = level(MEADOW);
        let _ = tick(&mut level, COOLDOWN, &[MoveKey::Up]);
        let mut events = Vec::new();
        apply(&mut level, Command::RestoreActor, &mut events);

        assert_eq!(
            events,
            vec![Event::ActorRestored {
                position: Vec2::new(160.0, 32.0)
            }]
        );
        assert_eq!(query::actor_position(&level), Vec2::new(160.0, 32.0));
    }
}
