#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Froggit engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the level executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened during the frame. Drawing flows the other way: the level emits
//! [`Drawable`] values into any [`DrawSurface`] an adapter provides.

mod description;

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use description::{LaneRecord, LevelDescription, LevelError, ObjectRecord};

/// Canonical title shown by adapters before a level is loaded.
pub const TITLE_BANNER: &str = "FROGGIT";

/// Side length of a square grid cell in pixels unless configured otherwise.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Minimum time between two accepted actor moves unless configured otherwise.
pub const DEFAULT_MOVE_COOLDOWN: Duration = Duration::from_millis(250);

/// Number of lives the actor starts every level with.
pub const STARTING_LIVES: u8 = 3;

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the level by one frame using the currently held movement keys.
    Tick {
        /// Duration of simulated time that elapsed since the previous frame.
        dt: Duration,
        /// Movement keys held down while the frame was captured.
        keys: KeySet,
    },
    /// Returns the actor to its starting cell and makes it visible again.
    RestoreActor,
}

/// Events reported by the level after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Confirms that the actor hopped one cell.
    ActorMoved {
        /// Direction of the accepted hop.
        direction: Direction,
        /// Actor position after the hop.
        position: Vec2,
    },
    /// Reports that a log carried the actor sideways.
    ActorCarried {
        /// Horizontal displacement applied to the actor in pixels.
        delta: f32,
    },
    /// Reports that the hedge rejected the actor and pushed it back a row.
    ActorPushedBack {
        /// Actor position after the push.
        position: Vec2,
    },
    /// Reports that the actor lost a life.
    ActorKilled {
        /// Hazard that killed the actor.
        cause: DeathCause,
        /// Lives left after the loss.
        lives_remaining: u8,
    },
    /// Confirms that the actor claimed a free exit slot.
    ExitClaimed {
        /// Index of the claimed slot within the hedge lane.
        slot: usize,
        /// Position where the occupied marker was placed.
        position: Vec2,
    },
    /// Announces that every exit slot is claimed.
    LevelWon,
    /// Confirms that the actor was returned to its starting cell.
    ActorRestored {
        /// Starting position the actor now occupies.
        position: Vec2,
    },
}

/// Hazards that can cost the actor a life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The actor overlapped a vehicle on a road lane.
    Vehicle,
    /// The actor stood in water without a log underneath.
    Drowned,
}

/// Transient visual state layered over the actor independently of its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActorOverlay {
    /// No overlay; the actor is drawn normally.
    #[default]
    None,
    /// The actor died and its remains mark the spot.
    Dead(DeathCause),
    /// The actor reached an exit and was replaced by the occupied marker.
    Rescued,
}

/// Cardinal movement directions available to the actor.
///
/// Rows grow upward, so `North` moves toward the hedge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Offset of a single hop measured in whole cells.
    #[must_use]
    pub const fn cell_offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Sprite rotation in degrees, counter-clockwise from north.
    #[must_use]
    pub const fn angle_degrees(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::West => 90.0,
            Self::South => 180.0,
            Self::East => 270.0,
        }
    }
}

/// Movement keys the level understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKey {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Letter `w`.
    W,
    /// Letter `a`.
    A,
    /// Letter `s`.
    S,
    /// Letter `d`.
    D,
}

impl MoveKey {
    /// Every supported movement key.
    pub const ALL: [MoveKey; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::W,
        Self::A,
        Self::S,
        Self::D,
    ];

    /// Direction requested by the key when held alone.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Up | Self::W => Direction::North,
            Self::Down | Self::S => Direction::South,
            Self::Left | Self::A => Direction::West,
            Self::Right | Self::D => Direction::East,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 1 << 0,
            Self::Down => 1 << 1,
            Self::Left => 1 << 2,
            Self::Right => 1 << 3,
            Self::W => 1 << 4,
            Self::A => 1 << 5,
            Self::S => 1 << 6,
            Self::D => 1 << 7,
        }
    }
}

/// Snapshot of the movement keys held down during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySet {
    bits: u8,
}

impl KeySet {
    /// Creates an empty key set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Builds a key set from the provided keys.
    #[must_use]
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = MoveKey>,
    {
        let mut set = Self::empty();
        for key in keys {
            set.press(key);
        }
        set
    }

    /// Marks the key as held.
    pub fn press(&mut self, key: MoveKey) {
        self.bits |= key.bit();
    }

    /// Reports whether the key is held.
    #[must_use]
    pub const fn contains(&self, key: MoveKey) -> bool {
        self.bits & key.bit() != 0
    }

    /// Reports whether no movement key is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Resolves the held keys to a single cardinal direction.
    ///
    /// Returns `None` when nothing is held or when the keys ask for more than
    /// one direction, whether opposite (up with down) or diagonal (up with
    /// left). Two keys naming the same direction, such as `w` and the up
    /// arrow, are not a conflict.
    #[must_use]
    pub fn resolve_direction(&self) -> Option<Direction> {
        let mut resolved: Option<Direction> = None;
        for key in MoveKey::ALL {
            if !self.contains(key) {
                continue;
            }
            let direction = key.direction();
            match resolved {
                None => resolved = Some(direction),
                Some(existing) if existing == direction => {}
                Some(_) => return None,
            }
        }
        resolved
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Row zero is the bottom lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Describes the square cell layout of a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
}

impl Grid {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_size: f32) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of lane rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Total height of the lanes in pixels.
    #[must_use]
    pub fn lanes_height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Pixel position of the center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            self.axis_center(cell.column() as i32),
            self.axis_center(cell.row() as i32),
        )
    }

    /// Pixel coordinate of the center of the cell at a signed index.
    ///
    /// Negative indices address cells left of the visible grid.
    #[must_use]
    pub fn axis_center(&self, index: i32) -> f32 {
        index as f32 * self.cell_size + self.cell_size / 2.0
    }

    /// Full-width strip covering the provided lane row.
    #[must_use]
    pub fn row_strip(&self, row: u32) -> Rect {
        Rect::from_min_size(
            Vec2::new(0.0, row as f32 * self.cell_size),
            Vec2::new(self.width(), self.cell_size),
        )
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its lower-left corner and size.
    #[must_use]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Creates a rectangle centered on the provided point.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Reports whether the interiors of the two rectangles intersect.
    ///
    /// Rectangles that only share an edge do not overlap, so grid-aligned
    /// entities in neighbouring cells never collide.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Reports whether the point lies inside the rectangle or on its boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Background kind of a lane, fixed when the lane is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    /// Safe ground.
    Grass,
    /// Traffic lane whose vehicles kill on contact.
    Road,
    /// Deadly water crossed by riding logs.
    Water,
    /// Goal lane holding the exit slots.
    Hedge,
}

impl LaneKind {
    /// Reports whether lanes of this kind must declare a scroll speed.
    #[must_use]
    pub const fn requires_speed(self) -> bool {
        matches!(self, Self::Road | Self::Water)
    }

    /// Lowercase name used by level descriptions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Road => "road",
            Self::Water => "water",
            Self::Hedge => "hedge",
        }
    }
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of an obstacle, assigned from the lane it was declared in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// A road vehicle. The model only selects the artwork.
    Vehicle {
        /// Artwork name taken from the level description.
        model: String,
    },
    /// A floating log the actor can ride.
    Log {
        /// Artwork name taken from the level description.
        model: String,
    },
    /// A claimable exit slot in the hedge.
    Exit,
    /// A gap in the hedge that is not an exit.
    Open,
    /// Scenery without gameplay effect.
    Decorative {
        /// Artwork name taken from the level description.
        model: String,
    },
}

impl ObstacleKind {
    /// Hedge object type naming a claimable exit slot.
    pub const EXIT_TYPE: &'static str = "exit";
    /// Hedge object type naming a gap that is not an exit.
    pub const OPEN_TYPE: &'static str = "open";

    /// Classifies an object declared in a lane of the provided kind.
    ///
    /// Everything on a road is a vehicle and everything on water is a log, so
    /// new artwork never needs a code change. Hedge objects must be either
    /// `exit` or `open`; anything else is rejected with `None`.
    #[must_use]
    pub fn classify(lane: LaneKind, declared: &str) -> Option<Self> {
        let model = declared.to_owned();
        match lane {
            LaneKind::Road => Some(Self::Vehicle { model }),
            LaneKind::Water => Some(Self::Log { model }),
            LaneKind::Grass => Some(Self::Decorative { model }),
            LaneKind::Hedge => match declared {
                Self::EXIT_TYPE => Some(Self::Exit),
                Self::OPEN_TYPE => Some(Self::Open),
                _ => None,
            },
        }
    }

    /// Reports whether the obstacle kills the actor on contact.
    #[must_use]
    pub const fn is_vehicle(&self) -> bool {
        matches!(self, Self::Vehicle { .. })
    }

    /// Reports whether the actor can ride the obstacle.
    #[must_use]
    pub const fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }
}

/// Horizontal orientation of an obstacle sprite, fixed at creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Drawn as authored.
    #[default]
    Forward,
    /// Flipped by 180 degrees because the lane scrolls toward negative x.
    Reversed,
}

impl Facing {
    /// Facing for obstacles of a lane scrolling with the provided speed.
    #[must_use]
    pub fn for_speed(speed: f32) -> Self {
        if speed < 0.0 {
            Self::Reversed
        } else {
            Self::Forward
        }
    }

    /// Sprite rotation in degrees.
    #[must_use]
    pub const fn angle_degrees(self) -> f32 {
        match self {
            Self::Forward => 0.0,
            Self::Reversed => 180.0,
        }
    }
}

/// Status values the outer shell needs to drive its state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelStatus {
    /// Whether the actor is currently visible.
    pub actor_visible: bool,
    /// Lives remaining, between zero and [`STARTING_LIVES`].
    pub lives: u8,
    /// Whether every exit slot has been claimed.
    pub won: bool,
}

/// Drawable entity emitted by the level, in pixel space with y growing upward.
#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    /// Background strip of a lane.
    LaneStrip {
        /// Background kind of the lane.
        kind: LaneKind,
        /// Area covered by the strip.
        bounds: Rect,
    },
    /// An obstacle owned by a lane.
    Obstacle {
        /// Identity of the obstacle.
        kind: ObstacleKind,
        /// Area covered by the obstacle.
        bounds: Rect,
        /// Orientation of the sprite.
        facing: Facing,
    },
    /// The live actor.
    Actor {
        /// Area covered by the actor.
        bounds: Rect,
        /// Direction the actor faces.
        heading: Direction,
    },
    /// Overlay left where a hidden actor died.
    ActorRemains {
        /// Area covered by the overlay.
        bounds: Rect,
        /// Reason the actor was hidden.
        overlay: ActorOverlay,
    },
    /// Anchor of the "LIVES" caption.
    LivesLabel {
        /// Right edge of the caption, vertically centered on the status row.
        anchor: Vec2,
    },
    /// One remaining life.
    LifeGlyph {
        /// Area covered by the glyph.
        bounds: Rect,
    },
    /// Marker occupying a claimed exit slot.
    ClaimedExit {
        /// Area covered by the marker.
        bounds: Rect,
    },
}

/// Receiver of drawable entities, implemented by rendering adapters.
pub trait DrawSurface {
    /// Accepts the next drawable in back-to-front order.
    fn emit(&mut self, drawable: Drawable);
}

impl DrawSurface for Vec<Drawable> {
    fn emit(&mut self, drawable: Drawable) {
        self.push(drawable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_resolves_to_its_direction() {
        let keys = KeySet::from_keys([MoveKey::A]);
        assert_eq!(keys.resolve_direction(), Some(Direction::West));
    }

    #[test]
    fn aliases_for_the_same_direction_do_not_conflict() {
        let keys = KeySet::from_keys([MoveKey::W, MoveKey::Up]);
        assert_eq!(keys.resolve_direction(), Some(Direction::North));
    }

    #[test]
    fn opposite_keys_are_rejected() {
        let keys = KeySet::from_keys([MoveKey::W, MoveKey::S]);
        assert_eq!(keys.resolve_direction(), None);
        let keys = KeySet::from_keys([MoveKey::Left, MoveKey::Right]);
        assert_eq!(keys.resolve_direction(), None);
    }

    #[test]
    fn diagonal_keys_are_rejected_across_key_families() {
        let keys = KeySet::from_keys([MoveKey::W, MoveKey::Left]);
        assert_eq!(keys.resolve_direction(), None);
    }

    #[test]
    fn empty_key_set_requests_nothing() {
        assert!(KeySet::empty().is_empty());
        assert_eq!(KeySet::empty().resolve_direction(), None);
    }

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let left = Rect::from_min_size(Vec2::ZERO, Vec2::splat(64.0));
        let right = Rect::from_min_size(Vec2::new(64.0, 0.0), Vec2::splat(64.0));
        assert!(!left.overlaps(&right));

        let nudged = Rect::from_min_size(Vec2::new(63.0, 0.0), Vec2::splat(64.0));
        assert!(left.overlaps(&nudged));
    }

    #[test]
    fn containment_includes_the_boundary() {
        let rect = Rect::from_center_size(Vec2::new(32.0, 32.0), Vec2::splat(64.0));
        assert!(rect.contains(Vec2::new(64.0, 0.0)));
        assert!(!rect.contains(Vec2::new(64.5, 32.0)));
    }

    #[test]
    fn cell_centers_follow_the_cell_size() {
        let grid = Grid::new(5, 3, 64.0);
        assert_eq!(grid.cell_center(CellCoord::new(3, 0)), Vec2::new(224.0, 32.0));
        assert_eq!(grid.axis_center(-1), -32.0);
        assert_eq!(grid.row_strip(2).min(), Vec2::new(0.0, 128.0));
        assert_eq!(grid.row_strip(2).max(), Vec2::new(320.0, 192.0));
    }

    #[test]
    fn hedge_objects_must_be_exit_or_open() {
        assert_eq!(
            ObstacleKind::classify(LaneKind::Hedge, "exit"),
            Some(ObstacleKind::Exit)
        );
        assert_eq!(
            ObstacleKind::classify(LaneKind::Hedge, "open"),
            Some(ObstacleKind::Open)
        );
        assert_eq!(ObstacleKind::classify(LaneKind::Hedge, "car1"), None);
    }

    #[test]
    fn road_objects_are_vehicles_whatever_their_artwork() {
        let kind = ObstacleKind::classify(LaneKind::Road, "truck7").expect("road object");
        assert!(kind.is_vehicle());
        assert!(!kind.is_log());
    }

    #[test]
    fn facing_flips_for_negative_speed_only() {
        assert_eq!(Facing::for_speed(-60.0), Facing::Reversed);
        assert_eq!(Facing::for_speed(60.0), Facing::Forward);
        assert_eq!(Facing::for_speed(0.0), Facing::Forward);
    }
}
