use froggit_core::{Facing, Grid, LaneKind, LaneRecord, ObstacleKind, Rect};
use glam::Vec2;

use crate::hedge::Hedge;

/// Rectangular entity owned by a lane.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    kind: ObstacleKind,
    center: Vec2,
    size: Vec2,
    facing: Facing,
}

impl Obstacle {
    /// Identity assigned when the level was loaded.
    #[must_use]
    pub fn kind(&self) -> &ObstacleKind {
        &self.kind
    }

    /// Current center of the obstacle in pixels.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Orientation fixed at creation.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Box currently covered by the obstacle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }
}

/// Kind-specific state of a lane. Speeds are signed pixels per second.
#[derive(Clone, Debug)]
enum Terrain {
    Grass,
    Road { speed: f32 },
    Water { speed: f32 },
    Hedge(Hedge),
}

/// One horizontal strip of the level.
#[derive(Clone, Debug)]
pub struct Lane {
    strip: Rect,
    wrap_margin: f32,
    obstacles: Vec<Obstacle>,
    terrain: Terrain,
}

impl Lane {
    /// Builds the lane occupying `row` from a record that already passed
    /// [`froggit_core::LevelDescription::validate`].
    pub(crate) fn from_record(row: u32, record: &LaneRecord, grid: &Grid, offscreen: u32) -> Self {
        let cell = grid.cell_size();
        let speed = record.speed.unwrap_or_default();
        let facing = match record.kind {
            LaneKind::Road | LaneKind::Water => Facing::for_speed(speed),
            LaneKind::Grass | LaneKind::Hedge => Facing::Forward,
        };

        let obstacles: Vec<Obstacle> = record
            .objects
            .iter()
            .filter_map(|object| {
                let kind = ObstacleKind::classify(record.kind, &object.kind)?;
                let size = Vec2::new(object.width as f32 * cell, cell);
                let center = Vec2::new(
                    object.position as f32 * cell + size.x / 2.0,
                    grid.axis_center(row as i32),
                );
                Some(Obstacle {
                    kind,
                    center,
                    size,
                    facing,
                })
            })
            .collect();

        let terrain = match record.kind {
            LaneKind::Grass => Terrain::Grass,
            LaneKind::Road => Terrain::Road { speed },
            LaneKind::Water => Terrain::Water { speed },
            LaneKind::Hedge => Terrain::Hedge(Hedge::new(&obstacles)),
        };

        Self {
            strip: grid.row_strip(row),
            wrap_margin: offscreen as f32 * cell,
            obstacles,
            terrain,
        }
    }

    /// Background kind of the lane.
    #[must_use]
    pub fn kind(&self) -> LaneKind {
        match self.terrain {
            Terrain::Grass => LaneKind::Grass,
            Terrain::Road { .. } => LaneKind::Road,
            Terrain::Water { .. } => LaneKind::Water,
            Terrain::Hedge(_) => LaneKind::Hedge,
        }
    }

    /// Signed scroll speed, present only for road and water lanes.
    #[must_use]
    pub fn speed(&self) -> Option<f32> {
        match self.terrain {
            Terrain::Road { speed } | Terrain::Water { speed } => Some(speed),
            Terrain::Grass | Terrain::Hedge(_) => None,
        }
    }

    /// Full-width background strip.
    #[must_use]
    pub fn strip(&self) -> Rect {
        self.strip
    }

    /// Obstacles in declaration order.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Exit bookkeeping when the lane is a hedge.
    #[must_use]
    pub fn hedge(&self) -> Option<&Hedge> {
        match &self.terrain {
            Terrain::Hedge(hedge) => Some(hedge),
            _ => None,
        }
    }

    pub(crate) fn hedge_parts_mut(&mut self) -> Option<(&mut Hedge, &[Obstacle])> {
        match &mut self.terrain {
            Terrain::Hedge(hedge) => Some((hedge, &self.obstacles)),
            _ => None,
        }
    }

    /// Scrolls every obstacle by `speed * dt` and wraps those that left the
    /// buffer zone around to the opposite side.
    pub(crate) fn advance(&mut self, dt: f32, level_width: f32) {
        let Some(speed) = self.speed() else {
            return;
        };
        let margin = self.wrap_margin;
        let delta = speed * dt;
        for obstacle in &mut self.obstacles {
            obstacle.center.x += delta;
            if speed > 0.0 && obstacle.center.x > level_width + margin {
                obstacle.center.x = -margin;
            } else if speed < 0.0 && obstacle.center.x < -margin {
                obstacle.center.x = level_width + margin;
            }
        }
    }

    pub(crate) fn vehicle_overlaps(&self, bounds: &Rect) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.kind.is_vehicle() && obstacle.bounds().overlaps(bounds))
    }

    pub(crate) fn log_contains(&self, point: Vec2) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.kind.is_log() && obstacle.bounds().contains(point))
    }
}
