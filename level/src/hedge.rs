use froggit_core::{ObstacleKind, Rect};
use glam::Vec2;

use crate::lane::Obstacle;

/// Exit bookkeeping of the goal lane.
#[derive(Clone, Debug)]
pub struct Hedge {
    slots: Vec<ExitSlot>,
    claims: Vec<Vec2>,
}

#[derive(Clone, Copy, Debug)]
struct ExitSlot {
    obstacle: usize,
    claimed: bool,
}

/// What the hedge found at the actor's settled position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HedgeContact {
    /// The position lies inside a free exit slot.
    FreeExit(usize),
    /// The position lies inside an open gap.
    Open,
}

impl Hedge {
    /// Derives the exit slots from the lane's obstacles.
    pub(crate) fn new(obstacles: &[Obstacle]) -> Self {
        let slots = obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| *obstacle.kind() == ObstacleKind::Exit)
            .map(|(obstacle, _)| ExitSlot {
                obstacle,
                claimed: false,
            })
            .collect();
        Self {
            slots,
            claims: Vec::new(),
        }
    }

    /// Number of exit slots the lane started with.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Positions of the occupied markers in claim order.
    #[must_use]
    pub fn claimed(&self) -> &[Vec2] {
        &self.claims
    }

    /// Reports whether every exit slot is claimed.
    ///
    /// A hedge without exit slots can never be completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.claims.len() == self.slots.len()
    }

    /// Lists the free exits and open gaps containing `point`, in declaration
    /// order. Claimed exits are skipped; their markers block instead.
    pub(crate) fn contacts(&self, obstacles: &[Obstacle], point: Vec2) -> Vec<HedgeContact> {
        obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| obstacle.bounds().contains(point))
            .filter_map(|(index, obstacle)| match obstacle.kind() {
                ObstacleKind::Open => Some(HedgeContact::Open),
                ObstacleKind::Exit => self
                    .slots
                    .iter()
                    .position(|slot| slot.obstacle == index && !slot.claimed)
                    .map(HedgeContact::FreeExit),
                ObstacleKind::Vehicle { .. }
                | ObstacleKind::Log { .. }
                | ObstacleKind::Decorative { .. } => None,
            })
            .collect()
    }

    /// Marks the slot as taken and places an occupied marker at `position`.
    pub(crate) fn claim(&mut self, slot: usize, position: Vec2) {
        if let Some(entry) = self.slots.get_mut(slot) {
            if !entry.claimed {
                entry.claimed = true;
                self.claims.push(position);
            }
        }
    }

    /// Reports whether any of the first `settled` markers overlaps `bounds`.
    pub(crate) fn markers_block(&self, settled: usize, bounds: &Rect, cell_size: f32) -> bool {
        self.claims
            .iter()
            .take(settled)
            .any(|claim| marker_bounds(*claim, cell_size).overlaps(bounds))
    }
}

/// Box covered by an occupied marker placed at `position`.
pub(crate) fn marker_bounds(position: Vec2, cell_size: f32) -> Rect {
    Rect::from_center_size(position, Vec2::splat(cell_size))
}
