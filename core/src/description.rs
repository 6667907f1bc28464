use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LaneKind, ObstacleKind};

/// Parsed level file describing the grid, the lanes and the actor start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Grid dimensions as `[columns, rows]`.
    pub size: [u32; 2],
    /// Starting cell of the actor as `[column, row]`.
    pub start: [u32; 2],
    /// Width of the off-screen wrap buffer measured in cells.
    pub offscreen: u32,
    /// Lanes ordered from the bottom row upward.
    pub lanes: Vec<LaneRecord>,
}

/// Single lane entry of a level description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    /// Background kind of the lane.
    #[serde(rename = "type")]
    pub kind: LaneKind,
    /// Signed scroll speed in pixels per second, required for road and water.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Obstacles placed in the lane.
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

/// Single obstacle entry of a lane record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Declared object type. Artwork name on roads, water and grass.
    #[serde(rename = "type")]
    pub kind: String,
    /// Column of the obstacle's leftmost cell, possibly off-screen.
    pub position: i32,
    /// Horizontal footprint in cells.
    #[serde(default = "ObjectRecord::default_width")]
    pub width: u32,
}

impl ObjectRecord {
    const fn default_width() -> u32 {
        1
    }
}

/// Reasons a level description cannot produce a playable level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The document is not valid JSON or does not match the level format.
    #[error("level description is malformed: {0}")]
    Json(#[from] serde_json::Error),
    /// The grid has no cells.
    #[error("level grid {columns}x{rows} has no cells")]
    EmptyGrid {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
    },
    /// The number of lanes does not match the declared row count.
    #[error("level declares {declared} rows but lists {found} lanes")]
    LaneCountMismatch {
        /// Row count declared by `size`.
        declared: u32,
        /// Number of lane records present.
        found: usize,
    },
    /// The actor would start outside the grid.
    #[error("start cell ({column}, {row}) lies outside the grid")]
    StartOutOfBounds {
        /// Declared start column.
        column: u32,
        /// Declared start row.
        row: u32,
    },
    /// A scrolling lane lacks its speed.
    #[error("{kind} lane {lane} has no speed")]
    MissingSpeed {
        /// Index of the offending lane, counted from the bottom.
        lane: usize,
        /// Kind of the offending lane.
        kind: LaneKind,
    },
    /// A hedge object is neither an exit nor an open gap.
    #[error("hedge lane {lane} contains unknown object type `{kind}`")]
    UnknownObstacle {
        /// Index of the offending lane, counted from the bottom.
        lane: usize,
        /// Declared object type.
        kind: String,
    },
    /// More than one lane is a hedge.
    #[error("lanes {first} and {second} are both hedges")]
    DuplicateHedge {
        /// Index of the first hedge lane, counted from the bottom.
        first: usize,
        /// Index of the second hedge lane, counted from the bottom.
        second: usize,
    },
    /// An obstacle has no horizontal footprint.
    #[error("object {index} of lane {lane} has zero width")]
    ZeroWidthObstacle {
        /// Index of the offending lane, counted from the bottom.
        lane: usize,
        /// Index of the offending object within its lane.
        index: usize,
    },
}

impl LevelDescription {
    /// Parses and validates a level description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Json`] when the text is not a level document and
    /// any other variant when the document is inconsistent.
    pub fn from_json_str(source: &str) -> Result<Self, LevelError> {
        let description: Self = serde_json::from_str(source)?;
        description.validate()?;
        Ok(description)
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.size[0]
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.size[1]
    }

    /// Checks the structural rules every playable level satisfies.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), LevelError> {
        let (columns, rows) = (self.columns(), self.rows());
        if columns == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid { columns, rows });
        }
        if self.lanes.len() != rows as usize {
            return Err(LevelError::LaneCountMismatch {
                declared: rows,
                found: self.lanes.len(),
            });
        }
        let [column, row] = self.start;
        if column >= columns || row >= rows {
            return Err(LevelError::StartOutOfBounds { column, row });
        }

        let mut hedge = None;
        for (lane, record) in self.lanes.iter().enumerate() {
            if record.kind == LaneKind::Hedge {
                if let Some(first) = hedge {
                    return Err(LevelError::DuplicateHedge {
                        first,
                        second: lane,
                    });
                }
                hedge = Some(lane);
            }
            if record.kind.requires_speed() && record.speed.is_none() {
                return Err(LevelError::MissingSpeed {
                    lane,
                    kind: record.kind,
                });
            }
            for (index, object) in record.objects.iter().enumerate() {
                if object.width == 0 {
                    return Err(LevelError::ZeroWidthObstacle { lane, index });
                }
                if ObstacleKind::classify(record.kind, &object.kind).is_none() {
                    return Err(LevelError::UnknownObstacle {
                        lane,
                        kind: object.kind.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_LEVEL: &str = r#"{
        "size": [5, 3],
        "start": [2, 0],
        "offscreen": 2,
        "lanes": [
            {"type": "grass"},
            {"type": "road", "speed": -60, "objects": [{"type": "car1", "position": 3}]},
            {"type": "hedge", "objects": [
                {"type": "exit", "position": 1},
                {"type": "open", "position": 2},
                {"type": "exit", "position": 3}
            ]}
        ]
    }"#;

    #[test]
    fn parses_the_level_format() {
        let description = LevelDescription::from_json_str(SMALL_LEVEL).expect("valid level");
        assert_eq!(description.columns(), 5);
        assert_eq!(description.rows(), 3);
        assert_eq!(description.lanes[1].kind, LaneKind::Road);
        assert_eq!(description.lanes[1].speed, Some(-60.0));
        assert_eq!(description.lanes[1].objects[0].width, 1);
        assert!(description.lanes[0].objects.is_empty());
    }

    #[test]
    fn road_without_speed_is_rejected() {
        let source = SMALL_LEVEL.replace(r#""speed": -60, "#, "");
        let error = LevelDescription::from_json_str(&source).expect_err("missing speed");
        assert!(matches!(
            error,
            LevelError::MissingSpeed {
                lane: 1,
                kind: LaneKind::Road
            }
        ));
    }

    #[test]
    fn unknown_lane_kind_is_a_parse_error() {
        let source = SMALL_LEVEL.replace(r#""type": "grass""#, r#""type": "lava""#);
        let error = LevelDescription::from_json_str(&source).expect_err("unknown lane");
        assert!(matches!(error, LevelError::Json(_)));
    }

    #[test]
    fn unknown_hedge_object_is_rejected() {
        let source = SMALL_LEVEL.replace(r#""type": "open""#, r#""type": "car2""#);
        let error = LevelDescription::from_json_str(&source).expect_err("bad hedge object");
        assert!(matches!(error, LevelError::UnknownObstacle { lane: 2, .. }));
    }

    #[test]
    fn lane_count_must_match_rows() {
        let source = SMALL_LEVEL.replace("[5, 3]", "[5, 4]");
        let error = LevelDescription::from_json_str(&source).expect_err("row mismatch");
        assert!(matches!(
            error,
            LevelError::LaneCountMismatch {
                declared: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn start_must_lie_inside_the_grid() {
        let source = SMALL_LEVEL.replace("[2, 0]", "[5, 0]");
        let error = LevelDescription::from_json_str(&source).expect_err("start outside");
        assert!(matches!(
            error,
            LevelError::StartOutOfBounds { column: 5, row: 0 }
        ));
    }

    #[test]
    fn a_second_hedge_lane_is_rejected() {
        let source = SMALL_LEVEL.replace(r#"{"type": "grass"}"#, r#"{"type": "hedge"}"#);
        let error = LevelDescription::from_json_str(&source).expect_err("two hedges");
        assert!(matches!(
            error,
            LevelError::DuplicateHedge {
                first: 0,
                second: 2
            }
        ));
    }

    #[test]
    fn zero_width_objects_are_rejected() {
        let source = SMALL_LEVEL.replace(
            r#"{"type": "car1", "position": 3}"#,
            r#"{"type": "car1", "position": 3, "width": 0}"#,
        );
        let error = LevelDescription::from_json_str(&source).expect_err("zero width");
        assert!(matches!(
            error,
            LevelError::ZeroWidthObstacle { lane: 1, index: 0 }
        ));
    }
}
