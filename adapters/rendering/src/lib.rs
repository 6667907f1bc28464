#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Froggit adapters.

use anyhow::Result as AnyResult;
use froggit_core::{
    ActorOverlay, DeathCause, DrawSurface, Drawable, KeySet, LaneKind, ObstacleKind,
};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors used to paint each kind of drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Grass strips.
    pub grass: Color,
    /// Road strips.
    pub road: Color,
    /// Water strips.
    pub water: Color,
    /// Hedge strips.
    pub hedge: Color,
    /// Vehicles.
    pub vehicle: Color,
    /// Logs.
    pub log: Color,
    /// Free exit slots.
    pub exit: Color,
    /// Open gaps in the hedge.
    pub open: Color,
    /// Scenery on grass.
    pub decorative: Color,
    /// The live actor.
    pub actor: Color,
    /// Remains of an actor hit by a vehicle.
    pub squashed: Color,
    /// Remains of a drowned actor.
    pub drowned: Color,
    /// Occupied exit markers.
    pub rescued: Color,
    /// Captions and banners.
    pub text: Color,
}

impl Palette {
    /// Default palette evoking the arcade original.
    #[must_use]
    pub fn classic() -> Self {
        let actor = Color::from_rgb_u8(0x3c, 0xb3, 0x4a);
        let water = Color::from_rgb_u8(0x1f, 0x4e, 0x9c);
        Self {
            grass: Color::from_rgb_u8(0x2e, 0x6b, 0x2a),
            road: Color::from_rgb_u8(0x30, 0x30, 0x34),
            water,
            hedge: Color::from_rgb_u8(0x1b, 0x4d, 0x1e),
            vehicle: Color::from_rgb_u8(0xd9, 0x3b, 0x2f),
            log: Color::from_rgb_u8(0x7a, 0x4e, 0x24),
            exit: water.lighten(0.25),
            open: Color::from_rgb_u8(0x12, 0x36, 0x14),
            decorative: Color::from_rgb_u8(0xe8, 0xc5, 0x3a),
            actor,
            squashed: Color::from_rgb_u8(0x8b, 0x1a, 0x1a),
            drowned: water.lighten(0.6),
            rescued: Color::from_rgb_u8(0x3a, 0x7b, 0xd5),
            text: Color::from_rgb_u8(0x34, 0x94, 0x41).lighten(0.2),
        }
    }

    /// Background color of a lane strip.
    #[must_use]
    pub fn lane(&self, kind: LaneKind) -> Color {
        match kind {
            LaneKind::Grass => self.grass,
            LaneKind::Road => self.road,
            LaneKind::Water => self.water,
            LaneKind::Hedge => self.hedge,
        }
    }

    /// Fill color of an obstacle.
    #[must_use]
    pub fn obstacle(&self, kind: &ObstacleKind) -> Color {
        match kind {
            ObstacleKind::Vehicle { .. } => self.vehicle,
            ObstacleKind::Log { .. } => self.log,
            ObstacleKind::Exit => self.exit,
            ObstacleKind::Open => self.open,
            ObstacleKind::Decorative { .. } => self.decorative,
        }
    }

    /// Fill color of the overlay left behind by a hidden actor.
    #[must_use]
    pub fn overlay(&self, overlay: ActorOverlay) -> Option<Color> {
        match overlay {
            ActorOverlay::None => None,
            ActorOverlay::Dead(DeathCause::Vehicle) => Some(self.squashed),
            ActorOverlay::Dead(DeathCause::Drowned) => Some(self.drowned),
            ActorOverlay::Rescued => Some(self.rescued),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Movement keys held down during the frame.
    pub keys: KeySet,
    /// Whether the start key went down on this frame.
    pub start: bool,
    /// Whether the resume key went down on this frame.
    pub resume: bool,
}

/// Scene description consumed by backends, in world pixels with y up.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Width of the world in pixels.
    pub width: f32,
    /// Height of the world in pixels.
    pub height: f32,
    /// Drawables in back-to-front order.
    pub drawables: Vec<Drawable>,
    /// Large caption centered on the screen, such as the game title.
    pub title: Option<String>,
    /// Prompt or banner drawn beneath the title.
    pub message: Option<String>,
}

impl Scene {
    /// Creates an empty scene of the provided dimensions.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(width: f32, height: f32) -> std::result::Result<Self, RenderingError> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            drawables: Vec::new(),
            title: None,
            message: None,
        })
    }

    /// Resizes the scene, keeping its contents.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn resize(&mut self, width: f32, height: f32) -> std::result::Result<(), RenderingError> {
        validate_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Removes every drawable and caption.
    pub fn clear(&mut self) {
        self.drawables.clear();
        self.title = None;
        self.message = None;
    }

    /// Dimensions of the scene as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl DrawSurface for Scene {
    fn emit(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }
}

fn validate_dimensions(width: f32, height: f32) -> std::result::Result<(), RenderingError> {
    let valid = |value: f32| value.is_finite() && value > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(RenderingError::InvalidDimensions { width, height })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Colors used to paint the drawables.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Froggit scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Scene dimensions must be positive and finite.
    InvalidDimensions {
        /// Provided width that failed validation.
        width: f32,
        /// Provided height that failed validation.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(
                    f,
                    "scene dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use froggit_core::Rect;

    #[test]
    fn scene_creation_accepts_positive_dimensions() {
        let scene = Scene::new(320.0, 256.0).expect("positive dimensions should succeed");

        assert_eq!(scene.size(), Vec2::new(320.0, 256.0));
        assert!(scene.drawables.is_empty());
    }

    #[test]
    fn scene_creation_rejects_degenerate_dimensions_without_panicking() {
        let error = Scene::new(0.0, 256.0).expect_err("zero width must be rejected");
        assert!(matches!(error, RenderingError::InvalidDimensions { .. }));

        let error = Scene::new(320.0, f32::NAN).expect_err("NaN height must be rejected");
        assert!(matches!(error, RenderingError::InvalidDimensions { .. }));
    }

    #[test]
    fn failed_resize_keeps_previous_dimensions() {
        let mut scene = Scene::new(320.0, 256.0).expect("valid scene");
        assert!(scene.resize(-1.0, 10.0).is_err());
        assert_eq!(scene.size(), Vec2::new(320.0, 256.0));
    }

    #[test]
    fn scene_collects_emitted_drawables_until_cleared() {
        let mut scene = Scene::new(64.0, 64.0).expect("valid scene");
        scene.emit(Drawable::LifeGlyph {
            bounds: Rect::from_min_size(Vec2::ZERO, Vec2::splat(64.0)),
        });
        scene.message = Some("PRESS 'C' TO CONTINUE".to_owned());
        assert_eq!(scene.drawables.len(), 1);

        scene.clear();

        assert!(scene.drawables.is_empty());
        assert_eq!(scene.message, None);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn palette_colors_overlays_by_cause() {
        let palette = Palette::classic();
        assert_eq!(palette.overlay(ActorOverlay::None), None);
        assert_eq!(
            palette.overlay(ActorOverlay::Dead(DeathCause::Drowned)),
            Some(palette.drowned)
        );
        assert_eq!(palette.obstacle(&ObstacleKind::Exit), palette.exit);
    }
}
