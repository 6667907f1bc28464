#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Froggit.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::{ensure, Result};
use froggit_core::{Direction, Drawable, Facing, KeySet, MoveKey, Rect};
use froggit_rendering::{Color, FrameInput, Palette, Presentation, RenderingBackend, Scene};
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use std::time::{Duration, Instant};

const TITLE_FONT_SIZE: f32 = 64.0;
const MESSAGE_FONT_SIZE: f32 = 28.0;
const LABEL_FONT_SIZE: f32 = 24.0;

const MOVE_BINDINGS: [(KeyCode, MoveKey); 8] = [
    (KeyCode::Up, MoveKey::Up),
    (KeyCode::Down, MoveKey::Down),
    (KeyCode::Left, MoveKey::Left),
    (KeyCode::Right, MoveKey::Right),
    (KeyCode::W, MoveKey::W),
    (KeyCode::A, MoveKey::A),
    (KeyCode::S, MoveKey::S),
    (KeyCode::D, MoveKey::D),
];

#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `S` or `Enter` starts a level.
    start: bool,
    /// `C` restores the actor after a death.
    resume: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            start: is_key_pressed(KeyCode::S) || is_key_pressed(KeyCode::Enter),
            resume: is_key_pressed(KeyCode::C),
        }
    }
}

fn held_keys<F>(is_down: F) -> KeySet
where
    F: Fn(KeyCode) -> bool,
{
    KeySet::from_keys(
        MOVE_BINDINGS
            .iter()
            .filter(|(code, _)| is_down(*code))
            .map(|(_, key)| *key),
    )
}

fn gather_frame_input(keyboard: KeyboardShortcuts) -> FrameInput {
    FrameInput {
        keys: held_keys(is_key_down),
        start: keyboard.start,
        resume: keyboard.resume,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

/// Per-second frame rate and average update and render cost.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsReport {
    frames_per_second: f32,
    update: Duration,
    render: Duration,
}

/// Accumulates frame timings until a full second has elapsed.
#[derive(Debug, Default)]
struct FpsCounter {
    totals: FrameBreakdown,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsReport> {
        self.totals.frame += breakdown.frame;
        self.totals.update += breakdown.update;
        self.totals.render += breakdown.render;
        self.frames = self.frames.saturating_add(1);

        if self.totals.frame < Duration::from_secs(1) {
            return None;
        }

        let totals = std::mem::take(&mut self.totals);
        let frames = std::mem::take(&mut self.frames);
        Some(FpsReport {
            frames_per_second: frames as f32 / totals.frame.as_secs_f32(),
            update: totals.update / frames,
            render: totals.render / frames,
        })
    }
}

fn window_dimension(value: f32) -> Result<i32> {
    ensure!(
        value.is_finite() && value >= 1.0 && value <= i32::MAX as f32,
        "scene dimension {value} cannot size a window"
    );
    Ok(value.round() as i32)
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            palette,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_dimension(scene.width)?,
            window_height: window_dimension(scene.height)?,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(keyboard);

                let update_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                for drawable in &scene.drawables {
                    draw_drawable(drawable, &palette, &metrics);
                }
                draw_captions(&scene, &palette, &metrics);
                let render_duration = render_start.elapsed();

                let report = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if let Some(report) = report.filter(|_| show_fps) {
                    log::info!(
                        "FPS: {:.2} | update: {:>6.2}ms render: {:>6.2}ms",
                        report.frames_per_second,
                        report.update.as_secs_f64() * 1_000.0,
                        report.render.as_secs_f64() * 1_000.0,
                    );
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps world pixels (y up) onto the screen (y down) with a uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    world_height: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let scale = if scene.width <= 0.0 || scene.height <= 0.0 {
            1.0
        } else {
            (screen_width / scene.width).min(screen_height / scene.height)
        };
        Self {
            scale,
            offset_x: ((screen_width - scene.width * scale) * 0.5).max(0.0),
            offset_y: ((screen_height - scene.height * scale) * 0.5).max(0.0),
            world_height: scene.height,
        }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + (self.world_height - point.y) * self.scale,
        )
    }

    /// Screen rectangle as `(left, top, width, height)`.
    fn screen_rect(&self, rect: &Rect) -> (f32, f32, f32, f32) {
        let top_left = self.to_screen(Vec2::new(rect.min().x, rect.max().y));
        let size = rect.size() * self.scale;
        (top_left.x, top_left.y, size.x, size.y)
    }
}

fn draw_drawable(drawable: &Drawable, palette: &Palette, metrics: &SceneMetrics) {
    match drawable {
        Drawable::LaneStrip { kind, bounds } => fill_rect(bounds, palette.lane(*kind), metrics),
        Drawable::Obstacle {
            kind,
            bounds,
            facing,
        } => {
            let color = palette.obstacle(kind);
            fill_rect(bounds, color, metrics);
            if kind.is_vehicle() {
                draw_vehicle_front(bounds, *facing, color, metrics);
            }
        }
        Drawable::Actor { bounds, heading } => {
            let body = inset(bounds, 0.15);
            fill_rect(&body, palette.actor, metrics);
            draw_heading_marker(&body, *heading, palette.actor.lighten(0.5), metrics);
        }
        Drawable::ActorRemains { bounds, overlay } => {
            if let Some(color) = palette.overlay(*overlay) {
                fill_rect(&inset(bounds, 0.25), color, metrics);
            }
        }
        Drawable::LivesLabel { anchor } => {
            let label = "LIVES:";
            let size = LABEL_FONT_SIZE * metrics.scale;
            let width = text_width(label, size);
            let position = metrics.to_screen(*anchor);
            let _ = macroquad::text::draw_text(
                label,
                position.x - width - 8.0 * metrics.scale,
                position.y + size * 0.3,
                size,
                to_macroquad_color(palette.text),
            );
        }
        Drawable::LifeGlyph { bounds } => {
            fill_rect(&inset(bounds, 0.2), palette.actor, metrics);
        }
        Drawable::ClaimedExit { bounds } => {
            let body = inset(bounds, 0.15);
            fill_rect(&body, palette.rescued, metrics);
            draw_heading_marker(&body, Direction::South, palette.rescued.lighten(0.5), metrics);
        }
    }
}

fn draw_captions(scene: &Scene, palette: &Palette, metrics: &SceneMetrics) {
    let center_x = scene.width * 0.5;
    let center_y = scene.height * 0.5;
    let color = to_macroquad_color(palette.text);

    if let Some(title) = &scene.title {
        let size = TITLE_FONT_SIZE * metrics.scale;
        let anchor = metrics.to_screen(Vec2::new(center_x, center_y + TITLE_FONT_SIZE));
        let _ = macroquad::text::draw_text(
            title,
            anchor.x - text_width(title, size) * 0.5,
            anchor.y,
            size,
            color,
        );
    }
    if let Some(message) = &scene.message {
        let size = MESSAGE_FONT_SIZE * metrics.scale;
        let anchor = metrics.to_screen(Vec2::new(center_x, center_y));
        let width = text_width(message, size);
        macroquad::shapes::draw_rectangle(
            anchor.x - width * 0.5 - size * 0.5,
            anchor.y - size,
            width + size,
            size * 1.5,
            macroquad::color::Color::new(0.0, 0.0, 0.0, 0.6),
        );
        let _ = macroquad::text::draw_text(message, anchor.x - width * 0.5, anchor.y, size, color);
    }
}

fn text_width(text: &str, font_size: f32) -> f32 {
    macroquad::text::measure_text(text, None, font_size.max(1.0) as u16, 1.0).width
}

fn fill_rect(rect: &Rect, color: Color, metrics: &SceneMetrics) {
    let (x, y, width, height) = metrics.screen_rect(rect);
    macroquad::shapes::draw_rectangle(x, y, width, height, to_macroquad_color(color));
}

fn inset(rect: &Rect, fraction: f32) -> Rect {
    let size = rect.size() * (1.0 - fraction);
    Rect::from_center_size(rect.center(), size)
}

/// Darkened band on the side a vehicle drives toward.
fn draw_vehicle_front(bounds: &Rect, facing: Facing, color: Color, metrics: &SceneMetrics) {
    let band = bounds.size().y * 0.25;
    let left = match facing {
        Facing::Forward => bounds.max().x - band,
        Facing::Reversed => bounds.min().x,
    };
    let front = Rect::from_min_size(
        Vec2::new(left, bounds.min().y),
        Vec2::new(band, bounds.size().y),
    );
    let shade = Color::new(color.red * 0.6, color.green * 0.6, color.blue * 0.6, 1.0);
    fill_rect(&front, shade, metrics);
}

/// Small square pushed toward the side the sprite faces.
fn draw_heading_marker(bounds: &Rect, heading: Direction, color: Color, metrics: &SceneMetrics) {
    let (dx, dy) = heading.cell_offset();
    let offset = Vec2::new(dx as f32, dy as f32) * bounds.size() * 0.3;
    let marker = Rect::from_center_size(bounds.center() + offset, bounds.size() * 0.3);
    fill_rect(&marker, color, metrics);
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(width: f32, height: f32) -> Scene {
        Scene::new(width, height).expect("valid scene")
    }

    #[test]
    fn metrics_flip_the_vertical_axis() {
        let metrics = SceneMetrics::from_scene(&scene(320.0, 256.0), 320.0, 256.0);

        assert_eq!(metrics.to_screen(Vec2::ZERO), Vec2::new(0.0, 256.0));
        let cell = Rect::from_min_size(Vec2::new(64.0, 0.0), Vec2::splat(64.0));
        assert_eq!(metrics.screen_rect(&cell), (64.0, 192.0, 64.0, 64.0));
    }

    #[test]
    fn metrics_letterbox_wide_screens() {
        let metrics = SceneMetrics::from_scene(&scene(320.0, 256.0), 1280.0, 512.0);

        assert_eq!(metrics.scale, 2.0);
        assert_eq!(metrics.offset_x, 320.0);
        assert_eq!(metrics.offset_y, 0.0);
    }

    #[test]
    fn held_keys_map_to_move_keys() {
        let keys = held_keys(|code| matches!(code, KeyCode::W | KeyCode::Up));

        assert!(keys.contains(MoveKey::W));
        assert!(keys.contains(MoveKey::Up));
        assert_eq!(keys.resolve_direction(), Some(Direction::North));
    }

    #[test]
    fn window_dimension_rejects_degenerate_sizes() {
        assert_eq!(window_dimension(320.0).expect("valid width"), 320);
        assert!(window_dimension(0.0).is_err());
        assert!(window_dimension(f32::INFINITY).is_err());
    }

    #[test]
    fn inset_shrinks_around_the_center() {
        let rect = Rect::from_min_size(Vec2::ZERO, Vec2::splat(100.0));
        let shrunk = inset(&rect, 0.2);
        assert_eq!(shrunk.center(), rect.center());
        assert_eq!(shrunk.size(), Vec2::splat(80.0));
    }

    #[test]
    fn fps_counter_reports_once_per_second_of_frames() {
        let mut counter = FpsCounter::default();
        let quarter = FrameBreakdown {
            frame: Duration::from_millis(250),
            update: Duration::from_millis(2),
            render: Duration::from_millis(6),
        };
        for _ in 0..3 {
            assert_eq!(counter.record_frame(quarter), None);
        }

        assert_eq!(
            counter.record_frame(quarter),
            Some(FpsReport {
                frames_per_second: 4.0,
                update: Duration::from_millis(2),
                render: Duration::from_millis(6),
            })
        );
        assert_eq!(counter.record_frame(quarter), None);
    }
}
