#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Froggit window.

mod game;
mod settings;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use froggit_core::{LevelDescription, TITLE_BANNER};
use froggit_rendering::{Color, Palette, Presentation, RenderingBackend, Scene};
use froggit_rendering_macroquad::MacroquadBackend;

use crate::{game::Game, settings::Settings};

const DEFAULT_LEVEL: &str = include_str!("../../../levels/default.json");

/// Command-line arguments accepted by the Froggit binary.
#[derive(Debug, Parser)]
#[command(name = "froggit", about = "Guide the frog across the road and the river")]
struct Args {
    /// Level description in JSON. The bundled level is used when omitted.
    level: Option<PathBuf>,

    /// Settings file in TOML.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the vsync setting.
    #[arg(long, value_enum)]
    vsync: Option<Toggle>,

    /// Logs frame timings once per second.
    #[arg(long)]
    show_fps: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

fn load_description(path: Option<&PathBuf>) -> Result<LevelDescription> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read level file {}", path.display()))?;
            LevelDescription::from_json_str(&contents)
                .with_context(|| format!("invalid level file {}", path.display()))
        }
        None => LevelDescription::from_json_str(DEFAULT_LEVEL)
            .context("bundled level description is invalid"),
    }
}

/// Entry point for the Froggit command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(toggle) = args.vsync {
        settings.vsync = toggle.into();
    }
    settings.show_fps |= args.show_fps;

    let description = load_description(args.level.as_ref())?;
    let mut game = Game::new(description, settings.level_config())
        .context("level description cannot be played")?;
    let (width, height) = game.dimensions();
    let scene = Scene::new(width, height)?;
    log::info!("starting {width}x{height} window");

    let presentation = Presentation::new(
        TITLE_BANNER,
        Color::from_rgb_u8(0, 0, 0),
        Palette::classic(),
        scene,
    );
    MacroquadBackend::new()
        .with_vsync(settings.vsync)
        .with_show_fps(settings.show_fps)
        .run(presentation, move |dt, input, scene| game.frame(dt, input, scene))
}
