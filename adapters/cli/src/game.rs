use std::time::Duration;

use froggit_core::{Command, Event, LevelDescription, LevelError, TITLE_BANNER};
use froggit_level::{self as level, query, Level, LevelConfig};
use froggit_rendering::{FrameInput, Scene};
use froggit_system_session::{Directive, Session, SessionState, ShellInput};

/// Glue between the session, the level and the rendered scene.
#[derive(Debug)]
pub(crate) struct Game {
    description: LevelDescription,
    config: LevelConfig,
    session: Session,
    level: Option<Level>,
    directives: Vec<Directive>,
    events: Vec<Event>,
}

impl Game {
    /// Prepares a game for the description, checking that it builds a level.
    pub(crate) fn new(
        description: LevelDescription,
        config: LevelConfig,
    ) -> Result<Self, LevelError> {
        let _ = Level::new(&description, config)?;
        Ok(Self {
            description,
            config,
            session: Session::new(),
            level: None,
            directives: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Width and height of the world in pixels, including the lives row.
    pub(crate) fn dimensions(&self) -> (f32, f32) {
        let cell = self.config.cell_size();
        (
            self.description.columns() as f32 * cell,
            (self.description.rows() + 1) as f32 * cell,
        )
    }

    /// Runs one frame and rebuilds the scene.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let shell_input = ShellInput {
            start: input.start,
            resume: input.resume,
        };
        let status = self.level.as_ref().map(query::status);
        self.directives.clear();
        self.session.handle(shell_input, status, &mut self.directives);

        for directive in self.directives.drain(..) {
            match directive {
                Directive::LoadLevel => match Level::new(&self.description, self.config) {
                    Ok(level) => self.level = Some(level),
                    Err(error) => log::error!("failed to build level: {error}"),
                },
                Directive::Simulate => {
                    if let Some(level) = self.level.as_mut() {
                        level::apply(
                            level,
                            Command::Tick {
                                dt,
                                keys: input.keys,
                            },
                            &mut self.events,
                        );
                    }
                }
                Directive::RestoreActor => {
                    if let Some(level) = self.level.as_mut() {
                        level::apply(level, Command::RestoreActor, &mut self.events);
                    }
                }
            }
        }
        for event in self.events.drain(..) {
            log::trace!("{event:?}");
        }

        self.populate(scene);
    }

    fn populate(&self, scene: &mut Scene) {
        scene.clear();
        match (self.session.state(), &self.level) {
            (SessionState::Inactive, _) | (_, None) => {
                scene.title = Some(TITLE_BANNER.to_owned());
            }
            (_, Some(level)) => level::draw(level, scene),
        }
        scene.message = self.session.message().map(str::to_owned);
    }
}
