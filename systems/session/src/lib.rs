#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system driving the title, play, pause and completion screens.
//!
//! The session never touches a level directly. Each frame it inspects the
//! shell input and the level status and emits [`Directive`] values telling
//! the shell whether to build a level, simulate a frame or restore the actor.

use froggit_core::LevelStatus;

/// Prompt shown on the title screen.
pub const START_PROMPT: &str = "PRESS 'S' TO BEGIN";
/// Prompt shown while the actor waits to be restored.
pub const CONTINUE_PROMPT: &str = "PRESS 'C' TO CONTINUE";
/// Banner shown after every exit was claimed.
pub const WIN_BANNER: &str = "YOU WIN!";
/// Banner shown after the last life was lost.
pub const LOSS_BANNER: &str = "GAME OVER";

/// Edge-triggered shell presses captured for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShellInput {
    /// The start key went down this frame.
    pub start: bool,
    /// The resume key went down this frame.
    pub resume: bool,
}

/// How a finished level ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every exit slot was claimed.
    Won,
    /// Every life was lost.
    Lost,
}

/// Screen the session is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Title screen waiting for the start key.
    Inactive,
    /// A level was requested and is being built.
    Loading,
    /// Normal play.
    Active,
    /// The actor died with lives to spare.
    Paused,
    /// The actor is being restored; lasts a single frame.
    Continue,
    /// The level ended.
    Complete(Outcome),
}

/// Instructions for the shell produced by [`Session::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Build a fresh level from the level description.
    LoadLevel,
    /// Run one simulation tick with the current frame's input.
    Simulate,
    /// Return the actor to its starting cell.
    RestoreActor,
}

/// Shell state machine reacting to level status and shell presses.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Creates a session showing the title screen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Inactive,
        }
    }

    /// Screen currently shown.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Text the shell should overlay on the current screen, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self.state {
            SessionState::Inactive => Some(START_PROMPT),
            SessionState::Paused => Some(CONTINUE_PROMPT),
            SessionState::Complete(Outcome::Won) => Some(WIN_BANNER),
            SessionState::Complete(Outcome::Lost) => Some(LOSS_BANNER),
            SessionState::Loading | SessionState::Active | SessionState::Continue => None,
        }
    }

    /// Advances the state machine by one frame.
    ///
    /// `status` is the status of the currently loaded level, or `None` when no
    /// level exists yet.
    pub fn handle(
        &mut self,
        input: ShellInput,
        status: Option<LevelStatus>,
        out: &mut Vec<Directive>,
    ) {
        match self.state {
            SessionState::Inactive => {
                if input.start {
                    self.request_level(out);
                }
            }
            SessionState::Loading => {
                if let Some(status) = status {
                    self.transition(SessionState::Active);
                    self.play(status, out);
                }
            }
            SessionState::Active => match status {
                Some(status) => self.play(status, out),
                None => self.request_level(out),
            },
            SessionState::Paused => {
                if input.resume {
                    out.push(Directive::RestoreActor);
                    self.transition(SessionState::Continue);
                }
            }
            SessionState::Continue => {
                self.transition(SessionState::Active);
                if let Some(status) = status {
                    self.play(status, out);
                }
            }
            SessionState::Complete(_) => {
                if input.start {
                    self.request_level(out);
                }
            }
        }
    }

    fn play(&mut self, status: LevelStatus, out: &mut Vec<Directive>) {
        if status.won {
            self.transition(SessionState::Complete(Outcome::Won));
        } else if status.actor_visible {
            out.push(Directive::Simulate);
        } else if status.lives > 0 {
            self.transition(SessionState::Paused);
        } else {
            self.transition(SessionState::Complete(Outcome::Lost));
        }
    }

    fn request_level(&mut self, out: &mut Vec<Directive>) {
        out.push(Directive::LoadLevel);
        self.transition(SessionState::Loading);
    }

    fn transition(&mut self, next: SessionState) {
        log::info!("session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYING: LevelStatus = LevelStatus {
        actor_visible: true,
        lives: 3,
        won: false,
    };

    #[test]
    fn title_screen_waits_for_start() {
        let mut session = Session::new();
        let mut out = Vec::new();
        session.handle(ShellInput::default(), None, &mut out);
        assert!(out.is_empty());
        assert_eq!(session.message(), Some(START_PROMPT));
    }

    #[test]
    fn loading_becomes_active_once_a_level_exists() {
        let mut session = Session::new();
        let mut out = Vec::new();
        session.handle(
            ShellInput {
                start: true,
                resume: false,
            },
            None,
            &mut out,
        );
        assert_eq!(out, vec![Directive::LoadLevel]);
        assert_eq!(session.state(), SessionState::Loading);

        out.clear();
        session.handle(ShellInput::default(), Some(PLAYING), &mut out);
        assert_eq!(out, vec![Directive::Simulate]);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn win_takes_precedence_over_a_hidden_actor() {
        let mut session = Session {
            state: SessionState::Active,
        };
        let mut out = Vec::new();
        session.handle(
            ShellInput::default(),
            Some(LevelStatus {
                actor_visible: false,
                lives: 2,
                won: true,
            }),
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(session.state(), SessionState::Complete(Outcome::Won));
        assert_eq!(session.message(), Some(WIN_BANNER));
    }
}
