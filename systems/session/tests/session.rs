use std::time::Duration;

use froggit_core::{Command, KeySet, LevelDescription};
use froggit_level::{self as level, query, Level, LevelConfig};
use froggit_system_session::{
    Directive, Outcome, Session, SessionState, ShellInput, CONTINUE_PROMPT, LOSS_BANNER,
};

const DROWNING_START: &str = r#"{
    "size": [3, 2], "start": [1, 1], "offscreen": 1,
    "lanes": [
        {"type": "grass"},
        {"type": "water", "speed": 30, "objects": []}
    ]
}"#;

struct Shell {
    session: Session,
    description: LevelDescription,
    level: Option<Level>,
    loads: usize,
}

impl Shell {
    fn new(source: &str) -> Self {
        Self {
            session: Session::new(),
            description: LevelDescription::from_json_str(source).expect("valid level"),
            level: None,
            loads: 0,
        }
    }

    fn frame(&mut self, input: ShellInput) {
        let status = self.level.as_ref().map(query::status);
        let mut directives = Vec::new();
        self.session.handle(input, status, &mut directives);

        for directive in directives {
            match directive {
                Directive::LoadLevel => {
                    self.level = Some(
                        Level::new(&self.description, LevelConfig::default())
                            .expect("level builds"),
                    );
                    self.loads += 1;
                }
                Directive::Simulate => {
                    let level = self.level.as_mut().expect("level loaded");
                    let mut events = Vec::new();
                    level::apply(
                        level,
                        Command::Tick {
                            dt: Duration::from_millis(16),
                            keys: KeySet::empty(),
                        },
                        &mut events,
                    );
                }
                Directive::RestoreActor => {
                    let level = self.level.as_mut().expect("level loaded");
                    let mut events = Vec::new();
                    level::apply(level, Command::RestoreActor, &mut events);
                }
            }
        }
    }

    fn lives(&self) -> u8 {
        self.level.as_ref().map_or(0, query::lives)
    }
}

const START: ShellInput = ShellInput {
    start: true,
    resume: false,
};
const RESUME: ShellInput = ShellInput {
    start: false,
    resume: true,
};
const IDLE: ShellInput = ShellInput {
    start: false,
    resume: false,
};

#[test]
fn death_pauses_until_resume_then_play_continues() {
    let mut shell = Shell::new(DROWNING_START);
    shell.frame(START);
    assert_eq!(shell.session.state(), SessionState::Loading);

    shell.frame(IDLE);
    assert_eq!(shell.session.state(), SessionState::Active);
    assert_eq!(shell.lives(), 2);

    shell.frame(IDLE);
    assert_eq!(shell.session.state(), SessionState::Paused);
    assert_eq!(shell.session.message(), Some(CONTINUE_PROMPT));

    shell.frame(IDLE);
    assert_eq!(shell.session.state(), SessionState::Paused);

    shell.frame(RESUME);
    assert_eq!(shell.session.state(), SessionState::Continue);
    assert!(shell.level.as_ref().is_some_and(query::actor_visible));

    shell.frame(IDLE);
    assert_eq!(shell.session.state(), SessionState::Active);
    assert_eq!(shell.lives(), 1);
}

#[test]
fn losing_every_life_completes_the_session() {
    let mut shell = Shell::new(DROWNING_START);
    shell.frame(START);
    for _ in 0..20 {
        shell.frame(RESUME);
    }

    assert_eq!(shell.lives(), 0);
    assert_eq!(
        shell.session.state(),
        SessionState::Complete(Outcome::Lost)
    );
    assert_eq!(shell.session.message(), Some(LOSS_BANNER));
}

#[test]
fn start_after_completion_loads_a_fresh_level() {
    let mut shell = Shell::new(DROWNING_START);
    shell.frame(START);
    for _ in 0..20 {
        shell.frame(RESUME);
    }
    assert_eq!(shell.loads, 1);

    shell.frame(START);

    assert_eq!(shell.loads, 2);
    assert_eq!(shell.lives(), 3);
    assert_eq!(shell.session.state(), SessionState::Loading);
}
