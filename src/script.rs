//! JSONL replay scripts.
//!
//! Each non-empty line is one [`Command`], tagged by `cmd`. Commands either
//! mirror what a host shell would do (paste an image, press/move/release the
//! pointer, hit a toolbar button) or dispatch a raw reducer action. Lines
//! starting with `#` are comments.
//!
//! Replays run on a [`ScriptClock`] that only advances through `wait`
//! commands and a fixed step per command, so a script always produces the
//! same document.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::cell::Cell;
use std::io::BufRead;
use std::rc::Rc;

use canvas::config::EditorConfig;
use canvas::doc::{Document, ImageSource};
use canvas::engine::{Clock, Editor};
use canvas::geometry::{Point, Rect, Size};
use canvas::input::Modifiers;
use canvas::persist::PersistedState;
use canvas::reducer::Action;
use canvas::render::RenderItem;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::NoticeSession;

/// Time that passes between two script commands.
pub const COMMAND_STEP_MS: i64 = 16;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid command: {source}")]
    Json { line: usize, source: serde_json::Error },
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Run a reducer action as-is.
    Dispatch { action: Action },
    /// Paste a decoded image of the given natural size.
    Paste {
        src: String,
        width: f64,
        height: f64,
        #[serde(default)]
        viewport: Option<Rect>,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    /// One paint tick.
    Frame,
    /// The host lost the pointer mid-gesture.
    Cancel,
    Undo,
    Redo,
    DeleteSelected,
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
    /// Resize the board.
    Board { width: f64, height: f64 },
    /// Let time pass.
    Wait { ms: i64 },
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
///
/// # Errors
///
/// Returns [`ScriptError::Json`] when the line is not a valid command.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<Command>, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some).map_err(|source| ScriptError::Json { line, source })
}

/// Replay clock: a shared counter the script advances by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptClock(Rc<Cell<i64>>);

impl ScriptClock {
    #[must_use]
    pub fn starting_at(ms: i64) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.set(self.0.get().saturating_add(ms.max(0)));
    }
}

impl Clock for ScriptClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub commands: usize,
    pub notices: usize,
    pub selected: Option<Uuid>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history: Vec<String>,
    pub render: Vec<RenderItem>,
    pub state: PersistedState,
}

/// Drives an [`Editor`] from script commands.
#[derive(Debug)]
pub struct Replay {
    editor: Editor<ScriptClock>,
    clock: ScriptClock,
    session: NoticeSession,
    commands: usize,
    notices: usize,
}

impl Replay {
    #[must_use]
    pub fn new(config: EditorConfig, start_ms: i64) -> Self {
        let clock = ScriptClock::starting_at(start_ms);
        Self {
            editor: Editor::with_clock(config, clock.clone()),
            clock,
            session: NoticeSession::default(),
            commands: 0,
            notices: 0,
        }
    }

    /// Load a persisted layout before the script runs. Images whose pixel
    /// data was not stored cannot be restored and are dropped.
    pub fn load_state(&mut self, state: PersistedState) {
        let stored = state.images.len();
        self.editor.load_persisted(state, |_| None);
        let restored = self.editor.document().len();
        if restored < stored {
            warn!(stored, restored, "images without a stored source were skipped");
        }
        info!(images = restored, "persisted state loaded");
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    /// Run every command from `reader`, one per line.
    ///
    /// # Errors
    ///
    /// Stops at the first line that cannot be read or parsed.
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<(), ScriptError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(command) = parse_line(&line, index + 1)? {
                self.apply(command);
            }
        }
        Ok(())
    }

    /// Apply one command.
    pub fn apply(&mut self, command: Command) {
        self.clock.advance(COMMAND_STEP_MS);
        self.commands += 1;
        debug!(?command, "script command");

        let ed = &mut self.editor;
        match command {
            Command::Dispatch { action } => ed.dispatch(action),
            Command::Paste { src, width, height, viewport } => {
                if ed.paste_image(ImageSource::from(src), Size::new(width, height), viewport).is_none() {
                    self.notice("image could not be added");
                }
            }
            Command::PointerDown { x, y, shift } => {
                ed.on_pointer_down(Point::new(x, y), modifiers(shift));
            }
            Command::PointerMove { x, y, shift } => ed.on_pointer_move(Point::new(x, y), modifiers(shift)),
            Command::PointerUp { x, y, shift } => {
                ed.on_pointer_up(Point::new(x, y), modifiers(shift));
            }
            Command::Frame => {
                ed.on_animation_frame();
            }
            Command::Cancel => {
                ed.on_gesture_cancel();
            }
            Command::Undo => ed.undo(),
            Command::Redo => ed.redo(),
            Command::DeleteSelected => {
                if !ed.delete_selected() {
                    self.notice("nothing selected");
                }
            }
            Command::BringForward => self.layer_command(Editor::bring_forward),
            Command::SendBackward => self.layer_command(Editor::send_backward),
            Command::BringToFront => self.layer_command(Editor::bring_to_front),
            Command::SendToBack => self.layer_command(Editor::send_to_back),
            Command::Board { width, height } => ed.set_board_size(width, height),
            Command::Wait { ms } => self.clock.advance(ms),
        }
    }

    fn layer_command(&mut self, command: fn(&mut Editor<ScriptClock>, &Uuid) -> bool) {
        let Some(id) = self.editor.selection() else {
            self.notice("nothing selected");
            return;
        };
        if !command(&mut self.editor, &id) {
            debug!(%id, "layer already at the end of the stack");
        }
    }

    /// Show a notice unless one was shown within the cooldown.
    fn notice(&mut self, message: &str) {
        if self.session.should_notify(self.clock.now_ms()) {
            self.notices += 1;
            warn!(notice = message, "notice shown");
        } else {
            debug!(notice = message, "notice suppressed");
        }
    }

    /// Summarize the current state.
    #[must_use]
    pub fn report(&self) -> ReplayReport {
        let doc = self.editor.document();
        ReplayReport {
            commands: self.commands,
            notices: self.notices,
            selected: self.editor.selection(),
            can_undo: self.editor.can_undo(),
            can_redo: self.editor.can_redo(),
            history: doc.history.steps().map(|step| step.description.clone()).collect(),
            render: self.editor.render_list(),
            state: self.editor.persisted(),
        }
    }
}

fn modifiers(shift: bool) -> Modifiers {
    Modifiers { shift }
}
