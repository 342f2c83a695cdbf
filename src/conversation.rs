//! Chat turns against one project.
//!
//! [`Conversation`] holds the history the user sees. A chat turn is started
//! with [`Conversation::begin`], driven with [`Turn::run`], and applied with
//! [`Conversation::settle`]:
//!
//! ```rust,no_run
//! use specdrafter::{Conversation, DirectiveDisplay, DrafterClient, Message, ProjectBackend};
//!
//! # async fn demo() -> specdrafter::Result<()> {
//! let client = DrafterClient::new("http://localhost:8000")?;
//! let project = client.get_project("65a1f0c2e4b0a1b2c3d4e5f6").await?;
//! let mut conversation = Conversation::from_project(&project, DirectiveDisplay::Strip);
//!
//! let turn = conversation.begin(Message::user("It's a recipe planner for families."))?;
//! let outcome = turn.run(&client, &mut ()).await;
//! if let Some(settled) = conversation.settle(outcome) {
//!     if let Some(name) = settled.rename {
//!         conversation.apply_rename(&client, &name).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Only one turn may be in flight per conversation; a second `begin` fails
//! with [`DrafterError::StreamActive`] until the first outcome is settled or
//! dropped. Dropping a running turn releases the HTTP stream.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::accumulator::{Completion, MessageAccumulator, Signal};
use crate::directive::DirectiveDisplay;
use crate::phase::{self, PhaseStatus, SpecPhase};
use crate::{
    DrafterError, Message, Project, ProjectBackend, ProjectUpdate, Result, Role, telemetry,
};

/// Where a chat turn failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The request failed before any chunk arrived.
    Transport,
    /// The body failed after at least one chunk; partial text is kept.
    MidStream,
    /// The stream succeeded but refreshing the project snapshot failed.
    Resync,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureStage::Transport => "transport",
            FailureStage::MidStream => "mid-stream",
            FailureStage::Resync => "resync",
        })
    }
}

/// Receives a turn's notifications, in order, from the task driving it.
///
/// All methods default to doing nothing; `()` is the silent observer.
pub trait ChatObserver: Send {
    /// The in-progress message changed.
    fn on_update(&mut self, _message: &Message) {}

    /// A `phase_complete` chunk arrived.
    fn on_phase_advanced(&mut self) {}

    /// The stream ended cleanly. Called at most once per turn.
    fn on_complete(&mut self, _message: &Message) {}

    /// The finished text asked for the project to be renamed.
    fn on_rename_requested(&mut self, _name: &str) {}

    /// The canonical snapshot was fetched after the stream.
    fn on_resync(&mut self, _project: &Project) {}

    /// A failure; called at most once per stage.
    fn on_error(&mut self, _stage: FailureStage, _error: &DrafterError) {}
}

impl ChatObserver for () {}

/// Clears the conversation's active flag when dropped.
#[derive(Debug)]
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What a finished turn produced.
#[derive(Debug)]
pub enum TurnResult {
    /// The stream ran to the end.
    Completed {
        completion: Completion,
        /// Snapshot fetched afterwards; `None` if the resync failed
        project: Option<Project>,
    },
    /// Nothing arrived before the failure.
    TransportFailed { error: DrafterError },
    /// The stream broke after delivering part of the answer.
    StreamFailed { partial: Message, error: DrafterError },
}

/// A finished turn waiting to be settled into its conversation.
///
/// The conversation stays busy until the outcome is settled or dropped.
#[derive(Debug)]
pub struct TurnOutcome {
    epoch: u64,
    result: TurnResult,
    _active: ActiveGuard,
}

impl TurnOutcome {
    pub fn result(&self) -> &TurnResult {
        &self.result
    }

    pub fn into_result(self) -> TurnResult {
        self.result
    }
}

/// What settling a turn changed, for the caller to act on.
#[derive(Debug, Default)]
pub struct Settled {
    /// Name requested by a rename directive; applying it is up to the caller
    pub rename: Option<String>,
    pub phase_advances: usize,
    pub error: Option<DrafterError>,
}

/// One chat request in flight.
#[derive(Debug)]
pub struct Turn {
    project_id: String,
    epoch: u64,
    request: Vec<Message>,
    active: ActiveGuard,
}

impl Turn {
    /// History sent to the backend, newest message last.
    pub fn request(&self) -> &[Message] {
        &self.request
    }

    /// Stream the assistant's reply, reporting progress to `observer`.
    ///
    /// Never fails: errors go to [`ChatObserver::on_error`] and into the
    /// returned outcome.
    pub async fn run<B, O>(self, backend: &B, observer: &mut O) -> TurnOutcome
    where
        B: ProjectBackend + ?Sized,
        O: ChatObserver + ?Sized,
    {
        let Turn {
            project_id,
            epoch,
            request,
            active,
        } = self;
        let result = drive(backend, &project_id, &request, observer).await;
        TurnOutcome {
            epoch,
            result,
            _active: active,
        }
    }
}

async fn drive<B, O>(
    backend: &B,
    project_id: &str,
    request: &[Message],
    observer: &mut O,
) -> TurnResult
where
    B: ProjectBackend + ?Sized,
    O: ChatObserver + ?Sized,
{
    let mut stream = match backend.chat_stream(project_id, request).await {
        Ok(stream) => stream,
        Err(error) => {
            warn!(%project_id, error = %error, "chat request failed");
            record_stream(false);
            observer.on_error(FailureStage::Transport, &error);
            return TurnResult::TransportFailed { error };
        }
    };

    let mut accumulator = MessageAccumulator::new();
    let mut received = 0usize;
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                received += 1;
                match accumulator.apply(&chunk) {
                    Some(Signal::PhaseAdvanced) => observer.on_phase_advanced(),
                    None => observer.on_update(accumulator.message()),
                }
            }
            Err(error) => {
                drop(stream);
                record_stream(false);
                if received == 0 {
                    warn!(%project_id, error = %error, "chat stream failed before any chunk");
                    observer.on_error(FailureStage::Transport, &error);
                    return TurnResult::TransportFailed { error };
                }
                warn!(%project_id, received, error = %error, "chat stream failed mid-response");
                observer.on_error(FailureStage::MidStream, &error);
                return TurnResult::StreamFailed {
                    partial: accumulator.into_partial(),
                    error,
                };
            }
        }
    }
    drop(stream);
    record_stream(true);

    let completion = accumulator.finish();
    debug!(%project_id, received, phase_advances = completion.phase_advances, "chat stream complete");
    observer.on_complete(&completion.message);
    if let Some(name) = &completion.rename {
        observer.on_rename_requested(name);
    }

    let project = match backend.get_project(project_id).await {
        Ok(project) => {
            observer.on_resync(&project);
            Some(project)
        }
        Err(error) => {
            warn!(%project_id, error = %error, "failed to refresh project after chat");
            observer.on_error(FailureStage::Resync, &error);
            None
        }
    };

    TurnResult::Completed {
        completion,
        project,
    }
}

fn record_stream(ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::STREAMS_TOTAL, "kind" => "chat", "status" => status)
        .increment(1);
}

/// Chat history and progress of the active project.
#[derive(Debug)]
pub struct Conversation {
    project_id: String,
    name: String,
    phase: SpecPhase,
    history: Vec<Message>,
    display: DirectiveDisplay,
    active: Arc<AtomicBool>,
    epoch: u64,
}

impl Conversation {
    pub fn from_project(project: &Project, display: DirectiveDisplay) -> Self {
        Self {
            project_id: project.id.clone(),
            name: project.name.clone(),
            phase: project.current_phase,
            history: project.conversation_history.clone(),
            display,
            active: Arc::new(AtomicBool::new(false)),
            epoch: 0,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> SpecPhase {
        self.phase
    }

    /// Status of every phase for a progress display.
    pub fn progress(&self) -> Vec<(SpecPhase, PhaseStatus)> {
        phase::progress(self.phase)
    }

    /// Stored history, text exactly as received.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Whether a turn is in flight.
    pub fn is_streaming(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Start a chat turn with a new user message.
    pub fn begin(&mut self, message: Message) -> Result<Turn> {
        if message.role != Role::User {
            return Err(DrafterError::InvalidInput(
                "a turn must start with a user message".to_string(),
            ));
        }
        let has_audio = message
            .auxiliary
            .as_ref()
            .is_some_and(|aux| aux.audio.is_some());
        if message.content.trim().is_empty() && !has_audio {
            return Err(DrafterError::InvalidInput("empty message".to_string()));
        }
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DrafterError::StreamActive);
        }

        self.history.push(message);
        Ok(Turn {
            project_id: self.project_id.clone(),
            epoch: self.epoch,
            request: self.history.clone(),
            active: ActiveGuard(Arc::clone(&self.active)),
        })
    }

    /// Apply a finished turn.
    ///
    /// Returns `None` when the turn belongs to a project that is no longer
    /// active; its result is discarded.
    pub fn settle(&mut self, outcome: TurnOutcome) -> Option<Settled> {
        let TurnOutcome {
            epoch,
            result,
            _active,
        } = outcome;
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding outcome of an abandoned turn");
            return None;
        }

        let settled = match result {
            TurnResult::Completed {
                completion,
                project,
            } => {
                let refreshed = project.is_some_and(|p| self.resync(&p));
                if !refreshed {
                    self.history.push(completion.message);
                    for _ in 0..completion.phase_advances {
                        self.phase = self.phase.next();
                    }
                }
                Settled {
                    rename: completion.rename,
                    phase_advances: completion.phase_advances,
                    error: None,
                }
            }
            TurnResult::TransportFailed { error } => {
                self.history
                    .push(Message::assistant(format!("Error: {error}")));
                Settled {
                    error: Some(error),
                    ..Settled::default()
                }
            }
            TurnResult::StreamFailed { partial, error } => {
                self.history.push(partial);
                Settled {
                    error: Some(error),
                    ..Settled::default()
                }
            }
        };
        Some(settled)
    }

    /// Replace local state with a snapshot of the same project.
    ///
    /// Returns `false` (and changes nothing) for a different project.
    pub fn resync(&mut self, project: &Project) -> bool {
        if project.id != self.project_id {
            return false;
        }
        self.name = project.name.clone();
        self.phase = project.current_phase;
        self.history = project.conversation_history.clone();
        true
    }

    /// Make another project active. Turns begun before the switch are
    /// discarded when settled and no longer block new turns.
    pub fn switch_project(&mut self, project: &Project) {
        self.project_id = project.id.clone();
        self.name = project.name.clone();
        self.phase = project.current_phase;
        self.history = project.conversation_history.clone();
        self.active = Arc::new(AtomicBool::new(false));
        self.epoch += 1;
    }

    /// Rename the project on the backend and adopt the returned name.
    pub async fn apply_rename<B>(&mut self, backend: &B, name: &str) -> Result<()>
    where
        B: ProjectBackend + ?Sized,
    {
        let update = ProjectUpdate::default().name(name);
        let project = backend.update_project(&self.project_id, &update).await?;
        if project.id == self.project_id {
            self.name = project.name;
        }
        Ok(())
    }

    /// A message as it should be displayed under the directive policy.
    ///
    /// Directives are assistant output; user text is never rewritten.
    pub fn render(&self, message: &Message) -> Message {
        if message.role != Role::Assistant {
            return message.clone();
        }
        Message {
            content: self.display.render(&message.content).into_owned(),
            ..message.clone()
        }
    }

    /// The history as it should be displayed.
    pub fn transcript(&self) -> Vec<Message> {
        self.history.iter().map(|m| self.render(m)).collect()
    }
}
