//! Instruction programs that drive actors through their script hosts.
//!
//! A [`ProgramDriver`] plays the role of a script running on one actor: it
//! issues one instruction at a time, suspends on the returned
//! [`PendingCall`], and resumes once the matching completion event shows up
//! in the actor's script host. The driver finds its actor by identity every
//! step, so it keeps working after the actor relocates.

use rover_brain::{ActorCommand, ActorTable, BrainError, PendingCall};
use rover_types::{ActorId, CommandId, CommandResult};
use tracing::{debug, warn};

/// Where a driver is in its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// Still issuing or waiting.
    Running,
    /// Every instruction completed and the program does not loop.
    Finished,
    /// The actor is no longer in the world.
    Detached,
}

/// What one [`ProgramDriver::step`] did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverStep {
    /// The completion consumed this step.
    pub resumed: Option<CommandResult>,
    /// The instruction submitted this step.
    pub issued: Option<CommandId>,
    /// Whether the actor's queue refused the next instruction.
    pub rejected: bool,
}

/// Runs a fixed instruction list on one actor.
#[derive(Debug, Clone)]
pub struct ProgramDriver {
    actor: ActorId,
    program: Vec<ActorCommand>,
    cursor: usize,
    looping: bool,
    pending: Option<PendingCall>,
    status: DriverStatus,
    completed: u64,
    failed: u64,
    last_result: Option<CommandResult>,
}

impl ProgramDriver {
    /// Drive `actor` through `program`, restarting at the end if `looping`.
    pub const fn new(actor: ActorId, program: Vec<ActorCommand>, looping: bool) -> Self {
        Self {
            actor,
            program,
            cursor: 0,
            looping,
            pending: None,
            status: DriverStatus::Running,
            completed: 0,
            failed: 0,
            last_result: None,
        }
    }

    /// The driven actor.
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Current status.
    pub const fn status(&self) -> DriverStatus {
        self.status
    }

    /// The call currently suspended on, if any.
    pub const fn pending(&self) -> Option<&PendingCall> {
        self.pending.as_ref()
    }

    /// Completions received so far.
    pub const fn completed(&self) -> u64 {
        self.completed
    }

    /// Completions that reported a failure.
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    /// The most recent completion.
    pub const fn last_result(&self) -> Option<&CommandResult> {
        self.last_result.as_ref()
    }

    /// Resume on a delivered completion, then issue the next instruction.
    pub fn step(&mut self, table: &mut ActorTable) -> DriverStep {
        let mut step = DriverStep::default();
        if self.status != DriverStatus::Running {
            return step;
        }
        let Some(handle) = table.handle_of(self.actor) else {
            self.status = DriverStatus::Detached;
            debug!(actor = %self.actor, pending = ?self.pending.as_ref().map(PendingCall::id), "driven actor left the world");
            return step;
        };
        let Ok(actor) = table.actor_mut(handle) else {
            self.status = DriverStatus::Detached;
            return step;
        };

        if let Some(call) = self.pending {
            let Some(host) = actor.host_mut() else {
                warn!(actor = %self.actor, "driven actor has no script host");
                self.status = DriverStatus::Detached;
                return step;
            };
            let Some(result) = call.poll(host) else {
                return step;
            };
            self.pending = None;
            self.completed = self.completed.saturating_add(1);
            if !result.is_success() {
                self.failed = self.failed.saturating_add(1);
            }
            self.last_result = Some(result.clone());
            step.resumed = Some(result);
        }

        if self.cursor >= self.program.len() {
            if self.looping && !self.program.is_empty() {
                self.cursor = 0;
            } else {
                self.status = DriverStatus::Finished;
                return step;
            }
        }
        let Some(instruction) = self.program.get(self.cursor).cloned() else {
            return step;
        };
        match actor.execute(instruction.boxed()) {
            Ok(call) => {
                step.issued = Some(call.id());
                self.pending = Some(call);
                self.cursor = self.cursor.saturating_add(1);
            }
            Err(BrainError::QueueFull { capacity }) => {
                step.rejected = true;
                debug!(actor = %self.actor, capacity, "command queue full, retrying next tick");
            }
            Err(err) => {
                step.rejected = true;
                warn!(actor = %self.actor, error = %err, "driver could not submit instruction");
                self.status = DriverStatus::Detached;
            }
        }
        step
    }
}
