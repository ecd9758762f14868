//! Continuation bridge between scripts and the command queue.
//!
//! A script call that needs a world-affecting command cannot return
//! directly: the command runs on a later tick. Instead:
//!
//! 1. [`Actor::execute`](crate::actor::Actor::execute) enqueues the command
//!    and hands back a [`PendingCall`] carrying its id.
//! 2. When the command has run, [`complete`] turns the result into a
//!    [`RESPONSE_EVENT`] event `[id, true, ...values]` or
//!    `[id, false, message]` and delivers it to the actor's [`ScriptHost`].
//! 3. The script's suspended continuation filters incoming events with
//!    [`PendingCall::resume`] until one carries its id.
//!
//! Every command of an actor shares the one event name; correlation is by
//! id alone, so several calls may be in flight at once.

use std::collections::VecDeque;
use std::sync::Arc;

use rover_types::{CommandId, CommandResult, RESPONSE_EVENT, ScriptEvent, Side};
use serde_json::Value;
use tracing::debug;

use crate::upgrade::Peripheral;

/// The scripting side of an actor.
pub trait ScriptHost: core::fmt::Debug + Send {
    /// Queue an event for the script.
    fn deliver_event(&mut self, event: ScriptEvent);

    /// Resume a continuation suspended on `event_name`.
    ///
    /// Offers every queued event of that name to `filter`, oldest first.
    /// The first event the filter accepts is consumed and its result
    /// returned. Events the filter passes over stay queued. `None` means the
    /// continuation remains suspended.
    fn suspend_until(
        &mut self,
        event_name: &str,
        filter: &mut dyn FnMut(&ScriptEvent) -> Option<CommandResult>,
    ) -> Option<CommandResult>;

    /// Expose (or withdraw, with `None`) a peripheral on one side.
    fn attach_peripheral(&mut self, side: Side, peripheral: Option<Arc<dyn Peripheral>>);
}

/// Suspend token for one issued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingCall {
    id: CommandId,
}

impl PendingCall {
    /// Token for command `id`.
    pub const fn new(id: CommandId) -> Self {
        Self { id }
    }

    /// The command id this call waits for.
    pub const fn id(&self) -> CommandId {
        self.id
    }

    /// Filter one event. Returns the unwrapped result when `event` is the
    /// completion of this call.
    pub fn resume(&self, event: &ScriptEvent) -> Option<CommandResult> {
        if event.name != RESPONSE_EVENT {
            return None;
        }
        let mut args = event.args.iter();
        let id = args.next().and_then(Value::as_u64)?;
        if id != self.id.get() {
            return None;
        }
        let success = args.next().and_then(Value::as_bool)?;
        if success {
            Some(CommandResult::success_with(args.cloned().collect()))
        } else {
            let message = args
                .next()
                .map(|value| value.as_str().map_or_else(|| value.to_string(), str::to_owned))
                .unwrap_or_default();
            Some(CommandResult::Failure(message))
        }
    }

    /// Try to resume against `host`. `None` means still suspended.
    pub fn poll(&self, host: &mut dyn ScriptHost) -> Option<CommandResult> {
        host.suspend_until(RESPONSE_EVENT, &mut |event| self.resume(event))
    }
}

/// Deliver the completion of command `id` to `host`.
///
/// Returns `false` when there is no host to deliver to; the completion is
/// dropped.
pub fn complete(host: Option<&mut dyn ScriptHost>, id: CommandId, result: CommandResult) -> bool {
    let Some(host) = host else {
        debug!(command_id = %id, "no script host attached, completion dropped");
        return false;
    };
    host.deliver_event(result.into_event(id));
    true
}

/// In-memory [`ScriptHost`] backed by an event queue.
#[derive(Debug, Default)]
pub struct EventQueueHost {
    events: VecDeque<ScriptEvent>,
    left: Option<Arc<dyn Peripheral>>,
    right: Option<Arc<dyn Peripheral>>,
    attachments: u64,
}

impl EventQueueHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events queued and not yet consumed.
    pub fn pending_events(&self) -> impl Iterator<Item = &ScriptEvent> {
        self.events.iter()
    }

    /// Number of queued events.
    pub fn pending_len(&self) -> usize {
        self.events.len()
    }

    /// Peripheral currently exposed on `side`.
    pub const fn peripheral(&self, side: Side) -> Option<&Arc<dyn Peripheral>> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Number of `attach_peripheral` calls received.
    pub const fn attachment_count(&self) -> u64 {
        self.attachments
    }
}

impl ScriptHost for EventQueueHost {
    fn deliver_event(&mut self, event: ScriptEvent) {
        self.events.push_back(event);
    }

    fn suspend_until(
        &mut self,
        event_name: &str,
        filter: &mut dyn FnMut(&ScriptEvent) -> Option<CommandResult>,
    ) -> Option<CommandResult> {
        let (position, result) = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.name == event_name)
            .find_map(|(position, event)| filter(event).map(|result| (position, result)))?;
        self.events.remove(position);
        Some(result)
    }

    fn attach_peripheral(&mut self, side: Side, peripheral: Option<Arc<dyn Peripheral>>) {
        self.attachments = self.attachments.saturating_add(1);
        match side {
            Side::Left => self.left = peripheral,
            Side::Right => self.right = peripheral,
        }
    }
}
