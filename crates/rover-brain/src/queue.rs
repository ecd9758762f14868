//! Bounded FIFO of pending commands.
//!
//! Every accepted command receives an actor-scoped id from a counter that
//! starts above zero and is never reused. The queue refuses new entries
//! once it holds `capacity` of them; that refusal is the only backpressure
//! a script sees.

use std::collections::VecDeque;

use rover_types::CommandId;

use crate::command::Command;
use crate::error::BrainError;

/// One pending command and the id its completion will carry.
#[derive(Debug)]
pub struct CommandEntry {
    /// Completion correlation id.
    pub id: CommandId,
    /// The work to perform.
    pub command: Box<dyn Command>,
}

/// Per-actor command queue.
#[derive(Debug)]
pub struct CommandQueue {
    entries: VecDeque<CommandEntry>,
    capacity: usize,
    last_id: u64,
}

impl CommandQueue {
    /// An empty queue accepting up to `capacity` pending commands.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            last_id: 0,
        }
    }

    /// Append a command and return its id.
    ///
    /// Fails with [`BrainError::QueueFull`] when `capacity` commands are
    /// already pending; no id is consumed in that case.
    pub fn enqueue(&mut self, command: Box<dyn Command>) -> Result<CommandId, BrainError> {
        if self.entries.len() >= self.capacity {
            return Err(BrainError::QueueFull {
                capacity: self.capacity,
            });
        }
        self.last_id = self.last_id.saturating_add(1);
        let id = CommandId(self.last_id);
        self.entries.push_back(CommandEntry { id, command });
        Ok(id)
    }

    /// Remove the oldest pending command.
    pub fn pop(&mut self) -> Option<CommandEntry> {
        self.entries.pop_front()
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of pending commands.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently issued id, `CommandId(0)` before the first.
    pub const fn last_issued(&self) -> CommandId {
        CommandId(self.last_id)
    }

    /// Ids of the pending commands, oldest first.
    pub fn pending_ids(&self) -> Vec<CommandId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rover_types::CommandResult;

    use super::*;
    use crate::command::command_fn;

    fn noop() -> Box<dyn Command> {
        command_fn("noop", |_| CommandResult::success())
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut queue = CommandQueue::new(16);
        let ids: Vec<u64> = (0..16).map(|_| queue.enqueue(noop()).unwrap().get()).collect();
        assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
    }

    #[test]
    fn seventeenth_command_is_rejected() {
        let mut queue = CommandQueue::new(16);
        for _ in 0..16 {
            assert!(queue.enqueue(noop()).is_ok());
        }
        let overflow = queue.enqueue(noop());
        assert_eq!(overflow.err(), Some(BrainError::QueueFull { capacity: 16 }));
        assert_eq!(queue.len(), 16);
        assert_eq!(queue.last_issued(), CommandId(16));
    }

    #[test]
    fn pop_is_fifo_and_ids_are_not_reused() {
        let mut queue = CommandQueue::new(2);
        let first = queue.enqueue(noop()).unwrap();
        let second = queue.enqueue(noop()).unwrap();
        assert_eq!(queue.pending_ids(), vec![first, second]);
        assert_eq!(queue.pop().map(|e| e.id), Some(first));
        let third = queue.enqueue(noop()).unwrap();
        assert_eq!(third, CommandId(3));
        assert_eq!(queue.pop().map(|e| e.id), Some(second));
        assert_eq!(queue.pop().map(|e| e.id), Some(third));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }
}
