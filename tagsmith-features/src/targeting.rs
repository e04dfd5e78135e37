//! Ad-slot targeting.
//!
//! Publishes the visitor's variant as the page-level key-value
//! [`TARGETING_KEY`] through the ad library's command queue. Before the
//! library loads the queue is a plain list; afterwards it is replaced by the
//! library's append-only queue.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tagsmith_log::debug;

/// Page-level key carrying the visitor's variant
pub const TARGETING_KEY: &str = "tagsmith_ab_variant";

/// Receiver of page-level targeting, i.e. the ad library's publisher service.
pub trait TargetingSink {
    fn set_targeting(&mut self, key: &str, value: &str);
}

/// A queued ad library command.
pub type Command = Box<dyn FnOnce(&mut dyn TargetingSink)>;

/// The command queue once the ad library owns it: append only.
pub trait AppendOnlyQueue {
    fn push(&mut self, command: Command);
}

/// The ad library's command queue in either of its shapes.
pub enum CommandQueue {
    /// Library not loaded yet; commands wait in order
    Pending(VecDeque<Command>),
    /// Library loaded; commands go to its own queue
    Live(Box<dyn AppendOnlyQueue>),
}

impl CommandQueue {
    /// An empty pre-load queue
    pub fn pending() -> Self {
        CommandQueue::Pending(VecDeque::new())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CommandQueue::Pending(_))
    }

    /// Number of commands waiting; always 0 once live
    pub fn len(&self) -> usize {
        match self {
            CommandQueue::Pending(commands) => commands.len(),
            CommandQueue::Live(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a command, the way tags queue their own commands
    pub fn push(&mut self, command: Command) {
        match self {
            CommandQueue::Pending(commands) => commands.push_back(command),
            CommandQueue::Live(queue) => queue.push(command),
        }
    }

    /// Hand the queue over to the loaded library: run waiting commands in
    /// order against `sink`, then route future commands to `live`.
    pub fn go_live(&mut self, sink: &mut dyn TargetingSink, live: Box<dyn AppendOnlyQueue>) {
        let previous = std::mem::replace(self, CommandQueue::Live(live));

        if let CommandQueue::Pending(commands) = previous {
            for command in commands {
                command(sink);
            }
        }
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::pending()
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandQueue::Pending(commands) => write!(f, "Pending({} commands)", commands.len()),
            CommandQueue::Live(_) => f.write_str("Live"),
        }
    }
}

/// In-memory page-level targeting, one list of values per key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageTargeting {
    values: HashMap<String, Vec<String>>,
}

impl PageTargeting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }
}

impl TargetingSink for PageTargeting {
    fn set_targeting(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), vec![value.to_string()]);
    }
}

/// Schedules the variant key-value once per page load.
#[derive(Debug)]
pub struct AdSlotTargeting {
    key: String,
    scheduled: Cell<bool>,
}

impl AdSlotTargeting {
    pub fn new() -> Self {
        Self {
            key: TARGETING_KEY.to_string(),
            scheduled: Cell::new(false),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.get()
    }

    /// Queue the targeting command for `user_variant`.
    ///
    /// A pending queue gets the command at the front, ahead of commands tags
    /// already queued; a live queue only supports appending. Returns `false`
    /// when the visitor has no variant or targeting was already scheduled.
    pub fn schedule(&self, queue: &mut CommandQueue, user_variant: Option<&str>) -> bool {
        let Some(variant) = user_variant else {
            return false;
        };

        if self.scheduled.replace(true) {
            return false;
        }

        let key = self.key.clone();
        let value = variant.to_string();
        let command: Command = Box::new(move |sink| sink.set_targeting(&key, &value));

        match queue {
            CommandQueue::Pending(commands) => commands.push_front(command),
            CommandQueue::Live(live) => live.push(command),
        }

        debug!(target: "tagsmith::targeting", "scheduled {}={}", self.key, variant);
        true
    }
}

impl Default for AdSlotTargeting {
    fn default() -> Self {
        Self::new()
    }
}
