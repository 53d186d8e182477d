use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use serde::Serialize;

/// Mutation events published by a [`CommitGraph`](crate::CommitGraph)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    BranchCreated {
        name: String,
        /// `None` for the initial branch
        source: Option<String>,
        head: Option<String>,
    },
    CommitAdded {
        branch: String,
        commit_id: String,
    },
    Merged {
        source: String,
        target: String,
        commit_id: String,
    },
    Rebased {
        old: String,
        new: String,
        onto: String,
        /// IDs of the replayed commits, oldest first
        replayed: Vec<String>,
    },
    BranchRetired {
        name: String,
    },
}

impl GraphEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::BranchCreated { .. } => "branch_created",
            GraphEvent::CommitAdded { .. } => "commit_added",
            GraphEvent::Merged { .. } => "merged",
            GraphEvent::Rebased { .. } => "rebased",
            GraphEvent::BranchRetired { .. } => "branch_retired",
        }
    }
}

/// Event handler trait
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &GraphEvent);
}

/// Forwards every event into an mpsc channel.
pub struct ChannelHandler {
    sender: Sender<GraphEvent>,
}

impl ChannelHandler {
    pub fn new(sender: Sender<GraphEvent>) -> Self {
        Self { sender }
    }
}

impl EventHandler for ChannelHandler {
    fn handle_event(&mut self, event: &GraphEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.sender.send(event.clone());
    }
}

/// Bounded history of recent events
#[derive(Debug, Clone)]
pub struct EventLogger {
    events: VecDeque<GraphEvent>,
    max_events: usize,
}

impl EventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    pub fn log(&mut self, event: GraphEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Most recent events, newest first
    pub fn get_recent(&self, count: usize) -> Vec<&GraphEvent> {
        self.events.iter().rev().take(count).collect()
    }

    /// Everything still held, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &GraphEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Fans events out to subscribers and keeps the recent-history log.
pub(crate) struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
    log: EventLogger,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("log", &self.log)
            .finish()
    }
}

impl EventBus {
    pub(crate) fn new(log_capacity: usize) -> Self {
        Self {
            handlers: Vec::new(),
            log: EventLogger::new(log_capacity),
        }
    }

    pub(crate) fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub(crate) fn publish_all(&mut self, events: Vec<GraphEvent>) {
        for event in events {
            for handler in &mut self.handlers {
                handler.handle_event(&event);
            }
            self.log.log(event);
        }
    }

    pub(crate) fn log(&self) -> &EventLogger {
        &self.log
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
