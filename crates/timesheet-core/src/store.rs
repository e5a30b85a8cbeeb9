use tracing::debug;

use crate::event::Event;

/// Ordered in-memory collection of calendar events keyed by id.
#[derive(Debug, Default, Clone)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the event with the same id in place, or appends it.
    #[tracing::instrument(skip(self, event), fields(id = %event.id))]
    pub fn upsert(&mut self, event: Event) {
        match self.events.iter().position(|e| e.id == event.id) {
            Some(idx) => {
                debug!(index = idx, "replacing event in place");
                self.events[idx] = event;
            }
            None => {
                debug!(count = self.events.len() + 1, "appending event");
                self.events.push(event);
            }
        }
    }

    pub fn extend<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            self.upsert(event);
        }
    }

    /// Drops the event locally. Nothing is sent to the remote side.
    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        debug!(id, index = idx, "removing event");
        Some(self.events.remove(idx))
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
