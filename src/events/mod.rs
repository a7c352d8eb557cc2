//! Narrative events: templates, the weighted pool and trigger application.

pub mod catalogue;
pub mod pool;
pub mod trigger;

use serde::{Deserialize, Serialize};

/// Pool capacity after replenishment; the oldest external events are dropped first.
pub const POOL_CAPACITY: usize = 40;
pub const LOW_WATER_MARK: usize = 5;
pub const REPLENISH_INTERVAL: u32 = 10;

/// Scheduled draws happen every third week after the first month, on a roll above this.
pub const DRAW_MIN_TICK: u32 = 4;
pub const DRAW_INTERVAL: u32 = 3;
pub const DRAW_THRESHOLD: f64 = 0.4;

pub const EXTERNAL_WEIGHT: f64 = 1.0;
pub const FIXED_WEIGHT: f64 = 1.0;
pub const HAPPINESS_WEIGHT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Info,
    Warning,
    Danger,
    Success,
}

impl EventCategory {
    /// Unknown categories from outside are treated as info.
    pub fn parse_lenient(name: &str) -> EventCategory {
        match name.to_ascii_lowercase().as_str() {
            "warning" => EventCategory::Warning,
            "danger" => EventCategory::Danger,
            "success" => EventCategory::Success,
            _ => EventCategory::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    External,
    Fixed,
    Happiness,
}

/// An event before it has been given an id by the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub message: String,
    pub category: EventCategory,
    pub delta_food: f64,
    pub delta_wood: f64,
    pub delta_gold: f64,
    pub delta_pop: i32,
    pub source: EventSource,
    pub weight: f64,
}

impl EventDraft {
    pub fn external(
        message: impl Into<String>,
        category: EventCategory,
        delta_food: f64,
        delta_wood: f64,
        delta_gold: f64,
        delta_pop: i32,
    ) -> Self {
        EventDraft {
            message: message.into(),
            category,
            delta_food,
            delta_wood,
            delta_gold,
            delta_pop,
            source: EventSource::External,
            weight: EXTERNAL_WEIGHT,
        }
    }

    pub fn with_source(mut self, source: EventSource, weight: f64) -> Self {
        self.source = source;
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub message: String,
    pub category: EventCategory,
    pub delta_food: f64,
    pub delta_wood: f64,
    pub delta_gold: f64,
    pub delta_pop: i32,
    pub source: EventSource,
    pub weight: f64,
}

impl Event {
    /// Non-positive or non-finite weights are raised to a small positive floor.
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        let weight = if draft.weight.is_finite() && draft.weight > 0.0 {
            draft.weight
        } else {
            0.01
        };
        Event {
            id,
            message: draft.message,
            category: draft.category,
            delta_food: draft.delta_food,
            delta_wood: draft.delta_wood,
            delta_gold: draft.delta_gold,
            delta_pop: draft.delta_pop,
            source: draft.source,
            weight,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, EventSource::Fixed | EventSource::Happiness)
    }
}

/// Pending events in insertion order. Order is the draw order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventPool {
    events: Vec<Event>,
}

impl EventPool {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        let index = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(index))
    }

    pub fn total_weight(&self) -> f64 {
        self.events.iter().map(|e| e.weight).sum()
    }

    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Event) -> bool) {
        self.events.retain(keep);
    }

    /// Drop the oldest external events until at most `capacity` remain.
    pub(crate) fn trim_to_capacity(&mut self, capacity: usize) {
        while self.events.len() > capacity {
            let index = self.events.iter().position(|e| !e.is_derived()).unwrap_or(0);
            self.events.remove(index);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}
