use std::cmp::Ordering;

use smallvec::{smallvec, SmallVec};

use super::math::{compare_with_tolerance, Circle};
use super::sweep_tree::{Insertion, NodeId, SweepTree};

/// Refers to an event stored in an [EventQueue].
///
/// Event ids are never reused during a sweep. Once an event has been popped or deleted,
/// its id becomes stale and all lookups return `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u32);

impl EventId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The position at which an event is processed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventKey {
    pub y: f64,
    pub x: f64,
}

/// A predicted disappearance of the middle arc of a beach line triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleEvent {
    /// The left, middle and right arc.
    pub arcs: [NodeId; 3],
    /// The breakpoints between left and middle arc and between middle and right arc.
    pub breakpoints: [NodeId; 2],
    pub circle: Circle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventKind {
    Site { site: usize },
    Circle(CircleEvent),
}

impl EventKind {
    fn is_circle(&self) -> bool {
        matches!(self, EventKind::Circle(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub key: EventKey,
    pub kind: EventKind,
    node: NodeId,
}

/// Events sharing the same key (within tolerance).
///
/// Circle events are kept in front of site events.
#[derive(Clone, Debug)]
struct Bucket {
    key: EventKey,
    events: SmallVec<[EventId; 2]>,
}

/// Priority queue of site and circle events.
///
/// Events are processed from top to bottom. Events with the same y coordinate are
/// processed from left to right. Keys that are equal within the queue's tolerance are
/// merged into a single bucket.
#[derive(Clone, Debug)]
pub struct EventQueue {
    tree: SweepTree<Bucket>,
    events: Vec<Option<Event>>,
    tolerance: f64,
}

fn compare_keys(key: EventKey, other: EventKey, tolerance: f64) -> Ordering {
    compare_with_tolerance(other.y, key.y, tolerance)
        .then_with(|| compare_with_tolerance(key.x, other.x, tolerance))
}

impl EventQueue {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tree: SweepTree::new(),
            events: Vec::new(),
            tolerance,
        }
    }

    /// Returns the number of pending events.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.iter().filter(|event| event.is_some()).count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.get_mut(id.index())?.as_mut()
    }

    /// Inserts a new event.
    ///
    /// Returns the new event's id and whether an event with an equal key was already
    /// present. Both are kept in the same bucket.
    pub fn insert(&mut self, key: EventKey, kind: EventKind) -> (EventId, bool) {
        let id = EventId(self.events.len() as u32);
        let tolerance = self.tolerance;
        let insertion = self.tree.insert_by(
            |bucket| compare_keys(key, bucket.key, tolerance),
            || Bucket {
                key,
                events: smallvec![id],
            },
        );

        let (node, existed) = match insertion {
            Insertion::Inserted(node) => (node, false),
            Insertion::Existing(node) => (node, true),
        };
        if existed {
            let first_site = self.first_site_position(node);
            if let Some(bucket) = self.tree.get_mut(node) {
                if kind.is_circle() {
                    bucket.events.insert(first_site, id);
                } else {
                    bucket.events.push(id);
                }
            }
        }
        self.events.push(Some(Event { key, kind, node }));
        (id, existed)
    }

    fn first_site_position(&self, node: NodeId) -> usize {
        self.tree.get(node).map_or(0, |bucket| {
            bucket
                .events
                .iter()
                .position(|id| matches!(self.get(*id), Some(event) if !event.kind.is_circle()))
                .unwrap_or(bucket.events.len())
        })
    }

    /// Returns the other events sharing the bucket of `id`.
    pub fn bucket_mates(&self, id: EventId) -> impl Iterator<Item = &Event> + '_ {
        self.get(id)
            .and_then(|event| self.tree.get(event.node))
            .into_iter()
            .flat_map(|bucket| bucket.events.iter())
            .filter(move |other| **other != id)
            .filter_map(|other| self.get(*other))
    }

    /// Returns the next event to process without removing it.
    #[cfg(test)]
    pub fn peek(&self) -> Option<&Event> {
        let bucket = self.tree.get(self.tree.first()?)?;
        self.get(*bucket.events.first()?)
    }

    /// Removes and returns the next event to process.
    ///
    /// This is the event with the largest y coordinate, ties are broken by the smaller x
    /// coordinate. Within a bucket, circle events come first.
    pub fn delete_max(&mut self) -> Option<(EventId, Event)> {
        let node = self.tree.first()?;
        let bucket = self.tree.get_mut(node)?;
        let id = bucket.events.remove(0);
        if bucket.events.is_empty() {
            self.tree.remove(node);
        }
        let event = self.events[id.index()].take()?;
        Some((id, event))
    }

    /// Removes an event from the queue.
    ///
    /// Returns `None` if the event has already been removed.
    pub fn delete(&mut self, id: EventId) -> Option<Event> {
        let event = self.events.get_mut(id.index())?.take()?;
        if let Some(bucket) = self.tree.get_mut(event.node) {
            bucket.events.retain(|other| *other != id);
            if bucket.events.is_empty() {
                self.tree.remove(event.node);
            }
        }
        Some(event)
    }
}
