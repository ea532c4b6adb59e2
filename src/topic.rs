//! The data channel readings are published on.

use core::cell::Cell;

use crate::types::Reading;

/// Producer side of a typed broadcast channel.
///
/// The first reading is handed to [`Publisher::advertise`], which returns the handle every later
/// [`Publisher::publish`] goes through.
pub trait Publisher {
    type Handle;

    /// Announce the channel with its first value.
    fn advertise(&mut self, initial: &Reading) -> Self::Handle;

    /// Replace the channel's value.
    fn publish(&mut self, handle: &Self::Handle, value: &Reading);
}

/// Single-slot topic holding the latest reading.
///
/// Subscribers share the topic by reference and poll it with a [`TopicSubscriber`]. Intended for a
/// single cooperative context, hence `Cell` rather than a lock.
#[derive(Debug, Default)]
pub struct BatteryTopic {
    latest: Cell<Option<Reading>>,
    /// Bumped on every advertise or publish.
    generation: Cell<u32>,
    advertised: Cell<bool>,
}

/// Proof that [`BatteryTopic`] has been advertised.
#[derive(Debug)]
pub struct TopicHandle(());

impl BatteryTopic {
    pub const fn new() -> Self {
        Self {
            latest: Cell::new(None),
            generation: Cell::new(0),
            advertised: Cell::new(false),
        }
    }

    /// The last value published, if any.
    pub fn latest(&self) -> Option<Reading> {
        self.latest.get()
    }

    /// Number of values published so far.
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    pub fn is_advertised(&self) -> bool {
        self.advertised.get()
    }

    /// Create a subscriber which has not seen any value yet.
    pub fn subscribe(&self) -> TopicSubscriber<'_> {
        TopicSubscriber {
            topic: self,
            seen: 0,
        }
    }

    fn store(&self, value: &Reading) {
        self.latest.set(Some(*value));
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

impl Publisher for &BatteryTopic {
    type Handle = TopicHandle;

    fn advertise(&mut self, initial: &Reading) -> TopicHandle {
        self.advertised.set(true);
        self.store(initial);
        TopicHandle(())
    }

    fn publish(&mut self, _handle: &TopicHandle, value: &Reading) {
        self.store(value);
    }
}

/// Reader side of a [`BatteryTopic`].
pub struct TopicSubscriber<'a> {
    topic: &'a BatteryTopic,
    seen: u32,
}

impl TopicSubscriber<'_> {
    /// Whether a value newer than the last one copied is available.
    pub fn updated(&self) -> bool {
        self.topic.generation() != self.seen
    }

    /// Copy the latest value if it changed since the previous call.
    pub fn check(&mut self) -> Option<Reading> {
        if !self.updated() {
            return None;
        }
        self.seen = self.topic.generation();
        self.topic.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(voltage_mv: i32) -> Reading {
        Reading {
            voltage_mv,
            ..Default::default()
        }
    }

    #[test]
    fn test_advertise_then_publish() {
        let topic = BatteryTopic::new();
        assert!(!topic.is_advertised());
        assert_eq!(topic.latest(), None);

        let mut publisher = &topic;
        let handle = publisher.advertise(&reading(16));
        assert!(topic.is_advertised());
        assert_eq!(topic.latest(), Some(reading(16)));
        assert_eq!(topic.generation(), 1);

        publisher.publish(&handle, &reading(17));
        assert_eq!(topic.latest(), Some(reading(17)));
        assert_eq!(topic.generation(), 2);
    }

    #[test]
    fn test_subscriber_sees_each_update_once() {
        let topic = BatteryTopic::new();
        let mut subscriber = topic.subscribe();
        assert!(!subscriber.updated());
        assert_eq!(subscriber.check(), None);

        let mut publisher = &topic;
        let handle = publisher.advertise(&reading(16));
        assert!(subscriber.updated());
        assert_eq!(subscriber.check(), Some(reading(16)));
        assert_eq!(subscriber.check(), None);

        // Only the newest value is kept.
        publisher.publish(&handle, &reading(17));
        publisher.publish(&handle, &reading(18));
        assert_eq!(subscriber.check(), Some(reading(18)));
        assert_eq!(subscriber.check(), None);
    }
}
