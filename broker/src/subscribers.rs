//! Subscriber bookkeeping for the topic relay
//!
//! This module tracks who is connected, where to reach them, which topic
//! filters they registered, and when they were last heard from. It enforces
//! the relay's capacity limit and sweeps out clients that have gone silent
//! so stale addresses do not accumulate in the routing table.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use shared::protocol;

/// How long a client may stay silent before the sweeper drops it.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// A connected client and the topic filters it registered
///
/// Each subscriber carries:
/// - Connection metadata (ID, address, last activity)
/// - The filters used to decide which published topics it receives
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier assigned by the relay
    pub id: u32,
    /// Network address messages are forwarded to
    pub addr: SocketAddr,
    /// Last time any packet arrived from this client
    pub last_seen: Instant,
    /// Registered topic filters, exact or trailing-wildcard
    filters: Vec<String>,
}

impl Subscriber {
    /// Creates a subscriber with no filters, marked as just heard from.
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            filters: Vec::new(),
        }
    }

    /// Marks the subscriber as heard from right now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Registers a filter; registering the same filter twice is a no-op.
    pub fn subscribe(&mut self, filter: String) {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }

    /// True if any registered filter matches the topic.
    pub fn wants(&self, topic: &str) -> bool {
        self.filters
            .iter()
            .any(|filter| protocol::topic_matches(filter, topic))
    }

    /// True if nothing has arrived from this client within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// The relay's routing table
///
/// Centralizes subscriber registration, capacity enforcement, address
/// lookup for incoming packets, and the routing decision for each publish.
pub struct SubscriberTable {
    /// Connected subscribers indexed by their unique ID
    subscribers: HashMap<u32, Subscriber>,
    /// Next ID handed out to a new connection
    next_id: u32,
    /// Maximum number of concurrent subscribers allowed
    max_subscribers: usize,
}

impl SubscriberTable {
    pub fn new(max_subscribers: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            next_id: 1,
            max_subscribers,
        }
    }

    /// Registers a new subscriber.
    ///
    /// Returns `Some(id)` on success, `None` when the relay is at capacity.
    pub fn add(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.subscribers.len() >= self.max_subscribers {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        info!("subscriber {} connected from {}", id, addr);
        self.subscribers.insert(id, Subscriber::new(id, addr));

        Some(id)
    }

    /// Removes a subscriber. Returns false if it was already gone.
    pub fn remove(&mut self, id: &u32) -> bool {
        if let Some(sub) = self.subscribers.remove(id) {
            info!("subscriber {} disconnected", sub.id);
            true
        } else {
            false
        }
    }

    /// Finds the subscriber registered at a network address.
    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.subscribers
            .iter()
            .find(|(_, sub)| sub.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Refreshes a subscriber's liveness timestamp.
    pub fn touch(&mut self, id: u32) {
        if let Some(sub) = self.subscribers.get_mut(&id) {
            sub.touch();
        }
    }

    /// Registers a topic filter for a subscriber.
    ///
    /// Returns false if the subscriber ID is unknown.
    pub fn subscribe(&mut self, id: u32, filter: String) -> bool {
        if let Some(sub) = self.subscribers.get_mut(&id) {
            sub.subscribe(filter);
            true
        } else {
            false
        }
    }

    /// Everyone a publish on `topic` must be forwarded to.
    ///
    /// The publisher itself is included whenever its own filters cover the
    /// topic; suppressing the echo is the client's job.
    pub fn recipients(&self, topic: &str) -> Vec<(u32, SocketAddr)> {
        self.subscribers
            .iter()
            .filter(|(_, sub)| sub.wants(topic))
            .map(|(id, sub)| (*id, sub.addr))
            .collect()
    }

    /// Drops every subscriber that exceeded the liveness timeout.
    ///
    /// Returns the removed (id, addr) pairs so the relay can send a
    /// best-effort disconnect notice to each.
    pub fn check_timeouts(&mut self) -> Vec<(u32, SocketAddr)> {
        let timed_out: Vec<(u32, SocketAddr)> = self
            .subscribers
            .iter()
            .filter(|(_, sub)| sub.is_timed_out(LIVENESS_TIMEOUT))
            .map(|(id, sub)| (*id, sub.addr))
            .collect();

        for (id, _) in &timed_out {
            self.remove(id);
        }

        timed_out
    }

    /// Number of currently connected subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    #[test]
    fn test_add_and_find_by_addr() {
        let mut table = SubscriberTable::new(4);
        let id = table.add(addr(4000)).unwrap();
        assert_eq!(table.find_by_addr(addr(4000)), Some(id));
        assert_eq!(table.find_by_addr(addr(4001)), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let mut table = SubscriberTable::new(2);
        assert!(table.add(addr(4000)).is_some());
        assert!(table.add(addr(4001)).is_some());
        assert!(table.add(addr(4002)).is_none());

        let first = table.find_by_addr(addr(4000)).unwrap();
        assert!(table.remove(&first));
        assert!(table.add(addr(4002)).is_some());
    }

    #[test]
    fn test_remove_twice() {
        let mut table = SubscriberTable::new(4);
        let id = table.add(addr(4000)).unwrap();
        assert!(table.remove(&id));
        assert!(!table.remove(&id));
    }

    #[test]
    fn test_subscribe_deduplicates_filters() {
        let mut sub = Subscriber::new(1, addr(4000));
        sub.subscribe("mqttsnake/#".to_string());
        sub.subscribe("mqttsnake/#".to_string());
        assert!(sub.wants("mqttsnake/alice"));
    }

    #[test]
    fn test_recipients_follow_filters() {
        let mut table = SubscriberTable::new(4);
        let a = table.add(addr(4000)).unwrap();
        let b = table.add(addr(4001)).unwrap();
        let c = table.add(addr(4002)).unwrap();

        table.subscribe(a, "mqttsnake/#".to_string());
        table.subscribe(b, "mqttsnake/fruitpos".to_string());
        table.subscribe(c, "othergame/#".to_string());

        let mut on_fruit: Vec<u32> = table
            .recipients("mqttsnake/fruitpos")
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        on_fruit.sort();
        assert_eq!(on_fruit, vec![a, b]);

        let on_player: Vec<u32> = table
            .recipients("mqttsnake/alice")
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(on_player, vec![a]);
    }

    #[test]
    fn test_subscribe_unknown_id() {
        let mut table = SubscriberTable::new(4);
        assert!(!table.subscribe(42, "mqttsnake/#".to_string()));
    }

    #[test]
    fn test_timeout_detection() {
        let sub = Subscriber::new(1, addr(4000));
        assert!(!sub.is_timed_out(Duration::from_secs(60)));
        assert!(sub.is_timed_out(Duration::ZERO));
    }
}
