//! # Topic Relay
//!
//! A minimal publish/subscribe relay over UDP. Clients connect, register
//! topic filters, and publish opaque payloads on named topics; the relay
//! fans every publish out to all subscribers whose filter matches the
//! topic, the publisher included when its own filter covers the topic.
//!
//! The relay never inspects payloads. It keeps exactly the state needed to
//! route: a table of subscribers, their addresses, their filters, and the
//! last time each was heard from. Silent clients are swept out after a
//! liveness timeout; clients keep themselves registered with periodic pings
//! or simply by publishing.
//!
//! ## Module Organization
//!
//! ### Subscribers Module (`subscribers`)
//! Bookkeeping for connected clients: registration with a capacity cap,
//! address lookup, filter storage, topic routing, and timeout sweeping.
//!
//! ### Relay Module (`relay`)
//! The UDP socket loop: decodes packet envelopes, answers the connect
//! handshake, applies subscriptions, and forwards published messages.

pub mod relay;
pub mod subscribers;
