//! # Snake Client Library
//!
//! The playable side of the two-player networked snake. Each running client
//! simulates only its own snake; the opponent's snake and the fruit are
//! kept in sync by exchanging small JSON payloads over a shared topic tree
//! on the relay.
//!
//! ## Architecture Overview
//!
//! Every client is authoritative for exactly one snake. There is no server
//! arbitration, no prediction and no rollback: the peer's self-reported
//! body is trusted as-is and rendered as a mirror. What keeps the two
//! simulations visually consistent is nothing more than publishing the
//! full local body every tick and replacing the mirror wholesale whenever
//! an update arrives.
//!
//! Two execution contexts exist. The tick loop owns and mutates all local
//! game state; a dedicated network thread owns the socket. They meet only
//! at two channels — outbound publishes and inbound validated updates — so
//! the tick loop never blocks on the network and never observes a
//! half-written remote body.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The local state machine: snake movement and growth, fruit consumption
//! and respawning, wall/self/peer collision detection, and the settling
//! countdown that suppresses false peer collisions right after a join.
//!
//! ### Sync Module (`sync`)
//! The peer link: broker handshake, wildcard subscription, fire-and-forget
//! publishing, and validated delivery of remote updates.
//!
//! ### Input Module (`input`)
//! Per-frame keyboard sampling that accumulates the latest steering request
//! between ticks.
//!
//! ### Session Module (`session`)
//! The orchestrator: the join wait, the fixed-cadence tick loop, and the
//! game-over screen.
//!
//! ### Render Module (`render`)
//! Board, snakes, fruit and banner drawing.

pub mod game;
pub mod input;
pub mod render;
pub mod session;
pub mod sync;
