//! Broker envelope and the JSON payloads carried on the game topics.
//!
//! Two layers: `Packet` is the bincode envelope exchanged with the broker,
//! while the snake bodies and fruit positions ride inside `Publish`/`Message`
//! as opaque JSON bytes, so either end can be replaced independently.

use crate::grid::Point;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC_ROOT: &str = "mqttsnake";
pub const FRUIT_CHANNEL: &str = "fruitpos";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect { client_version: u32 },
    Connected { client_id: u32 },
    Subscribe { filter: String },
    Publish { topic: String, payload: Vec<u8> },
    Message { topic: String, payload: Vec<u8> },
    Ping,
    Disconnect,
    Disconnected { reason: String },
}

pub fn player_topic(root: &str, player: &str) -> String {
    format!("{}/{}", root, player)
}

pub fn fruit_topic(root: &str) -> String {
    format!("{}/{}", root, FRUIT_CHANNEL)
}

/// Filter covering every topic under `root`.
pub fn wildcard(root: &str) -> String {
    format!("{}/#", root)
}

/// Filter match supporting the trailing multi-level wildcard: `snake/#`
/// accepts `snake`, `snake/alice` and `snake/alice/extra`.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    match filter.strip_suffix("/#") {
        Some(prefix) => {
            topic == prefix
                || topic
                    .strip_prefix(prefix)
                    .map_or(false, |rest| rest.starts_with('/'))
        }
        None => filter == topic,
    }
}

pub fn encode_body(body: &[Point]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(body)
}

pub fn decode_body(payload: &[u8]) -> Result<Vec<Point>, serde_json::Error> {
    serde_json::from_slice(payload)
}

pub fn encode_fruit(pos: Point) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&pos)
}

pub fn decode_fruit(payload: &[u8]) -> Result<Point, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_helpers() {
        assert_eq!(player_topic("mqttsnake", "alice"), "mqttsnake/alice");
        assert_eq!(fruit_topic("mqttsnake"), "mqttsnake/fruitpos");
        assert_eq!(wildcard("mqttsnake"), "mqttsnake/#");
    }

    #[test]
    fn test_topic_matches_exact() {
        assert!(topic_matches("mqttsnake/alice", "mqttsnake/alice"));
        assert!(!topic_matches("mqttsnake/alice", "mqttsnake/bob"));
        assert!(!topic_matches("mqttsnake/alice", "mqttsnake/alice/extra"));
    }

    #[test]
    fn test_topic_matches_wildcard() {
        assert!(topic_matches("mqttsnake/#", "mqttsnake"));
        assert!(topic_matches("mqttsnake/#", "mqttsnake/alice"));
        assert!(topic_matches("mqttsnake/#", "mqttsnake/alice/extra"));
        assert!(!topic_matches("mqttsnake/#", "mqttsnakes/alice"));
        assert!(!topic_matches("mqttsnake/#", "other/alice"));
    }

    #[test]
    fn test_body_wire_shape() {
        let body = vec![Point::new(40, 30), Point::new(41, 30)];
        let payload = encode_body(&body).unwrap();
        assert_eq!(payload, b"[[40,30],[41,30]]");
    }

    #[test]
    fn test_body_roundtrip_preserves_order() {
        let body = vec![
            Point::new(1, 2),
            Point::new(2, 2),
            Point::new(2, 3),
            Point::new(3, 3),
        ];
        let payload = encode_body(&body).unwrap();
        let back = decode_body(&payload).unwrap();
        assert_eq!(back, body);
    }

    #[test]
    fn test_fruit_roundtrip() {
        let payload = encode_fruit(Point::new(12, 48)).unwrap();
        assert_eq!(payload, b"[12,48]");
        assert_eq!(decode_fruit(&payload).unwrap(), Point::new(12, 48));
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        assert!(decode_body(b"not json").is_err());
        assert!(decode_body(b"[[1,2],[3]]").is_err());
        assert!(decode_fruit(b"{\"x\":1,\"y\":2}").is_err());
    }

    #[test]
    fn test_packet_serialization_roundtrip() {
        let packets = vec![
            Packet::Connect { client_version: 1 },
            Packet::Connected { client_id: 7 },
            Packet::Subscribe {
                filter: "mqttsnake/#".to_string(),
            },
            Packet::Publish {
                topic: "mqttsnake/alice".to_string(),
                payload: b"[[1,2]]".to_vec(),
            },
            Packet::Ping,
            Packet::Disconnected {
                reason: "broker full".to_string(),
            },
        ];

        for packet in packets {
            let serialized = bincode::serialize(&packet).unwrap();
            let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

            match (&packet, &deserialized) {
                (Packet::Connect { client_version: a }, Packet::Connect { client_version: b }) => {
                    assert_eq!(a, b)
                }
                (Packet::Connected { client_id: a }, Packet::Connected { client_id: b }) => {
                    assert_eq!(a, b)
                }
                (Packet::Subscribe { filter: a }, Packet::Subscribe { filter: b }) => {
                    assert_eq!(a, b)
                }
                (
                    Packet::Publish {
                        topic: t1,
                        payload: p1,
                    },
                    Packet::Publish {
                        topic: t2,
                        payload: p2,
                    },
                ) => {
                    assert_eq!(t1, t2);
                    assert_eq!(p1, p2);
                }
                (Packet::Ping, Packet::Ping) => {}
                (Packet::Disconnected { reason: a }, Packet::Disconnected { reason: b }) => {
                    assert_eq!(a, b)
                }
                _ => panic!("packet type changed across serialization"),
            }
        }
    }
}
