//! Peer synchronization over the topic relay
//!
//! `PeerLink` owns a dedicated network thread and hides the broker behind
//! three logical channels: our own body updates, the peer's body updates,
//! and fruit announcements. The game talks to it through channels only:
//! publishes are fire-and-forget, inbound updates arrive as fully-formed,
//! already-validated values that the tick loop drains non-blockingly.

use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{protocol, Packet, Point};
use std::error::Error;
use std::io;
use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const PING_PERIOD: Duration = Duration::from_secs(2);

/// Connection parameters for a networked session.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub broker: String,
    pub topic_root: String,
    pub player: String,
    pub opponent: String,
}

/// A validated update from the peer, ready to apply wholesale.
#[derive(Debug, Clone)]
pub enum RemoteEvent {
    SnakeBody(Vec<Point>),
    Fruit(Point),
}

enum Outbound {
    Publish { topic: String, payload: Vec<u8> },
    Shutdown,
}

pub struct PeerLink {
    outbound: mpsc::UnboundedSender<Outbound>,
    inbound: mpsc::UnboundedReceiver<RemoteEvent>,
    player_topic: String,
    fruit_topic: String,
    worker: Option<JoinHandle<()>>,
}

impl PeerLink {
    /// Connects and subscribes; returns only once the broker handshake has
    /// completed. A failure here is fatal to the session, since the join
    /// wait would otherwise block forever.
    pub fn connect(config: LinkConfig) -> Result<Self, Box<dyn Error>> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let player_topic = protocol::player_topic(&config.topic_root, &config.player);
        let fruit_topic = protocol::fruit_topic(&config.topic_root);

        let worker = thread::Builder::new()
            .name("peer-link".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("failed to start runtime: {}", e)));
                        return;
                    }
                };

                runtime.block_on(worker_loop(config, outbound_rx, inbound_tx, ready_tx));
            })?;

        match ready_rx.recv_timeout(HANDSHAKE_TIMEOUT + Duration::from_secs(1)) {
            Ok(Ok(())) => Ok(Self {
                outbound: outbound_tx,
                inbound: inbound_rx,
                player_topic,
                fruit_topic,
                worker: Some(worker),
            }),
            Ok(Err(reason)) => {
                let _ = worker.join();
                Err(reason.into())
            }
            Err(_) => Err("timed out waiting for the broker handshake".into()),
        }
    }

    /// Queues the local body for publication. Fire and forget: a failure is
    /// logged and superseded by the next tick's publish.
    pub fn publish_body(&self, body: &[Point]) {
        match protocol::encode_body(body) {
            Ok(payload) => self.send(self.player_topic.clone(), payload),
            Err(e) => error!("failed to encode body update: {}", e),
        }
    }

    /// Queues a fruit announcement.
    pub fn publish_fruit(&self, pos: Point) {
        match protocol::encode_fruit(pos) {
            Ok(payload) => self.send(self.fruit_topic.clone(), payload),
            Err(e) => error!("failed to encode fruit update: {}", e),
        }
    }

    fn send(&self, topic: String, payload: Vec<u8>) {
        let message = Outbound::Publish { topic, payload };
        if self.outbound.send(message).is_err() {
            error!("network thread is gone, dropping publish");
        }
    }

    /// Drains every update delivered since the last call. Non-blocking.
    pub fn poll(&mut self) -> Vec<RemoteEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbound.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        let _ = self.outbound.send(Outbound::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn worker_loop(
    config: LinkConfig,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    inbound_tx: mpsc::UnboundedSender<RemoteEvent>,
    ready_tx: std_mpsc::Sender<Result<(), String>>,
) {
    let socket = match connect_and_subscribe(&config).await {
        Ok(socket) => {
            let _ = ready_tx.send(Ok(()));
            socket
        }
        Err(reason) => {
            let _ = ready_tx.send(Err(reason));
            return;
        }
    };

    let own_topic = protocol::player_topic(&config.topic_root, &config.player);
    let peer_topic = protocol::player_topic(&config.topic_root, &config.opponent);
    let fruit_topic = protocol::fruit_topic(&config.topic_root);

    let mut ping = interval(PING_PERIOD);
    let mut buffer = [0u8; 2048];

    loop {
        tokio::select! {
            command = outbound_rx.recv() => match command {
                Some(Outbound::Publish { topic, payload }) => {
                    let packet = Packet::Publish { topic, payload };
                    if let Err(e) = send_packet(&socket, &packet).await {
                        error!("publish failed: {}", e);
                    }
                }
                Some(Outbound::Shutdown) | None => {
                    // best-effort teardown
                    let _ = send_packet(&socket, &Packet::Disconnect).await;
                    break;
                }
            },

            received = socket.recv(&mut buffer) => match received {
                Ok(len) => match deserialize::<Packet>(&buffer[..len]) {
                    Ok(Packet::Message { topic, payload }) => {
                        dispatch(&topic, &payload, &own_topic, &peer_topic, &fruit_topic, &inbound_tx);
                    }
                    Ok(Packet::Disconnected { reason }) => {
                        warn!("dropped by broker: {}", reason);
                    }
                    Ok(_) => {}
                    Err(_) => warn!("dropping undecodable packet from broker"),
                },
                Err(e) => {
                    error!("error receiving from broker: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },

            _ = ping.tick() => {
                if let Err(e) = send_packet(&socket, &Packet::Ping).await {
                    debug!("keep-alive failed: {}", e);
                }
            }
        }
    }
}

async fn connect_and_subscribe(config: &LinkConfig) -> Result<UdpSocket, String> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|e| format!("failed to bind socket: {}", e))?;
    socket
        .connect(&config.broker)
        .await
        .map_err(|e| format!("cannot reach broker {}: {}", config.broker, e))?;

    send_packet(&socket, &Packet::Connect { client_version: 1 })
        .await
        .map_err(|e| format!("failed to send connect: {}", e))?;

    let mut buffer = [0u8; 2048];
    let handshake = timeout(HANDSHAKE_TIMEOUT, async {
        loop {
            let len = socket
                .recv(&mut buffer)
                .await
                .map_err(|e| format!("handshake receive failed: {}", e))?;

            match deserialize::<Packet>(&buffer[..len]) {
                Ok(Packet::Connected { client_id }) => return Ok(client_id),
                Ok(Packet::Disconnected { reason }) => {
                    return Err(format!("broker refused connection: {}", reason))
                }
                Ok(_) | Err(_) => continue,
            }
        }
    })
    .await;

    let client_id = match handshake {
        Ok(outcome) => outcome?,
        Err(_) => return Err(format!("no answer from broker {}", config.broker)),
    };
    info!("connected to broker {} as client {}", config.broker, client_id);

    let subscribe = Packet::Subscribe {
        filter: protocol::wildcard(&config.topic_root),
    };
    send_packet(&socket, &subscribe)
        .await
        .map_err(|e| format!("subscribe failed: {}", e))?;

    Ok(socket)
}

fn dispatch(
    topic: &str,
    payload: &[u8],
    own_topic: &str,
    peer_topic: &str,
    fruit_topic: &str,
    inbound_tx: &mpsc::UnboundedSender<RemoteEvent>,
) {
    let event = if topic == peer_topic {
        match protocol::decode_body(payload) {
            Ok(body) => RemoteEvent::SnakeBody(body),
            Err(e) => {
                warn!("dropping malformed body update: {}", e);
                return;
            }
        }
    } else if topic == fruit_topic {
        match protocol::decode_fruit(payload) {
            Ok(pos) => RemoteEvent::Fruit(pos),
            Err(e) => {
                warn!("dropping malformed fruit update: {}", e);
                return;
            }
        }
    } else if topic == own_topic {
        // our own publish echoed back through the wildcard subscription
        return;
    } else {
        debug!("ignoring message on unrelated topic {}", topic);
        return;
    };

    // receiver gone means the session is over; the worker learns soon
    let _ = inbound_tx.send(event);
}

async fn send_packet(socket: &UdpSocket, packet: &Packet) -> io::Result<()> {
    let data = serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    socket.send(&data).await?;
    Ok(())
}
