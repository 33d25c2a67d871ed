//! UDP relay loop fanning published payloads out to matching subscribers

use crate::subscribers::SubscriberTable;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::Packet;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;

pub struct Broker {
    socket: Arc<UdpSocket>,
    subscribers: Arc<RwLock<SubscriberTable>>,
}

impl Broker {
    pub async fn bind(addr: &str, max_subscribers: usize) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("relay listening on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            subscribers: Arc::new(RwLock::new(SubscriberTable::new(max_subscribers))),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the relay until the surrounding task is cancelled.
    pub async fn run(self) -> io::Result<()> {
        self.spawn_timeout_sweeper();

        let mut buffer = [0u8; 2048];

        loop {
            let (len, addr) = match self.socket.recv_from(&mut buffer).await {
                Ok(received) => received,
                Err(e) => {
                    error!("error receiving packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    continue;
                }
            };

            match deserialize::<Packet>(&buffer[..len]) {
                Ok(packet) => self.handle_packet(packet, addr).await,
                Err(_) => warn!("dropping undecodable packet from {}", addr),
            }
        }
    }

    /// Spawns the task that drops subscribers gone silent.
    fn spawn_timeout_sweeper(&self) {
        let subscribers = Arc::clone(&self.subscribers);
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let swept = {
                    let mut table = subscribers.write().await;
                    table.check_timeouts()
                };

                for (id, addr) in swept {
                    let notice = Packet::Disconnected {
                        reason: "timed out".to_string(),
                    };
                    if let Err(e) = send_packet(&socket, &notice, addr).await {
                        debug!("could not notify timed-out subscriber {}: {}", id, e);
                    }
                }
            }
        });
    }

    async fn handle_packet(&self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!("connect from {} (version {})", addr, client_version);

                let response = {
                    let mut table = self.subscribers.write().await;
                    // a reconnecting address replaces its old registration
                    if let Some(existing) = table.find_by_addr(addr) {
                        info!("replacing existing subscriber {} from {}", existing, addr);
                        table.remove(&existing);
                    }

                    match table.add(addr) {
                        Some(client_id) => Packet::Connected { client_id },
                        None => Packet::Disconnected {
                            reason: "broker full".to_string(),
                        },
                    }
                };

                if let Err(e) = send_packet(&self.socket, &response, addr).await {
                    error!("failed to answer connect from {}: {}", addr, e);
                }
            }

            Packet::Subscribe { filter } => {
                let mut table = self.subscribers.write().await;
                match table.find_by_addr(addr) {
                    Some(id) => {
                        debug!("subscriber {} registers filter {}", id, filter);
                        table.touch(id);
                        table.subscribe(id, filter);
                    }
                    None => warn!("subscribe from unknown address {}", addr),
                }
            }

            Packet::Publish { topic, payload } => {
                let recipients = {
                    let mut table = self.subscribers.write().await;
                    if let Some(id) = table.find_by_addr(addr) {
                        table.touch(id);
                    }
                    table.recipients(&topic)
                };

                debug!(
                    "publish on {} fans out to {} subscriber(s)",
                    topic,
                    recipients.len()
                );

                let message = Packet::Message { topic, payload };
                for (id, dest) in recipients {
                    if let Err(e) = send_packet(&self.socket, &message, dest).await {
                        error!("failed to forward to subscriber {}: {}", id, e);
                    }
                }
            }

            Packet::Ping => {
                let mut table = self.subscribers.write().await;
                if let Some(id) = table.find_by_addr(addr) {
                    table.touch(id);
                }
            }

            Packet::Disconnect => {
                let mut table = self.subscribers.write().await;
                if let Some(id) = table.find_by_addr(addr) {
                    table.remove(&id);
                }
            }

            _ => {
                warn!("unexpected packet type from {}", addr);
            }
        }
    }
}

async fn send_packet(socket: &UdpSocket, packet: &Packet, addr: SocketAddr) -> io::Result<()> {
    let data =
        serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    socket.send_to(&data, addr).await?;
    Ok(())
}
