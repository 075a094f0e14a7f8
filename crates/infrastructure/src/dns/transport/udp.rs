use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};
use zonequery_domain::DomainError;

/// Largest datagram a server may send back, whatever payload size we
/// advertised.
const MAX_UDP_RESPONSE_SIZE: usize = 65_535;

/// DNS over UDP to a single server.
///
/// The socket is bound once and reused for every attempt, so a late reply
/// to an earlier attempt is still accepted by a later one.
pub struct UdpTransport {
    server_addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds an ephemeral socket of the server's address family.
    pub async fn bind(server_addr: SocketAddr) -> Result<Self, DomainError> {
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        Ok(Self {
            server_addr,
            socket,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Waits for a datagram from the server until `deadline`. Datagrams from
    /// any other source are dropped without ending the wait.
    async fn recv_from_server(&self, deadline: Instant) -> Result<Bytes, DomainError> {
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        loop {
            let (bytes_received, from_addr) =
                tokio::time::timeout_at(deadline, self.socket.recv_from(&mut recv_buf))
                    .await
                    .map_err(|_| DomainError::TransportTimeout {
                        server: self.server_addr.to_string(),
                    })?
                    .map_err(|e| {
                        DomainError::IoError(format!(
                            "Failed to receive UDP response from {}: {}",
                            self.server_addr, e
                        ))
                    })?;

            if from_addr != self.server_addr {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            recv_buf.truncate(bytes_received);
            return Ok(Bytes::from(recv_buf));
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let deadline = Instant::now() + timeout;

        let bytes_sent = tokio::time::timeout_at(
            deadline,
            self.socket.send_to(message_bytes, self.server_addr),
        )
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: self.server_addr.to_string(),
        })?
        .map_err(|e| {
            DomainError::IoError(format!(
                "Failed to send UDP query to {}: {}",
                self.server_addr, e
            ))
        })?;

        debug!(server = %self.server_addr, bytes_sent = bytes_sent, "UDP query sent");

        let bytes = self.recv_from_server(deadline).await?;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
