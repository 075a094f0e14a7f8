use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use zonequery_domain::DomainError;

/// DNS over TCP (RFC 1035 two-byte length prefix), one connection per
/// exchange.
pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Bytes, DomainError> {
        let length = u16::try_from(message_bytes.len()).map_err(|_| {
            DomainError::MessageEncoding(format!(
                "query of {} bytes does not fit a TCP frame",
                message_bytes.len()
            ))
        })?;

        let mut stream = TcpStream::connect(self.server_addr).await.map_err(|e| {
            DomainError::IoError(format!(
                "Failed to connect to {} over TCP: {}",
                self.server_addr, e
            ))
        })?;

        let mut frame = Vec::with_capacity(message_bytes.len() + 2);
        frame.extend_from_slice(&length.to_be_bytes());
        frame.extend_from_slice(message_bytes);
        stream.write_all(&frame).await.map_err(|e| {
            DomainError::IoError(format!(
                "Failed to send TCP query to {}: {}",
                self.server_addr, e
            ))
        })?;

        debug!(server = %self.server_addr, bytes_sent = message_bytes.len(), "TCP query sent");

        let mut length_buf = [0u8; 2];
        stream.read_exact(&mut length_buf).await.map_err(|e| {
            DomainError::IoError(format!(
                "Failed to read TCP response length from {}: {}",
                self.server_addr, e
            ))
        })?;

        let response_length = usize::from(u16::from_be_bytes(length_buf));
        if response_length == 0 {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} returned a zero-length TCP response",
                self.server_addr
            )));
        }

        let mut response_buf = vec![0u8; response_length];
        stream.read_exact(&mut response_buf).await.map_err(|e| {
            DomainError::IoError(format!(
                "Failed to read TCP response from {}: {}",
                self.server_addr, e
            ))
        })?;

        Ok(Bytes::from(response_buf))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    /// Connect, send and receive all share the one `timeout`.
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server_addr.to_string(),
            })??;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
