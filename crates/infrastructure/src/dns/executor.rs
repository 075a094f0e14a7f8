//! Per-target transport state machine.
//!
//! ```text
//! Start ─┬─> SendUdp ─┬─> Done                      (answer)
//!        │     ^      ├─> RetryUdp ─┐               (timeout, attempts left)
//!        │     └──────┼─────────────┘
//!        │            ├─> EscalateTcp ─> SendTcp    (TC bit, fallback on)
//!        │            └─> Done                      (TC bit with fallback off,
//!        │                                           attempts exhausted, error)
//!        └─> SendTcp ─> Done                        (forced TCP)
//! ```

use crate::dns::forwarding::{DnsResponse, MessageBuilder, ResponseParser};
use crate::dns::transport::tcp::TcpTransport;
use crate::dns::transport::udp::UdpTransport;
use crate::dns::transport::Transport;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use zonequery_application::ports::QueryExecutor;
use zonequery_domain::config::query::DEFAULT_DNS_PORT;
use zonequery_domain::{
    DomainError, QueryErrorKind, QueryFailure, QueryOutcome, QueryTarget, ZoneQuery,
};

enum State {
    Start,
    SendUdp { attempt: u8, udp: Transport },
    RetryUdp { attempt: u8, udp: Transport },
    EscalateTcp,
    SendTcp,
    Done(Result<Exchange, QueryFailure>),
}

/// The response that ended the run, and how long its exchange took.
struct Exchange {
    response: DnsResponse,
    rtt: Duration,
}

/// Mutable bookkeeping of one execution. Never shared between targets.
struct Execution<'a> {
    server: SocketAddr,
    query: &'a ZoneQuery,
    query_id: u16,
    query_bytes: Vec<u8>,
    info: Vec<String>,
    udp_truncated: bool,
    tcp_fallback: bool,
}

impl<'a> Execution<'a> {
    async fn run(&mut self) -> Result<Exchange, QueryFailure> {
        let mut state = State::Start;
        loop {
            state = match state {
                State::Start if self.query.options.tcp_only => State::SendTcp,
                State::Start => self.open_udp().await,
                State::SendUdp { attempt, udp } => self.send_udp(attempt, udp).await,
                State::RetryUdp { attempt, udp } => {
                    debug!(server = %self.server, attempt = attempt, "Retrying UDP query");
                    State::SendUdp { attempt, udp }
                }
                State::EscalateTcp => {
                    self.tcp_fallback = true;
                    debug!(server = %self.server, "Response truncated (TC bit), retrying via TCP");
                    State::SendTcp
                }
                State::SendTcp => self.send_tcp().await,
                State::Done(result) => return result,
            };
        }
    }

    async fn open_udp(&mut self) -> State {
        match UdpTransport::bind(self.server).await {
            Ok(transport) => State::SendUdp {
                attempt: 1,
                udp: Transport::Udp(transport),
            },
            Err(e) => {
                warn!(server = %self.server, error = %e, "UDP query error");
                self.info.push(format!("UDP query error: {}", e));
                State::Done(Err(QueryFailure::new(
                    QueryErrorKind::TransportError,
                    e.to_string(),
                )))
            }
        }
    }

    /// One UDP attempt. Every lost attempt leaves a warning in `info`, so a
    /// success after a retry still shows the attempts before it.
    async fn send_udp(&mut self, attempt: u8, udp: Transport) -> State {
        let retries = self.query.options.retries;

        let started = Instant::now();
        let sent = udp.send(&self.query_bytes, self.query.options.timeout).await;
        let rtt = started.elapsed();

        let transport_response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(server = %self.server, attempt = attempt, retries = retries, "UDP query error: attempt timed out");
                self.info.push(format!("UDP query error: {}", e));
                if attempt < retries {
                    return State::RetryUdp {
                        attempt: attempt + 1,
                        udp,
                    };
                }
                return State::Done(Err(QueryFailure::new(
                    QueryErrorKind::Timeout,
                    format!("no response after {} UDP attempts", attempt),
                )));
            }
            Err(e) => {
                warn!(server = %self.server, error = %e, "UDP query error");
                self.info.push(format!("UDP query error: {}", e));
                return State::Done(Err(QueryFailure::new(
                    QueryErrorKind::TransportError,
                    e.to_string(),
                )));
            }
        };
        debug!(
            server = %self.server,
            protocol = transport_response.protocol_used,
            attempt = attempt,
            "Response received"
        );

        let response = match ResponseParser::parse_bytes(transport_response.bytes, self.query_id) {
            Ok(response) => response,
            Err(e) => return State::Done(Err(protocol_failure(self.server, e))),
        };

        if response.truncated {
            self.udp_truncated = true;
            warn!(server = %self.server, "UDP response was truncated");
            self.info.push("UDP response was truncated".to_string());
            if self.query.options.tcp_fallback {
                return State::EscalateTcp;
            }
        }

        State::Done(Ok(Exchange { response, rtt }))
    }

    async fn send_tcp(&mut self) -> State {
        let transport = Transport::Tcp(TcpTransport::new(self.server));
        debug!(server = %self.server, protocol = transport.protocol_name(), "Sending query");

        let started = Instant::now();
        let sent = transport
            .send(&self.query_bytes, self.query.options.timeout)
            .await;
        let rtt = started.elapsed();

        let transport_response = match sent {
            Ok(response) => response,
            Err(e) if e.is_protocol_error() => {
                return State::Done(Err(protocol_failure(self.server, e)));
            }
            Err(e) => {
                warn!(server = %self.server, error = %e, "TCP query error");
                self.info.push(format!("TCP query error: {}", e));
                return State::Done(Err(QueryFailure::new(
                    QueryErrorKind::TcpFailure,
                    e.to_string(),
                )));
            }
        };
        debug!(
            server = %self.server,
            protocol = transport_response.protocol_used,
            "Response received"
        );

        match ResponseParser::parse_bytes(transport_response.bytes, self.query_id) {
            Ok(response) => State::Done(Ok(Exchange { response, rtt })),
            Err(e) => State::Done(Err(protocol_failure(self.server, e))),
        }
    }
}

fn protocol_failure(server: SocketAddr, error: DomainError) -> QueryFailure {
    warn!(server = %server, error = %error, "Unusable DNS response");
    QueryFailure::new(QueryErrorKind::TransportError, error.to_string())
}

/// Talks DNS to the target address itself: UDP with retries, TCP on
/// truncation or when forced.
pub struct DnsQueryExecutor {
    port: u16,
}

impl DnsQueryExecutor {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_DNS_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for DnsQueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for DnsQueryExecutor {
    async fn execute(&self, target: &QueryTarget, query: &ZoneQuery) -> QueryOutcome {
        let server = SocketAddr::new(target.address, self.port);

        let (query_id, query_bytes) = match MessageBuilder::build_query(query) {
            Ok(built) => built,
            Err(e) => {
                return QueryOutcome::failure(
                    target.clone(),
                    QueryErrorKind::TransportError,
                    e.to_string(),
                );
            }
        };

        let mut execution = Execution {
            server,
            query,
            query_id,
            query_bytes,
            info: Vec::new(),
            udp_truncated: false,
            tcp_fallback: false,
        };

        let result = execution.run().await;

        let mut outcome = match result {
            Ok(exchange) => {
                debug!(
                    server = %server,
                    rtt_ms = ResponseParser::rtt_millis(exchange.rtt),
                    rcode = ?exchange.response.rcode(),
                    "Query complete"
                );
                QueryOutcome::success(
                    target.clone(),
                    exchange.response.into_response_data(exchange.rtt),
                )
            }
            Err(failure) => {
                debug!(server = %server, error = %failure.kind, detail = %failure.detail, "Query failed");
                QueryOutcome::failure(target.clone(), failure.kind, failure.detail)
            }
        };

        outcome.info = execution.info;
        outcome.udp_truncated = execution.udp_truncated;
        outcome.tcp_fallback = execution.tcp_fallback;
        outcome
    }
}
