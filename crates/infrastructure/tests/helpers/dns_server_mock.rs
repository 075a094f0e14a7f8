#![allow(dead_code)]
use hickory_proto::op::{Edns, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsCode, EdnsOption};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// What the mock does with a UDP query. TCP queries, when a listener is
/// bound, are always answered in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Answer,
    /// Never replies over UDP.
    Silent,
    /// Replies with TC set and an empty answer section.
    Truncate,
    WrongId,
    Garbage,
    /// Sends a bogus reply from another socket before the real one.
    ForeignSourceThenAnswer,
    /// Ignores the first `n` UDP queries, then answers.
    DropFirst(usize),
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub behavior: MockBehavior,
    pub answers: Vec<Ipv4Addr>,
    pub nsid: Option<&'static str>,
    pub tcp: bool,
}

impl MockConfig {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            answers: vec![Ipv4Addr::new(192, 0, 2, 10), Ipv4Addr::new(192, 0, 2, 1)],
            nsid: None,
            tcp: true,
        }
    }

    pub fn answers(mut self, answers: &[&str]) -> Self {
        self.answers = answers.iter().map(|a| a.parse().unwrap()).collect();
        self
    }

    pub fn nsid(mut self, nsid: &'static str) -> Self {
        self.nsid = Some(nsid);
        self
    }

    pub fn without_tcp(mut self) -> Self {
        self.tcp = false;
        self
    }
}

#[derive(Default)]
struct Recorded {
    udp_queries: AtomicUsize,
    tcp_queries: AtomicUsize,
    queries: Mutex<Vec<Message>>,
}

/// Scripted authoritative server on loopback UDP (and optionally TCP on the
/// same port).
pub struct MockDnsServer {
    addr: SocketAddr,
    recorded: Arc<Recorded>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    /// Starts on 127.0.0.1 with an OS-assigned port.
    pub async fn start(config: MockConfig) -> std::io::Result<Self> {
        let mut last_err = None;
        for _ in 0..16 {
            let udp = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
            let port = udp.local_addr()?.port();
            match Self::bind_tcp(&config, IpAddr::V4(Ipv4Addr::LOCALHOST), port).await {
                Ok(tcp) => return Self::spawn(udp, tcp, config),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| std::io::Error::other("no free port")))
    }

    /// Starts on a specific loopback address and port.
    pub async fn start_on(ip: IpAddr, port: u16, config: MockConfig) -> std::io::Result<Self> {
        let udp = UdpSocket::bind((ip, port)).await?;
        let tcp = Self::bind_tcp(&config, ip, port).await?;
        Self::spawn(udp, tcp, config)
    }

    /// One server per address, all sharing a port (the executor uses a
    /// single port for every target).
    pub async fn start_cluster(servers: Vec<(IpAddr, MockConfig)>) -> std::io::Result<Vec<Self>> {
        let mut last_err = None;
        'attempt: for _ in 0..16 {
            let port_finder = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;
            let port = port_finder.local_addr()?.port();
            drop(port_finder);

            let mut started = Vec::with_capacity(servers.len());
            for (ip, config) in &servers {
                match Self::start_on(*ip, port, config.clone()).await {
                    Ok(server) => started.push(server),
                    Err(e) => {
                        last_err = Some(e);
                        continue 'attempt;
                    }
                }
            }
            return Ok(started);
        }
        Err(last_err.unwrap_or_else(|| std::io::Error::other("no free port")))
    }

    async fn bind_tcp(config: &MockConfig, ip: IpAddr, port: u16) -> std::io::Result<Option<TcpListener>> {
        if config.tcp {
            Ok(Some(TcpListener::bind((ip, port)).await?))
        } else {
            Ok(None)
        }
    }

    fn spawn(udp: UdpSocket, tcp: Option<TcpListener>, config: MockConfig) -> std::io::Result<Self> {
        let addr = udp.local_addr()?;
        let recorded = Arc::new(Recorded::default());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task_recorded = Arc::clone(&recorded);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = udp.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            task_recorded.udp_queries.fetch_add(1, Ordering::SeqCst);
                            Self::handle_udp(&udp, peer, &buf[..len], &config, &task_recorded).await;
                        }
                    }
                    accepted = accept(tcp.as_ref()) => {
                        if let Ok((stream, _)) = accepted {
                            let config = config.clone();
                            let recorded = Arc::clone(&task_recorded);
                            tokio::spawn(async move {
                                let _ = Self::handle_tcp(stream, &config, &recorded).await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    async fn handle_udp(
        socket: &UdpSocket,
        peer: SocketAddr,
        packet: &[u8],
        config: &MockConfig,
        recorded: &Recorded,
    ) {
        let Ok(query) = Message::from_vec(packet) else {
            return;
        };
        recorded.queries.lock().unwrap().push(query.clone());

        let reply = match config.behavior {
            MockBehavior::Silent => return,
            MockBehavior::DropFirst(n) if recorded.udp_queries.load(Ordering::SeqCst) <= n => return,
            MockBehavior::DropFirst(_) => build_response(&query, config, false).to_vec().unwrap(),
            MockBehavior::Garbage => vec![0xde, 0xad],
            MockBehavior::Truncate => build_response(&query, config, true).to_vec().unwrap(),
            MockBehavior::WrongId => {
                let mut response = build_response(&query, config, false);
                response.set_id(query.id().wrapping_add(1));
                response.to_vec().unwrap()
            }
            MockBehavior::ForeignSourceThenAnswer => {
                let foreign = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
                let bogus = MockConfig::new(MockBehavior::Answer).answers(&["203.0.113.66"]);
                let bogus = build_response(&query, &bogus, false).to_vec().unwrap();
                let _ = foreign.send_to(&bogus, peer).await;
                build_response(&query, config, false).to_vec().unwrap()
            }
            MockBehavior::Answer => build_response(&query, config, false).to_vec().unwrap(),
        };

        let _ = socket.send_to(&reply, peer).await;
    }

    async fn handle_tcp(
        mut stream: TcpStream,
        config: &MockConfig,
        recorded: &Recorded,
    ) -> std::io::Result<()> {
        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let mut packet = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        stream.read_exact(&mut packet).await?;

        let Ok(query) = Message::from_vec(&packet) else {
            return Ok(());
        };
        recorded.tcp_queries.fetch_add(1, Ordering::SeqCst);
        recorded.queries.lock().unwrap().push(query.clone());

        let reply = build_response(&query, config, false).to_vec().unwrap();
        stream.write_all(&(reply.len() as u16).to_be_bytes()).await?;
        stream.write_all(&reply).await?;
        stream.flush().await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.recorded.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.recorded.tcp_queries.load(Ordering::SeqCst)
    }

    /// Every query received so far, UDP and TCP, in arrival order.
    pub fn queries(&self) -> Vec<Message> {
        self.recorded.queries.lock().unwrap().clone()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn accept(listener: Option<&TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

/// Authoritative answer for `query`, echoing NSID and client subnet the way
/// a cooperating server would.
pub fn build_response(query: &Message, config: &MockConfig, truncated: bool) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_authoritative(true)
        .set_recursion_desired(query.recursion_desired())
        .set_response_code(ResponseCode::NoError)
        .set_truncated(truncated);

    for question in query.queries() {
        response.add_query(question.clone());
    }

    if !truncated {
        if let Some(question) = query.queries().first() {
            for addr in &config.answers {
                response.add_answer(Record::from_rdata(
                    question.name().clone(),
                    300,
                    RData::A(A(*addr)),
                ));
            }
        }
    }

    if let Some(request_edns) = query.extensions() {
        let mut edns = Edns::new();
        edns.set_version(0);
        edns.set_max_payload(1232);
        if request_edns.options().get(EdnsCode::NSID).is_some() {
            if let Some(nsid) = config.nsid {
                edns.options_mut().insert(EdnsOption::Unknown(
                    u16::from(EdnsCode::NSID),
                    nsid.as_bytes().to_vec(),
                ));
            }
        }
        if let Some(EdnsOption::Subnet(ecs)) = request_edns.options().get(EdnsCode::Subnet) {
            edns.options_mut().insert(EdnsOption::Subnet(ClientSubnet::new(
                ecs.addr(),
                ecs.source_prefix(),
                ecs.source_prefix(),
            )));
        }
        response.set_edns(edns);
    }

    response
}
