use crate::wire::{Message, PACKET_SIZE};
use emberdns_application::use_cases::{HandleDnsQueryUseCase, QueryOutcome};
use emberdns_domain::{normalize_name, DnsRequest, DomainError, ResponseCode};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// UDP query dispatcher: one handler task per inbound datagram. A
/// malformed datagram yields FORMERR (or a silent drop when even the
/// header is unreadable), never a crash of the loop.
pub struct UdpServer {
    socket: Arc<UdpSocket>,
    use_case: Arc<HandleDnsQueryUseCase>,
    shutdown: CancellationToken,
}

impl UdpServer {
    pub fn new(
        socket: UdpSocket,
        use_case: Arc<HandleDnsQueryUseCase>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            socket: Arc::new(socket),
            use_case,
            shutdown,
        }
    }

    pub async fn bind(
        addr: SocketAddr,
        use_case: Arc<HandleDnsQueryUseCase>,
        shutdown: CancellationToken,
    ) -> Result<Self, DomainError> {
        let socket = create_udp_socket(addr)
            .map_err(|e| DomainError::Io(format!("Failed to bind {}: {}", addr, e)))?;
        Ok(Self::new(socket, use_case, shutdown))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        self.socket
            .local_addr()
            .map_err(|e| DomainError::Io(e.to_string()))
    }

    /// Receive loop. Returns once the shutdown token fires and all
    /// in-flight handlers have finished.
    pub async fn run(&self) -> Result<(), DomainError> {
        let local = self.local_addr()?;
        info!(bind_address = %local, "DNS server listening");

        let mut handlers: JoinSet<()> = JoinSet::new();
        let mut recv_buf = [0u8; PACKET_SIZE];

        loop {
            // Reap finished handlers without blocking the receive path.
            while handlers.try_join_next().is_some() {}

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut recv_buf) => {
                    match received {
                        Ok((len, peer)) => {
                            let datagram = recv_buf[..len].to_vec();
                            let socket = Arc::clone(&self.socket);
                            let use_case = Arc::clone(&self.use_case);
                            handlers.spawn(async move {
                                if let Some(response) = handle_datagram(&use_case, &datagram, peer).await {
                                    if let Err(e) = socket.send_to(&response, peer).await {
                                        warn!(peer = %peer, error = %e, "Failed to send response");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "UDP recv error");
                        }
                    }
                }
            }
        }

        info!("Shutdown requested, draining in-flight handlers");
        while handlers.join_next().await.is_some() {}
        info!("DNS server stopped");
        Ok(())
    }
}

/// Handles one datagram end to end. `None` means drop: the header was too
/// mangled to even echo an error back.
async fn handle_datagram(
    use_case: &HandleDnsQueryUseCase,
    datagram: &[u8],
    peer: SocketAddr,
) -> Option<Vec<u8>> {
    let request = match Message::from_bytes(datagram) {
        Ok(message) => message,
        Err(e) => {
            debug!(peer = %peer, error = %e, len = datagram.len(), "Undecodable datagram");
            // Best effort: if at least the header is intact, answer
            // FORMERR under the client's transaction id; otherwise drop.
            return formerr_from_header(datagram);
        }
    };

    let Some(question) = request.question() else {
        debug!(peer = %peer, "Query without question section");
        return encode_or_drop(Message::response_to(&request, ResponseCode::FormErr));
    };

    let Some(record_type) = question.record_type() else {
        debug!(peer = %peer, qtype = question.qtype, "Unsupported query type");
        return encode_or_drop(Message::response_to(&request, ResponseCode::NotImp));
    };

    let domain = normalize_name(&question.name);
    let outcome = use_case
        .execute(&DnsRequest::new(domain, record_type, peer.ip()))
        .await;

    let response = match outcome {
        QueryOutcome::Answered { records, .. } => {
            Message::response_to(&request, ResponseCode::NoError).with_answers(records)
        }
        other => Message::response_to(&request, other.rcode()),
    };

    encode_or_drop(response)
}

fn formerr_from_header(datagram: &[u8]) -> Option<Vec<u8>> {
    use crate::wire::{Header, PacketBuffer, HEADER_LEN};

    if datagram.len() < HEADER_LEN {
        return None;
    }
    let mut buffer = PacketBuffer::from_bytes(datagram).ok()?;
    let header = Header::read(&mut buffer).ok()?;

    let mut response = Message::default();
    response.header.id = header.id;
    response.header.response = true;
    response.header.recursion_desired = header.recursion_desired;
    response.header.recursion_available = true;
    response.header.rcode = ResponseCode::FormErr;
    encode_or_drop(response)
}

fn encode_or_drop(response: Message) -> Option<Vec<u8>> {
    match response.to_bytes() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(error = %e, "Failed to encode response");
            None
        }
    }
}

/// Socket tuned the same way for the server and the tests: larger buffers
/// so a burst of small queries is not dropped by the kernel.
fn create_udp_socket(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    use socket2::{Domain, Protocol, Socket, Type};

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}
