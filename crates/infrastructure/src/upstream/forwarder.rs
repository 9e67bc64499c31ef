use crate::wire::{Message, PACKET_SIZE};
use emberdns_domain::config::UpstreamConfig;
use emberdns_domain::{DomainError, RecordType};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Forwards one question to the configured upstream resolver over UDP.
/// Timeouts retry with exponential backoff; anything else fails fast.
pub struct UdpForwarder {
    server: SocketAddr,
    timeout: Duration,
    max_retries: u32,
    initial_retry_delay: Duration,
    backoff_multiplier: f64,
}

impl UdpForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DomainError> {
        let server: SocketAddr = config
            .server
            .parse()
            .map_err(|e| DomainError::ConfigError(format!("Invalid upstream address: {}", e)))?;

        Ok(Self {
            server,
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries.max(1),
            initial_retry_delay: Duration::from_millis(config.initial_retry_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
        })
    }

    pub async fn query(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Message, DomainError> {
        let mut delay = self.initial_retry_delay;

        for attempt in 0..self.max_retries {
            match self.query_once(domain, record_type).await {
                Ok(message) => return Ok(message),
                Err(DomainError::QueryTimeout) if attempt + 1 < self.max_retries => {
                    warn!(
                        domain = %domain,
                        record_type = %record_type,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Upstream query timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.backoff_multiplier);
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::QueryTimeout)
    }

    async fn query_once(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Message, DomainError> {
        // Fresh id per attempt so a straggling reply to a previous attempt
        // cannot be mistaken for the current one.
        let id = fastrand::u16(..);
        let request = Message::query(id, domain, record_type);
        let request_bytes = request.to_bytes()?;

        let bind_addr: SocketAddr = if self.server.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .connect(self.server)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to connect to {}: {}", self.server, e)))?;

        socket
            .send(&request_bytes)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to send query to {}: {}", self.server, e)))?;

        let mut recv_buf = vec![0u8; PACKET_SIZE];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut recv_buf))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| {
                DomainError::Io(format!(
                    "Failed to receive response from {}: {}",
                    self.server, e
                ))
            })?;

        let response = Message::from_bytes(&recv_buf[..len])
            .map_err(|e| DomainError::Upstream(format!("Malformed upstream response: {}", e)))?;

        if response.header.id != id {
            return Err(DomainError::Upstream(format!(
                "Upstream response id {} does not match query id {}",
                response.header.id, id
            )));
        }

        debug!(
            domain = %domain,
            record_type = %record_type,
            rcode = %response.header.rcode,
            answers = response.answers.len(),
            "Upstream response received"
        );

        Ok(response)
    }
}
