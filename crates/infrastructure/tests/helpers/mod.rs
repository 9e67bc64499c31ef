use emberdns_application::ports::{DnsResolver, RateLimiter};
use emberdns_application::use_cases::HandleDnsQueryUseCase;
use emberdns_domain::config::{RateLimitConfig, UpstreamConfig};
use emberdns_domain::{RecordType, ResourceRecord, ResponseCode};
use emberdns_infrastructure::cache::{ResponseCache, ResponseCacheConfig};
use emberdns_infrastructure::rate_limit::SlidingWindowRateLimiter;
use emberdns_infrastructure::resolver::ForwardingResolver;
use emberdns_infrastructure::server::UdpServer;
use emberdns_infrastructure::upstream::UdpForwarder;
use emberdns_infrastructure::wire::Message;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

/// How the stub upstream reacts to a (name, qtype) question.
#[derive(Clone)]
pub enum StubReply {
    Records(Vec<ResourceRecord>),
    NxDomain,
    /// Never answer, so the forwarder times out.
    Silence,
}

/// In-process canned upstream resolver. Counts queries per question so
/// tests can prove the cache-hit path never re-contacts upstream.
pub struct StubUpstream {
    pub addr: SocketAddr,
    zones: Arc<Mutex<HashMap<(String, u16), StubReply>>>,
    counts: Arc<Mutex<HashMap<(String, u16), u64>>>,
}

impl StubUpstream {
    pub async fn start() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = socket.local_addr().unwrap();
        let zones: Arc<Mutex<HashMap<(String, u16), StubReply>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let counts: Arc<Mutex<HashMap<(String, u16), u64>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let zones_task = Arc::clone(&zones);
        let counts_task = Arc::clone(&counts);
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let Ok(request) = Message::from_bytes(&buf[..len]) else {
                    continue;
                };
                let Some(question) = request.question() else {
                    continue;
                };

                let key = (question.name.clone(), question.qtype);
                *counts_task.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

                let reply = zones_task
                    .lock()
                    .unwrap()
                    .get(&key)
                    .cloned()
                    .unwrap_or(StubReply::NxDomain);

                let response = match reply {
                    StubReply::Records(records) => {
                        Message::response_to(&request, ResponseCode::NoError)
                            .with_answers(records)
                    }
                    StubReply::NxDomain => {
                        Message::response_to(&request, ResponseCode::NxDomain)
                    }
                    StubReply::Silence => continue,
                };

                if let Ok(bytes) = response.to_bytes() {
                    let _ = socket.send_to(&bytes, peer).await;
                }
            }
        });

        Self {
            addr,
            zones,
            counts,
        }
    }

    pub fn serve(&self, name: &str, record_type: RecordType, reply: StubReply) {
        self.zones
            .lock()
            .unwrap()
            .insert((name.to_string(), record_type.to_u16()), reply);
    }

    pub fn query_count(&self, name: &str, record_type: RecordType) -> u64 {
        self.counts
            .lock()
            .unwrap()
            .get(&(name.to_string(), record_type.to_u16()))
            .copied()
            .unwrap_or(0)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
}

/// Full server wired against the stub upstream, with a short upstream
/// timeout so SERVFAIL paths stay fast.
pub async fn start_server(
    upstream: &StubUpstream,
    max_queries_per_window: u32,
) -> TestServer {
    let forwarder = Arc::new(
        UdpForwarder::new(&UpstreamConfig {
            server: upstream.addr.to_string(),
            timeout_ms: 200,
            max_retries: 1,
            initial_retry_delay_ms: 10,
            backoff_multiplier: 2.0,
        })
        .expect("forwarder"),
    );

    let cache = Arc::new(ResponseCache::new(ResponseCacheConfig {
        max_entries: 1024,
        min_ttl: 0,
        max_ttl: 86_400,
    }));

    let resolver: Arc<dyn DnsResolver> =
        Arc::new(ForwardingResolver::new(forwarder, 8).with_cache(Arc::clone(&cache)));

    let rate_limiter: Arc<dyn RateLimiter> =
        Arc::new(SlidingWindowRateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_queries_per_window,
            window_seconds: 1,
        }));

    let use_case = Arc::new(HandleDnsQueryUseCase::new(resolver, rate_limiter));

    let shutdown = CancellationToken::new();
    let server = UdpServer::bind("127.0.0.1:0".parse().unwrap(), use_case, shutdown.clone())
        .await
        .expect("bind server");
    let addr = server.local_addr().expect("server addr");

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    TestServer { addr, shutdown }
}

/// Raw UDP client, the `dig` stand-in for the black-box tests.
pub struct TestClient {
    socket: UdpSocket,
    server: SocketAddr,
}

impl TestClient {
    pub async fn connect(server: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind client");
        Self { socket, server }
    }

    pub async fn send_raw(&self, bytes: &[u8]) {
        self.socket
            .send_to(bytes, self.server)
            .await
            .expect("send");
    }

    pub async fn recv(&self) -> Message {
        let mut buf = [0u8; 512];
        let (len, _) = tokio::time::timeout(
            Duration::from_secs(2),
            self.socket.recv_from(&mut buf),
        )
        .await
        .expect("response deadline")
        .expect("recv");
        Message::from_bytes(&buf[..len]).expect("decode response")
    }

    pub async fn query(&self, name: &str, record_type: RecordType) -> Message {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed) as u16;
        let request = Message::query(id, name, record_type);
        self.send_raw(&request.to_bytes().expect("encode")).await;
        let response = self.recv().await;
        assert_eq!(response.header.id, id, "response id must echo the query id");
        response
    }
}
