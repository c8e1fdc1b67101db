//! Shared utilities for integration testing.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gen_rotor::config::{BackendConfig, RotorConfig};
use gen_rotor::error::CallError;
use gen_rotor::registry::Backend;
use gen_rotor::transport::{Completion, GenerationTransport};

/// One scripted transport outcome.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Outcome {
    Success(&'static str),
    RateLimited,
    Unusable,
    Transient,
    Empty,
}

impl Outcome {
    fn into_result(self) -> Result<Completion, CallError> {
        match self {
            Outcome::Success(text) => Ok(Completion {
                text: text.to_string(),
                model: None,
            }),
            Outcome::RateLimited => Err(CallError::RateLimited {
                retry_after: Some(Duration::from_secs(1)),
            }),
            Outcome::Unusable => Err(CallError::Unusable {
                status: 404,
                message: "model removed".to_string(),
            }),
            Outcome::Transient => Err(CallError::Api {
                status: 503,
                message: "upstream unavailable".to_string(),
            }),
            Outcome::Empty => Err(CallError::EmptyCompletion),
        }
    }
}

/// In-process transport replaying a scripted sequence of outcomes.
///
/// Once the script runs dry the fallback outcome repeats forever. Every call
/// is logged with the backend name it targeted.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: Outcome::Success("fallback"),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(&self, backend: &Backend, _prompt: &str) -> Result<Completion, CallError> {
        self.calls.lock().unwrap().push(backend.name().to_string());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.into_result()
    }
}

#[allow(dead_code)]
pub fn backend(name: &str, priority: u32, daily_quota: u64) -> BackendConfig {
    BackendConfig {
        name: name.to_string(),
        priority,
        daily_quota,
        category: "general".to_string(),
        max_output_length: 256,
        sampling_temperature: 0.7,
    }
}

#[allow(dead_code)]
pub fn rotor_config(backends: Vec<BackendConfig>) -> RotorConfig {
    let mut config = RotorConfig::default();
    config.backends = backends;
    config
}

/// Start a mock chat-completions upstream answering every request with the
/// given status and body.
#[allow(dead_code)]
pub async fn start_completions_backend(status: u16, body: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let body = body.clone();
                    tokio::spawn(async move {
                        read_request(&mut socket).await;

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Drain an HTTP request (headers plus content-length body) from the socket.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_header_end(&buf) {
                    break pos;
                }
            }
            Err(_) => return,
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut remaining = content_length.saturating_sub(buf.len() - header_end - 4);
    while remaining > 0 {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => remaining = remaining.saturating_sub(n),
        }
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
