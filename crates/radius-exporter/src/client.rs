//! Status-Server exchange client
//!
//! Holds one prepared request per monitored target and queries all of them
//! on every scrape. Every request goes to the status server; home-server
//! requests only differ in the selectors they carry.

use crate::request::{HomeServerTarget, RequestError, StatusRequest};
use crate::stats::Statistics;
use radius_proto::auth::verify_response_authenticator;
use radius_proto::message_auth::verify_response_message_authenticator;
use radius_proto::{AttributeType, Code, Packet, PacketError};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("No response from status server before the deadline")]
    Timeout,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Packet error: {0}")]
    Packet(#[from] PacketError),
    #[error("Unexpected response code: {0}")]
    UnexpectedCode(Code),
}

/// Status client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Status server address (FreeRADIUS `status` virtual server)
    pub server: SocketAddr,
    /// Home servers to report on through the status server
    pub home_servers: Vec<HomeServerTarget>,
    pub secret: String,
    /// Time allowed for one whole scrape, shared by all targets
    pub timeout: Duration,
    /// Resend interval while waiting for a response
    pub retry_interval: Duration,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

    pub fn new(server: SocketAddr, secret: impl Into<String>) -> Self {
        Self {
            server,
            home_servers: Vec::new(),
            secret: secret.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
        }
    }

    pub fn with_home_servers(mut self, home_servers: Vec<HomeServerTarget>) -> Self {
        self.home_servers = home_servers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }
}

/// Outcome of one target's exchange
#[derive(Debug)]
pub struct TargetReport {
    /// Label the target reports under
    pub address: String,
    pub result: Result<Statistics, ExchangeError>,
}

impl TargetReport {
    pub fn is_up(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct StatusClient {
    server: SocketAddr,
    secret: Arc<[u8]>,
    requests: Vec<Arc<StatusRequest>>,
    timeout: Duration,
    retry_interval: Duration,
}

impl StatusClient {
    /// Build the requests for the status server and every home server
    pub fn new(config: ClientConfig) -> Result<Self, RequestError> {
        let secret: Arc<[u8]> = Arc::from(config.secret.as_bytes());

        let mut requests = Vec::with_capacity(1 + config.home_servers.len());
        requests.push(Arc::new(StatusRequest::for_server(
            &secret,
            config.server.to_string(),
        )?));
        for target in &config.home_servers {
            requests.push(Arc::new(StatusRequest::for_home_server(&secret, target)?));
        }

        Ok(Self {
            server: config.server,
            secret,
            requests,
            timeout: config.timeout,
            retry_interval: config.retry_interval,
        })
    }

    pub fn requests(&self) -> &[Arc<StatusRequest>] {
        &self.requests
    }

    /// Query every target concurrently under one shared deadline
    ///
    /// Reports come back in target order, the status server first. A failed
    /// target never affects the others.
    pub async fn stats(&self) -> Vec<TargetReport> {
        let deadline = Instant::now() + self.timeout;

        let mut tasks = JoinSet::new();
        for (index, request) in self.requests.iter().enumerate() {
            let request = Arc::clone(request);
            let secret = Arc::clone(&self.secret);
            let server = self.server;
            let retry_interval = self.retry_interval;
            tasks.spawn(async move {
                let result = exchange(&request, server, &secret, deadline, retry_interval).await;
                (index, result)
            });
        }

        let mut responses: Vec<Option<Result<Packet, ExchangeError>>> =
            self.requests.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => responses[index] = Some(result),
                Err(e) => warn!(error = %e, "Status exchange task failed"),
            }
        }

        self.requests
            .iter()
            .zip(responses)
            .map(|(request, response)| {
                let address = request.address().to_string();
                let result = response
                    .unwrap_or_else(|| Err(io::Error::other("exchange task aborted").into()))
                    .map(|packet| Statistics::from_response(&packet, &address));
                if let Err(ref e) = result {
                    warn!(address = %address, error = %e, "Status exchange failed");
                }
                TargetReport { address, result }
            })
            .collect()
    }
}

/// Send `request` to `server` and wait for its answer
///
/// A fresh ephemeral socket is used per exchange. The request is resent every
/// `retry_interval` until `deadline`. Datagrams that do not answer this
/// request (wrong identifier, bad authenticator or Message-Authenticator)
/// are dropped.
pub async fn exchange(
    request: &StatusRequest,
    server: SocketAddr,
    secret: &[u8],
    deadline: Instant,
    retry_interval: Duration,
) -> Result<Packet, ExchangeError> {
    let bind_addr: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server).await?;

    let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];
    loop {
        socket.send(request.bytes()).await?;
        debug!(
            address = %request.address(),
            identifier = request.identifier(),
            "Status-Server request sent"
        );

        let resend_at = if retry_interval.is_zero() {
            deadline
        } else {
            (Instant::now() + retry_interval).min(deadline)
        };

        while let Ok(received) = timeout_at(resend_at, socket.recv(&mut buf)).await {
            let len = received?;
            if let Some(response) = match_response(request, &buf[..len], secret)? {
                if response.code != Code::AccessAccept {
                    return Err(ExchangeError::UnexpectedCode(response.code));
                }
                return Ok(response);
            }
        }

        if Instant::now() >= deadline {
            return Err(ExchangeError::Timeout);
        }
    }
}

/// Decode a datagram and check that it answers `request`
fn match_response(
    request: &StatusRequest,
    data: &[u8],
    secret: &[u8],
) -> Result<Option<Packet>, ExchangeError> {
    let response = Packet::decode(data)?;

    if response.identifier != request.identifier() {
        debug!(
            address = %request.address(),
            expected = request.identifier(),
            received = response.identifier,
            "Ignoring response with mismatched identifier"
        );
        return Ok(None);
    }

    if !verify_response_authenticator(&response, request.authenticator(), secret) {
        debug!(address = %request.address(), "Ignoring response with invalid authenticator");
        return Ok(None);
    }

    if let Some(offset) = response.attribute_value_offset(AttributeType::MessageAuthenticator as u8)
        && !verify_response_message_authenticator(
            &data[..response.length()],
            request.authenticator(),
            secret,
            offset,
        )
    {
        debug!(address = %request.address(), "Ignoring response with invalid Message-Authenticator");
        return Ok(None);
    }

    Ok(Some(response))
}
