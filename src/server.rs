//! The cooperative control loop.

use futures::FutureExt as _;
use log::{debug, info, warn};

use crate::command::Command;
use crate::config::{DeviceConfig, DeviceIdentity};
use crate::device::DeviceState;
use crate::driver::LedDriver;
use crate::engine;
use crate::errors::Error;
use crate::http::{self, HttpMethod, ParsedRequest, Response};
use crate::runtime::{self, AsyncTcpListener, AsyncTcpStream, Instant, TcpListener};

type Result<T> = std::result::Result<T, Error>;

/// The route all commands arrive on.
pub const COMMAND_ROUTE: &str = "/command";

/// A single-threaded strip controller.
///
/// One cooperative scheduler loop owns the listener, the device state, and
/// the output driver. Each tick services at most one pending connection,
/// advances the running fade by the measured elapsed time, re-asserts the
/// output color, and sleeps for the configured tick interval. All state
/// mutation happens on this one control flow, so there are no locks
/// anywhere.
///
/// Reading a request is bounded only by the client; a stalled sender
/// stalls the fade until it disconnects. Recovery from anything worse than
/// a failed request is a process restart, which is how the physical device
/// treats losing its network.
pub struct DeviceServer<D: LedDriver, I: DeviceIdentity> {
    config: DeviceConfig,
    state: DeviceState,
    driver: D,
    identity: I,
}

impl<D: LedDriver, I: DeviceIdentity> DeviceServer<D, I> {
    pub fn new(config: DeviceConfig, driver: D, identity: I) -> Self {
        DeviceServer {
            config,
            state: DeviceState::new(),
            driver,
            identity,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Bind the configured port and run the control loop.
    ///
    /// Only returns on a fatal socket error; the caller decides whether to
    /// restart.
    pub async fn run(&mut self) -> Result<()> {
        let listener = TcpListener::bind(&format!("0.0.0.0:{}", self.config.port))
            .await
            .map_err(|e| Error::socket("bind", e))?;
        if let Ok(addr) = listener.local_addr() {
            info!("listening on {addr}");
        }
        self.serve(&listener).await
    }

    /// Drive the control loop over an already-bound listener.
    pub async fn serve<L: AsyncTcpListener>(&mut self, listener: &L) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            self.tick(listener, &mut last_tick).await?;
        }
    }

    /// Run one scheduler tick.
    ///
    /// Polls for a pending connection without waiting, services it if one
    /// is queued, then advances the fade by the wall time since the
    /// previous tick and hands the current color to the driver. A second
    /// connection arriving mid-tick stays in the accept backlog until a
    /// later tick.
    pub async fn tick<L: AsyncTcpListener>(
        &mut self,
        listener: &L,
        last_tick: &mut Instant,
    ) -> Result<()> {
        if let Some(pending) = listener.accept().now_or_never() {
            let (mut stream, peer) = pending.map_err(|e| Error::socket("accept", e))?;
            debug!("connection from {peer}");
            if let Err(e) = self.service(&mut stream).await {
                warn!("request from {peer} failed: {e}");
            }
            if let Err(e) = stream.shutdown().await {
                debug!("shutdown toward {peer} failed: {e}");
            }
        }

        let elapsed = last_tick.elapsed();
        *last_tick = Instant::now();
        engine::advance(&mut self.state, elapsed);
        self.driver.apply(self.state.current());

        runtime::sleep(self.config.tick_interval).await;
        Ok(())
    }

    /// Read, dispatch, and answer one request on an accepted connection.
    async fn service<S: AsyncTcpStream>(&mut self, stream: &mut S) -> Result<()> {
        let request = http::read_request(stream).await?;
        let response = self.handle(&request)?;
        response.write_to(stream).await
    }

    /// Map one decoded request onto the device, mutating state as
    /// commanded.
    ///
    /// Anything that is not `POST /command` is a 404 with no body, as is a
    /// well-formed command naming an unknown method. A body that fails
    /// validation is a 400 and leaves the state untouched.
    pub fn handle(&mut self, request: &ParsedRequest) -> Result<Response> {
        if !request.matches(HttpMethod::Post, COMMAND_ROUTE) {
            debug!("no handler for {:?} {:?}", request.method, request.route.as_str());
            return Ok(Response::not_found());
        }

        match Command::parse(&request.body) {
            Ok(command) => {
                let body = self.state.dispatch(&command, &self.identity);
                if body.is_populated() {
                    Response::ok().with_json(&body)
                } else {
                    Ok(Response::ok())
                }
            }
            Err(Error::UnknownMethod(method)) => {
                debug!("unknown command method {method:?}");
                Ok(Response::not_found())
            }
            Err(e) => {
                warn!("rejecting malformed command: {e}");
                Ok(Response::bad_request())
            }
        }
    }
}


#[cfg(all(test, feature = "runtime-tokio"))]
mod loop_tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::config::StaticIdentity;
    use crate::driver::testing::RecordingDriver;
    use crate::types::Color;

    async fn roundtrip(
        server: &mut DeviceServer<RecordingDriver, StaticIdentity>,
        listener: &TcpListener,
        last_tick: &mut Instant,
        addr: std::net::SocketAddr,
        body: &str,
    ) -> String {
        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let raw = format!(
            "POST /command HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        client.write_all(raw.as_bytes()).await.unwrap();

        // The connection sits in the backlog until a tick polls it out.
        for _ in 0..3 {
            server.tick(listener, last_tick).await.unwrap();
        }

        let mut reply = Vec::new();
        runtime::timeout(Duration::from_secs(2), client.read_to_end(&mut reply))
            .await
            .unwrap()
            .unwrap();
        String::from_utf8(reply).unwrap()
    }

    #[tokio::test]
    async fn full_loop_fades_to_a_commanded_color() {
        let mut server = DeviceServer::new(
            DeviceConfig::new().with_port(0),
            RecordingDriver::default(),
            StaticIdentity::new("AA:BB:CC:DD:EE:FF"),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut last_tick = Instant::now();

        let reply = roundtrip(
            &mut server,
            &listener,
            &mut last_tick,
            addr,
            r#"{"method": "set_power", "param": {"value": true}}"#,
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(server.state().is_on());

        let reply = roundtrip(
            &mut server,
            &listener,
            &mut last_tick,
            addr,
            r#"{"method": "set_rgbw", "param": {"r":1,"g":0,"b":0,"w":0,"time":100}}"#,
        )
        .await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));

        // 10 ms ticks against a 100 ms fade: give it ample wall time.
        for _ in 0..30 {
            server.tick(&listener, &mut last_tick).await.unwrap();
        }
        assert_eq!(server.state().remaining(), Duration::ZERO);
        assert_eq!(*server.state().current(), Color::rgbw(1.0, 0.0, 0.0, 0.0));

        // The driver saw the color re-asserted on every tick.
        assert!(server.driver().applied.len() >= 30);
        assert_eq!(
            *server.driver().applied.last().unwrap(),
            Color::rgbw(1.0, 0.0, 0.0, 0.0)
        );

        let reply = roundtrip(
            &mut server,
            &listener,
            &mut last_tick,
            addr,
            r#"{"method": "get_status"}"#,
        )
        .await;
        let json_start = reply.find("\r\n\r\n").unwrap() + 4;
        let body: serde_json::Value = serde_json::from_str(&reply[json_start..]).unwrap();
        assert_eq!(body["power"], serde_json::json!(true));
        assert_eq!(body["r"], serde_json::json!(1.0));
    }

    #[tokio::test]
    async fn idle_ticks_without_connections_are_no_ops() {
        let mut server = DeviceServer::new(
            DeviceConfig::new().with_port(0),
            RecordingDriver::default(),
            StaticIdentity::new("AA:BB:CC:DD:EE:FF"),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut last_tick = Instant::now();

        for _ in 0..5 {
            server.tick(&listener, &mut last_tick).await.unwrap();
        }
        assert_eq!(*server.state(), DeviceState::new());
        assert_eq!(server.driver().applied.len(), 5);
    }
}
