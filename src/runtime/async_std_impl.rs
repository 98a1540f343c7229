//! async-std runtime implementation.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_std::net::{TcpListener as AsyncStdTcpListener, TcpStream as AsyncStdTcpStream};
use futures::{AsyncReadExt, AsyncWriteExt};

use super::{AsyncTcpListener, AsyncTcpStream, TimedOut};

/// async-std-based TCP listener.
pub struct TcpListener(AsyncStdTcpListener);

impl AsyncTcpListener for TcpListener {
    type Stream = TcpStream;

    async fn bind(addr: &str) -> io::Result<Self> {
        AsyncStdTcpListener::bind(addr).await.map(TcpListener)
    }

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        self.0
            .accept()
            .await
            .map(|(stream, peer)| (TcpStream(stream), peer))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.0.local_addr()
    }
}

/// async-std-based TCP connection.
pub struct TcpStream(AsyncStdTcpStream);

impl AsyncTcpStream for TcpStream {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        AsyncReadExt::read(&mut self.0, buf).await
    }

    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        AsyncWriteExt::write_all(&mut self.0, buf).await
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        AsyncWriteExt::close(&mut self.0).await
    }
}

/// Internal instant type for async-std.
#[derive(Debug, Clone, Copy)]
pub struct InstantInner(std::time::Instant);

impl InstantInner {
    pub fn now() -> Self {
        InstantInner(std::time::Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Sleep for the specified duration using async-std.
pub async fn sleep_impl(duration: Duration) {
    async_std::task::sleep(duration).await
}

/// Run a future with a timeout using async-std.
pub async fn timeout_impl<F, T>(duration: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    async_std::future::timeout(duration, future)
        .await
        .map_err(|_| TimedOut)
}
