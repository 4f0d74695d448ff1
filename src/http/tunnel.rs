//! CONNECT tunnel relay.
//!
//! Once the handshake reply has been sent the client connection is an opaque
//! byte pipe. Each direction is copied by its own task; whichever finishes
//! first (EOF, error or idle timeout) aborts the other, and dropping the
//! halves closes both connections. Ownership makes every close happen once.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::net::socks::UpstreamConnection;
use crate::resilience::timeouts::IdleClock;

const BUFFER_SIZE: usize = 16 * 1024;

/// Which side of the tunnel stopped first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToUpstream,
    UpstreamToClient,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::ClientToUpstream => f.write_str("client->upstream"),
            Direction::UpstreamToClient => f.write_str("upstream->client"),
        }
    }
}

/// Outcome of a finished tunnel.
#[derive(Debug)]
pub struct TunnelStats {
    pub client_to_upstream: u64,
    pub upstream_to_client: u64,
    /// The direction whose end tore the tunnel down.
    pub finished_first: Direction,
    /// Why that direction ended. `Ok` means a clean EOF.
    pub result: io::Result<()>,
}

#[derive(Debug, Default)]
struct Counters {
    client_to_upstream: AtomicU64,
    upstream_to_client: AtomicU64,
    clock: IdleClock,
}

/// Splice `client` and `upstream` until either side closes, errors or idles out.
pub async fn relay<C>(client: C, upstream: UpstreamConnection, idle: Option<Duration>) -> TunnelStats
where
    C: AsyncRead + AsyncWrite + Send + 'static,
{
    let (client_read, client_write) = tokio::io::split(client);
    let (upstream_read, upstream_write) = upstream.into_split();
    let counters = Arc::new(Counters::default());

    let mut outbound = spawn_pipe(
        client_read,
        upstream_write,
        Direction::ClientToUpstream,
        idle,
        Arc::clone(&counters),
    );
    let mut inbound = spawn_pipe(
        upstream_read,
        client_write,
        Direction::UpstreamToClient,
        idle,
        Arc::clone(&counters),
    );

    let (finished_first, joined, other) = tokio::select! {
        joined = &mut outbound => (Direction::ClientToUpstream, joined, inbound),
        joined = &mut inbound => (Direction::UpstreamToClient, joined, outbound),
    };

    // The surviving direction owns the remaining halves; aborting it drops them.
    other.abort();
    let _ = other.await;

    let result = joined.unwrap_or_else(|e| Err(io::Error::other(e)));
    TunnelStats {
        client_to_upstream: counters.client_to_upstream.load(Ordering::Relaxed),
        upstream_to_client: counters.upstream_to_client.load(Ordering::Relaxed),
        finished_first,
        result,
    }
}

fn spawn_pipe<R, W>(
    reader: R,
    writer: W,
    direction: Direction,
    idle: Option<Duration>,
    counters: Arc<Counters>,
) -> JoinHandle<io::Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(pipe(reader, writer, direction, idle, counters))
}

async fn pipe<R, W>(
    mut reader: R,
    mut writer: W,
    direction: Direction,
    idle: Option<Duration>,
    counters: Arc<Counters>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let bytes = match direction {
        Direction::ClientToUpstream => &counters.client_to_upstream,
        Direction::UpstreamToClient => &counters.upstream_to_client,
    };
    let mut buf = vec![0u8; BUFFER_SIZE];

    loop {
        let n = match idle {
            Some(limit) => match tokio::time::timeout(limit, reader.read(&mut buf)).await {
                Ok(read) => read?,
                Err(_) if counters.clock.idle_for() >= limit => {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("tunnel idle for {:?}", limit),
                    ));
                }
                // The other direction is still moving bytes.
                Err(_) => continue,
            },
            None => reader.read(&mut buf).await?,
        };

        if n == 0 {
            let _ = writer.shutdown().await;
            return Ok(());
        }

        writer.write_all(&buf[..n]).await?;
        bytes.fetch_add(n as u64, Ordering::Relaxed);
        counters.clock.touch();
    }
}
