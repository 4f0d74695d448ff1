//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use socks_gateway::config::ProxyConfig;
use socks_gateway::http::HttpServer;
use socks_gateway::lifecycle::Shutdown;
use socks_gateway::net::{Listener, SocksDialer};

/// Minimal SOCKS5 server (CONNECT only) for exercising the gateway.
///
/// Requested targets are looked up in `routes` first; anything else is
/// dialed as given.
pub struct MockSocks {
    pub addr: SocketAddr,
    targets: Arc<Mutex<Vec<String>>>,
}

impl MockSocks {
    /// Every `host:port` requested so far, in order.
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

pub async fn start_mock_socks(
    routes: HashMap<String, SocketAddr>,
    credentials: Option<(&'static str, &'static str)>,
) -> MockSocks {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let targets = Arc::new(Mutex::new(Vec::new()));
    let routes = Arc::new(routes);

    let recorded = targets.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let routes = routes.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let _ = serve_socks(socket, &routes, credentials, &recorded).await;
            });
        }
    });

    MockSocks { addr, targets }
}

async fn serve_socks(
    mut client: TcpStream,
    routes: &HashMap<String, SocketAddr>,
    credentials: Option<(&str, &str)>,
    recorded: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    // Greeting: VER NMETHODS METHODS...
    let mut head = [0u8; 2];
    client.read_exact(&mut head).await?;
    let mut methods = vec![0u8; head[1] as usize];
    client.read_exact(&mut methods).await?;

    let wanted = if credentials.is_some() { 0x02 } else { 0x00 };
    if !methods.contains(&wanted) {
        client.write_all(&[0x05, 0xFF]).await?;
        return Ok(());
    }
    client.write_all(&[0x05, wanted]).await?;

    if let Some((user, pass)) = credentials {
        let mut ver_ulen = [0u8; 2];
        client.read_exact(&mut ver_ulen).await?;
        let mut username = vec![0u8; ver_ulen[1] as usize];
        client.read_exact(&mut username).await?;
        let mut plen = [0u8; 1];
        client.read_exact(&mut plen).await?;
        let mut password = vec![0u8; plen[0] as usize];
        client.read_exact(&mut password).await?;

        if username != user.as_bytes() || password != pass.as_bytes() {
            client.write_all(&[0x01, 0x01]).await?;
            return Ok(());
        }
        client.write_all(&[0x01, 0x00]).await?;
    }

    // Request: VER CMD RSV ATYP DST.ADDR DST.PORT
    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    let host = match request[3] {
        0x01 => {
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).await?;
            std::net::Ipv4Addr::from(ip).to_string()
        }
        0x03 => {
            let mut len = [0u8; 1];
            client.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        0x04 => {
            let mut ip = [0u8; 16];
            client.read_exact(&mut ip).await?;
            format!("[{}]", std::net::Ipv6Addr::from(ip))
        }
        _ => return Ok(()),
    };
    let mut port = [0u8; 2];
    client.read_exact(&mut port).await?;
    let target = format!("{}:{}", host, u16::from_be_bytes(port));
    recorded.lock().unwrap().push(target.clone());

    let dialed = match routes.get(&target) {
        Some(addr) => TcpStream::connect(addr).await,
        None => TcpStream::connect(target.as_str()).await,
    };
    let mut upstream = match dialed {
        Ok(stream) => stream,
        Err(_) => {
            // Connection refused
            client.write_all(&[0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
            return Ok(());
        }
    };
    client.write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;

    let _ = tokio::io::copy_bidirectional(&mut client, &mut upstream).await;
    Ok(())
}

/// Echo server that closes its side once the peer stops writing.
pub async fn start_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
                let _ = writer.shutdown().await;
            });
        }
    });

    addr
}

/// Origin server returning a fixed raw response and recording each request head.
pub struct MockOrigin {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockOrigin {
    /// Raw request heads received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn start_mock_origin(response: &'static str) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let head = match read_head(&mut socket).await {
                    Some(head) => head,
                    None => return,
                };
                recorded.lock().unwrap().push(head);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    MockOrigin { addr, requests }
}

/// Origin that accepts and reads the request but never answers.
pub async fn start_silent_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_head(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    addr
}

/// Read up to and including the blank line that ends an HTTP head.
pub async fn read_head(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match socket.read(&mut byte).await {
            Ok(0) | Err(_) => return None,
            Ok(_) => buf.push(byte[0]),
        }
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing the gateway at a SOCKS5 server on `socks`.
pub fn gateway_config(socks: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.listen_ip = "127.0.0.1".into();
    config.listener.http_port = 0;
    config.socks.hostname = socks.ip().to_string();
    config.socks.port = socks.port();
    config.shutdown.grace_secs = 1;
    config
}

/// A gateway running on an ephemeral loopback port.
pub struct Gateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<()>,
}

impl Gateway {
    /// `reqwest` client sending everything through this gateway.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(format!("http://{}", self.addr)).unwrap())
            .pool_max_idle_per_host(0)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap()
    }
}

pub async fn start_gateway(config: ProxyConfig) -> Gateway {
    let dialer = SocksDialer::new(&config.socks, config.timeouts.connect()).unwrap();
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, dialer);
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway {
        addr,
        shutdown,
        handle,
    }
}

/// Open a raw CONNECT tunnel and return the stream with the reply head.
pub async fn raw_connect(gateway: SocketAddr, target: &str) -> (TcpStream, String) {
    let mut stream = TcpStream::connect(gateway).await.unwrap();
    let request = format!("CONNECT {target} HTTP/1.1\r\nHost: {target}\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let head = read_head(&mut stream).await.unwrap_or_default();
    (stream, head)
}
