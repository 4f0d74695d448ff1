//! Failure injection tests for the gateway.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, StatusCode};
use tokio::io::AsyncWriteExt;

use socks_gateway::config::TimeoutConfig;
use socks_gateway::http::ProxyDispatcher;
use socks_gateway::net::{ConnectionTracker, SocksDialer};

mod common;

#[tokio::test]
async fn test_unreachable_socks_server_returns_503() {
    let dead = common::closed_port().await;
    let gateway = common::start_gateway(common::gateway_config(dead)).await;

    let res = gateway
        .client()
        .get("http://origin.test/")
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 503);
    assert_eq!(
        res.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(
        res.text().await.unwrap(),
        "Failed to connect to target via SOCKS5\n"
    );

    let (_stream, head) = common::raw_connect(gateway.addr, "echo.test:443").await;
    assert!(head.starts_with("HTTP/1.1 503 "), "unexpected reply: {head}");
}

#[tokio::test]
async fn test_refused_target_returns_503() {
    let dead = common::closed_port().await;
    let socks = common::start_mock_socks(HashMap::from([("gone.test:80".into(), dead)]), None).await;
    let gateway = common::start_gateway(common::gateway_config(socks.addr)).await;

    let res = gateway.client().get("http://gone.test/").send().await.unwrap();
    assert_eq!(res.status(), 503);
    assert_eq!(socks.targets(), vec!["gone.test:80".to_string()]);
}

#[tokio::test]
async fn test_rejected_socks_credentials_return_503() {
    let echo = common::start_echo_server().await;
    let socks = common::start_mock_socks(
        HashMap::from([("echo.test:443".into(), echo)]),
        Some(("alice", "s3cret")),
    )
    .await;

    let mut config = common::gateway_config(socks.addr);
    config.socks.username = "alice".into();
    config.socks.password = "wrong".into();
    let gateway = common::start_gateway(config).await;

    let (_stream, head) = common::raw_connect(gateway.addr, "echo.test:443").await;
    assert!(head.starts_with("HTTP/1.1 503 "), "unexpected reply: {head}");
    assert!(socks.targets().is_empty());
}

#[tokio::test]
async fn test_half_configured_credentials_dial_without_auth() {
    let echo = common::start_echo_server().await;
    let socks = common::start_mock_socks(HashMap::from([("echo.test:443".into(), echo)]), None).await;

    let mut config = common::gateway_config(socks.addr);
    config.socks.username = "alice".into();
    let gateway = common::start_gateway(config).await;

    let (_stream, head) = common::raw_connect(gateway.addr, "echo.test:443").await;
    assert_eq!(head, "HTTP/1.1 200 Connection Established\r\n\r\n");
}

#[tokio::test]
async fn test_connect_without_upgrade_support_returns_500() {
    let echo = common::start_echo_server().await;
    let socks = common::start_mock_socks(HashMap::from([("echo.test:443".into(), echo)]), None).await;
    let config = common::gateway_config(socks.addr);

    let dialer = SocksDialer::new(&config.socks, None).unwrap();
    let dispatcher = Arc::new(ProxyDispatcher::new(
        dialer,
        &TimeoutConfig::default(),
        ConnectionTracker::new(),
    ));

    // Built by hand, so hyper never attached an upgrade handle.
    let request = Request::builder()
        .method(Method::CONNECT)
        .uri("echo.test:443")
        .body(Empty::<Bytes>::new())
        .unwrap();

    let res = dispatcher.dispatch(request).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Hijacking not supported\n");
}

#[tokio::test]
async fn test_request_without_host_returns_400() {
    let socks = common::start_mock_socks(HashMap::new(), None).await;
    let gateway = common::start_gateway(common::gateway_config(socks.addr)).await;

    let mut stream = tokio::net::TcpStream::connect(gateway.addr).await.unwrap();
    stream
        .write_all(b"GET /no-host HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let head = common::read_head(&mut stream).await.unwrap();

    assert!(head.starts_with("HTTP/1.1 400 "), "unexpected reply: {head}");
    assert!(socks.targets().is_empty());
}

#[tokio::test]
async fn test_slow_origin_times_out_with_504() {
    let origin = common::start_silent_origin().await;
    let socks =
        common::start_mock_socks(HashMap::from([("slow.test:80".into(), origin)]), None).await;

    let mut config = common::gateway_config(socks.addr);
    config.timeouts.request_secs = Some(1);
    let gateway = common::start_gateway(config).await;

    let started = std::time::Instant::now();
    let res = gateway.client().get("http://slow.test/").send().await.unwrap();
    assert_eq!(res.status(), 504);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_origin_hanging_up_returns_500() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = common::read_head(&mut socket).await;
            // Close without answering.
        }
    });

    let socks =
        common::start_mock_socks(HashMap::from([("rude.test:80".into(), origin)]), None).await;
    let gateway = common::start_gateway(common::gateway_config(socks.addr)).await;

    let res = gateway.client().get("http://rude.test/").send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Failed to read response\n");
}
