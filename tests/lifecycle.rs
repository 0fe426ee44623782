//! Integration tests for the server lifecycle state machine

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use gamenet_protocol::config::{NetworkConfig, PROTOCOL_VERSION};
use gamenet_protocol::protocol::ping;
use gamenet_protocol::utils::metrics::global_metrics;
use gamenet_protocol::{ClientSession, Dispatch, NetServer, ProtocolError};

/// Grab a port the OS considers free right now
fn free_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn test_config(port: u16) -> NetworkConfig {
    NetworkConfig::default_with_overrides(|config| {
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.server.accept_threads = 1;
        config.server.worker_threads = 2;
        config.server.backlog = 16;
        config.server.shutdown_timeout = Duration::from_secs(1);
    })
}

fn connect_ok(port: u16) -> bool {
    std::net::TcpStream::connect_timeout(
        &format!("127.0.0.1:{port}").parse().unwrap(),
        Duration::from_secs(1),
    )
    .is_ok()
}

#[test]
fn start_is_idempotent_sequentially() {
    let port = free_port();
    let server = NetServer::new(test_config(port));

    server.start().unwrap();
    server.start().unwrap();
    assert!(server.is_running());

    // exactly one listening socket: the port cannot be bound again
    assert!(StdTcpListener::bind(("127.0.0.1", port)).is_err());
    assert!(connect_ok(port));

    server.stop();
    assert!(!server.is_running());
}

#[test]
fn start_is_idempotent_concurrently() {
    let port = free_port();
    let server = std::sync::Arc::new(NetServer::new(test_config(port)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let server = server.clone();
            std::thread::spawn(move || server.start())
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert!(server.is_running());
    assert!(StdTcpListener::bind(("127.0.0.1", port)).is_err());

    server.stop();
}

#[test]
fn stop_when_not_running_is_a_noop() {
    let server = NetServer::new(test_config(free_port()));
    server.stop();
    server.stop();
    assert!(!server.is_running());
}

#[test]
fn stop_is_idempotent_after_running() {
    let port = free_port();
    let server = NetServer::new(test_config(port));

    server.start().unwrap();
    server.stop();
    server.stop();
    assert!(!server.is_running());
}

#[test]
fn restart_rebinds_cleanly() {
    let port = free_port();
    let server = NetServer::new(test_config(port));

    server.start().unwrap();
    server.stop();
    assert!(!server.is_running());

    // no leaked listener from the prior run
    server.start().unwrap();
    assert!(server.is_running());
    assert!(connect_ok(port));

    server.stop();
}

#[test]
fn occupied_port_fails_start_with_rollback() {
    let blocker = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    let server = NetServer::new(test_config(port));
    let result = server.start();

    assert!(matches!(result, Err(ProtocolError::BindError(_))));
    assert!(!server.is_running());
    assert!(server.local_addr().is_none());

    // startup failure must not poison later attempts
    drop(blocker);
    server.start().unwrap();
    assert!(server.is_running());
    server.stop();
}

#[test]
fn invalid_config_fails_start_before_binding() {
    let mut config = test_config(free_port());
    config.server.worker_threads = 0;

    let server = NetServer::new(config);
    assert!(matches!(
        server.start(),
        Err(ProtocolError::ConfigError(_))
    ));
    assert!(!server.is_running());
}

#[test]
fn end_to_end_ping_exchange() {
    let port = free_port();
    let server = NetServer::new(test_config(port));
    server.start().unwrap();

    let pings_before = global_metrics().snapshot().pings_received;

    let client_rt = tokio::runtime::Runtime::new().unwrap();
    client_rt.block_on(async {
        let mut session = ClientSession::connect(&format!("127.0.0.1:{port}"))
            .await
            .unwrap();

        // the server announces its version on accept
        let (dispatch, _frame) = session.recv().await.unwrap().expect("server closed early");
        assert_eq!(dispatch, Dispatch::Ping);
        assert_eq!(session.server_version(), Some(PROTOCOL_VERSION));

        // send our own version announcement back
        session
            .send(ping::ping_frame("client-9.9.9").unwrap())
            .await
            .unwrap();
    });
    drop(client_rt);

    // the worker pool processes the inbound ping asynchronously
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while global_metrics().snapshot().pings_received == pings_before {
        assert!(
            std::time::Instant::now() < deadline,
            "server never processed the client ping"
        );
        std::thread::sleep(Duration::from_millis(20));
    }

    server.stop();
    assert!(!server.is_running());
}
