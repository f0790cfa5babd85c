//! Connection lifecycle tests against real sockets.
//!
//! The "reachable" case starts an in-process tonic server with no services
//! registered: dialing succeeds, and every call comes back `UNIMPLEMENTED`.

use std::net::SocketAddr;
use std::time::Duration;

use profile_client::{ClientConfig, Context, ProfileClient, ProfileError};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tonic::service::Routes;
use tonic::transport::Server;

/// Find an available port for testing.
async fn find_available_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start an empty gRPC server on a random port and return its address.
async fn start_empty_server() -> String {
    let addr = find_available_port().await;

    tokio::spawn(async move {
        Server::builder()
            .add_routes(Routes::default())
            .serve(addr)
            .await
            .unwrap();
    });

    // Give the server a moment to bind.
    tokio::time::sleep(Duration::from_millis(100)).await;

    format!("http://{addr}")
}

#[tokio::test]
async fn connects_to_reachable_endpoint() {
    let endpoint = start_empty_server().await;
    let ctx = Context::background();

    let client = ProfileClient::connect(&ctx, ClientConfig::new(endpoint))
        .await
        .expect("client should connect");
    assert!(!client.is_closed());

    // The connection is usable: the server answers, just without this service.
    let err = client.get_profile_by_id(&ctx, "p1").await.unwrap_err();
    assert_eq!(
        err.status().map(tonic::Status::code),
        Some(tonic::Code::Unimplemented)
    );

    client.close();
    let err = client.get_profile_by_id(&ctx, "p1").await.unwrap_err();
    assert!(matches!(err, ProfileError::Closed), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connection_error() {
    let config = ClientConfig::new("http://127.0.0.1:1").connect_timeout(Duration::from_secs(2));

    let err = ProfileClient::connect(&Context::background(), config)
        .await
        .unwrap_err();
    match err {
        ProfileError::Connection { endpoint, .. } => assert_eq!(endpoint, "http://127.0.0.1:1"),
        other => panic!("expected connection error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_endpoint_is_a_configuration_error() {
    let err = ProfileClient::connect(&Context::background(), ClientConfig::new("not a uri"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::Configuration(_)), "got {err:?}");
}

#[tokio::test]
async fn lazy_client_reports_failures_per_call() {
    let config = ClientConfig::new("http://127.0.0.1:1")
        .lazy(true)
        .connect_timeout(Duration::from_secs(2));
    let ctx = Context::background();

    let client = ProfileClient::connect(&ctx, config)
        .await
        .expect("lazy dial never touches the network");

    let err = client
        .get_profile_by_contact(&ctx, "a@example.com")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ProfileError::Transport(_) | ProfileError::Timeout(_)),
        "got {err:?}"
    );
}

/// Bind a listener and fill its accept queue, so further connection attempts
/// stall in the handshake instead of being refused.
///
/// The returned listener and streams must be kept alive for the duration of the test.
async fn stalled_endpoint() -> (TcpListener, Vec<TcpStream>, String) {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = socket.local_addr().unwrap();
    let listener = socket.listen(1).unwrap();

    let mut held = Vec::new();
    for _ in 0..16 {
        match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => held.push(stream),
            _ => break,
        }
    }
    (listener, held, format!("http://{addr}"))
}

#[tokio::test]
async fn caller_deadline_bounds_construction() {
    let (_listener, _held, endpoint) = stalled_endpoint().await;
    // The dial's own timeout is far away; only the caller's deadline can end it.
    let config = ClientConfig::new(endpoint).connect_timeout(Duration::from_secs(30));
    let ctx = Context::background().with_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let err = ProfileClient::connect(&ctx, config).await.unwrap_err();
    assert!(matches!(err, ProfileError::Timeout(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn cancellation_abandons_construction() {
    let (_listener, _held, endpoint) = stalled_endpoint().await;
    let config = ClientConfig::new(endpoint).connect_timeout(Duration::from_secs(30));
    let ctx = Context::background();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = ProfileClient::connect(&ctx, config).await.unwrap_err();
    assert!(matches!(err, ProfileError::Cancelled), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}
