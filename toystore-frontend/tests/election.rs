use std::time::Duration;

use bytes::Bytes;
use tokio::net::TcpListener;

use toystore_core::rpc::{serve, RouterBuilder};
use toystore_core::shutdown;
use toystore_frontend::clients::OrderClient;
use toystore_frontend::election::Election;

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn spawn_fake_replica(shutdown: toystore_core::shutdown::Shutdown) -> String {
    let port = free_port().await;
    let addr: std::net::SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let router = RouterBuilder::new()
        .route("/rpc/ping", |_body: Bytes| async move {
            Ok(Bytes::from(serde_json::to_vec(&serde_json::json!({"ping_number": 0})).unwrap()))
        })
        .build();
    tokio::spawn(serve(addr, router.into_handler(), shutdown));
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("127.0.0.1:{port}")
}

/// S6 from `spec.md` §8's liveness property: among an arbitrary subset of
/// live replicas, the lowest id wins.
#[tokio::test]
async fn elects_lowest_id_among_live_replicas() {
    let (h2, s2) = shutdown::channel();
    let (h3, s3) = shutdown::channel();
    let addr2 = spawn_fake_replica(s2).await;
    let addr3 = spawn_fake_replica(s3).await;

    // Replica 1 is unreachable (nothing bound there); 2 and 3 are live.
    let replicas = vec![
        OrderClient::new(1, "127.0.0.1:1".to_string()),
        OrderClient::new(2, addr2),
        OrderClient::new(3, addr3),
    ];
    let election = Election::new(replicas);

    let leader = election.elect().await;
    assert_eq!(leader, Some(2));
    assert_eq!(election.current_leader(), Some(2));

    h2.trigger();
    h3.trigger();
}

#[tokio::test]
async fn elect_returns_none_when_nothing_is_reachable() {
    let replicas = vec![
        OrderClient::new(1, "127.0.0.1:1".to_string()),
        OrderClient::new(2, "127.0.0.1:2".to_string()),
        OrderClient::new(3, "127.0.0.1:3".to_string()),
    ];
    let election = Election::new(replicas);
    assert_eq!(election.elect().await, None);
}
