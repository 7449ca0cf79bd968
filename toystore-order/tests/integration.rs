use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;
use tokio::net::TcpListener;

use toystore_core::rpc::{serve, RouterBuilder, RpcClient};
use toystore_core::shutdown;
use toystore_order::config::OrderConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[derive(Serialize)]
struct BuyRequest<'a> {
    product_name: &'a str,
    quantity: i64,
}

#[derive(Deserialize)]
struct BuyResponse {
    order_number: i64,
}

#[derive(Serialize)]
struct CheckRequest {
    order_number: i64,
}

#[derive(Deserialize)]
struct CheckResponse {
    product_name: String,
    quantity: i64,
}

/// Spawn a stub catalog that always answers `Order` with success, on a
/// fresh loopback port. Good enough to exercise the order replica's own
/// logic without building a real product table.
async fn spawn_stub_catalog(shutdown: toystore_core::shutdown::Shutdown) -> String {
    let port = free_port().await;
    let addr: std::net::SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let router = RouterBuilder::new()
        .route("/rpc/order", |_body: Bytes| async move {
            Ok(Bytes::from(serde_json::to_vec(&serde_json::json!({"order_result": 1})).unwrap()))
        })
        .build();
    tokio::spawn(serve(addr, router.into_handler(), shutdown));
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("127.0.0.1:{port}")
}

/// A single replica, acting alone as leader (no peers reachable), should
/// assign dense order numbers and answer `Check` for what it just
/// committed — the single-leader slice of S1/S3 from `spec.md` §8.
#[tokio::test]
async fn single_replica_buy_then_check() {
    let dir = tempdir().unwrap();
    let log_file = dir.path().join("log1.csv");

    let (catalog_handle, catalog_shutdown) = shutdown::channel();
    let catalog_addr = spawn_stub_catalog(catalog_shutdown).await;

    let order_port = free_port().await;
    let recovery_port = free_port().await;

    let config = {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("COMPONENT_ID", "1");
        std::env::set_var("ORDER_HOST_1", "127.0.0.1");
        std::env::set_var("ORDER_PORT_1", order_port.to_string());
        std::env::set_var("ORDER2_PORT_1", recovery_port.to_string());
        std::env::set_var("ORDER_HOST_2", "127.0.0.1");
        std::env::set_var("ORDER_PORT_2", "1"); // unreachable peer
        std::env::set_var("ORDER2_PORT_2", "2");
        std::env::set_var("ORDER_HOST_3", "127.0.0.1");
        std::env::set_var("ORDER_PORT_3", "1");
        std::env::set_var("ORDER2_PORT_3", "2");
        std::env::set_var("ORDER_LOG_FILE", log_file.to_str().unwrap());
        let (host, port) = catalog_addr.split_once(':').unwrap();
        std::env::set_var("CATALOG_HOST", host);
        std::env::set_var("CATALOG_PORT", port);
        OrderConfig::from_env().unwrap()
    };

    let (handle, replica_shutdown) = shutdown::channel();
    let server = tokio::spawn(toystore_order::replica::run(config, replica_shutdown));

    tokio::time::sleep(Duration::from_millis(150)).await;

    let client = RpcClient::new();
    let addr = format!("127.0.0.1:{order_port}");

    let resp: BuyResponse = client
        .call_json(&addr, "/rpc/buy", &BuyRequest { product_name: "Tux", quantity: 1 }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.order_number, 0);

    let resp: BuyResponse = client
        .call_json(&addr, "/rpc/buy", &BuyRequest { product_name: "Tux", quantity: 2 }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.order_number, 1);

    let resp: CheckResponse =
        client.call_json(&addr, "/rpc/check", &CheckRequest { order_number: 1 }, Duration::from_secs(1)).await.unwrap();
    assert_eq!(resp.product_name, "Tux");
    assert_eq!(resp.quantity, 2);

    let resp: CheckResponse =
        client.call_json(&addr, "/rpc/check", &CheckRequest { order_number: 99 }, Duration::from_secs(1)).await.unwrap();
    assert_eq!(resp.quantity, -1);

    handle.trigger();
    catalog_handle.trigger();
    let _ = tokio::time::timeout(Duration::from_secs(1), server).await;
}
