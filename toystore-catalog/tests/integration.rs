use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::tempdir;
use tokio::net::TcpListener;

use toystore_catalog::config::CatalogConfig;
use toystore_core::rpc::RpcClient;
use toystore_core::shutdown;

// These tests configure the process via environment variables, which are
// process-wide; serialize them so concurrently-run tests don't race on them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[derive(Serialize)]
struct QueryRequest<'a> {
    product_name: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    price: String,
    quantity: i64,
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    product_name: &'a str,
    quantity: i64,
}

#[derive(Deserialize)]
struct OrderResponse {
    order_result: i64,
}

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// S1 from `spec.md` §8: seed a product, query it, buy one, observe the
/// decrement.
#[tokio::test]
async fn basic_buy_decrements_stock() {
    let dir = tempdir().unwrap();
    let catalog_file = dir.path().join("catalog.csv");
    std::fs::write(&catalog_file, "product_name,price,quantity\nTux,19.99,100\n").unwrap();
    let port = free_port().await;

    let config = {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("CATALOG_HOST", "127.0.0.1");
        std::env::set_var("CATALOG_PORT", port.to_string());
        std::env::set_var("CATALOG_FILE", catalog_file.to_str().unwrap());
        std::env::set_var("FRONT_HOST", "127.0.0.1");
        std::env::set_var("FRONT_PORT", "1"); // unreachable; invalidation drop is expected
        CatalogConfig::from_env().unwrap()
    };
    let (handle, shutdown) = shutdown::channel();
    let server = tokio::spawn(toystore_catalog::service::run(config, shutdown));

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = RpcClient::new();
    let addr = format!("127.0.0.1:{port}");

    let resp: QueryResponse = client
        .call_json(&addr, "/rpc/query", &QueryRequest { product_name: "Tux" }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.price, "19.99");
    assert_eq!(resp.quantity, 100);

    let resp: OrderResponse = client
        .call_json(&addr, "/rpc/order", &OrderRequest { product_name: "Tux", quantity: 1 }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.order_result, 1);

    let resp: QueryResponse = client
        .call_json(&addr, "/rpc/query", &QueryRequest { product_name: "Tux" }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.quantity, 99);

    handle.trigger();
    let _ = tokio::time::timeout(Duration::from_secs(1), server).await;
}

/// S2 from `spec.md` §8: stock-out then a later restock.
#[tokio::test]
async fn stock_out_then_restock() {
    let dir = tempdir().unwrap();
    let catalog_file = dir.path().join("catalog.csv");
    std::fs::write(&catalog_file, "product_name,price,quantity\nTux,19.99,1\n").unwrap();
    let port = free_port().await;

    let config = {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("CATALOG_HOST", "127.0.0.1");
        std::env::set_var("CATALOG_PORT", port.to_string());
        std::env::set_var("CATALOG_FILE", catalog_file.to_str().unwrap());
        std::env::set_var("FRONT_HOST", "127.0.0.1");
        std::env::set_var("FRONT_PORT", "1");
        std::env::set_var("RESTOCK_INTERVAL", "1");
        CatalogConfig::from_env().unwrap()
    };
    let (handle, shutdown) = shutdown::channel();
    let server = tokio::spawn(toystore_catalog::service::run(config, shutdown));

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = RpcClient::new();
    let addr = format!("127.0.0.1:{port}");

    let resp: OrderResponse = client
        .call_json(&addr, "/rpc/order", &OrderRequest { product_name: "Tux", quantity: 1 }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.order_result, 1);

    let resp: OrderResponse = client
        .call_json(&addr, "/rpc/order", &OrderRequest { product_name: "Tux", quantity: 1 }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.order_result, -1);

    tokio::time::sleep(Duration::from_millis(1200)).await;

    let resp: QueryResponse = client
        .call_json(&addr, "/rpc/query", &QueryRequest { product_name: "Tux" }, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(resp.quantity, 100);

    handle.trigger();
    let _ = tokio::time::timeout(Duration::from_secs(1), server).await;
}
