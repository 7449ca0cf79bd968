//! Wires the product table to the RPC surface and runs the catalog process:
//! load the seed CSV, spawn the restocker and durable writer, serve `Query`
//! and `Order` over HTTP.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use toystore_core::csv_store::catalog_csv;
use toystore_core::rpc::{serve, RouterBuilder, RpcError};
use toystore_core::shutdown::Shutdown;

use crate::client::FrontendClient;
use crate::config::CatalogConfig;
use crate::invalidate::Invalidator;
use crate::table::{OrderOutcome, ProductRow, ProductTable};
use crate::{restocker, writer};

#[derive(Deserialize)]
struct QueryRequest {
    product_name: String,
}

#[derive(Serialize)]
struct QueryResponse {
    price: String,
    quantity: i64,
}

#[derive(Deserialize)]
struct OrderRequest {
    product_name: String,
    quantity: i64,
}

#[derive(Serialize)]
struct OrderResponse {
    order_result: i64,
}

fn decode<T: for<'de> Deserialize<'de>>(body: Bytes) -> Result<T, RpcError> {
    serde_json::from_slice(&body).map_err(|err| RpcError::Codec(err.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<Bytes, RpcError> {
    serde_json::to_vec(value).map(Bytes::from).map_err(|err| RpcError::Codec(err.to_string()))
}

/// Load the seed catalog CSV into a `ProductTable`, creating an empty one
/// (header only) if the file does not yet exist.
fn load_table(config: &CatalogConfig) -> anyhow::Result<ProductTable> {
    if !config.catalog_file.exists() {
        catalog_csv::write_header_only(&config.catalog_file)?;
    }
    let rows = catalog_csv::read_catalog(&config.catalog_file)?;
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let price = Decimal::from_str(&row.price)?;
        map.insert(row.product_name, ProductRow { price, quantity: row.quantity });
    }
    Ok(ProductTable::new(map))
}

pub async fn run(config: CatalogConfig, shutdown: Shutdown) -> anyhow::Result<()> {
    let table = Arc::new(load_table(&config)?);
    let frontend = FrontendClient::new(config.front_addr.clone());
    let invalidator = Invalidator::new(frontend, config.max_workers);

    tokio::spawn(restocker::run(table.clone(), invalidator.clone(), config.restock_interval, shutdown.clone()));
    tokio::spawn(writer::run(table.clone(), config.catalog_file.clone(), shutdown.clone()));

    let query_table = table.clone();
    let order_table = table.clone();
    let order_invalidator = invalidator.clone();

    let router = RouterBuilder::new()
        .route("/rpc/query", move |body| {
            let table = query_table.clone();
            async move {
                let req: QueryRequest = decode(body)?;
                let (price, quantity) = table
                    .query(&req.product_name)
                    .map_err(|err| RpcError::Remote(err.to_string()))?;
                encode(&QueryResponse { price: price.round_dp(2).to_string(), quantity })
            }
        })
        .route("/rpc/order", move |body| {
            let table = order_table.clone();
            let invalidator = order_invalidator.clone();
            async move {
                let req: OrderRequest = decode(body)?;
                let outcome = table
                    .order(&req.product_name, req.quantity)
                    .map_err(|err| RpcError::Remote(err.to_string()))?;
                if outcome == OrderOutcome::Success {
                    invalidator.submit(req.product_name);
                }
                encode(&OrderResponse { order_result: outcome.as_sentinel() })
            }
        })
        .build();

    info!(addr = %config.bind_addr, "catalog service starting");
    serve(config.bind_addr, router.into_handler(), shutdown).await
}
