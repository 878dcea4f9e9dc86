//! Disposable downstream target for exercising the relay by hand.
//!
//! Answers every request randomly: a third succeed immediately, a third
//! succeed after a long stall, a third fail with 500. Point the relay at
//! it and watch requests get retried until they land.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::any, Router};
use rand::Rng;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", any(random_response))
        .route("/{*path}", any(random_response));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("relay target listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn random_response() -> (StatusCode, &'static str) {
    let roll = rand::thread_rng().gen_range(0..3);
    tokio::time::sleep(Duration::from_millis(100)).await;

    match roll {
        0 => {
            let delay = 10;
            println!("will respond in {delay} seconds");
            tokio::time::sleep(Duration::from_secs(delay)).await;
            (StatusCode::OK, "Success!")
        }
        1 => {
            println!("success");
            (StatusCode::OK, "Success!")
        }
        _ => {
            println!("error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}
