//! Admin surface and generation endpoint over a real socket.

use std::net::SocketAddr;
use std::sync::Arc;

use gen_rotor::http::HttpServer;
use gen_rotor::service::RotorService;

mod common;
use common::{backend, rotor_config, Outcome, ScriptedTransport};

const ADMIN_KEY: &str = "rotor-admin-key";

async fn serve(transport: Arc<ScriptedTransport>) -> SocketAddr {
    let config = rotor_config(vec![backend("a", 0, 10), backend("b", 1, 10)]);
    let service = Arc::new(RotorService::new(&config, transport).unwrap());
    let router = HttpServer::new(&config, service).into_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn admin_routes_require_the_bearer_key() {
    let addr = serve(ScriptedTransport::always(Outcome::Success("ok"))).await;
    let client = client();

    let res = client
        .get(format!("http://{addr}/admin/stats"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("http://{addr}/admin/stats"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("http://{addr}/admin/stats"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn generate_then_stats_reflect_usage() {
    let addr = serve(ScriptedTransport::always(Outcome::Success("generated text"))).await;
    let client = client();

    let res = client
        .post(format!("http://{addr}/generate"))
        .json(&serde_json::json!({ "prompt": "say hi", "caller": "test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["text"], "generated text");
    assert!(body["backend"].is_string());

    let stats: serde_json::Value = client
        .get(format!("http://{addr}/admin/stats"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["requests"], 1);
    assert_eq!(stats["successes"], 1);
    assert_eq!(stats["total_used"], 1);
    assert_eq!(stats["success_rate"], 1.0);
}

#[tokio::test]
async fn generate_maps_exhaustion_to_bad_gateway() {
    let addr = serve(ScriptedTransport::always(Outcome::Transient)).await;
    let client = client();

    let res = client
        .post(format!("http://{addr}/generate"))
        .json(&serde_json::json!({ "prompt": "say hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("exhausted"));
}

#[tokio::test]
async fn rotate_and_reset_round_trip() {
    let addr = serve(ScriptedTransport::always(Outcome::Success("ok"))).await;
    let client = client();

    client
        .post(format!("http://{addr}/generate"))
        .json(&serde_json::json!({ "prompt": "hi" }))
        .send()
        .await
        .unwrap();

    let rotation: serde_json::Value = client
        .post(format!("http://{addr}/admin/rotate"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rotation["forced_rotations"], 1);

    let res = client
        .post(format!("http://{addr}/admin/reset"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let stats: serde_json::Value = client
        .get(format!("http://{addr}/admin/stats"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["requests"], 0);
    assert_eq!(stats["forced_rotations"], 0);
    assert_eq!(stats["total_used"], 0);
    assert_eq!(stats["active_backends"], 2);
}

#[tokio::test]
async fn backend_churn_over_the_admin_api() {
    let addr = serve(ScriptedTransport::always(Outcome::Success("ok"))).await;
    let client = client();

    let new_backend = serde_json::json!({
        "name": "late",
        "priority": 5,
        "daily_quota": 3,
        "category": "overflow"
    });

    let res = client
        .post(format!("http://{addr}/admin/backends"))
        .bearer_auth(ADMIN_KEY)
        .json(&new_backend)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let res = client
        .post(format!("http://{addr}/admin/backends"))
        .bearer_auth(ADMIN_KEY)
        .json(&new_backend)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409, "duplicate registration rejected");

    let res = client
        .delete(format!("http://{addr}/admin/backends/late"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .delete(format!("http://{addr}/admin/backends/late"))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}
