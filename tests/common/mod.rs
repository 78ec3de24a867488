#![allow(dead_code)]

use reve::ReveClient;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test_api_key";

pub fn client_for(server: &MockServer) -> ReveClient {
    ReveClient::new_with_url(API_KEY.to_string(), &server.uri()).unwrap()
}

pub fn image_body(image: &str, request_id: &str) -> Value {
    json!({
        "image": image,
        "metadata": {
            "version": "reve-create@20250915",
            "credits_used": 1,
            "credits_remaining": 99,
            "content_violation": false,
            "request_id": request_id
        }
    })
}

/// The JSON bodies of every request the server saw, in order.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
