//! Mock cloud hosting API
//!
//! Serves `/server/{id}` and `/server/{id}/action` the way the real API
//! does, so `CloudApiClient` can be tested end to end over HTTP.

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const SERVER_ID: &str = "417022";
pub const API_TOKEN: &str = "cloud-test-token";

pub struct MockCloudApi {
    pub server: MockServer,
    pub base_url: String,
}

impl MockCloudApi {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    fn server_path() -> String {
        format!("/server/{}", SERVER_ID)
    }

    pub fn status_body(is_on: bool) -> Value {
        json!({
            "ID": 417022,
            "Name": "office-1",
            "IsPowerOn": is_on,
            "IP": "203.0.113.10",
            "Image": "Windows Server 2022",
            "CPU": 4,
            "RAM": 8192,
            "HDD": 80,
            "State": if is_on { "Active" } else { "Stopped" }
        })
    }

    /// Status endpoint reporting the given power state
    pub async fn mock_status(&self, is_on: bool) {
        Mock::given(method("GET"))
            .and(path(Self::server_path()))
            .and(header("authorization", format!("Bearer {}", API_TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::status_body(is_on)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status_error(&self, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path(Self::server_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "Message": message })))
            .mount(&self.server)
            .await;
    }

    /// Accept one specific action type, expecting it `times` times
    pub async fn expect_action(&self, action_type: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("{}/action", Self::server_path())))
            .and(header("authorization", format!("Bearer {}", API_TOKEN).as_str()))
            .and(body_json(json!({ "Type": action_type })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ID": 1,
                "Type": action_type,
                "State": "InProgress"
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_action_error(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(format!("{}/action", Self::server_path())))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
