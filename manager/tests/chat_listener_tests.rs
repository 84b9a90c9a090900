//! Integration tests for the long-poll loop against a mock Bot API

mod common;

use common::fixtures::test_env::LISTENER_POLL_SECONDS;
use common::fixtures::*;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::watch;

fn text_update(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 1,
            "chat": { "id": ALLOWED_CHAT, "type": "group" },
            "from": { "id": 5, "first_name": "Anna", "username": "anna" },
            "text": text
        }
    })
}

async fn wait_for_polls(api: &MockTelegramApi, count: usize) {
    for _ in 0..100 {
        if api.payloads("getUpdates").await.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("listener never reached {} getUpdates calls", count);
}

#[tokio::test]
async fn test_shutdown_acknowledges_last_batch() {
    let env = TestEnv::at(days::ordinary_wednesday(), 10, 0).build();
    let api = MockTelegramApi::start().await;
    api.mock_updates_once(json!([text_update(100, "good morning")]))
        .await;
    api.mock_idle_updates().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = env.chat_listener(&api.base_url);
    let task = tokio::spawn(async move { listener.run(shutdown_rx).await });

    // Second poll means the batch was handled
    wait_for_polls(&api, 2).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    let polls = api.payloads("getUpdates").await;
    assert_eq!(polls[0]["offset"], 0);
    assert_eq!(polls[1]["offset"], 101);
    assert_eq!(polls[1]["timeout"], LISTENER_POLL_SECONDS);

    let last = polls.last().unwrap();
    assert_eq!(last["offset"], 101);
    assert_eq!(last["timeout"], 0, "final call only confirms the offset");
}

#[tokio::test]
async fn test_shutdown_without_updates_sends_no_acknowledgement() {
    let env = TestEnv::at(days::ordinary_wednesday(), 10, 0).build();
    let api = MockTelegramApi::start().await;
    api.mock_idle_updates().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = env.chat_listener(&api.base_url);
    let task = tokio::spawn(async move { listener.run(shutdown_rx).await });

    wait_for_polls(&api, 1).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap().unwrap();

    assert!(api
        .payloads("getUpdates")
        .await
        .iter()
        .all(|p| p["timeout"] == LISTENER_POLL_SECONDS));
}
