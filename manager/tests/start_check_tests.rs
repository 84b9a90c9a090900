//! The start-check run mode: decide, and on a holiday stay up with the chat
//! listener until the answer arrives

mod common;

use common::fixtures::*;
use power_manager::app::start_check;
use power_manager::config::ConfirmationConfig;
use power_manager::engine::{reasons, CheckAction, CheckOutcome, ResolutionWait};
use power_manager::power::PowerAction;
use power_manager::store::Decision;
use serde_json::json;

#[tokio::test]
async fn test_ordinary_day_does_not_stay_resident() {
    let env = TestEnv::at(days::ordinary_wednesday(), 7, 55).build();
    let api = MockTelegramApi::start().await;

    let report = start_check(
        &env.engine,
        env.chat_listener(&api.base_url),
        &ConfirmationConfig::default(),
    )
    .await;

    assert_eq!(report.outcome.action, CheckAction::Started);
    assert!(report.resolution.is_none());
    assert!(api.payloads("getUpdates").await.is_empty());
}

#[tokio::test]
async fn test_holiday_answer_resolves_resident_check() {
    let env = TestEnv::at(days::unity_day(), 7, 55).build();
    let api = MockTelegramApi::start().await;
    api.mock_updates_once(json!([{
        "update_id": 300,
        "callback_query": {
            "id": "cb-9",
            "from": { "id": 5, "first_name": "Anna" },
            "message": {
                "message_id": 1,
                "chat": { "id": ALLOWED_CHAT, "type": "group" }
            },
            "data": "holiday_yes_2026-11-04"
        }
    }]))
    .await;
    api.mock_idle_updates().await;

    let report = start_check(
        &env.engine,
        env.chat_listener(&api.base_url),
        &ConfirmationConfig::default(),
    )
    .await;

    assert_eq!(report.outcome.action, CheckAction::WaitingConfirmation);
    assert_eq!(report.resolution, Some(ResolutionWait::Decided(Decision::Run)));
    assert_eq!(env.power.request_count(PowerAction::PowerOn), 1);

    // The answered batch is confirmed before the process exits
    let last = api.payloads("getUpdates").await.pop().unwrap();
    assert_eq!(last["offset"], 301);
    assert_eq!(last["timeout"], 0);
}

#[tokio::test]
async fn test_unanswered_prompt_expires_to_default() {
    let env = TestEnv::at(days::unity_day(), 7, 55).build();
    let api = MockTelegramApi::start().await;
    api.mock_idle_updates().await;
    let confirmation = ConfirmationConfig {
        expire_after_minutes: Some(0),
        on_expiry: Some(Decision::Skip),
    };

    let report = start_check(
        &env.engine,
        env.chat_listener(&api.base_url),
        &confirmation,
    )
    .await;

    assert_eq!(
        report.resolution,
        Some(ResolutionWait::Expired(CheckOutcome::skip(
            reasons::USER_DECLINED_HOLIDAY
        )))
    );
    assert!(env.power.requests().is_empty());
}
