//! Integration tests for the message/voice pipeline server

mod common;

use std::sync::atomic::Ordering;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use common::*;

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let metrics = json_body(response).await;
    assert!(metrics["request_count"].is_number());
    assert!(metrics["memory_total_mb"].is_number());
}

#[tokio::test]
async fn test_message_consumes_credit_and_uses_stored_personalization() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/message", json!({ "identifier": "mw-1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["remaining"], 2);
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Marie,"), "got: {text}");
    assert_eq!(body["intent"], "love");
}

#[tokio::test]
async fn test_message_is_stable_within_the_hour() {
    let app = create_test_app();
    let first = json_body(
        app.router
            .clone()
            .oneshot(post_json("/message", json!({ "identifier": "mw-1" })))
            .await
            .unwrap(),
    )
    .await;
    let second = json_body(
        app.router
            .oneshot(post_json("/message", json!({ "identifier": "mw-1" })))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["text"], second["text"]);
}

#[tokio::test]
async fn test_message_without_stored_personalization_is_not_found() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/message", json!({ "identifier": "mw-empty" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_message_gate_rejects_exhausted_jewel() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json(
            "/message",
            json!({
                "identifier": "mw-empty",
                "personalization": { "first_name": "Luc" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "exhausted_or_inactive");
}

#[tokio::test]
async fn test_message_unknown_jewel_is_not_found() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/message", json!({ "identifier": "ghost" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_message_invalid_identifier() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/message", json!({ "identifier": "../etc" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_tts_returns_url_and_preset() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json(
            "/tts",
            json!({
                "text": "Marie, respire.",
                "locale": "fr",
                "voice": "feminin",
                "meta": { "theme": "Deuil" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["url"].as_str().unwrap().ends_with(".mp3"));
    assert_eq!(body["voice_profile"], "distant_echo");
    assert_eq!(body["playback_rate"], 0.84);
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn test_tts_identical_request_served_from_cache() {
    let app = create_test_app();
    let request = json!({ "text": "Marie, respire.", "locale": "fr", "voice": "feminin" });

    let first = json_body(
        app.router
            .clone()
            .oneshot(post_json("/tts", request.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second = json_body(
        app.router
            .oneshot(post_json("/tts", request))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["url"], second["url"]);
    assert_eq!(second["cached"], true);
    assert_eq!(app.synth.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_tts_rejects_empty_text() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/tts", json!({ "text": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_synthesis_does_not_refund_the_credit() {
    let app = create_broken_synth_app();

    let first = json_body(
        app.clone()
            .oneshot(post_json("/message", json!({ "identifier": "mw-1" })))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["remaining"], 2);

    let tts = app
        .clone()
        .oneshot(post_json(
            "/tts",
            json!({ "text": first["text"].clone(), "locale": "fr", "voice": "feminin" }),
        ))
        .await
        .unwrap();
    assert_eq!(tts.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(tts).await;
    assert_eq!(body["kind"], "upstream_unavailable");

    // The credit spent on the message stays spent: the next draw starts
    // from 2, not 3.
    let second = json_body(
        app.oneshot(post_json("/message", json!({ "identifier": "mw-1" })))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(second["remaining"], 1);
}

#[tokio::test]
async fn test_abandoned_session_keeps_its_listen_spent() {
    let app = create_test_app();
    let complete = |session: &str| {
        post_json(
            "/listens/complete",
            json!({ "recording_id": "rec-1", "session_id": session }),
        )
    };

    // sess-a completes and the client never comes back.
    let first = json_body(app.router.clone().oneshot(complete("sess-a")).await.unwrap()).await;
    assert_eq!(first["remaining"], 1);

    // Later sessions draw from the reduced balance; nothing restores the
    // listen sess-a charged.
    let other = json_body(app.router.clone().oneshot(complete("sess-b")).await.unwrap()).await;
    assert_eq!(other["remaining"], 0);

    let exhausted = app.router.oneshot(complete("sess-c")).await.unwrap();
    assert_eq!(exhausted.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_credits_consume_until_exhausted() {
    let app = create_test_app();
    for expected in [2, 1, 0] {
        let body = json_body(
            app.router
                .clone()
                .oneshot(post_json("/credits/consume", json!({ "identifier": "mw-1" })))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["remaining"], expected);
    }

    let response = app
        .router
        .oneshot(post_json("/credits/consume", json!({ "identifier": "mw-1" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "exhausted_or_inactive");
}

#[tokio::test]
async fn test_listen_completion_charges_once_per_session() {
    let app = create_test_app();
    let complete =
        |session: &str| post_json("/listens/complete", json!({ "recording_id": "rec-1", "session_id": session }));

    let first = json_body(app.router.clone().oneshot(complete("sess-a")).await.unwrap()).await;
    assert_eq!(first["remaining"], 1);

    // Replayed completion in the same session is a no-op.
    let replay = json_body(app.router.clone().oneshot(complete("sess-a")).await.unwrap()).await;
    assert_eq!(replay["remaining"], 1);

    let other = json_body(app.router.clone().oneshot(complete("sess-b")).await.unwrap()).await;
    assert_eq!(other["remaining"], 0);

    let exhausted = app.router.oneshot(complete("sess-c")).await.unwrap();
    assert_eq!(exhausted.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_listen_restart_reopens_the_charge() {
    let app = create_test_app();
    let body = json!({ "recording_id": "rec-1", "session_id": "sess-a" });

    let first = json_body(
        app.router
            .clone()
            .oneshot(post_json("/listens/complete", body.clone()))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["remaining"], 1);

    let restart = app
        .router
        .clone()
        .oneshot(post_json("/listens/restart", body.clone()))
        .await
        .unwrap();
    assert_eq!(restart.status(), StatusCode::OK);

    let again = json_body(
        app.router
            .oneshot(post_json("/listens/complete", body))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(again["remaining"], 0);
}

#[tokio::test]
async fn test_checkout_creates_session() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/checkout", json!({ "identifier": "mw-1", "credits": 10 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["session_id"].as_str().unwrap().starts_with("cs_"));
    assert!(body["url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_checkout_rejects_zero_credits() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json("/checkout", json!({ "identifier": "mw-1", "credits": 0 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_applies_paid_session_idempotently() {
    let app = create_test_app();
    let confirm = post_json("/checkout/confirm", json!({ "session_id": "cs_paid_mw-1_credits_10" }));

    let first = json_body(app.router.clone().oneshot(confirm).await.unwrap()).await;
    assert_eq!(first["ok"], true);
    assert_eq!(first["kind"], "credits");
    assert_eq!(first["total"], 13);

    // Replay does not add credits a second time.
    let replay = json_body(
        app.router
            .oneshot(post_json(
                "/checkout/confirm",
                json!({ "session_id": "cs_paid_mw-1_credits_10" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(replay["total"], 13);
}

#[tokio::test]
async fn test_confirm_rejects_unpaid_session() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(post_json(
            "/checkout/confirm",
            json!({ "session_id": "cs_pending_mw-1_credits_10" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "payment_not_confirmed");
}

fn webhook_request(signature: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

const WEBHOOK_BODY: &str = r#"{
    "type": "checkout.session.completed",
    "data": {
        "object": {
            "id": "cs_hook_1",
            "payment_status": "paid",
            "metadata": {"identifier": "mw-1", "kind": "credits", "quantity": "5"}
        }
    }
}"#;

#[tokio::test]
async fn test_webhook_applies_verified_top_up() {
    let app = create_test_app();
    let signature = webhook_signature(TEST_WEBHOOK_SECRET, "1700000000", WEBHOOK_BODY);

    let response = app
        .router
        .clone()
        .oneshot(webhook_request(Some(&signature), WEBHOOK_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["received"], true);

    // 3 seeded + 5 from the webhook, minus the consume below.
    let consume = json_body(
        app.router
            .oneshot(post_json("/credits/consume", json!({ "identifier": "mw-1" })))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(consume["remaining"], 7);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = create_test_app();
    let signature = webhook_signature("whsec_wrong", "1700000000", WEBHOOK_BODY);

    let response = app
        .router
        .oneshot(webhook_request(Some(&signature), WEBHOOK_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_requires_signature_header() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(webhook_request(None, WEBHOOK_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_and_confirm_share_idempotency() {
    let app = create_test_app();

    // The fake provider reports this same session as paid on confirm.
    let body = WEBHOOK_BODY.replace("cs_hook_1", "cs_paid_mw-1_credits_5");
    let signature = webhook_signature(TEST_WEBHOOK_SECRET, "1700000000", &body);
    let response = app
        .router
        .clone()
        .oneshot(webhook_request(Some(&signature), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let confirm = json_body(
        app.router
            .oneshot(post_json(
                "/checkout/confirm",
                json!({ "session_id": "cs_paid_mw-1_credits_5" }),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(confirm["total"], 8);
}

#[tokio::test]
async fn test_not_found_endpoint() {
    let app = create_test_app();
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
