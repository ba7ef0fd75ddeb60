#![allow(clippy::unwrap_used)]
// Integration tests for `GatewayClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unlockly_api::{ApiError, FirmwareRequest, ForceDetectRequest, GatewayClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Detection tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_detect_phone_success() {
    let (server, client) = setup().await;

    let envelope = json!({
        "success": true,
        "phone": {
            "brand": "Samsung",
            "model": "Galaxy S21",
            "model_number": "SM-G991B",
            "android_version": "12",
            "supported_locks": ["frp", "screen_lock"],
            "detection_confidence": 0.91
        },
        "detection_method": "adb"
    });

    Mock::given(method("POST"))
        .and(path("/api/detect-phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let resp = client.detect_phone().await.unwrap();

    assert_eq!(resp.phone.brand, "Samsung");
    assert_eq!(resp.phone.model, "Galaxy S21");
    assert!((resp.phone.detection_confidence - 0.91).abs() < f64::EPSILON);
    assert_eq!(resp.detection_method.as_deref(), Some("adb"));
    assert_eq!(resp.phone.supported_locks.len(), 2);
}

#[tokio::test]
async fn test_detect_phone_backend_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/detect-phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "no device"
        })))
        .mount(&server)
        .await;

    let result = client.detect_phone().await;

    match result {
        Err(ApiError::Backend { message }) => assert_eq!(message, "no device"),
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_detect_any_phone() {
    let (server, client) = setup().await;

    let envelope = json!({
        "success": true,
        "detection": {
            "vendor_id": "1782",
            "product_id": "4d00",
            "mode": "download",
            "method": "usb_raw"
        },
        "identification": {
            "brand": "Hisense",
            "model": "Infinity H40 Lite",
            "model_number": "HLTE230E",
            "supported_locks": ["frp"],
            "detection_confidence": 0.8
        },
        "combined_confidence": 0.8
    });

    Mock::given(method("POST"))
        .and(path("/api/detect-any-phone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let resp = client.detect_any_phone().await.unwrap();

    assert_eq!(resp.identification.brand, "Hisense");
    assert_eq!(resp.detection.vendor_id.as_deref(), Some("1782"));
    assert_eq!(resp.combined_confidence, Some(0.8));
}

#[tokio::test]
async fn test_force_detect_sends_usb_ids() {
    let (server, client) = setup().await;

    let req = ForceDetectRequest {
        vendor_id: "1782".into(),
        product_id: "9008".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/force-detect-device"))
        .and(body_json(json!({"vendor_id": "1782", "product_id": "9008"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "detection": { "vendor_id": "1782", "product_id": "9008", "mode": "edl" },
            "identification": {
                "brand": "Hisense",
                "model": "Infinity H40 Lite",
                "detection_confidence": 0.8
            }
        })))
        .mount(&server)
        .await;

    let resp = client.force_detect_device(&req).await.unwrap();
    assert_eq!(resp.detection.mode.as_deref(), Some("edl"));
}

// ── Firmware and analysis tests ─────────────────────────────────────

#[tokio::test]
async fn test_find_firmware() {
    let (server, client) = setup().await;

    let envelope = json!({
        "success": true,
        "firmware_list": [{
            "version": "HLTE230E_10_001",
            "android_version": "10",
            "build_date": "2023-05-15",
            "region": "Global",
            "download_url": "https://firmware.example.com/HLTE230E_10_001.zip",
            "file_size": "2.1GB",
            "checksum": "a1b2c3d4e5f6"
        }],
        "ai_recommendation": "latest Global build recommended"
    });

    Mock::given(method("POST"))
        .and(path("/api/find-firmware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let resp = client
        .find_firmware(&unlockly_api::FindFirmwareRequest {
            phone_model: "HLTE230E".into(),
            region: "Global".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.firmware_list.len(), 1);
    assert_eq!(resp.firmware_list[0].version, "HLTE230E_10_001");
    assert!(resp.ai_recommendation.is_some());
}

#[tokio::test]
async fn test_analyze_lock() {
    let (server, client) = setup().await;

    let envelope = json!({
        "success": true,
        "analysis": {
            "detected_lock_type": "frp",
            "difficulty": "medium",
            "success_rate": 0.85,
            "estimated_time": "45 minutes",
            "methods": ["combination_file", "edl_flash"],
            "risks": ["data loss"],
            "requirements": ["Unisoc USB drivers"]
        },
        "ai_recommendation": "use combination file first"
    });

    Mock::given(method("POST"))
        .and(path("/api/analyze-lock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let resp = client
        .analyze_lock(&unlockly_api::AnalyzeLockRequest {
            phone_model: "HLTE230E".into(),
            lock_type: "frp".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.analysis.detected_lock_type, "frp");
    assert_eq!(resp.analysis.methods.len(), 2);
}

#[tokio::test]
async fn test_request_firmware_empty_payload() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/request-firmware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    client
        .request_firmware(&FirmwareRequest {
            brand: "hisense".into(),
            model: "Infinity H30".into(),
            model_number: None,
            region: "Global".into(),
            notes: Some("needs Europe build".into()),
        })
        .await
        .unwrap();
}

// ── Agent and health tests ──────────────────────────────────────────

#[tokio::test]
async fn test_activate_ai() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/activate-ai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "agents": {
                "phone_detection": "active",
                "unlock_recommender": "active"
            }
        })))
        .mount(&server)
        .await;

    let resp = client.activate_ai().await.unwrap();
    assert_eq!(resp.agents.len(), 2);
    assert_eq!(resp.agents.get("phone_detection").map(String::as_str), Some("active"));
}

#[tokio::test]
async fn test_toggle_agent_path() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/toggle-agent/phone_detection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "inactive",
            "all_agents": { "phone_detection": "inactive" }
        })))
        .mount(&server)
        .await;

    let resp = client.toggle_agent("phone_detection").await.unwrap();
    assert_eq!(resp.status, "inactive");
}

#[tokio::test]
async fn test_health_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "overall_health": "degraded",
            "issues": ["database: locked"]
        })))
        .mount(&server)
        .await;

    let resp = client.health_status().await.unwrap();
    assert_eq!(resp.overall_health, "degraded");
    assert_eq!(resp.issues, vec!["database: locked"]);
}

// ── Error path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health-status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let result = client.health_status().await;

    match result {
        Err(ApiError::Http { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/check-updates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.check_updates().await;

    match result {
        Err(ApiError::Deserialization { body, .. }) => assert!(body.contains("not json")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_multibyte_body_preview_truncates_cleanly() {
    let (server, client) = setup().await;

    // Byte 200 lands inside the first multibyte character; the preview
    // must back off to the previous char boundary instead of panicking.
    let body = format!("{}日本語のエラーページ", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/check-updates"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let result = client.check_updates().await;

    match result {
        Err(ApiError::Deserialization { message, body: got }) => {
            assert_eq!(got, body);
            assert!(message.contains("body preview"));
            assert!(!message.contains('日'));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_multibyte_http_error_body() {
    let (server, client) = setup().await;

    let body = format!("{}серверная ошибка", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/health-status"))
        .respond_with(ResponseTemplate::new(502).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.health_status().await;

    match result {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "x".repeat(199));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_backend_failure_without_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/self-heal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let result = client.self_heal().await;

    match result {
        Err(ApiError::Backend { message }) => assert_eq!(message, "operation failed"),
        other => panic!("expected Backend error, got: {other:?}"),
    }
}
