use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use revtag_api::{build_router, ApiConfig, AppContext};
use revtag_core::RevtagConfig;
use serde_json::{json, Value};
use tower::util::ServiceExt;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

const LABELS: [&str; 5] = ["delivery", "packaging", "price", "quality", "service"];

/// Terms that switch each label on, in label order.
const LABEL_TERMS: [&[&str]; 5] = [
    &["late", "delivery", "shipping", "arrived"],
    &["box", "packaging", "damaged"],
    &["price", "expensive", "cheap", "value"],
    &["product", "quality", "amazing", "wonderful", "broken"],
    &["support", "rude", "service", "refund"],
];

fn unique_test_root() -> PathBuf {
    let epoch_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("revtag_api_http_{}_{}", epoch_nanos, seq))
}

fn write_json_file(path: &Path, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn write_fixture_model(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;

    let terms: Vec<&str> = LABEL_TERMS.iter().flat_map(|t| t.iter().copied()).collect();
    let vocabulary: serde_json::Map<String, Value> = terms
        .iter()
        .enumerate()
        .map(|(idx, term)| (term.to_string(), json!(idx)))
        .collect();
    let coefficients: Vec<Vec<f64>> = LABEL_TERMS
        .iter()
        .map(|label_terms| {
            terms
                .iter()
                .map(|term| if label_terms.contains(term) { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();

    write_json_file(
        &dir.join("vectorizer.json"),
        &json!({ "vocabulary": vocabulary, "idf": vec![1.0; terms.len()] }),
    )?;
    write_json_file(
        &dir.join("classifier.json"),
        &json!({ "coefficients": coefficients, "intercepts": vec![-0.1; LABELS.len()] }),
    )?;
    write_json_file(&dir.join("labels.json"), &json!({ "classes": LABELS }))?;
    Ok(())
}

struct TestApp {
    router: axum::Router,
    feedback_path: PathBuf,
}

fn test_app() -> Result<TestApp, Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let root = unique_test_root();
    let mut config = RevtagConfig::default();
    config.model.artifact_dir = root.join("models");
    config.storage.feedback_path = root.join("data").join("reviews.csv");
    write_fixture_model(&config.model.artifact_dir)?;

    let ctx = Arc::new(AppContext::from_config(&config)?);
    Ok(TestApp {
        router: build_router(&ApiConfig::default(), ctx),
        feedback_path: config.storage.feedback_path,
    })
}

async fn send(
    app: &axum::Router,
    request: Request<Body>,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

async fn post_raw(
    app: &axum::Router,
    body: &str,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    send(app, request).await
}

async fn predict(
    app: &axum::Router,
    review: &str,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    post_raw(app, &json!({ "review": review }).to_string()).await
}

async fn get(
    app: &axum::Router,
    uri: &str,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    send(app, Request::builder().uri(uri).body(Body::empty())?).await
}

#[tokio::test]
async fn predict_returns_tags_sentiment_and_score() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;

    let (status, body) = predict(&app.router, "This product is amazing and wonderful").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["tags"], json!(["quality"]));
    assert_eq!(body["score"], json!(0.2));
    assert_eq!(body.as_object().map(|o| o.len()), Some(3));

    let (status, body) = predict(
        &app.router,
        "Terrible. The box was damaged, delivery was late and support was rude.",
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "negative");
    assert_eq!(body["tags"], json!(["delivery", "packaging", "service"]));
    assert_eq!(body["score"], json!(0.6));

    let log = fs::read_to_string(&app.feedback_path)?;
    assert!(log.starts_with("timestamp,feedback,tags,sentiment,score"));
    assert_eq!(log.lines().count(), 3);
    assert!(log.contains("\"delivery, packaging, service\""));
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;

    for body in ["{}", "", "not json", r#"{"review": null}"#, r#"{"review": 3}"#, "[1, 2]"] {
        let (status, response) = post_raw(&app.router, body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
        assert_eq!(response, json!({ "error": "Invalid input" }));
    }

    // Rejected requests are never logged.
    let log = fs::read_to_string(&app.feedback_path)?;
    assert_eq!(log.lines().count(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_review_is_accepted_with_no_tags() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;

    let (status, body) = predict(&app.router, "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["sentiment"], "neutral");
    assert_eq!(body["score"], json!(0.0));
    Ok(())
}

#[tokio::test]
async fn analytics_without_predictions_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;

    let (status, body) = get(&app.router, "/analytics").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No data available" }));

    // Same answer when the log file is gone entirely.
    fs::remove_file(&app.feedback_path)?;
    let (status, body) = get(&app.router, "/analytics").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No data available" }));
    Ok(())
}

#[tokio::test]
async fn analytics_counts_match_predictions() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;
    let reviews = [
        "Great value for the price, shipping was fast.",
        "The product broke after a week, awful quality.",
        "It arrived.",
        "Cheap packaging and the box was damaged.",
        "Support gave me a refund quickly, very helpful service!",
        "Wonderful product, amazing quality.",
    ];

    let mut total_tags = 0u64;
    for review in reviews {
        let (status, body) = predict(&app.router, review).await?;
        assert_eq!(status, StatusCode::OK);
        total_tags += body["tags"].as_array().map(|t| t.len() as u64).unwrap_or(0);
    }

    let (status, body) = get(&app.router, "/analytics").await?;
    assert_eq!(status, StatusCode::OK);

    let sum = |key: &str| -> u64 {
        body[key]
            .as_object()
            .map(|counts| counts.values().filter_map(Value::as_u64).sum())
            .unwrap_or(0)
    };
    assert_eq!(sum("tag_counts"), total_tags);
    assert_eq!(sum("sentiment_counts"), reviews.len() as u64);
    assert!(body.get("skipped_rows").is_none());
    Ok(())
}

#[tokio::test]
async fn concurrent_predictions_each_append_one_row() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;
    let requests = 16;

    let handles: Vec<_> = (0..requests)
        .map(|i| {
            let router = app.router.clone();
            let review = format!("Order {}: late delivery, \"damaged\" box,\nbut good value", i);
            let request = Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "review": review }).to_string()));
            tokio::spawn(async move {
                let request = request.map_err(|e| e.to_string())?;
                let response = router.oneshot(request).await.map_err(|e| e.to_string())?;
                Ok::<_, String>(response.status())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await??, StatusCode::OK);
    }

    let log = fs::read_to_string(&app.feedback_path)?;
    assert_eq!(log.matches("Order ").count(), requests);

    let (status, body) = get(&app.router, "/analytics").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tag_counts"]["delivery"], json!(requests));
    assert_eq!(body["tag_counts"]["packaging"], json!(requests));
    assert_eq!(body["tag_counts"]["price"], json!(requests));
    Ok(())
}

#[tokio::test]
async fn health_reports_label_count() -> Result<(), Box<dyn std::error::Error>> {
    let app = test_app()?;

    let (status, body) = get(&app.router, "/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["labels"], json!(LABELS.len()));
    assert!(body["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn bundled_demo_model_tags_positive_review() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RevtagConfig::default();
    config.model.artifact_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models");
    config.storage.feedback_path = unique_test_root().join("reviews.csv");
    let ctx = Arc::new(AppContext::from_config(&config)?);
    let label_count = ctx.pipeline.label_count();
    assert!(label_count > 0);
    let router = build_router(&ApiConfig::default(), ctx);

    let (status, body) = predict(&router, "This product is amazing and wonderful").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "positive");
    let tags = body["tags"].as_array().map(Vec::len).unwrap_or(0);
    assert!(tags > 0);
    let expected = ((tags as f64 / label_count as f64) * 100.0).round() / 100.0;
    assert_eq!(body["score"].as_f64(), Some(expected));
    Ok(())
}
