use serde_json::{Value, json};

use crate::common::{TestApp, basic_row, routes};

async fn seed_listing(app: &TestApp) -> i32 {
    let row = basic_row("700", "Shop to annotate", "100000", "1000", "100");
    app.ingest_csv("seed.csv", &[&row]).await;
    let listings = app.get(routes::LISTINGS).await;
    listings.body[0]["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn listing_starts_without_an_annotation() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    let res = app.get(&routes::annotation(id)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, Value::Null);

    let listings = app.get(routes::LISTINGS).await;
    assert_eq!(listings.body[0]["annotation"], Value::Null);
}

#[tokio::test]
async fn put_creates_the_annotation() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    let res = app
        .put(
            &routes::annotation(id),
            &json!({"reviewed": true, "interesting": "Yes", "notes": "call the agency"}),
        )
        .await;
    assert_eq!(res.status, 200, "upsert failed: {}", res.text);
    assert_eq!(res.body["listing_id"], id);
    assert_eq!(res.body["reviewed"], true);
    assert_eq!(res.body["contacted"], false);
    assert_eq!(res.body["interesting"], "Yes");
    assert_eq!(res.body["notes"], "call the agency");
}

#[tokio::test]
async fn put_updates_in_place_and_absent_fields_are_untouched() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    app.put(&routes::annotation(id), &json!({"reviewed": true, "notes": "first"}))
        .await;
    let res = app
        .put(&routes::annotation(id), &json!({"contacted": true}))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["reviewed"], true);
    assert_eq!(res.body["contacted"], true);
    assert_eq!(res.body["notes"], "first");

    // Still a single annotation row.
    let get = app.get(&routes::annotation(id)).await;
    assert_eq!(get.body["id"], res.body["id"]);
}

#[tokio::test]
async fn explicit_null_clears_nullable_fields() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    app.put(
        &routes::annotation(id),
        &json!({"interesting": "No", "notes": "skip it"}),
    )
    .await;
    let res = app
        .put(
            &routes::annotation(id),
            &json!({"interesting": null, "notes": null}),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["interesting"], Value::Null);
    assert_eq!(res.body["notes"], Value::Null);
}

#[tokio::test]
async fn interesting_only_accepts_yes_or_no() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    let res = app
        .put(&routes::annotation(id), &json!({"interesting": "maybe"}))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_listing_is_404() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::annotation(9999)).await;
    assert_eq!(res.status, 404);

    let res = app
        .put(&routes::annotation(9999), &json!({"reviewed": true}))
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn annotation_appears_in_listing_responses() {
    let app = TestApp::spawn().await;
    let id = seed_listing(&app).await;

    app.put(&routes::annotation(id), &json!({"interesting": "Yes"}))
        .await;
    let listings = app.get(routes::LISTINGS).await;
    assert_eq!(listings.body[0]["annotation"]["interesting"], "Yes");
}
