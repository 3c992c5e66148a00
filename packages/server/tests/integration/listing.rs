use crate::common::{CSV_HEADER, TestApp, routes};

/// Seed one snapshot with a small, varied set of listings.
///
/// | id | typology   | district | elevator | price  | ppm2 | area |
/// |----|------------|----------|----------|--------|------|------|
/// | 1  | Loja       | Porto    | sim      | 100000 | 1000 | 100  |
/// | 2  | Escritorio | Lisboa   | nao      | 200000 | 2000 | 100  |
/// | 3  | Loja       | Porto    | (blank)  | 300000 | 1500 | 200  |
async fn seed(app: &TestApp) {
    let rows: Vec<Vec<&str>> = vec![
        row("1", "Loja no Porto", "Loja", "Porto", "sim", "100000", "1000", "100"),
        row("2", "Escritorio em Lisboa", "Escritorio", "Lisboa", "nao", "200000", "2000", "100"),
        row("3", "Loja grande", "Loja", "Porto", "", "300000", "1500", "200"),
    ];
    let refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    app.ingest_csv("seed.csv", &refs).await;
}

fn row<'a>(
    id: &'a str,
    title: &'a str,
    typology: &'a str,
    district: &'a str,
    elevator: &'a str,
    price: &'a str,
    price_per_m2: &'a str,
    area: &'a str,
) -> Vec<&'a str> {
    CSV_HEADER
        .iter()
        .map(|&h| match h {
            "id" => id,
            "title" => title,
            "typology" => typology,
            "Distrito" => district,
            "elevador" => elevator,
            "price" => price,
            "price_per_m2" => price_per_m2,
            "area" => area,
            "address" => "Rua de Santa Catarina",
            _ => "",
        })
        .collect()
}

async fn listing_ids(app: &TestApp, query: &str) -> Vec<String> {
    let path = if query.is_empty() {
        routes::LISTINGS.to_string()
    } else {
        format!("{}?{}", routes::LISTINGS, query)
    };
    let res = app.get(&path).await;
    assert_eq!(res.status, 200, "list failed: {}", res.text);
    res.body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["external_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn no_filters_returns_everything() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(listing_ids(&app, "").await, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn district_filter_is_exact() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(listing_ids(&app, "district=Porto").await, vec!["1", "3"]);
    assert_eq!(listing_ids(&app, "district=Lisboa").await, vec!["2"]);
    assert!(listing_ids(&app, "district=Faro").await.is_empty());
}

#[tokio::test]
async fn typology_accepts_a_comma_separated_set() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(listing_ids(&app, "typology=Loja").await, vec!["1", "3"]);
    assert_eq!(
        listing_ids(&app, "typology=Loja,Escritorio").await,
        vec!["1", "2", "3"]
    );
}

#[tokio::test]
async fn boolean_filter_never_matches_unknown() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    // Listing 3 left the elevator cell blank, so it matches neither value.
    assert_eq!(listing_ids(&app, "elevator=true").await, vec!["1"]);
    assert_eq!(listing_ids(&app, "elevator=false").await, vec!["2"]);
}

#[tokio::test]
async fn price_bounds_are_inclusive() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(
        listing_ids(&app, "min_price=100000&max_price=200000").await,
        vec!["1", "2"]
    );
    assert_eq!(listing_ids(&app, "min_price=200001").await, vec!["3"]);
}

#[tokio::test]
async fn area_bounds_apply_to_the_listing() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(listing_ids(&app, "min_area=150").await, vec!["3"]);
    assert_eq!(listing_ids(&app, "max_area=100").await, vec!["1", "2"]);
}

#[tokio::test]
async fn address_filter_is_case_insensitive_substring() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(
        listing_ids(&app, "address=santa%20catarina").await,
        vec!["1", "2", "3"]
    );
    assert!(listing_ids(&app, "address=avenida").await.is_empty());
}

#[tokio::test]
async fn combined_filters_and_together() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    assert_eq!(
        listing_ids(&app, "district=Porto&typology=Loja&min_price=200000").await,
        vec!["3"]
    );
}

#[tokio::test]
async fn filtered_results_are_a_subset_of_unfiltered() {
    let app = TestApp::spawn().await;
    seed(&app).await;
    let all = listing_ids(&app, "").await;
    for query in [
        "district=Porto",
        "typology=Loja",
        "elevator=true",
        "min_price_per_m2=1500",
        "max_area=100",
    ] {
        let filtered = listing_ids(&app, query).await;
        assert!(
            filtered.iter().all(|id| all.contains(id)),
            "query {query} returned ids outside the unfiltered set"
        );
        assert!(filtered.len() <= all.len());
    }
}
