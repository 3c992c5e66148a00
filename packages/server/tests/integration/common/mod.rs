use std::net::SocketAddr;

use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use server::state::AppState;

pub mod routes {
    pub const LISTINGS: &str = "/api/v1/listings";
    pub const SNAPSHOTS: &str = "/api/v1/snapshots";
    pub const SNAPSHOTS_UPLOAD: &str = "/api/v1/snapshots/upload";
    pub const AVG_PRICE_PER_M2: &str = "/api/v1/analytics/avg-price-per-m2";
    pub const PRICE_DISTRIBUTION: &str = "/api/v1/analytics/price-distribution";
    pub const LISTINGS_PER_MONTH: &str = "/api/v1/analytics/listings-per-month";

    pub fn snapshot(id: i32) -> String {
        format!("/api/v1/snapshots/{id}")
    }

    pub fn annotation(listing_id: i32) -> String {
        format!("/api/v1/listings/{listing_id}/annotation")
    }
}

/// A running test server backed by a throwaway SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _db_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = db_dir.path().join("test.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
        };

        let state = AppState {
            db: db.clone(),
            config,
        };
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _db_dir: db_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    pub async fn upload(&self, file_name: &str, file_bytes: Vec<u8>) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(self.url(routes::SNAPSHOTS_UPLOAD))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");
        TestResponse::from_response(res).await
    }

    /// Upload a CSV built from `rows` (each row in header order) and return
    /// the parsed response.
    pub async fn upload_csv(&self, file_name: &str, rows: &[&[&str]]) -> TestResponse {
        self.upload(file_name, csv_bytes(rows)).await
    }

    /// Upload a CSV and assert it was accepted, returning the body.
    pub async fn ingest_csv(&self, file_name: &str, rows: &[&[&str]]) -> Value {
        let res = self.upload_csv(file_name, rows).await;
        assert_eq!(res.status, 201, "upload failed: {}", res.text);
        res.body
    }
}

/// Header used by the CSV builders, mirroring a typical scrape export.
pub const CSV_HEADER: &[&str] = &[
    "id",
    "title",
    "href",
    "price",
    "price_per_m2",
    "area",
    "typology",
    "Distrito",
    "Concelho",
    "Zone",
    "agency",
    "address",
    "tag",
    "parking",
    "elevador",
    "nova_construcao",
    "arrendada",
    "trespasse",
];

/// Render rows (plus the standard header) as CSV bytes.
pub fn csv_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push('\n');
    for row in rows {
        assert_eq!(row.len(), CSV_HEADER.len(), "row width mismatch");
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

/// A row with the given id/title/price/ppm2/area and everything else blank.
pub fn basic_row<'a>(
    id: &'a str,
    title: &'a str,
    price: &'a str,
    price_per_m2: &'a str,
    area: &'a str,
) -> Vec<&'a str> {
    vec![
        id,
        title,
        "",
        price,
        price_per_m2,
        area,
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
    ]
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}
