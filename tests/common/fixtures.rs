#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageBuffer, Rgb};
use pricelens::core::db::{AuctionDb, NewUser, User, UserRepository};
use pricelens::{DetectedLabel, LabelSource, PriceSource, ServiceError, ShoppingResult};
use tempfile::NamedTempFile;

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    create_test_image_sized(100, 100)
}

pub fn create_test_image_sized(width: u32, height: u32) -> NamedTempFile {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// DejaVu Sans Mono, shipped under tests/fixtures
pub fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
}

/// Creates an AuctionDb in a temporary directory.
/// Returns both the database and the temp directory (which must be kept alive).
pub async fn create_test_db() -> (AuctionDb, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("auction.db");
    let db = AuctionDb::new(&path)
        .await
        .expect("Failed to create test database");
    (db, dir)
}

pub async fn create_test_user(db: &AuctionDb, email: &str) -> User {
    db.create_user(&NewUser {
        email: email.to_string(),
        password_hash: "pbkdf2:sha256:600000$salt$hash".to_string(),
    })
    .await
    .expect("Failed to create test user")
}

pub fn label(name: &str, confidence: f32) -> DetectedLabel {
    DetectedLabel::new(name, confidence)
}

/// Label source returning a fixed answer and counting calls
pub struct StaticLabels {
    labels: Vec<DetectedLabel>,
    calls: AtomicUsize,
}

impl StaticLabels {
    pub fn new(labels: Vec<DetectedLabel>) -> Self {
        Self {
            labels,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LabelSource for StaticLabels {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<DetectedLabel>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.labels.clone())
    }

    fn name(&self) -> &str {
        "static labels"
    }
}

/// Label source whose transport always fails
pub struct FailingLabels;

impl LabelSource for FailingLabels {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<DetectedLabel>, ServiceError> {
        Err(ServiceError::Aws("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing labels"
    }
}

/// Price source returning fixed results and recording queries
pub struct StaticPrices {
    results: Result<Vec<ShoppingResult>, String>,
    queries: Mutex<Vec<String>>,
}

impl StaticPrices {
    pub fn new(prices: &[&str]) -> Self {
        Self {
            results: Ok(prices.iter().map(|p| ShoppingResult::priced(*p)).collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            results: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl PriceSource for StaticPrices {
    async fn search(&self, query: &str) -> Result<Vec<ShoppingResult>, ServiceError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results
            .clone()
            .map_err(ServiceError::InvalidRequest)
    }

    fn name(&self) -> &str {
        "static prices"
    }
}
