//! Integration tests for the RocketShoes cart.
//!
//! The tests drive a real [`HttpCatalog`] against an in-process catalog
//! server and persist the cart to a [`FileStore`] in a temporary directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! [`HttpCatalog`]: rocketshoes_storefront::catalog::HttpCatalog
//! [`FileStore`]: rocketshoes_storefront::storage::FileStore

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_storefront::catalog::{CatalogError, HttpCatalog};
use rocketshoes_storefront::config::CatalogConfig;
use rocketshoes_storefront::notify::RecordingNotifier;
use rocketshoes_storefront::storage::FileStore;
use rocketshoes_storefront::{CART_STORAGE_KEY, CartManager};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// Manager wired the way the CLI wires it, but with a file in a temp dir.
pub type TestCart = CartManager<HttpCatalog, FileStore, RecordingNotifier>;

// ============================================================================
// Fake catalog server
// ============================================================================

#[derive(Default)]
struct CatalogState {
    products: Mutex<HashMap<i32, Value>>,
    stock: Mutex<HashMap<i32, u32>>,
    stock_failure: Mutex<Option<StatusCode>>,
    product_hits: AtomicUsize,
    stock_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn stock_handler(
    State(state): State<Arc<CatalogState>>,
    UrlPath(id): UrlPath<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = *lock(&state.stock_failure) {
        return Err((status, "stock service unavailable".to_string()));
    }

    lock(&state.stock)
        .get(&id)
        .map(|amount| Json(json!({ "id": id, "amount": amount })))
        .ok_or((StatusCode::NOT_FOUND, String::new()))
}

async fn product_handler(
    State(state): State<Arc<CatalogState>>,
    UrlPath(id): UrlPath<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    state.product_hits.fetch_add(1, Ordering::SeqCst);

    lock(&state.products)
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, String::new()))
}

/// Catalog API served from memory on a random local port.
///
/// The server task is aborted when the value is dropped.
pub struct FakeCatalog {
    addr: SocketAddr,
    state: Arc<CatalogState>,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(CatalogState::default());

        let app = Router::new()
            .route("/stock/{id}", get(stock_handler))
            .route("/products/{id}", get(product_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Serve `product` (must carry a numeric `id`) with `stock` units.
    #[must_use]
    pub fn with_product(self, product: Value, stock: u32) -> Self {
        let id = product
            .get("id")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .unwrap_or_default();

        lock(&self.state.products).insert(id, product);
        lock(&self.state.stock).insert(id, stock);
        self
    }

    pub fn set_stock(&self, id: i32, amount: u32) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Answer every stock request with `status` until cleared with `None`.
    pub fn fail_stock_with(&self, status: Option<StatusCode>) {
        *lock(&self.state.stock_failure) = status;
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    /// Base URL of the running server, with a trailing `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not form a valid URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}/", self.addr))
    }

    /// Catalog configuration pointing at this server.
    ///
    /// # Errors
    ///
    /// See [`FakeCatalog::base_url`].
    pub fn config(&self) -> Result<CatalogConfig, url::ParseError> {
        Ok(CatalogConfig {
            base_url: self.base_url()?,
            product_cache_ttl: Duration::from_secs(300),
        })
    }

    /// A new client for this server with its own, empty product cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn client(&self) -> Result<HttpCatalog, CatalogError> {
        HttpCatalog::new(&self.config()?)
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// ============================================================================
// Storage helpers
// ============================================================================

/// Temporary directory holding the storage file.
pub struct StorageDir {
    dir: TempDir,
}

impl StorageDir {
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(self.path())
    }

    /// Stored cart entries as raw JSON, or `None` if nothing is stored.
    #[must_use]
    pub fn stored_cart(&self) -> Option<Vec<Value>> {
        read_stored_cart(&self.path())
    }
}

fn read_stored_cart(path: &Path) -> Option<Vec<Value>> {
    let contents = std::fs::read_to_string(path).ok()?;
    let entries: HashMap<String, String> = serde_json::from_str(&contents).ok()?;
    serde_json::from_str(entries.get(CART_STORAGE_KEY)?).ok()
}

/// Load a manager over `catalog` and the file in `dir`.
///
/// # Errors
///
/// Returns an error if the HTTP client fails to build.
pub async fn load_cart(catalog: &FakeCatalog, dir: &StorageDir) -> Result<TestCart, CatalogError> {
    Ok(CartManager::load(catalog.client()?, dir.store(), RecordingNotifier::new()).await)
}

/// Product JSON as the catalog API serves it.
#[must_use]
pub fn product_json(id: i32, title: &str, price: f64) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": price,
        "image": format!("https://cdn.rocketshoes.test/{id}.jpg"),
    })
}
