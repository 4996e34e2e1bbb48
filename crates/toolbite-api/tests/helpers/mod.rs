//! Test helpers: build the router over fake engines for integration tests.
//!
//! Run from workspace root: `cargo test -p toolbite-api`.

#![allow(dead_code)]

pub mod fixtures;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use toolbite_api::constants;
use toolbite_api::setup::routes;
use toolbite_core::Config;
use toolbite_processing::pages::page_file_name;
use toolbite_processing::{
    BackgroundRemover, DocumentRenderer, Dispatcher, Engines, HtmlConverter, PageSelection,
    PageSetup, PdfRasterizer, RenderSession,
};
use toolbite_storage::{EphemeralStore, EphemeralStoreConfig};

pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake cut-out";
pub const FAKE_PDF: &[u8] = b"%PDF-1.7\nfake render";

/// Upload cap used by the test server.
pub const TEST_IMAGE_CAP: usize = 1024 * 1024;

/// Pages every fake PDF has.
pub const TEST_PAGE_COUNT: u32 = 12;

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// How often each fake engine was reached.
#[derive(Default)]
pub struct EngineCalls {
    pub background: AtomicUsize,
    pub html: AtomicUsize,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub rasterize: AtomicUsize,
}

impl EngineCalls {
    pub fn total(&self) -> usize {
        self.background.load(Ordering::SeqCst)
            + self.html.load(Ordering::SeqCst)
            + self.sessions_opened.load(Ordering::SeqCst)
            + self.rasterize.load(Ordering::SeqCst)
    }
}

async fn read_input(input: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(input).await?;
    if bytes == fixtures::CORRUPT_INPUT {
        return Err(anyhow!("engine rejected {}", input.display()));
    }
    Ok(bytes)
}

struct FakeRemover(Arc<EngineCalls>);

#[async_trait]
impl BackgroundRemover for FakeRemover {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn remove_background(&self, input: &Path) -> Result<Bytes> {
        self.0.background.fetch_add(1, Ordering::SeqCst);
        read_input(input).await?;
        Ok(Bytes::from_static(FAKE_PNG))
    }
}

struct FakeConverter(Arc<EngineCalls>);

#[async_trait]
impl HtmlConverter for FakeConverter {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn to_html(&self, input: &Path, _media_dir: &Path) -> Result<String> {
        self.0.html.fetch_add(1, Ordering::SeqCst);
        read_input(input).await?;
        Ok("<h1>Quarterly report</h1><p>All good.</p>".to_string())
    }
}

struct FakeRenderer(Arc<EngineCalls>);

struct FakeSession(Arc<EngineCalls>);

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn open_session(&self, _workdir: &Path) -> Result<Box<dyn RenderSession>> {
        self.0.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession(Arc::clone(&self.0))))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn render_pdf(&mut self, html: &Path, _setup: &PageSetup) -> Result<Bytes> {
        let html = tokio::fs::read_to_string(html).await?;
        if !html.contains("Quarterly report") {
            return Err(anyhow!("template lost the document body"));
        }
        Ok(Bytes::from_static(FAKE_PDF))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.0.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Writes one small PNG per selected page, last page first. Selecting a page
/// past the end fails, as both real rasterizers do.
struct FakeRasterizer(Arc<EngineCalls>);

#[async_trait]
impl PdfRasterizer for FakeRasterizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn rasterize(&self, input: &Path, out_dir: &Path, pages: &PageSelection) -> Result<()> {
        self.0.rasterize.fetch_add(1, Ordering::SeqCst);
        read_input(input).await?;

        let selected: Vec<u32> = match pages {
            PageSelection::All => (1..=TEST_PAGE_COUNT).collect(),
            PageSelection::Pages(list) => list.clone(),
        };

        if let Some(page) = selected.iter().find(|page| **page > TEST_PAGE_COUNT) {
            return Err(anyhow!(
                "page {} is out of range (document has {} pages)",
                page,
                TEST_PAGE_COUNT
            ));
        }

        for page in selected.into_iter().rev() {
            tokio::fs::write(out_dir.join(page_file_name(page)), page_content(page)).await?;
        }
        Ok(())
    }
}

/// Bytes the fake rasterizer writes for `page`.
pub fn page_content(page: u32) -> Vec<u8> {
    format!("page {}", page).into_bytes()
}

/// Test application: server, store and engine counters.
pub struct TestApp {
    pub server: TestServer,
    pub store: EphemeralStore,
    pub calls: Arc<EngineCalls>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Nothing allocated by any request is still on disk.
    pub fn assert_storage_released(&self) {
        assert_eq!(self.store.live_handles(), 0, "live handles left behind");
        let leftovers = std::fs::read_dir(self.store.base_path()).unwrap().count();
        assert_eq!(leftovers, 0, "files left under the store base path");
    }
}

/// Setup a test app with fake engines and an isolated ephemeral store.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config(temp_dir.path());

    let store = EphemeralStore::new(EphemeralStoreConfig::new(&config.temp_dir))
        .await
        .expect("Failed to create ephemeral store");

    let calls = Arc::new(EngineCalls::default());
    let engines = Engines {
        background_remover: Arc::new(FakeRemover(Arc::clone(&calls))),
        html_converter: Arc::new(FakeConverter(Arc::clone(&calls))),
        document_renderer: Arc::new(FakeRenderer(Arc::clone(&calls))),
        pdf_rasterizer: Arc::new(FakeRasterizer(Arc::clone(&calls))),
    };

    let dispatcher = Dispatcher::new(engines.into_registry(&config), store.clone());
    let app = routes::setup_routes(&config, dispatcher).expect("Failed to setup routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        store,
        calls,
        _temp_dir: temp_dir,
    }
}

fn create_test_config(base: &Path) -> Config {
    Config {
        temp_dir: base.join("ephemeral"),
        max_image_upload_bytes: TEST_IMAGE_CAP,
        ..Config::default()
    }
}
