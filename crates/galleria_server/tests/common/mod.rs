//! Shared fixtures for server integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, header};
use galleria_server::{
    AccessGate, ApiState, IngestionPipeline, User, UserDirectory, create_router,
};
use galleria_storage::{
    ContentId, FileSystemStorage, ImageStorage, StagingArea, StorageError, StorageErrorKind,
    StorageResult, StoredImage,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub const SESSION: &str = "valid-session";
const BOUNDARY: &str = "galleria-test-boundary";

/// How a [`CountingStore`] misbehaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Report every staged file as missing.
    pub lose_staged_files: bool,
    /// Fail every listing after the one made at bootstrap.
    pub fail_list_after_bootstrap: bool,
}

/// Filesystem store that counts calls and can inject faults.
pub struct CountingStore {
    inner: FileSystemStorage,
    normalize_calls: AtomicUsize,
    list_calls: AtomicUsize,
    known_hits: AtomicUsize,
    faults: Faults,
}

impl CountingStore {
    pub fn normalize_calls(&self) -> usize {
        self.normalize_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Normalizations answered by the caller's existence check.
    pub fn known_hits(&self) -> usize {
        self.known_hits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageStorage for CountingStore {
    async fn normalize_unless_known(
        &self,
        staged: &Path,
        known: &(dyn for<'k> Fn(&'k ContentId) -> bool + Send + Sync),
    ) -> StorageResult<ContentId> {
        self.normalize_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.lose_staged_files {
            let _ = std::fs::remove_file(staged);
            return Err(StorageError::new(StorageErrorKind::NotFound(
                staged.display().to_string(),
            )));
        }
        let counted = |id: &ContentId| {
            let hit = known(id);
            if hit {
                self.known_hits.fetch_add(1, Ordering::SeqCst);
            }
            hit
        };
        self.inner.normalize_unless_known(staged, &counted).await
    }

    async fn contains(&self, id: &ContentId) -> bool {
        self.inner.contains(id).await
    }

    async fn list(&self) -> StorageResult<Vec<StoredImage>> {
        let previous = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_list_after_bootstrap && previous > 0 {
            return Err(StorageError::new(StorageErrorKind::FileRead(
                "listing unavailable".to_string(),
            )));
        }
        self.inner.list().await
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub app: Router,
    pub pipeline: Arc<IngestionPipeline>,
    pub store: Arc<CountingStore>,
}

impl Harness {
    pub fn content_dir(&self) -> PathBuf {
        self.dir.path().join("image")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }
}

pub async fn harness(allow_upload: bool) -> Harness {
    build(allow_upload, Faults::default()).await
}

pub async fn harness_with_faults(faults: Faults) -> Harness {
    build(true, faults).await
}

async fn build(allow_upload: bool, faults: Faults) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(CountingStore {
        inner: FileSystemStorage::open(dir.path().join("image")).unwrap(),
        normalize_calls: AtomicUsize::new(0),
        list_calls: AtomicUsize::new(0),
        known_hits: AtomicUsize::new(0),
        faults,
    });
    let staging = StagingArea::open(dir.path().join("tmp")).unwrap();
    let pipeline = Arc::new(
        IngestionPipeline::bootstrap(Arc::clone(&store) as Arc<dyn ImageStorage>, staging)
            .await
            .unwrap(),
    );

    let users = UserDirectory::new([User::new("tester", 1, SESSION, true)]);
    let state = ApiState::new(
        Arc::clone(&pipeline),
        AccessGate::new(allow_upload, users),
        "session",
        1024 * 1024,
    );
    let app =
        create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4242))));

    Harness {
        dir,
        app,
        pipeline,
        store,
    }
}

pub fn png(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8 * 30, y as u8 * 30, seed]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

pub fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, format!("session={cookie}"));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files
}
