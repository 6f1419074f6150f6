//! Local stand-in for the hosting service, used by the tests of every stage.

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;

use crate::config::ServiceConfig;
use crate::progress::{ProgressBar, ProgressReporter, Unit};

pub enum Page {
    /// A regular landing page: titled, with a link to `/dl/<id>`.
    Linked { title: String, id: String },
    Raw(String),
}

impl Page {
    pub fn linked(title: &str, id: &str) -> Self {
        Page::Linked {
            title: title.to_string(),
            id: id.to_string(),
        }
    }

    pub fn raw(html: &str) -> Self {
        Page::Raw(html.to_string())
    }
}

#[derive(Clone)]
pub enum File {
    /// Served with an exact Content-Length.
    Bytes(Vec<u8>),
    /// Served chunked, without Content-Length.
    Unsized(Vec<u8>),
    /// Announces `announced` bytes, sends `sent`, then breaks the connection.
    Truncated { announced: u64, sent: Vec<u8> },
    Status(StatusCode),
}

struct MockState {
    addr: SocketAddr,
    pages: Mutex<HashMap<String, Page>>,
    files: Mutex<HashMap<String, File>>,
    page_hits: AtomicUsize,
    file_hits: Mutex<HashMap<String, usize>>,
}

pub struct MockService {
    state: Arc<MockState>,
    _server: tokio::task::JoinHandle<()>,
}

impl MockService {
    pub async fn start() -> Self {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState {
            addr,
            pages: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            page_hits: AtomicUsize::new(0),
            file_hits: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/{page}", get(serve_page))
            .route("/dl/{id}", get(serve_file))
            .with_state(Arc::clone(&state));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockService {
            state,
            _server: server,
        }
    }

    pub fn config(&self) -> Arc<ServiceConfig> {
        Arc::new(self.service_config())
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new(&format!("http://{}/", self.state.addr)).unwrap()
    }

    pub fn page_url(&self, name: &str) -> String {
        format!("http://{}/{}", self.state.addr, name)
    }

    pub fn download_url(&self, id: &str) -> String {
        format!("http://{}/dl/{}", self.state.addr, id)
    }

    pub fn add_page(&self, name: &str, page: Page) {
        self.state.pages.lock().unwrap().insert(name.to_string(), page);
    }

    pub fn add_file(&self, id: &str, file: File) {
        self.state.files.lock().unwrap().insert(id.to_string(), file);
    }

    /// Landing page plus its file in one go.
    pub fn add_item(&self, name: &str, title: &str, file: File) {
        let id = format!("{}-id", name);
        self.add_page(name, Page::linked(title, &id));
        self.add_file(&id, file);
    }

    pub fn page_hits(&self) -> usize {
        self.state.page_hits.load(Ordering::SeqCst)
    }

    /// GET requests seen for `/dl/<id>`, size probes included.
    pub fn file_hits(&self, id: &str) -> usize {
        self.state
            .file_hits
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(0)
    }
}

async fn serve_page(State(state): State<Arc<MockState>>, Path(name): Path<String>) -> Response {
    state.page_hits.fetch_add(1, Ordering::SeqCst);
    let pages = state.pages.lock().unwrap();
    match pages.get(&name) {
        Some(Page::Linked { title, id }) => Html(format!(
            r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
  <a href="http://{addr}/faq">FAQ</a>
  <a class="link-button" onclick="window.open('http://{addr}/dl/{id}')">DOWNLOAD</a>
</body>
</html>"#,
            title = title,
            addr = state.addr,
            id = id,
        ))
        .into_response(),
        Some(Page::Raw(html)) => Html(html.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_file(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    *state.file_hits.lock().unwrap().entry(id.clone()).or_insert(0) += 1;
    let file = state.files.lock().unwrap().get(&id).cloned();
    match file {
        Some(File::Bytes(data)) => data.into_response(),
        Some(File::Unsized(data)) => {
            let stream = ReaderStream::new(std::io::Cursor::new(data));
            Body::from_stream(stream).into_response()
        }
        Some(File::Truncated { announced, sent }) => {
            let head = futures::stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(sent)) });
            // pause so the head and first chunk are flushed before the break
            let cut = futures::stream::once(async {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                Err::<Bytes, _>(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection dropped",
                ))
            });
            Response::builder()
                .header(header::CONTENT_LENGTH, announced)
                .body(Body::from_stream(head.chain(cut)))
                .unwrap()
        }
        Some(File::Status(status)) => status.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Progress reporter that only counts.
#[derive(Default)]
pub struct CountingProgress {
    pub bars: AtomicUsize,
    pub totals: AtomicU64,
    pub advanced: Arc<AtomicU64>,
}

struct CountingBar(Arc<AtomicU64>);

impl ProgressBar for CountingBar {
    fn advance(&mut self, n: u64) {
        self.0.fetch_add(n, Ordering::SeqCst);
    }
}

impl ProgressReporter for CountingProgress {
    fn add_bar(&self, total: u64, _label: &str, _unit: Unit) -> Box<dyn ProgressBar> {
        self.bars.fetch_add(1, Ordering::SeqCst);
        self.totals.fetch_add(total, Ordering::SeqCst);
        Box::new(CountingBar(Arc::clone(&self.advanced)))
    }
}
