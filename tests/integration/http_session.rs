//! Session over HTTP against a real listener.

use grove::client::{ExplorerSession, ExplorerTransport, HttpTransport};
use grove::server::{serve_on, AppState};
use grove::store::MemoryNodeStore;
use grove::{ApiError, MutationEngine, NodeEdit, NodeId};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    engine: Arc<MutationEngine>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(base_path: &str) -> Self {
        let engine = Arc::new(MutationEngine::new(Arc::new(MemoryNodeStore::new())));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let state = Arc::new(AppState::new(engine.clone()));
        let base = base_path.to_string();
        let handle = tokio::spawn(async move {
            serve_on(listener, state, &base, async move {
                let _ = rx.await;
            })
            .await
        });
        Self {
            base_url: format!("http://{}{}", addr, base_path),
            engine,
            shutdown: Some(tx),
            handle,
        }
    }

    fn transport(&self) -> HttpTransport {
        HttpTransport::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn session_round_trips_over_http() {
    let server = TestServer::start("/file-explorer").await;
    let session = ExplorerSession::new(Arc::new(server.transport()));

    session.load().await.unwrap();
    assert!(session.forest().is_none());

    let docs = session.create_root("Docs").await.unwrap();
    session.insert_child(&docs.id, "readme.txt", false).await.unwrap();
    session.rename(&docs.id, "Documents").await.unwrap();

    let forest = session.forest().unwrap();
    assert_eq!(forest[0].name, "Documents");
    assert_eq!(forest[0].items[0].name, "readme.txt");
    assert_eq!(Some(forest), server.engine.get_forest().unwrap());

    session.delete(&docs.id).await.unwrap();
    assert!(session.forest().is_none());
    server.stop().await;
}

#[tokio::test]
async fn domain_errors_survive_the_wire() {
    let server = TestServer::start("/file-explorer").await;
    let http = server.transport();

    let docs = http.create_root("Docs").await.unwrap();
    let forest = http
        .insert_child(&docs.id, "readme.txt", false)
        .await
        .unwrap()
        .unwrap();
    let readme = forest[0].items[0].id.clone();

    let err = http.insert_child(&readme, "x", true).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(ref m) if m == "Cannot add items to a file"));

    let err = http.create_root("").await.unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));

    let err = http
        .edit(&NodeId::from("ghost"), NodeEdit::rename("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = http.fetch_subtree(&readme).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let subtree = http.fetch_subtree(&docs.id).await.unwrap();
    assert_eq!(subtree.items.len(), 1);
    server.stop().await;
}

#[tokio::test]
async fn failed_round_trip_rolls_back_session() {
    let server = TestServer::start("/api/tree").await;
    let session = ExplorerSession::new(Arc::new(server.transport()));
    let docs = session.create_root("Docs").await.unwrap();
    session.insert_child(&docs.id, "readme.txt", false).await.unwrap();
    let readme = session.forest().unwrap()[0].items[0].id.clone();

    let err = session.insert_child(&readme, "nested", true).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)));
    let forest = session.forest().unwrap();
    assert_eq!(forest[0].items.len(), 1);
    assert!(forest[0].items[0].items.is_empty());
    assert!(session.last_error().is_some());

    session.rename(&docs.id, "").await.unwrap();
    assert_eq!(session.forest().unwrap()[0].name, "");
    server.stop().await;
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = HttpTransport::new(
        &format!("http://{}/file-explorer", addr),
        Duration::from_secs(2),
    )
    .unwrap();
    let session = ExplorerSession::new(Arc::new(http));
    assert!(matches!(
        session.load().await,
        Err(ApiError::Transport(_))
    ));
}
