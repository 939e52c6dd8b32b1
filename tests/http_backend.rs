use salvo::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hbase_browser::api::{DataSourceApi, HttpBackend};
use hbase_browser::core::{AddDataForm, AssumeYes, ProfileStore};
use hbase_browser::models::{CellWrite, ConfigFile, NewDataSource, RowKeyQuery};
use hbase_browser::{ApiError, ClientError, SessionManager, SessionOptions, ViewState};

/// Requests seen by the mock backend, one line each.
#[derive(Default)]
struct MockState {
    log: Mutex<Vec<String>>,
    fail_connect: AtomicBool,
    reject_upload: AtomicBool,
}

impl MockState {
    fn record(&self, line: String) {
        self.log.lock().unwrap().push(line);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

struct StateInjector(Arc<MockState>);

#[async_trait]
impl Handler for StateInjector {
    async fn handle(&self, _req: &mut Request, depot: &mut Depot, _res: &mut Response, _ctrl: &mut FlowCtrl) {
        depot.inject(self.0.clone());
    }
}

fn state(depot: &Depot) -> Arc<MockState> {
    depot.obtain::<Arc<MockState>>().unwrap().clone()
}

fn id(req: &Request) -> String {
    req.param::<String>("id").unwrap_or_default()
}

fn fail(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(Json(json!({ "error": message })));
}

#[handler]
async fn upload_config(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let id = id(req);
    let core = req.file("core-site").await.and_then(|f| f.name().map(str::to_string));
    let hbase = req.file("hbase-site").await.and_then(|f| f.name().map(str::to_string));
    match (core, hbase) {
        (Some(core), Some(hbase)) => {
            let state = state(depot);
            state.record(format!("upload:{}:{}:{}", id, core, hbase));
            if state.reject_upload.load(Ordering::SeqCst) {
                // Status stays 200, only the body says it failed
                res.render(Json(json!({ "error": "Invalid core-site.xml" })));
                return;
            }
            res.render(Json(json!({ "success": true })));
        }
        _ => fail(res, StatusCode::BAD_REQUEST, "Both configuration files are required"),
    }
}

#[handler]
async fn connect(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let state = state(depot);
    let body: Value = req.parse_json().await.unwrap_or_default();
    state.record(format!("connect:{}:{}", id(req), body["host"].as_str().unwrap_or("")));
    if state.fail_connect.load(Ordering::SeqCst) {
        return fail(res, StatusCode::INTERNAL_SERVER_ERROR, "Cannot reach quorum");
    }
    res.render(Json(json!({ "tables": ["orders", "users"] })));
}

#[handler]
async fn delete_source(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    state(depot).record(format!("delete:{}", id(req)));
    res.render(Json(json!({ "success": true })));
}

#[handler]
async fn list_rows(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let table = req.query::<String>("table").unwrap_or_default();
    let rowkey = req.query::<String>("rowkey");
    let limit = req.query::<String>("limit");
    state(depot).record(format!(
        "list:{}:{}:{}",
        table,
        rowkey.as_deref().unwrap_or("-"),
        limit.as_deref().unwrap_or("-")
    ));
    let rowkeys = match rowkey {
        Some(key) => vec![key],
        None => vec!["u1".to_string(), "u2".to_string()],
    };
    res.render(Json(json!({ "rowkeys": rowkeys })));
}

#[handler]
async fn query_row(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let table = req.query::<String>("table").unwrap_or_default();
    let rowkey = req.query::<String>("rowkey").unwrap_or_default();
    state(depot).record(format!("query:{}:{}", table, rowkey));
    if rowkey == "missing" {
        return fail(res, StatusCode::NOT_FOUND, "Row not found");
    }
    res.render(Json(json!({ "info": { "name": "Alice", "age": "30" } })));
}

#[handler]
async fn add_data(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: Value = req.parse_json().await.unwrap_or_default();
    state(depot).record(format!(
        "add:{}:{}:{}:{}:{}",
        body["table"].as_str().unwrap_or(""),
        body["rowKey"].as_str().unwrap_or(""),
        body["columnFamily"].as_str().unwrap_or(""),
        body["column"].as_str().unwrap_or(""),
        body["value"].as_str().unwrap_or("")
    ));
    res.render(Json(json!({ "success": true })));
}

#[handler]
async fn delete_data(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: Value = req.parse_json().await.unwrap_or_default();
    state(depot).record(format!(
        "delete-data:{}:{}",
        body["table"].as_str().unwrap_or(""),
        body["rowKey"].as_str().unwrap_or("")
    ));
    res.render(Json(json!({ "success": true })));
}

#[handler]
async fn add_family(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: Value = req.parse_json().await.unwrap_or_default();
    let family = body["familyName"].as_str().unwrap_or("").to_string();
    state(depot).record(format!("add-family:{}:{}", body["table"].as_str().unwrap_or(""), family));
    if family == "dup" {
        // Rejected without a usable message
        return fail(res, StatusCode::BAD_REQUEST, "");
    }
    res.render(Json(json!({ "success": true })));
}

async fn start_mock(state: Arc<MockState>) -> String {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let addr = format!("127.0.0.1:{}", port);

    let router = Router::new().hoop(StateInjector(state)).push(
        Router::with_path("api/datasource/{id}")
            .delete(delete_source)
            .push(Router::with_path("upload-config").post(upload_config))
            .push(Router::with_path("connect").post(connect))
            .push(Router::with_path("reconnect").post(connect))
            .push(Router::with_path("list-rows").get(list_rows))
            .push(Router::with_path("query").get(query_row))
            .push(Router::with_path("add-data").post(add_data))
            .push(Router::with_path("delete-data").delete(delete_data))
            .push(Router::with_path("add-family").post(add_family)),
    );

    let acceptor = TcpListener::new(addr.clone()).bind().await;
    tokio::spawn(async move {
        Server::new(acceptor).serve(router).await;
    });
    format!("http://{}", addr)
}

fn config_files() -> (ConfigFile, ConfigFile) {
    (
        ConfigFile::new("core-site.xml", "<configuration/>"),
        ConfigFile::new("hbase-site.xml", "<configuration/>"),
    )
}

#[tokio::test]
async fn test_upload_sends_both_multipart_parts() {
    let state = Arc::new(MockState::default());
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();
    let (core, hbase) = config_files();

    backend.upload_config("ds1", &core, &hbase).await.unwrap();
    assert_eq!(state.log(), ["upload:ds1:core-site.xml:hbase-site.xml"]);
}

#[tokio::test]
async fn test_upload_error_body_with_success_status_is_rejected() {
    let state = Arc::new(MockState::default());
    state.reject_upload.store(true, Ordering::SeqCst);
    let base = start_mock(state.clone()).await;
    let backend = HttpBackend::new(&base).unwrap();
    let (core, hbase) = config_files();

    match backend.upload_config("ds1", &core, &hbase).await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 200);
            assert_eq!(message.as_deref(), Some("Invalid core-site.xml"));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let options = SessionOptions {
        row_limit: 100,
        settle_delay: Duration::ZERO,
        notice_duration: Duration::from_secs(60),
    };
    let api = HttpBackend::new(&base).unwrap();
    let mut session = SessionManager::new(Arc::new(api), ProfileStore::in_memory(), options);
    let err = session
        .create(NewDataSource {
            name: "Prod".to_string(),
            cluster_quorum: "zk1:2181".to_string(),
            core_site: Some(core),
            hbase_site: Some(hbase),
        })
        .await
        .unwrap_err();
    match err {
        ClientError::Upload(message) => assert_eq!(message, "Invalid core-site.xml"),
        other => panic!("unexpected error: {:?}", other),
    }

    // Nothing connects or saves after a rejected upload
    assert!(state.log().iter().all(|line| line.starts_with("upload:")));
    assert!(session.profiles().is_empty());
    assert_eq!(session.view(), ViewState::Empty);
}

#[tokio::test]
async fn test_list_rows_sends_limit_or_rowkey() {
    let state = Arc::new(MockState::default());
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();

    let page = backend
        .list_rows("ds1", &RowKeyQuery::new("users", None, 100))
        .await
        .unwrap();
    assert_eq!(page, ["u1", "u2"]);

    let hit = backend
        .list_rows("ds1", &RowKeyQuery::new("users", Some("k1"), 100))
        .await
        .unwrap();
    assert_eq!(hit, ["k1"]);

    assert_eq!(state.log(), ["list:users:-:100", "list:users:k1:-"]);
}

#[tokio::test]
async fn test_backend_error_message_is_kept() {
    let state = Arc::new(MockState::default());
    state.fail_connect.store(true, Ordering::SeqCst);
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();

    match backend.connect("ds1", "zk1:2181").await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("Cannot reach quorum"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_error_falls_back_to_generic_message() {
    let state = Arc::new(MockState::default());
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();

    let err = backend.add_family("ds1", "users", "dup").await.unwrap_err();
    assert_eq!(err.message_or("Failed to add column family"), "Failed to add column family (HTTP 400)");
}

#[tokio::test]
async fn test_row_detail_and_json_bodies() {
    let state = Arc::new(MockState::default());
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();

    let detail = backend.query_row("ds1", "users", "u1").await.unwrap();
    assert_eq!(detail.row_key, "u1");
    assert_eq!(detail.families["info"]["name"], "Alice");
    assert_eq!(detail.cell_count(), 2);

    let cell = CellWrite {
        table: "users".to_string(),
        row_key: "u3".to_string(),
        column_family: "info".to_string(),
        column: "name".to_string(),
        value: "Carol".to_string(),
    };
    backend.add_data("ds1", &cell).await.unwrap();
    backend.delete_data("ds1", "users", "u3").await.unwrap();

    let log = state.log();
    assert_eq!(log[1], "add:users:u3:info:name:Carol");
    assert_eq!(log[2], "delete-data:users:u3");
}

#[tokio::test]
async fn test_session_over_http() {
    let state = Arc::new(MockState::default());
    let backend = HttpBackend::new(&start_mock(state.clone()).await).unwrap();
    let options = SessionOptions {
        row_limit: 100,
        settle_delay: Duration::from_millis(10),
        notice_duration: Duration::from_secs(60),
    };
    let mut session = SessionManager::new(Arc::new(backend), ProfileStore::in_memory(), options);

    let (core, hbase) = config_files();
    let profile = session
        .create(NewDataSource {
            name: "Prod".to_string(),
            cluster_quorum: "zk1:2181".to_string(),
            core_site: Some(core),
            hbase_site: Some(hbase),
        })
        .await
        .unwrap();
    assert_eq!(session.browser().tables(), ["orders", "users"]);

    session.choose_table("users").await.unwrap();
    let err = session.get_row("users", "missing").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load row data: Row not found");

    session.search("u2").await.unwrap();
    assert_eq!(session.browser().detail().unwrap().row_key, "u2");

    let form = AddDataForm {
        table: "users".to_string(),
        row_key: "u3".to_string(),
        column_family: "info".to_string(),
        column: "name".to_string(),
        value: "Carol".to_string(),
    };
    session.add_row_data(form).await.unwrap();
    assert!(session.delete_row("users", "u2", &AssumeYes).await.unwrap());
    assert!(session.delete(&profile.id, &AssumeYes).await.unwrap());
    assert_eq!(session.view(), ViewState::Empty);

    let id = &profile.id;
    assert_eq!(
        state.log(),
        vec![
            format!("upload:{}:core-site.xml:hbase-site.xml", id),
            format!("connect:{}:zk1:2181", id),
            "list:users:-:100".to_string(),
            "query:users:missing".to_string(),
            "list:users:u2:-".to_string(),
            "query:users:u2".to_string(),
            "add:users:u3:info:name:Carol".to_string(),
            "list:users:-:100".to_string(),
            "delete-data:users:u2".to_string(),
            "list:users:-:100".to_string(),
            format!("delete:{}", id),
        ]
    );
}
