//! Tele2 client tests against a local HTTP server.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tele2usage_core::{
    Credentials, DataLimit, UsageApi, UsageError, UsageSource,
};
use tele2usage_fetch::{AccountUsageSource, Tele2Api, resolve_subscription};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

const USAGE_BODY: &str = r#"{
    "hasUnlimitedData": false,
    "packageLimit": 20480,
    "usage": 5120.5,
    "remaining": 15359.5,
    "buckets": [{"startDate": "2024-03-09", "endDate": "2024-04-08"}]
}"#;

// ============================================================================
// Fake Server
// ============================================================================

#[derive(Default)]
struct ServerState {
    logins: usize,
    session: Option<String>,
}

struct FakeTele2 {
    base: Url,
    state: Arc<Mutex<ServerState>>,
}

impl FakeTele2 {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let state = Arc::new(Mutex::new(ServerState::default()));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(serve(stream, Arc::clone(&shared)));
            }
        });

        Self { base, state }
    }

    fn api(&self) -> Tele2Api {
        Tele2Api::new(self.base.clone())
    }

    fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    fn expire_session(&self) {
        self.state.lock().unwrap().session = None;
    }
}

async fn serve(mut stream: TcpStream, state: Arc<Mutex<ServerState>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    };
    let content_length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default();
    let path = request_line.next().unwrap_or_default();
    let cookie = header("cookie").unwrap_or_default();

    let (status, extra, response) = {
        let mut state = state.lock().unwrap();
        let logged_in = state
            .session
            .as_ref()
            .is_some_and(|s| cookie.contains(&format!("session={s}")));

        match (method, path) {
            ("POST", "/auth/login") if body.contains(r#""password":"secret""#) => {
                state.logins += 1;
                let token = format!("t{}", state.logins);
                state.session = Some(token.clone());
                (
                    "200 OK",
                    format!("Set-Cookie: session={token}; Path=/\r\n"),
                    "{}".to_string(),
                )
            }
            ("POST", "/auth/login") => ("401 Unauthorized", String::new(), "{}".to_string()),
            (_, _) if !logged_in => ("401 Unauthorized", String::new(), "{}".to_string()),
            ("GET", "/api/subscriptions") => (
                "200 OK",
                String::new(),
                r#"[{"subsId": "4711", "name": "Fast 20GB"}, {"subscriptionId": "4712"}]"#
                    .to_string(),
            ),
            ("GET", "/api/subscriptions/4711/data-usage") => {
                ("200 OK", String::new(), USAGE_BODY.to_string())
            }
            ("GET", "/api/subscriptions/4712/data-usage") => (
                "200 OK",
                String::new(),
                r#"{"hasUnlimitedData": false}"#.to_string(),
            ),
            _ => ("404 Not Found", String::new(), "{}".to_string()),
        }
    };

    let reply = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{extra}\r\n{response}",
        response.len()
    );
    let _ = stream.write_all(reply.as_bytes()).await;
    let _ = stream.shutdown().await;
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_login_and_fetch_usage() {
    let server = FakeTele2::start().await;
    let api = server.api();

    let session = api.authenticate("user", "secret").await.unwrap();
    let subscriptions = api.list_subscriptions(&session).await.unwrap();
    assert_eq!(subscriptions.len(), 2);
    assert_eq!(subscriptions[0].subscription_id, "4711");
    assert_eq!(subscriptions[1].name, "");

    let snapshot = api.fetch_usage(&session, "4711").await.unwrap();
    assert_eq!(snapshot.data_limit, Some(DataLimit::Megabytes(20480.0)));
    assert_eq!(snapshot.data_used_mb, Some(5120.5));
    assert_eq!(snapshot.data_left_mb, Some(15359.5));
    assert_eq!(snapshot.period_start, NaiveDate::from_ymd_opt(2024, 3, 9));
    assert_eq!(snapshot.period_end, NaiveDate::from_ymd_opt(2024, 4, 8));
    assert!(!snapshot.is_unlimited);
}

#[tokio::test]
async fn test_rejected_login() {
    let server = FakeTele2::start().await;

    let err = server.api().authenticate("user", "wrong").await.unwrap_err();
    assert!(matches!(err, UsageError::Authentication(_)));
}

#[tokio::test]
async fn test_unknown_subscription_is_network_error() {
    let server = FakeTele2::start().await;
    let api = server.api();
    let session = api.authenticate("user", "secret").await.unwrap();

    let err = api.fetch_usage(&session, "9999").await.unwrap_err();
    assert!(matches!(err, UsageError::Network(_)));
}

#[tokio::test]
async fn test_incomplete_usage_is_malformed() {
    let server = FakeTele2::start().await;
    let api = server.api();
    let session = api.authenticate("user", "secret").await.unwrap();

    let err = api.fetch_usage(&session, "4712").await.unwrap_err();
    assert!(matches!(err, UsageError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_resolve_subscription() {
    let server = FakeTele2::start().await;
    let credentials = Credentials::new("user", "secret");

    let identity = resolve_subscription(&server.api(), &credentials, None)
        .await
        .unwrap();
    assert_eq!(identity.subscription_id, "4711");
    assert_eq!(identity.subscription_model, "Fast 20GB");
}

#[tokio::test]
async fn test_source_logs_in_again_after_expiry() {
    let server = FakeTele2::start().await;
    let source = AccountUsageSource::new(server.api(), Credentials::new("user", "secret"), "4711");

    source.fetch_usage().await.unwrap();
    source.fetch_usage().await.unwrap();
    assert_eq!(server.logins(), 1);

    server.expire_session();
    let err = source.fetch_usage().await.unwrap_err();
    assert!(matches!(err, UsageError::Authentication(_)));
    assert!(!source.has_session().await);

    let snapshot = source.fetch_usage().await.unwrap();
    assert_eq!(server.logins(), 2);
    assert_eq!(snapshot.data_used_mb, Some(5120.5));
}
