//! Local HTTP test double shared by the integration tests.
//!
//! Started once per test binary on an ephemeral port, on its own multi-thread runtime so it keeps
//! serving while the blocking client under test runs on the test thread.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use std::time::Duration;

pub const XML_DOC: &str = r#"<?xml version="1.0" encoding="us-ascii"?>
<slideshow title="Sample Slide Show" date="Date of publication" author="Yours Truly">
    <slide type="all">
        <title>Wake up to WonderWidgets!</title>
    </slide>
    <slide type="all">
        <title>Overview</title>
        <item>Why <em>WonderWidgets</em> are great</item>
        <item/>
    </slide>
</slideshow>"#;

static BASE_URL: OnceLock<String> = OnceLock::new();

pub fn base_url() -> &'static str {
    BASE_URL.get_or_init(|| {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .expect("test server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind test server");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report address");
                axum::serve(listener, router()).await.expect("serve");
            });
        });
        format!("http://{}", rx.recv().expect("test server address"))
    })
}

pub fn url(path: &str) -> String {
    format!("{}{}", base_url(), path)
}

fn router() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/anything", any(echo))
        .route("/anything/*rest", any(echo))
        .route("/status/:code", any(status))
        .route("/delay/:ms", any(delay))
        .route("/redirect/:n", get(redirect))
        .route("/basic-auth/:user/:pass", get(basic_auth))
        .route("/xml", get(xml))
        .route("/bytes/:n", get(bytes))
        .route("/response-headers", get(response_headers))
}

/// Echoes the request back as JSON: `{method, url, args, headers, form, data}`.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(describe(&method, &uri, &headers, &body))
}

fn describe(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> Value {
    let data = String::from_utf8_lossy(body).into_owned();

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    let form = if is_form {
        pairs(&data)
    } else {
        Map::new()
    };

    let mut echoed = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match echoed.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            _ => {
                echoed.insert(name.as_str().to_string(), Value::String(value));
            }
        }
    }

    json!({
        "method": method.as_str(),
        "url": uri.to_string(),
        "args": pairs(uri.query().unwrap_or_default()),
        "headers": echoed,
        "form": form,
        "data": data,
    })
}

fn pairs(encoded: &str) -> Map<String, Value> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("Status: {}", code)).into_response()
}

async fn delay(
    Path(ms): Path<u64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    let mut value = describe(&method, &uri, &headers, &body);
    value["delay"] = json!(ms);
    Json(value)
}

async fn redirect(Path(n): Path<u32>) -> Redirect {
    if n <= 1 {
        Redirect::to("/get")
    } else {
        Redirect::to(&format!("/redirect/{}", n - 1))
    }
}

async fn basic_auth(Path((user, pass)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)));
    let given = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if given == Some(expected.as_str()) {
        Json(json!({ "authenticated": true, "user": user })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

async fn xml() -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], XML_DOC).into_response()
}

/// `n` bytes of filler text.
async fn bytes(Path(n): Path<usize>) -> Response {
    ([(header::CONTENT_TYPE, "text/plain")], vec![b'a'; n]).into_response()
}

/// Every query pair becomes a response header; repeated keys produce repeated headers.
async fn response_headers(uri: Uri) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            headers.append(name, value);
        }
    }
    (headers, "{}").into_response()
}
