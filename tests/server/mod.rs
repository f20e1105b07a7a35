// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What the test site answers on one path
#[derive(Clone)]
pub enum Stub {
    Html(u16, String),
    Redirect(String),
    Status(u16),
    /// Answers 405 to HEAD and `status` to everything else
    NoHead(u16),
    /// Serves the body after a delay in milliseconds
    Slow(u64, String),
    /// A 200 with the given content type and body
    Asset(String, String),
}

pub fn html(body: &str) -> Stub {
    Stub::Html(200, body.to_string())
}

/// A page with a title, meta description and one H1, linking to `links`
pub fn page(title: &str, links: &[&str]) -> Stub {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();

    html(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title}</title>
  <meta name="description" content="About {title}">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <h1>{title}</h1>
  <p>Some readable text about {title} so the page is not empty.</p>
  {anchors}
</body>
</html>"#
    ))
}

type Hits = Arc<Mutex<HashMap<(String, String), usize>>>;

pub struct TestSite {
    pub url: String,
    hits: Hits,
}

impl TestSite {
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Number of requests with `method` received on `path`
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_gets(&self) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|((method, _), _)| method == "GET")
            .map(|(_, count)| count)
            .sum()
    }
}

struct SiteState {
    routes: HashMap<String, Stub>,
    hits: Hits,
}

async fn serve(req: HttpRequest, state: web::Data<SiteState>) -> HttpResponse {
    *state
        .hits
        .lock()
        .unwrap()
        .entry((req.method().to_string(), req.path().to_string()))
        .or_insert(0) += 1;

    let status = |code: u16| StatusCode::from_u16(code).expect("valid status code");

    match state.routes.get(req.path()) {
        Some(Stub::Html(code, body)) => HttpResponse::build(status(*code))
            .content_type("text/html; charset=utf-8")
            .body(body.clone()),
        Some(Stub::Redirect(location)) => HttpResponse::Found()
            .append_header(("Location", location.as_str()))
            .finish(),
        Some(Stub::Status(code)) => HttpResponse::build(status(*code)).finish(),
        Some(Stub::NoHead(code)) => {
            if req.method() == actix_web::http::Method::HEAD {
                HttpResponse::MethodNotAllowed().finish()
            } else {
                HttpResponse::build(status(*code)).finish()
            }
        }
        Some(Stub::Slow(delay_ms, body)) => {
            tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(body.clone())
        }
        Some(Stub::Asset(content_type, body)) => HttpResponse::Ok()
            .content_type(content_type.as_str())
            .body(body.clone()),
        None => HttpResponse::NotFound().finish(),
    }
}

/// Starts an in-process site serving `routes` on a random local port.
pub async fn start_site(routes: Vec<(&str, Stub)>) -> TestSite {
    let hits: Hits = Arc::new(Mutex::new(HashMap::new()));
    let state = web::Data::new(SiteState {
        routes: routes
            .into_iter()
            .map(|(path, stub)| (path.to_string(), stub))
            .collect(),
        hits: Arc::clone(&hits),
    });

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .default_service(web::to(serve))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    TestSite { url, hits }
}

/// A local address nothing listens on
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/", addr)
}
