//! A throwaway metadata service for integration tests
//!
//! Serves a fixed route table with hyper on a background current-thread
//! runtime and records every request it sees, so tests can check both what
//! came back and what was sent.
#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::HeaderMap;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;

use node_metadata::metadata::{LabelScheme, MetadataFetcher};

pub const TOKEN_PATH: &str = "/latest/api/token";
pub const INSTANCE_ID_PATH: &str = "/latest/meta-data/instance-id";
pub const LIFECYCLE_PATH: &str = "/latest/meta-data/instance-life-cycle";

#[derive(Clone, Debug)]
pub enum Reply {
    Fixed(u16, &'static str),
    /// Accept the request and never answer it
    Stall,
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
}

impl Recorded {
    /// Every value sent for `name`, in order
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }
}

type Routes = Arc<HashMap<&'static str, Reply>>;
type Seen = Arc<Mutex<Vec<Recorded>>>;

pub struct MockImds {
    base_url: String,
    requests: Seen,
}

impl MockImds {
    /// Serve `routes`. Unknown paths get a 404.
    pub fn start(routes: &[(&'static str, Reply)]) -> MockImds {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let routes: Routes = Arc::new(routes.iter().cloned().collect());
        let requests: Seen = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(serve(listener, routes, seen));
        });

        MockImds {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// The usual token and instance-id, with the given lifecycle reply
    pub fn healthy(lifecycle: Reply) -> MockImds {
        MockImds::start(&[
            (TOKEN_PATH, Reply::Fixed(200, "mock-token")),
            (INSTANCE_ID_PATH, Reply::Fixed(200, "i-1234567890abcdef0")),
            (LIFECYCLE_PATH, lifecycle),
        ])
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self, scheme: LabelScheme) -> MetadataFetcher {
        MetadataFetcher::with_base_url(&self.base_url, scheme)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(listener: TcpListener, routes: Routes, seen: Seen) {
    let listener = tokio::net::TcpListener::from_std(listener).unwrap();
    loop {
        let (stream, _addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => break,
        };
        let routes = routes.clone();
        let seen = seen.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req| respond(req, routes.clone(), seen.clone()));
            // The client hanging up mid-request is fine here
            let _ = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await;
        });
    }
}

async fn respond(
    req: Request<Incoming>,
    routes: Routes,
    seen: Seen,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_owned();

    // Recorded before answering, the client may be done as soon as it has a reply
    seen.lock().unwrap().push(Recorded {
        method: req.method().as_str().to_owned(),
        path: path.clone(),
        headers: req.headers().clone(),
    });

    let (status, body) = match routes.get(path.as_str()) {
        Some(Reply::Fixed(status, body)) => (*status, *body),
        Some(Reply::Stall) => {
            std::future::pending::<()>().await;
            (500, "")
        }
        None => (404, ""),
    };
    let resp = Response::builder()
        .status(status)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();
    Ok(resp)
}
