use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use actix_web::{dev::ServerHandle, http::StatusCode, web, App, HttpResponse, HttpServer};
use log::*;
use serde_json::json;

/// What the fake accrual system says about a given order.
#[derive(Clone, Debug)]
pub enum FakeResponse {
    Status { status: &'static str, accrual: Option<f64> },
    /// Answers 200 with this body verbatim
    Raw(String),
    NoContent,
    TooManyRequests { retry_after: Option<&'static str> },
    Error(u16),
    Slow(Duration, Box<FakeResponse>),
}

#[derive(Default)]
pub struct FakeState {
    responses: Mutex<HashMap<String, FakeResponse>>,
    hits: AtomicUsize,
}

/// A stand-in for the accrual system, listening on a random local port.
pub struct FakeAccrualServer {
    address: String,
    handle: ServerHandle,
    state: web::Data<FakeState>,
}

impl FakeAccrualServer {
    pub async fn start() -> Self {
        let state = web::Data::new(FakeState::default());
        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new().app_data(app_state.clone()).route("/api/orders/{number}", web::get().to(order_status))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("Error binding fake accrual server");
        let addr = server.addrs()[0];
        let srv = server.run();
        let handle = srv.handle();
        tokio::spawn(async move {
            match srv.await {
                Ok(_) => info!("🌍️ Fake accrual server shut down"),
                Err(e) => warn!("🌍️ Fake accrual server error: {e}"),
            }
        });
        let address = format!("http://{addr}");
        debug!("🌍️ Fake accrual server listening on {address}");
        Self { address, handle, state }
    }

    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    pub fn respond(&self, number: &str, response: FakeResponse) {
        self.state.responses.lock().unwrap().insert(number.to_string(), response);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn order_status(path: web::Path<String>, state: web::Data<FakeState>) -> HttpResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let number = path.into_inner();
    let mut response = state.responses.lock().unwrap().get(&number).cloned().unwrap_or(FakeResponse::NoContent);
    while let FakeResponse::Slow(delay, inner) = response {
        tokio::time::sleep(delay).await;
        response = *inner;
    }
    match response {
        FakeResponse::Status { status, accrual: Some(accrual) } => {
            HttpResponse::Ok().json(json!({ "order": number, "status": status, "accrual": accrual }))
        },
        FakeResponse::Status { status, accrual: None } => {
            HttpResponse::Ok().json(json!({ "order": number, "status": status }))
        },
        FakeResponse::Raw(body) => HttpResponse::Ok().content_type("application/json").body(body),
        FakeResponse::NoContent => HttpResponse::NoContent().finish(),
        FakeResponse::TooManyRequests { retry_after: Some(secs) } => {
            HttpResponse::TooManyRequests().insert_header(("Retry-After", secs)).body("slow down")
        },
        FakeResponse::TooManyRequests { retry_after: None } => HttpResponse::TooManyRequests().body("slow down"),
        FakeResponse::Error(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).body("boom")
        },
        FakeResponse::Slow(..) => unreachable!("slow responses are unwrapped above"),
    }
}
