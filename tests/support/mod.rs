//! In-process stand-in for the remote loan service.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Rows returned by the detail endpoint, more than the client displays.
pub const DETAIL_ROWS: u32 = 24;

#[derive(Debug, Clone)]
struct StoredLoan {
    id: u64,
    amount: f64,
    apr: f64,
    term_months: u32,
    monthly_payment: f64,
}

#[derive(Default)]
struct FakeApi {
    next_id: u64,
    loans: Vec<StoredLoan>,
}

type Shared = Arc<Mutex<FakeApi>>;

#[derive(Debug, Deserialize)]
struct LoanBody {
    amount: f64,
    apr: f64,
    term_months: u32,
}

/// Base URL of the fake, started on first use on its own runtime thread so
/// it outlives any single test.
pub static FAKE_API: Lazy<String> = Lazy::new(|| {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind fake loan api");
    let addr = listener.local_addr().expect("fake api addr");
    listener.set_nonblocking(true).expect("nonblocking listener");

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake api runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, fake_router()).await.expect("fake api serve");
        });
    });

    format!("http://{addr}")
});

pub fn fake_api_url() -> String {
    FAKE_API.clone()
}

fn fake_router() -> Router {
    let state: Shared = Arc::default();
    Router::new()
        .route("/loans", post(create_loan).get(list_loans))
        .route("/loans/calculate", post(calculate_loan))
        .route("/loans/:id", get(get_loan).delete(delete_loan))
        .route("/broken/loans", get(broken_list))
        .route("/broken/loans/:id", get(broken_detail))
        .route("/echo/loans/:id", get(echo_detail).delete(echo_delete))
        .with_state(state)
}

async fn create_loan(State(state): State<Shared>, Json(body): Json<LoanBody>) -> Response {
    if let Err(response) = check_body(&body) {
        return response;
    }
    let monthly_payment = monthly_payment(body.amount, body.apr, body.term_months);
    let loan = {
        let mut api = state.lock().unwrap();
        api.next_id += 1;
        let loan = StoredLoan {
            id: api.next_id,
            amount: body.amount,
            apr: body.apr,
            term_months: body.term_months,
            monthly_payment,
        };
        api.loans.push(loan.clone());
        loan
    };
    Json(detail(&loan, body.term_months.min(12))).into_response()
}

async fn calculate_loan(Json(body): Json<LoanBody>) -> Response {
    if let Err(response) = check_body(&body) {
        return response;
    }
    let loan = StoredLoan {
        id: 0,
        amount: body.amount,
        apr: body.apr,
        term_months: body.term_months,
        monthly_payment: monthly_payment(body.amount, body.apr, body.term_months),
    };
    Json(detail(&loan, body.term_months.min(12))).into_response()
}

async fn list_loans(State(state): State<Shared>) -> Json<Vec<Value>> {
    let api = state.lock().unwrap();
    Json(api.loans.iter().rev().map(summary).collect())
}

async fn get_loan(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let api = state.lock().unwrap();
    match api.loans.iter().find(|loan| loan.id == id) {
        Some(loan) => Json(detail(loan, loan.term_months.min(DETAIL_ROWS))).into_response(),
        None => not_found(),
    }
}

async fn delete_loan(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut api = state.lock().unwrap();
    let before = api.loans.len();
    api.loans.retain(|loan| loan.id != id);
    if api.loans.len() == before {
        return not_found();
    }
    Json(json!({ "message": "Loan deleted successfully" })).into_response()
}

async fn broken_list() -> &'static str {
    "<html>gateway page</html>"
}

async fn broken_detail(Path(id): Path<u64>) -> Json<Value> {
    Json(json!({
        "id": id,
        "amount": 1000.0,
        "apr": 0.0,
        "term_months": 12,
        "monthly_payment": 83.33,
        "schedule_preview": [
            { "month": 1, "interest_paid": 0.0, "principal_paid": 83.33, "remaining_balance": 916.67 },
            { "month": 3, "interest_paid": 0.0, "principal_paid": 83.33, "remaining_balance": 750.01 }
        ]
    }))
}

/// Answers for any id, string ones included, so the decoded path segment can
/// be checked against what the client sent.
async fn echo_detail(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "amount": 1200.0,
        "apr": 0.0,
        "term_months": 12,
        "monthly_payment": 100.0,
        "schedule_preview": [
            { "month": 1, "interest_paid": 0.0, "principal_paid": 100.0, "remaining_balance": 1100.0 }
        ]
    }))
}

async fn echo_delete(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "message": format!("Loan {id} deleted successfully") }))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Loan not found" }))).into_response()
}

fn check_body(body: &LoanBody) -> Result<(), Response> {
    let mut problems = Vec::new();
    if body.amount <= 0.0 {
        problems.push(json!({ "loc": ["body", "amount"], "msg": "Input should be greater than 0" }));
    }
    if !(0.0..=100.0).contains(&body.apr) {
        problems.push(json!({ "loc": ["body", "apr"], "msg": "Input should be less than or equal to 100" }));
    }
    if !(1..=480).contains(&body.term_months) {
        problems.push(json!({ "loc": ["body", "term_months"], "msg": "Input should be less than or equal to 480" }));
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": problems }))).into_response())
    }
}

fn summary(loan: &StoredLoan) -> Value {
    json!({
        "id": loan.id,
        "amount": loan.amount,
        "apr": loan.apr,
        "term_months": loan.term_months,
        "monthly_payment": loan.monthly_payment,
    })
}

fn detail(loan: &StoredLoan, rows: u32) -> Value {
    let mut body = summary(loan);
    body["schedule_preview"] = Value::Array(schedule(loan, rows));
    body
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn monthly_payment(amount: f64, apr: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months);
    if apr == 0.0 {
        return cents(amount / n);
    }
    let r = apr / 100.0 / 12.0;
    cents(amount * r / (1.0 - (1.0 + r).powf(-n)))
}

fn schedule(loan: &StoredLoan, rows: u32) -> Vec<Value> {
    let r = loan.apr / 100.0 / 12.0;
    let mut balance = loan.amount;
    (1..=rows)
        .map(|month| {
            let interest = cents(balance * r);
            let principal = if loan.apr == 0.0 {
                cents(loan.amount / f64::from(loan.term_months))
            } else {
                cents(loan.monthly_payment - interest)
            };
            balance = cents(balance - principal);
            json!({
                "month": month,
                "interest_paid": interest,
                "principal_paid": principal,
                "remaining_balance": balance,
            })
        })
        .collect()
}
