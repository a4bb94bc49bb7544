pub mod app;
pub mod config;
pub mod errors;
pub mod events;
pub mod form;
pub mod format;
pub mod handlers;
pub mod list;
pub mod models;
pub mod service;
pub mod state;
pub mod ui;
pub mod validate;

pub use app::router;
pub use config::Config;
pub use service::{HttpLoanService, LoanApi};
pub use state::AppState;
