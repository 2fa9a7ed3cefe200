//! # Conjurer Gateway
//!
//! A thin HTTP service that turns an uploaded image into a suggested
//! filename via one vision-model round trip, gated by an on-chain credit
//! ledger when a contract is configured.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin conjurer-gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check
//! - `POST /generate-filename` - Multipart image upload, returns a filename

pub mod config;
mod error;
mod handlers;
pub mod ledger;
mod response;
mod router;
mod state;
pub mod vision;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
