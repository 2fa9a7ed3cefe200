//! NEAR chain access for the Conjurer services.
//!
//! A deliberately thin client: one RPC endpoint, one attempt per call. The
//! gateway and the desktop CLI share the same view-call and signed-call
//! plumbing through this crate.

mod error;
pub mod keys;
pub mod rpc;

pub use error::Error;
pub use rpc::RpcClient;
