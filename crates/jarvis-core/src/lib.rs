//! # JARVIS Core
//!
//! Gateway logic for the JARVIS edge proxy: a stateless HTTP handler that
//! fronts a hosted language-model inference API.
//!
//! ```text
//! jarvis-core/src/
//! ├── gate.rs        # Origin gate middleware (allow-list, CORS echo)
//! ├── handlers/      # Route handlers (banner, health, debug, test, query)
//! ├── upstream/      # Inference client + response-shape extraction
//! ├── server.rs      # Router assembly, AppState
//! ├── config.rs      # Immutable startup configuration
//! └── error.rs       # GatewayError
//! ```
//!
//! Control flow per request: origin gate (may short-circuit with 403 or
//! answer a preflight) → route dispatch → for `/api/query`, one upstream
//! call → JSON envelope → CORS header attached by the gate.

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod server;
pub mod upstream;

// Re-export commonly used types
pub use config::{GatePolicy, GatewayConfig, UpstreamApi, UpstreamConfig};
pub use error::{GatewayError, GatewayResult};
pub use server::{build_gateway_router, AppState};
