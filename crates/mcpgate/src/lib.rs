//! Top-level facade crate for mcpgate.
//!
//! Re-exports core types and the gateway library so services can depend on a single crate.

pub mod core {
    pub use mcpgate_core::*;
}

pub mod gateway {
    pub use mcpgate_gateway::*;
}
