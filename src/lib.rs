//! Address and ABI of the Fund Me contract, per deployment network.
//!
//! [`contract::fund_me`] is the active deployment backed by the embedded
//! ABI. The registry, codec and MCP server build on it for clients that
//! encode calls and decode results against the contract.

pub mod config;
pub mod contract;
pub mod server;
