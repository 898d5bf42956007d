//! MCP (Model Context Protocol) Server Module
//!
//! Exposes the dialog session to coding agents over JSON-RPC on stdio.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Coding Agent                          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ MCP Protocol (JSON-RPC over stdio)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MCP Server (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Tools:                                                      │
//! │  ├── ask     - confirm / pick / text / form dialog           │
//! │  ├── notify  - non-blocking notification                     │
//! │  └── tweak   - sliders bound to numeric literals in files    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              DialogSession + presentation helper             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! CONSULT_DIALOG_BIN=/path/to/consult-dialog ./target/debug/consult_mcp
//! ```

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use handlers::ToolHandlers;
pub use server::{McpServer, ProgressNotifier};
