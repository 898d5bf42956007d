//! Consult - blocking human-in-the-loop dialogs for autonomous agents.
//!
//! An agent calls `ask` (confirm / pick / text / form) or `tweak` through the
//! MCP server; the request is validated, rendered by an external presentation
//! helper, and the helper's verbose JSON result is reduced to a compact object
//! or a single natural-language sentence.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   JSON-RPC over stdio   ┌──────────────────────────────┐
//! │    Agent     │ ──────────────────────▶ │ mcp::McpServer               │
//! └──────────────┘                         │   └── mcp::ToolHandlers      │
//!                                          └──────────────┬───────────────┘
//!                                                         ▼
//!                                          ┌──────────────────────────────┐
//!                                          │ dialog::DialogSession        │
//!                                          │   single flight + timeout    │
//!                                          │   + heartbeat                │
//!                                          └──────────────┬───────────────┘
//!                                                         ▼
//!                   ┌────────────────────┐   ┌──────────────────────────────┐
//!                   │ compact → humanize │ ◀ │ dialog::DialogProvider       │
//!                   └────────────────────┘   │   (ProcessProvider per OS)   │
//!                                            └──────────────────────────────┘
//! ```
//!
//! The `tweak` module is independent of the dialog flow: it maps a CSS
//! selector/property or a `{v}` search pattern to the exact location of a
//! numeric literal in a source file.

pub mod config;
pub mod dialog;
pub mod error;
pub mod mcp;
pub mod tweak;

pub use config::{ServerConfig, Settings};
pub use error::{AskError, ProviderError, ResolveError, ValidationError};
