//! Purpose: Inbound JSON parsing boundary shared by the CLI and callers.
//! Exports: `parse` module with decode helpers and failure categorization.
//! Role: Single seam turning wire bytes into the generic `serde_json::Value` tree.
//! Invariants: The decode engine never parses bytes; it only sees trees produced here or by callers.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub mod parse;
