//! Purpose: Typed decoding of loosely-typed WebSocket response payloads.
//! Exports: `api` (stable surface), `core` (classifier, decode engine, errors), `json`, `notice`.
//! Role: Library backing the `hadata` CLI and application-side entity decoding.
//! Invariants: Decoding is pure; no I/O, no shared mutable state.
//! Invariants: Byte parsing lives only in `json`; `core` consumes already-parsed trees.
pub mod api;
pub mod core;
pub mod json;
pub mod notice;
