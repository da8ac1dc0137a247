//! Platform runners
//!
//! Both runners own a `Session` and a `TickDriver` and differ only in where
//! time and keys come from:
//! - `native`: a clock thread and input threads feeding one command mailbox
//! - `web`: `requestAnimationFrame` timestamps and DOM key events via wasm-bindgen

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub mod web;
