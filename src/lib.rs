//! Portward starts local HTTP reverse proxies to Cloudflare Access
//! applications.
//!
//! Each configured endpoint gets its own listener on a local port.
//! Inbound requests are rewritten to the `https` target host, a
//! `cf-access-token` header (resolved via the `cloudflared` CLI) is
//! injected, and the request is forwarded as-is. All proxies run
//! concurrently and shut down together on Ctrl+C / SIGTERM.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution.
//! - [`config`] -- Config file loading and the endpoint-string grammar
//!   (`[LOCAL_PORT:]HOSTNAME[:DEST_PORT]`).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty output.
//! - [`proxy`] -- The core: request rewriting, per-endpoint listeners
//!   with port-conflict retry, and the orchestrator that runs them all.
//! - [`token`] -- Access-token acquisition through the `cloudflared`
//!   binary, behind the [`TokenProvider`](token::TokenProvider) seam.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod token;
