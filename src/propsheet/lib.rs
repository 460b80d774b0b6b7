//! # Propsheet Architecture
//!
//! Propsheet puts a markdown document's frontmatter properties into its printed
//! and exported output, as a small table at the top of the page. It is a library
//! around a modelled host application (a vault of markdown documents with live
//! preview views, a command table, and a print pipeline) plus a thin CLI.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - Parses arguments, prints messages, writes pages          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) and commands (commands/*.rs)                  │
//! │  - Dispatch, settings persistence, structured results       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Trigger Coordinator (trigger.rs)                           │
//! │  - Render hook, command middleware, print lifecycle         │
//! │  - Session: settings, current document, file backups        │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                             │
//!                 ▼                             ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Injection (inject.rs)        │ │  Patch fallback (patch.rs)│
//! │  DOM insert/remove            │ │  text splice/restore      │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                 │                             │
//!                 ▼                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Rendering (render.rs) and value formatting (format/)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Underneath sits the [`host`] model: document [`store`], [`metadata`] cache,
//! markdown renderer, workspace, command registry and print lifecycle.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns `Result`s. It never
//! writes to stdout or stderr; diagnostics go through the `log` facade and the
//! binary decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Logic behind each CLI command
//! - [`trigger`]: When the block goes in and comes out
//! - [`inject`]: Placing the block into a rendered view and removing it
//! - [`patch`]: Splicing the block into document text and restoring it
//! - [`render`]: Building the block from a property map
//! - [`format`]: Turning property values into safe display text
//! - [`metadata`]: Frontmatter parsing
//! - [`host`]: The modelled host application
//! - [`store`]: Document storage abstraction and implementations
//! - [`settings`]: User settings
//! - [`model`]: Shared types
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod error;
pub mod format;
pub mod host;
pub mod inject;
pub mod metadata;
pub mod model;
pub mod patch;
pub mod render;
pub mod settings;
pub mod store;
pub mod trigger;
