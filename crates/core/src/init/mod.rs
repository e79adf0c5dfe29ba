//! Scaffolding for new projects.
//!
//! `generate_clipflow_structure` writes `.clipflow/config.toml` plus sample
//! items and processes taken from templates embedded at build time. The
//! result loads with [`crate::config::load_config`] and imports as-is.
//!
//! ```no_run
//! use cf_core::init::{generate_clipflow_structure, InitOptions};
//!
//! # async fn scaffold() -> cf_core::init::InitResult<()> {
//! let written = generate_clipflow_structure(InitOptions {
//!     minimal: true,
//!     ..InitOptions::default()
//! })
//! .await?;
//! assert_eq!(written.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_clipflow_structure, InitOptions};
pub use templates::{get_template, list_templates};
