//! Turn JSON samples and an endpoint manifest into Rust request bodies,
//! response models, domain entities, mappers between them and unit tests.
//!
//! The pipeline per endpoint is `sample` → [`lower`] (type inference and
//! naming) → [`codegen`]; [`generate`] runs it for every endpoint and writes
//! the results through [`output`].
pub mod case;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod inference;
pub mod ir;
pub mod logging;
pub mod lower;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod path_de;
pub mod sample;

pub use error::{GenError, Result};
