//! # boot-inventory
//!
//! Static inventory of the beans in a Spring Boot source tree.
//!
//! ## Architecture
//!
//! - **syntax**: Java source to an owned declaration model (tree-sitter)
//! - **classify**: stereotype precedence, scope/route/dependency extraction
//! - **model**: role-indexed project model handed to the renderers
//! - **walker**: source root discovery and the parallel parse/classify pipeline
//! - **report**: HTML, JSON and text rendering
//! - **server**: `/analyze` HTTP endpoint
//! - **cli**, **config**, **logging**, **error**: command surface and ambient plumbing

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod server;
pub mod syntax;
pub mod walker;
