//! Sync a remote Cloudflare D1 database into the local development store.
//!
//! The heart of the crate is [`repair`], which rewrites a `wrangler d1 export`
//! dump so that a local import accepts it. [`sync`] drives the full
//! export, clean, repair, import and validate sequence around it.

pub mod cli;
pub mod config;
pub mod locale;
pub mod repair;
pub mod sync;
