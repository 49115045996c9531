//! Nutri: fast-food nutrition data importer
//!
//! Reads chain, product and food group CSV files and upserts them into an
//! entity store of content nodes and taxonomy terms.

pub mod cli;
pub mod core;
pub mod entities;
