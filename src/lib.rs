//! Boardgate Rust library.
//!
//! The rule engine lives in [`workflows`]; everything else is the shell a
//! board needs around it.

pub mod board;
pub mod cli;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod issue_files;
pub mod models;
pub mod verdict_display;
pub mod workflow_editor;
pub mod workflows;

#[cfg(test)]
mod property_tests;
