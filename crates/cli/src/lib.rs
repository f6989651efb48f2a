//! Command-line interface for revtag.
//!
//! Runs the HTTP service and exposes the prediction pipeline, analytics and
//! model checks for local use.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
