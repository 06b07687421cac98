//! Shared test utilities for the switchyard workspace.
//!
//! This crate provides a temporary on-disk layout with a config home (user and
//! machine layer files) and a project tree (project layer file plus a nested
//! working directory). It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`] - [`TestWorkspace`] builder for layered-config scenarios

pub mod workspace;

pub use workspace::TestWorkspace;
