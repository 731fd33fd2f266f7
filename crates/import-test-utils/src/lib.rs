//! Shared test utilities for the asset importer workspace.
//!
//! This crate is a dev-dependency only. It provides [`TestProject`], a
//! temporary project directory with helpers for laying out assets, their
//! `.meta` sidecars and settings files.

pub mod project;

pub use project::TestProject;
