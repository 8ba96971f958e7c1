//! EdTech API Library Crate
//!
//! This library contains all the logic for the EdTech web service: the
//! user store, course catalog, portal sessions, API handlers and routing.
//! The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod courses;
pub mod handlers;
pub mod models;
pub mod router;
pub mod sessions;
pub mod state;
pub mod users;
