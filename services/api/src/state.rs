//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared
//! resources: the user store, course catalog, portal sessions and the tutor.

use crate::{courses::CourseCatalog, sessions::SessionRegistry, users::UserStore};
use edtech_core::tutor::Tutor;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub courses: Arc<CourseCatalog>,
    pub sessions: Arc<SessionRegistry>,
    pub tutor: Arc<Tutor>,
}
