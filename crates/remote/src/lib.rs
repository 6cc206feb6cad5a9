//! HTTP clients for the remote generation services.
//!
//! Two backends are supported: the text-to-image job service and the
//! virtual try-on service. Both implement [`backend::JobBackend`], which
//! is all the [`poll`] loop and the orchestration layer need to know.
//! Result downloads go through [`collector`].

pub mod api;
pub mod backend;
pub mod collector;
pub mod credential;
pub mod poll;
pub mod schema;
pub mod sdjob;
pub mod tryon;
