//! Domain types and pure logic for the image job studio.
//!
//! Everything here is free of I/O: job request models and their
//! validation, job handles and status, result archives, and gallery
//! extraction. The HTTP clients live in `studio-remote`.

pub mod archive;
pub mod error;
pub mod gallery;
pub mod job;
pub mod session;
pub mod status;
