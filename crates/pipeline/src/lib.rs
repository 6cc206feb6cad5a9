//! End-to-end job orchestration on top of the remote clients.
//!
//! One job runs as a single logical flow: validate, submit, poll, collect.
//! The HTTP layer calls into this crate and never talks to a backend
//! directly.

pub mod error;
pub mod gallery;
pub mod options;
pub mod runner;

pub use error::{ErrorKind, JobError};
pub use gallery::{load_gallery, Gallery};
pub use options::{load_text2img_options, Text2ImgOptions};
pub use runner::{run_job, JobReport};
