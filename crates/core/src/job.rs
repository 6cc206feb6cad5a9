//! Job request models, parameter bounds, and validation.
//!
//! A request is built from user input, validated here before any network
//! call is made, and dropped as soon as the remote service has issued a
//! [`JobHandle`](crate::status::JobHandle) for it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Text-to-image parameter bounds
// ---------------------------------------------------------------------------

/// Lowest accepted CLIP skip layer count.
pub const MIN_CLIP_SKIP: u32 = 1;
/// Highest accepted CLIP skip layer count.
pub const MAX_CLIP_SKIP: u32 = 12;
/// CLIP skip used when the form omits it.
pub const DEFAULT_CLIP_SKIP: u32 = 2;

/// Lowest number of images per job.
pub const MIN_IMG_COUNT: u32 = 1;
/// Highest number of images per job.
pub const MAX_IMG_COUNT: u32 = 4;
/// Image count used when the form omits it.
pub const DEFAULT_IMG_COUNT: u32 = 1;

/// Width and height used when the form omits them.
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Lowest accepted sampler step count.
pub const MIN_STEPS: u32 = 1;
/// Highest accepted sampler step count.
pub const MAX_STEPS: u32 = 60;
/// Step count used when the form omits it.
pub const DEFAULT_STEPS: u32 = 20;

/// Lowest accepted guidance (CFG) scale.
pub const MIN_CFG_SCALE: f64 = 0.0;
/// Highest accepted guidance (CFG) scale.
pub const MAX_CFG_SCALE: f64 = 30.0;
/// Guidance scale used when the form omits it.
pub const DEFAULT_CFG_SCALE: f64 = 7.0;

/// Lowest accepted seed. `-1` asks the service to pick a random seed.
pub const MIN_SEED: i64 = -1;
/// Seed used when the form omits it.
pub const DEFAULT_SEED: i64 = -1;

/// Prompt used when the form omits it.
pub const DEFAULT_PROMPT: &str = "An astronaut riding a rainbow unicorn, cinematic, dramatic";
/// Negative prompt used when the form omits it.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "the absolute worst quality, distorted features";

// ---------------------------------------------------------------------------
// Try-on defaults
// ---------------------------------------------------------------------------

/// The only try-on model offered by the service.
pub const DEFAULT_TRYON_MODEL: &str = "kolors-virtual-try-on-v1";

// ---------------------------------------------------------------------------
// Validation seam
// ---------------------------------------------------------------------------

/// A request that can check itself before anything is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Text-to-image request
// ---------------------------------------------------------------------------

/// Parameters for one text-to-image job, as submitted by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text2ImgRequest {
    /// Model version id of the base checkpoint.
    pub checkpoint_id: String,
    #[serde(default = "default_clip_skip")]
    pub clip_skip: u32,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default = "default_img_count")]
    pub img_count: u32,
    /// Sampler name, one of the values offered by the sampler catalog.
    pub scheduler: String,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: f64,
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,
}

fn default_clip_skip() -> u32 {
    DEFAULT_CLIP_SKIP
}

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_img_count() -> u32 {
    DEFAULT_IMG_COUNT
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

fn default_cfg_scale() -> f64 {
    DEFAULT_CFG_SCALE
}

fn default_seed() -> i64 {
    DEFAULT_SEED
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_negative_prompt() -> String {
    DEFAULT_NEGATIVE_PROMPT.to_string()
}

impl Text2ImgRequest {
    /// Build a request for the given checkpoint and sampler with every other
    /// parameter at its form default.
    pub fn new(checkpoint_id: impl Into<String>, scheduler: impl Into<String>) -> Self {
        Self {
            checkpoint_id: checkpoint_id.into(),
            clip_skip: DEFAULT_CLIP_SKIP,
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            img_count: DEFAULT_IMG_COUNT,
            scheduler: scheduler.into(),
            steps: DEFAULT_STEPS,
            cfg_scale: DEFAULT_CFG_SCALE,
            seed: DEFAULT_SEED,
            prompt: DEFAULT_PROMPT.to_string(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
        }
    }
}

impl Validate for Text2ImgRequest {
    /// Check every parameter against its bounds.
    ///
    /// A seed of zero is rejected outright; the service treats it as invalid.
    fn validate(&self) -> Result<(), CoreError> {
        require_non_empty("checkpoint_id", &self.checkpoint_id)?;
        require_non_empty("scheduler", &self.scheduler)?;
        validate_range("clip_skip", self.clip_skip, MIN_CLIP_SKIP, MAX_CLIP_SKIP)?;
        validate_range("img_count", self.img_count, MIN_IMG_COUNT, MAX_IMG_COUNT)?;
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        validate_range("steps", self.steps, MIN_STEPS, MAX_STEPS)?;
        validate_cfg_scale(self.cfg_scale)?;
        validate_seed(self.seed)
    }
}

// ---------------------------------------------------------------------------
// Try-on request
// ---------------------------------------------------------------------------

/// Parameters for one virtual try-on job: a person photo and a garment photo.
#[derive(Clone, PartialEq)]
pub struct TryOnRequest {
    pub model_name: String,
    pub human_image: Vec<u8>,
    pub cloth_image: Vec<u8>,
}

impl TryOnRequest {
    pub fn new(human_image: Vec<u8>, cloth_image: Vec<u8>) -> Self {
        Self {
            model_name: DEFAULT_TRYON_MODEL.to_string(),
            human_image,
            cloth_image,
        }
    }
}

impl Validate for TryOnRequest {
    fn validate(&self) -> Result<(), CoreError> {
        require_non_empty("model_name", &self.model_name)?;
        if self.human_image.is_empty() {
            return Err(CoreError::Validation(
                "human_image must not be empty".to_string(),
            ));
        }
        if self.cloth_image.is_empty() {
            return Err(CoreError::Validation(
                "cloth_image must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// Image payloads can be megabytes; print their sizes only.
impl std::fmt::Debug for TryOnRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryOnRequest")
            .field("model_name", &self.model_name)
            .field("human_image_bytes", &self.human_image.len())
            .field("cloth_image_bytes", &self.cloth_image.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Reject a zero seed; accept `-1` (random) and any positive value.
pub fn validate_seed(seed: i64) -> Result<(), CoreError> {
    if seed == 0 {
        return Err(CoreError::Validation(
            "seed must not be 0; use -1 for a random seed".to_string(),
        ));
    }
    if seed < MIN_SEED {
        return Err(CoreError::Validation(format!(
            "seed must be >= {MIN_SEED}, got {seed}"
        )));
    }
    Ok(())
}

/// Width and height must be strictly positive.
pub fn validate_dimension(field: &str, value: u32) -> Result<(), CoreError> {
    if value == 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// Guidance scale must lie in `[MIN_CFG_SCALE, MAX_CFG_SCALE]` and be finite.
pub fn validate_cfg_scale(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(MIN_CFG_SCALE..=MAX_CFG_SCALE).contains(&value) {
        return Err(CoreError::Validation(format!(
            "cfg_scale must be between {MIN_CFG_SCALE} and {MAX_CFG_SCALE}, got {value}"
        )));
    }
    Ok(())
}

fn validate_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
