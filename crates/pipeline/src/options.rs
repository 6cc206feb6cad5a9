//! Checkpoint and sampler catalogs for the text-to-image form.

use serde::Serialize;
use studio_remote::sdjob::{CheckpointOption, SdJobApi};

/// Both catalogs, each loaded independently. A failed list is empty and
/// its error is recorded in `errors`.
#[derive(Debug, Default, Serialize)]
pub struct Text2ImgOptions {
    pub checkpoints: Vec<CheckpointOption>,
    pub samplers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

pub async fn load_text2img_options(api: &SdJobApi) -> Text2ImgOptions {
    let (checkpoints, samplers) = tokio::join!(api.list_checkpoints(), api.list_samplers());
    let mut options = Text2ImgOptions::default();

    match checkpoints {
        Ok(list) => options.checkpoints = list,
        Err(e) => {
            tracing::warn!(api_url = api.api_url(), error = %e, "Failed to load checkpoint list");
            options.errors.push(format!("checkpoints: {e}"));
        }
    }

    match samplers {
        Ok(list) => options.samplers = list,
        Err(e) => {
            tracing::warn!(api_url = api.api_url(), error = %e, "Failed to load sampler list");
            options.errors.push(format!("samplers: {e}"));
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_service_yields_empty_lists_with_errors() {
        // Nothing listens on the discard port.
        let api = SdJobApi::new("http://127.0.0.1:9");

        let options = load_text2img_options(&api).await;

        assert!(options.checkpoints.is_empty());
        assert!(options.samplers.is_empty());
        assert_eq!(options.errors.len(), 2);
        assert!(options.errors[0].starts_with("checkpoints:"));
        assert!(options.errors[1].starts_with("samplers:"));
    }
}
