use crate::error::{DeployError, Result};
use serde::Serialize;

// ---------------------------------------------------------------------------
// ModelRecipe
// ---------------------------------------------------------------------------

/// One deployable model configuration: which serving engines, instance
/// types, services, and API frameworks it supports. The catalog is static;
/// recipes are data, not behavior.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRecipe {
    pub model_id: &'static str,
    pub description: &'static str,
    pub engines: &'static [&'static str],
    pub instance_types: &'static [&'static str],
    pub services: &'static [&'static str],
    pub frameworks: &'static [&'static str],
    /// Whether the model artifact must be staged into object storage before
    /// the serving stack can start.
    pub needs_artifact: bool,
}

impl ModelRecipe {
    pub fn supports_instance(&self, instance_type: &str) -> bool {
        self.instance_types.contains(&instance_type)
    }

    pub fn supports_service(&self, service: &str) -> bool {
        self.services.contains(&service)
    }
}

// ---------------------------------------------------------------------------
// Builtin catalog
// ---------------------------------------------------------------------------

const CATALOG: &[ModelRecipe] = &[
    ModelRecipe {
        model_id: "model-in-docker",
        description: "Custom model running in a Docker container",
        engines: &["custom"],
        instance_types: &["g5.4xlarge", "local"],
        services: &["cluster", "endpoint", "endpoint-async", "local"],
        frameworks: &["custom"],
        needs_artifact: false,
    },
    ModelRecipe {
        model_id: "qwen2.5-7b-instruct",
        description: "Qwen 2.5 7B instruction-tuned chat model",
        engines: &["vllm"],
        instance_types: &["g5.2xlarge", "g5.4xlarge", "g6e.2xlarge"],
        services: &["cluster", "endpoint"],
        frameworks: &["openai-compatible"],
        needs_artifact: true,
    },
    ModelRecipe {
        model_id: "bge-m3",
        description: "BGE-M3 multilingual embedding model",
        engines: &["vllm", "custom"],
        instance_types: &["g5.xlarge", "g5.2xlarge", "local"],
        services: &["cluster", "endpoint", "local"],
        frameworks: &["openai-compatible"],
        needs_artifact: true,
    },
    ModelRecipe {
        model_id: "whisper-large-v3",
        description: "Whisper large v3 speech-to-text model",
        engines: &["custom"],
        instance_types: &["g5.2xlarge", "g5.4xlarge"],
        services: &["cluster", "endpoint-async"],
        frameworks: &["custom"],
        needs_artifact: true,
    },
];

pub fn recipes() -> &'static [ModelRecipe] {
    CATALOG
}

pub fn find(model_id: &str) -> Result<&'static ModelRecipe> {
    CATALOG
        .iter()
        .find(|r| r.model_id == model_id)
        .ok_or_else(|| DeployError::ModelNotFound(model_id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
