use thiserror::Error;

/// Failure taxonomy of a pipeline run.
///
/// Row drops during cleaning are never reported through this type; only
/// environment, connectivity and schema problems are.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("failed to extract {source_name}: {message}")]
    Extraction { source_name: String, message: String },

    #[error("transformation failed in {stage}: {message}")]
    Transformation { stage: String, message: String },

    #[error("failed to load {target}: {message}")]
    Load { target: String, message: String },
}

impl EtlError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn extraction(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Extraction {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn transformation(stage: impl Into<String>, message: impl ToString) -> Self {
        Self::Transformation {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    pub fn load(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Load {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Short name of the failing phase, used in logs and the CLI summary.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Extraction { .. } => "extract",
            Self::Transformation { .. } => "transform",
            Self::Load { .. } => "load",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
