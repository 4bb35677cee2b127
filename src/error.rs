use thiserror::Error;

use crate::channel::ChannelError;
use crate::kie::KieError;

/// Top-level error for a generation run.
///
/// Only total inability to proceed lives here: losing the notification
/// channel or ending dispatch with zero jobs. Failures local to one image,
/// one submission, one notification item or one poll cycle are isolated
/// and reported without aborting sibling work.
#[derive(Debug, Error)]
pub enum SketchrenderError {
    #[error("Config error: {0}")]
    Config(String),

    /// Fatal to the owning image only; sibling uploads proceed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Fatal to the run — without an inbox there is no notification path.
    #[error("Could not provision a notification inbox: {0}")]
    ChannelProvision(#[source] ChannelError),

    /// Fatal to the owning (provider, image) combination only.
    #[error("Submission failed for {label}: {source}")]
    Submission { label: String, source: KieError },

    /// Dispatch ended with an empty registry; there is nothing to poll.
    /// Carries the reason each combination failed so none is lost with
    /// the run.
    #[error("No generation job could be started{}", fmt_failures(.failures))]
    NoJobsStarted { failures: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn fmt_failures(failures: &[String]) -> String {
    if failures.is_empty() {
        String::new()
    } else {
        format!(": {}", failures.join("; "))
    }
}

/// Failure while preparing or storing one source image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("could not decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },

    #[error("could not encode {path}: {source}")]
    Encode {
        path: String,
        source: image::ImageError,
    },

    #[error("remote store rejected {filename}: {source}")]
    Store { filename: String, source: KieError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_jobs_started_display() {
        let err = SketchrenderError::NoJobsStarted { failures: vec![] };
        assert_eq!(err.to_string(), "No generation job could be started");
    }

    #[test]
    fn no_jobs_started_lists_every_failure() {
        let err = SketchrenderError::NoJobsStarted {
            failures: vec![
                "Submission failed for z-image: quota".into(),
                "could not read s.png: not found".into(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("z-image: quota"));
        assert!(text.contains("s.png: not found"));
    }

    #[test]
    fn submission_error_display_names_the_job() {
        let err = SketchrenderError::Submission {
            label: "z-image".into(),
            source: KieError::LogicalError {
                code: 402,
                message: "insufficient credits".into(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("z-image"));
        assert!(text.contains("402"));
    }

    #[test]
    fn upload_error_converts_into_run_error() {
        let err = UploadError::Store {
            filename: "sketch.jpg".into(),
            source: KieError::ApiError {
                status: 500,
                message: "boom".into(),
            },
        };
        let run_err: SketchrenderError = err.into();
        assert!(run_err.to_string().contains("sketch.jpg"));
    }
}
