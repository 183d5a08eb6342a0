//! Structured analysis logging.
//!
//! Gives every log line of one analysis the same `analysis_id` and
//! `source` fields.

use tracing::{error, info, warn, Span};

use dfd_models::{AnalysisId, VideoSource};

/// Logger for the lifecycle of one analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: String,
    source: String,
}

impl AnalysisLogger {
    /// Create a logger for an analysis of a video from `source`.
    pub fn new(analysis_id: &AnalysisId, source: &VideoSource) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            source: source.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            source = %self.source,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            source = %self.source,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            analysis_id = %self.analysis_id,
            source = %self.source,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            source = %self.source,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            source = %self.source,
            "Analysis completed: {}", message
        );
    }

    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Span carrying the analysis context, for instrumenting futures.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            source = %self.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_logger_context() {
        let id = AnalysisId::new();
        let source = VideoSource::Upload {
            file_name: "clip.mp4".to_string(),
        };
        let logger = AnalysisLogger::new(&id, &source);

        assert_eq!(logger.analysis_id(), id.to_string());
        assert_eq!(logger.source(), "upload:clip.mp4");
    }
}
