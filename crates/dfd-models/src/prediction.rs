//! Prediction outcome and verdict types.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::ResultRecord;

/// Error returned for a class index the model does not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown class index {0}, expected 0 (fake) or 1 (real)")]
pub struct VerdictError(pub u32);

/// Real-or-fake classification of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    /// Map the model's class index to a verdict.
    ///
    /// The model emits class 0 for manipulated footage and class 1 for
    /// genuine footage.
    pub fn from_class_index(index: u32) -> Result<Self, VerdictError> {
        match index {
            0 => Ok(Verdict::Fake),
            1 => Ok(Verdict::Real),
            other => Err(VerdictError(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Predicted class index and its confidence, serialized as `[label, confidence]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictedClass(pub u32, pub f64);

impl PredictedClass {
    pub fn label(&self) -> u32 {
        self.0
    }

    pub fn confidence(&self) -> f64 {
        self.1
    }

    pub fn verdict(&self) -> Result<Verdict, VerdictError> {
        Verdict::from_class_index(self.0)
    }
}

/// Everything the predictor returns for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionOutcome {
    /// Result record with the analyzed video appended
    pub result: ResultRecord,
    /// Accuracy against the submitted ground-truth label
    #[serde(default)]
    pub accuracy: f64,
    /// Number of videos the predictor counted
    #[serde(default)]
    pub count: u32,
    /// Predicted class for the analyzed video
    pub pred: PredictedClass,
}

impl PredictionOutcome {
    pub fn verdict(&self) -> Result<Verdict, VerdictError> {
        self.pred.verdict()
    }

    pub fn confidence(&self) -> f64 {
        self.pred.confidence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_class_index() {
        assert_eq!(Verdict::from_class_index(0), Ok(Verdict::Fake));
        assert_eq!(Verdict::from_class_index(1), Ok(Verdict::Real));
        assert_eq!(Verdict::from_class_index(2), Err(VerdictError(2)));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Real.to_string(), "REAL");
        assert_eq!(Verdict::Fake.to_string(), "FAKE");
        assert_eq!(serde_json::to_string(&Verdict::Fake).unwrap(), "\"FAKE\"");
    }

    #[test]
    fn test_outcome_deserializes_tuple_prediction() {
        let json = r#"{
            "result": {"video": {"name": [], "pred": [], "klass": [], "pred_label": [], "correct_label": []}},
            "accuracy": 1.0,
            "count": 1,
            "pred": [1, 0.87]
        }"#;

        let outcome: PredictionOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.pred.label(), 1);
        assert_eq!(outcome.verdict(), Ok(Verdict::Real));
        assert!((outcome.confidence() - 0.87).abs() < f64::EPSILON);
    }
}
