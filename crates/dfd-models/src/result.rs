//! Per-video result record produced by the predictor.
//!
//! The record is columnar: each field of an analyzed video lives in its own
//! list under `video`, and row `i` of every list belongs to the same video.
//! This is the shape the prediction service accumulates and returns, so it
//! round-trips through JSON unchanged.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error returned when the result columns do not line up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultShapeError {
    #[error("result column `{column}` has {found} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Result accumulator keyed per analyzed video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultRecord {
    #[serde(default)]
    pub video: VideoColumns,
}

/// The five parallel columns of a result record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoColumns {
    /// Video file names
    #[serde(default)]
    pub name: Vec<String>,
    /// Confidence scores
    #[serde(default)]
    pub pred: Vec<f64>,
    /// Class the video was submitted under
    #[serde(default, deserialize_with = "lenient_strings")]
    #[schemars(with = "Vec<String>")]
    pub klass: Vec<String>,
    /// Predicted labels ("REAL" / "FAKE")
    #[serde(default)]
    pub pred_label: Vec<String>,
    /// Ground-truth labels (a placeholder for ad-hoc analyses)
    #[serde(default, deserialize_with = "lenient_strings")]
    #[schemars(with = "Vec<String>")]
    pub correct_label: Vec<String>,
}

/// One row of a result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoEntry {
    pub name: String,
    pub pred: f64,
    pub klass: String,
    pub pred_label: String,
    pub correct_label: String,
}

impl ResultRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one analyzed video to every column.
    pub fn store(&mut self, entry: VideoEntry) {
        let columns = &mut self.video;
        columns.name.push(entry.name);
        columns.pred.push(entry.pred);
        columns.klass.push(entry.klass);
        columns.pred_label.push(entry.pred_label);
        columns.correct_label.push(entry.correct_label);
    }

    /// Number of analyzed videos, as given by the `name` column.
    pub fn len(&self) -> usize {
        self.video.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video.name.is_empty()
    }

    /// Check that every column has one entry per name.
    pub fn validate(&self) -> Result<(), ResultShapeError> {
        let expected = self.len();
        let columns = [
            ("pred", self.video.pred.len()),
            ("klass", self.video.klass.len()),
            ("pred_label", self.video.pred_label.len()),
            ("correct_label", self.video.correct_label.len()),
        ];

        for (column, found) in columns {
            if found != expected {
                return Err(ResultShapeError::ColumnLength {
                    column,
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Rows in `name` order.
    pub fn entries(&self) -> Result<Vec<VideoEntry>, ResultShapeError> {
        self.validate()?;

        let columns = &self.video;
        Ok((0..self.len())
            .map(|i| VideoEntry {
                name: columns.name[i].clone(),
                pred: columns.pred[i],
                klass: columns.klass[i].clone(),
                pred_label: columns.pred_label[i].clone(),
                correct_label: columns.correct_label[i].clone(),
            })
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

/// The predictor stores the ground-truth label as an integer; accept both.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<StringOrNumber>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| match value {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, pred: f64, label: &str) -> VideoEntry {
        VideoEntry {
            name: name.to_string(),
            pred,
            klass: "uncategorized".to_string(),
            pred_label: label.to_string(),
            correct_label: "0".to_string(),
        }
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = ResultRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
        assert!(record.entries().unwrap().is_empty());
    }

    #[test]
    fn test_store_keeps_insertion_order() {
        let mut record = ResultRecord::new();
        record.store(entry("b.mp4", 0.7, "FAKE"));
        record.store(entry("a.mp4", 0.9, "REAL"));

        let entries = record.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "b.mp4");
        assert_eq!(entries[1].name, "a.mp4");
        assert_eq!(entries[1].pred_label, "REAL");
    }

    #[test]
    fn test_mismatched_columns_are_rejected() {
        let mut record = ResultRecord::new();
        record.store(entry("a.mp4", 0.9, "REAL"));
        record.video.pred_label.clear();

        assert_eq!(
            record.entries(),
            Err(ResultShapeError::ColumnLength {
                column: "pred_label",
                expected: 1,
                found: 0,
            })
        );
    }

    #[test]
    fn test_deserialize_predictor_payload() {
        let json = r#"{
            "video": {
                "name": ["clip.mp4"],
                "pred": [0.93],
                "klass": ["uncategorized"],
                "pred_label": ["FAKE"],
                "correct_label": [0]
            }
        }"#;

        let record: ResultRecord = serde_json::from_str(json).unwrap();
        let entries = record.entries().unwrap();
        assert_eq!(entries[0].correct_label, "0");
        assert!((entries[0].pred - 0.93).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_video_table_deserializes_empty() {
        let record: ResultRecord = serde_json::from_str("{}").unwrap();
        assert!(record.is_empty());
    }
}
