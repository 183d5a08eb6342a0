//! Plain text rendering.

use dfd_models::{format_score, ResultRecord, ResultShapeError, VideoEntry};

/// The five labelled lines describing one analyzed video.
pub fn entry_lines(entry: &VideoEntry) -> [String; 5] {
    [
        format!("Video: {}", entry.name),
        format!("Prediction: {}", entry.pred_label),
        format!("Confidence Score: {}", format_score(entry.pred)),
        format!("Class: {}", entry.klass),
        format!("Correct Label: {}", entry.correct_label),
    ]
}

/// One line set per analyzed video, in `name` order.
pub fn render_text(result: &ResultRecord) -> Result<Vec<String>, ResultShapeError> {
    Ok(result
        .entries()?
        .iter()
        .flat_map(entry_lines)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(names: &[&str]) -> ResultRecord {
        let mut record = ResultRecord::new();
        for (i, name) in names.iter().enumerate() {
            record.store(VideoEntry {
                name: name.to_string(),
                pred: 0.5 + i as f64 / 10.0,
                klass: "uncategorized".to_string(),
                pred_label: if i % 2 == 0 { "FAKE" } else { "REAL" }.to_string(),
                correct_label: "0".to_string(),
            });
        }
        record
    }

    #[test]
    fn test_one_line_set_per_entry_in_order() {
        let lines = render_text(&record(&["first.mp4", "second.mp4"])).unwrap();

        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Video: first.mp4");
        assert_eq!(lines[1], "Prediction: FAKE");
        assert_eq!(lines[2], "Confidence Score: 0.5");
        assert_eq!(lines[3], "Class: uncategorized");
        assert_eq!(lines[4], "Correct Label: 0");
        assert_eq!(lines[5], "Video: second.mp4");
        assert_eq!(lines[6], "Prediction: REAL");
    }

    #[test]
    fn test_whole_confidence_keeps_decimal_point() {
        let mut result = ResultRecord::new();
        result.store(VideoEntry {
            name: "sure.mp4".to_string(),
            pred: 1.0,
            klass: "uncategorized".to_string(),
            pred_label: "REAL".to_string(),
            correct_label: "0".to_string(),
        });

        assert_eq!(render_text(&result).unwrap()[2], "Confidence Score: 1.0");
    }

    #[test]
    fn test_empty_result_renders_nothing() {
        assert!(render_text(&ResultRecord::new()).unwrap().is_empty());
    }
}
