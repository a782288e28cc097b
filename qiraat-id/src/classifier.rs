//! Audio classifiers behind the predict endpoint
//!
//! [`MockClassifier`] stands in for real inference: it returns one of a
//! fixed set of readings chosen uniformly at random and ignores the audio.
//! A model-backed classifier plugs in by implementing [`Classifier`].

use axum::body::Bytes;
use qiraat_common::Prediction;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Fixed readings returned by the mock classifier
pub const MOCK_READINGS: [(&str, f64); 3] = [
    ("Imam Nafi’", 0.87),
    ("Imam Ibn Kathir", 0.81),
    ("Imam Abu ‘Amr", 0.78),
];

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier has no labels configured")]
    NoLabels,
}

/// Audio part received by the predict endpoint
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Maps one uploaded clip to a reading label and confidence
pub trait Classifier: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn classify(&self, audio: &AudioUpload) -> Result<Prediction, ClassifierError>;
}

/// Placeholder classifier returning a random fixed reading
#[derive(Debug, Clone)]
pub struct MockClassifier {
    choices: Vec<Prediction>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::with_choices(
            MOCK_READINGS
                .iter()
                .map(|(label, confidence)| Prediction::new(*label, *confidence))
                .collect(),
        )
    }

    pub fn with_choices(choices: Vec<Prediction>) -> Self {
        Self { choices }
    }

    pub fn choices(&self) -> &[Prediction] {
        &self.choices
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn classify(&self, _audio: &AudioUpload) -> Result<Prediction, ClassifierError> {
        self.choices
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ClassifierError::NoLabels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn upload() -> AudioUpload {
        AudioUpload {
            file_name: Some("clip.wav".to_string()),
            content_type: Some("audio/wav".to_string()),
            bytes: Bytes::from_static(b"RIFF"),
        }
    }

    #[test]
    fn test_mock_returns_fixed_reading() {
        let classifier = MockClassifier::new();
        for _ in 0..20 {
            let prediction = classifier.classify(&upload()).unwrap();
            assert!(classifier.choices().contains(&prediction));
        }
    }

    #[test]
    fn test_mock_eventually_covers_all_readings() {
        let classifier = MockClassifier::new();
        let mut seen = HashSet::new();
        // 1 - (2/3)^300 chance of covering each label
        for _ in 0..300 {
            seen.insert(classifier.classify(&upload()).unwrap().label);
        }
        assert_eq!(seen.len(), MOCK_READINGS.len());
    }

    #[test]
    fn test_mock_confidences_in_range() {
        for prediction in MockClassifier::new().choices() {
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
    }

    #[test]
    fn test_empty_classifier_errors() {
        let classifier = MockClassifier::with_choices(Vec::new());
        assert!(matches!(
            classifier.classify(&upload()),
            Err(ClassifierError::NoLabels)
        ));
    }
}
