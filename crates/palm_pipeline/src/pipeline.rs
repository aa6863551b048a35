//! End-to-end palm reading

use crate::classify::{LineClassifier, RankClassifier};
use crate::error::Result;
use crate::extract::extract;
use crate::narrative::narrate;
use crate::preprocess::preprocess;
use crate::types::{FortuneResult, LineFeatures};
use image::{GrayImage, RgbImage};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Runs preprocessing, extraction, measurement and narration in order
pub struct PalmReader {
    classifier: Box<dyn LineClassifier>,
}

impl PalmReader {
    /// Create a reader using rank-based role assignment
    pub fn new() -> Self {
        Self::with_classifier(RankClassifier)
    }

    /// Create a reader with a custom role assignment strategy
    pub fn with_classifier<C>(classifier: C) -> Self
    where
        C: LineClassifier + 'static,
    {
        Self {
            classifier: Box::new(classifier),
        }
    }

    /// Analyze a palm photograph
    ///
    /// Only an empty image is an error; a photograph without visible
    /// lines yields the fallback narrative.
    pub fn analyze(&self, image: &RgbImage) -> Result<FortuneResult> {
        let mask = preprocess(image)?;
        Ok(self.read_mask(&mask))
    }

    /// Run the stages after preprocessing on a binary ridge mask
    pub fn read_mask(&self, mask: &GrayImage) -> FortuneResult {
        let extraction = extract(mask, self.classifier.as_ref());

        let features: BTreeMap<_, _> = extraction
            .lines
            .iter()
            .map(|(role, line)| (*role, LineFeatures::measure(line)))
            .collect();
        for (role, f) in &features {
            debug!(%role, length = f.length, curvature = f.curvature, "measured line");
        }

        let narrative = narrate(&features);
        info!(lines = features.len(), "palm reading complete");

        FortuneResult {
            narrative,
            visualization: extraction.visualization,
            lines: extraction.lines,
            features,
        }
    }
}

impl Default for PalmReader {
    fn default() -> Self {
        Self::new()
    }
}
