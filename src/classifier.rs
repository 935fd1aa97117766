//! Keyword classification and priority scoring.
//!
//! The `Classifier` trait is the seam for swapping in a trained model;
//! `KeywordClassifier` is the rule-driven default.

use crate::config::ClassificationConfig;
use crate::models::ClassificationResult;
use rand::Rng;

pub trait Classifier: Send + Sync {
    fn classify(&self, description: &str, declared_category: &str) -> ClassificationResult;
    fn name(&self) -> &str;
}

/// Source of the small random term added to every base score.
#[derive(Debug, Clone, Copy)]
pub enum Jitter {
    /// Uniform in `0..=max_jitter`.
    Random,
    /// Always this value (capped at `max_jitter`).
    Fixed(u8),
}

pub struct KeywordClassifier {
    config: ClassificationConfig,
    critical_keywords: Vec<String>,
    refinements: Vec<(String, Vec<String>)>,
    jitter: Jitter,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(ClassificationConfig::default())
    }
}

impl KeywordClassifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self::with_jitter(config, Jitter::Random)
    }

    pub fn with_jitter(config: ClassificationConfig, jitter: Jitter) -> Self {
        // Keywords are matched against lowercased text, so normalize once here
        let critical_keywords = config
            .critical_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        let refinements = config
            .refinements
            .iter()
            .map(|rule| {
                (
                    rule.category.clone(),
                    rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
                )
            })
            .collect();

        Self {
            config,
            critical_keywords,
            refinements,
            jitter,
        }
    }

    pub fn refine_category(&self, description_lower: &str, declared_category: &str) -> String {
        self.refinements
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| description_lower.contains(k.as_str())))
            .map(|(category, _)| category.clone())
            .unwrap_or_else(|| declared_category.to_string())
    }

    /// Number of distinct critical keywords present in the description.
    pub fn critical_keyword_hits(&self, description_lower: &str) -> usize {
        self.critical_keywords
            .iter()
            .filter(|k| description_lower.contains(k.as_str()))
            .count()
    }

    fn jitter(&self) -> u8 {
        match self.jitter {
            Jitter::Random => rand::thread_rng().gen_range(0..=self.config.max_jitter),
            Jitter::Fixed(value) => value.min(self.config.max_jitter),
        }
    }

    fn score(
        &self,
        description_lower: &str,
        refined_category: &str,
        declared_category: &str,
    ) -> u8 {
        let cfg = &self.config;
        let hits = self.critical_keyword_hits(description_lower) as u32;

        let mut score = cfg.base_score as u32 + self.jitter() as u32;
        score += hits * cfg.keyword_weight as u32;

        let critical_category = refined_category
            .to_lowercase()
            .contains(&cfg.critical_marker.to_lowercase());
        let safety_category = declared_category
            .to_lowercase()
            .contains(&cfg.safety_marker.to_lowercase());
        if critical_category || safety_category {
            score += cfg.category_bonus as u32;
        }

        score.min(cfg.max_score as u32) as u8
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, description: &str, declared_category: &str) -> ClassificationResult {
        let description_lower = description.to_lowercase();
        let refined_category = self.refine_category(&description_lower, declared_category);
        let priority_score = self.score(&description_lower, &refined_category, declared_category);

        log::debug!(
            "Classified as {} (declared {}), P={}",
            refined_category,
            declared_category,
            priority_score
        );

        ClassificationResult {
            refined_category,
            priority_score,
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
