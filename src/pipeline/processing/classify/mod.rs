//! Rule-based taxonomy classifier.
//!
//! A description is lower-cased and accent-folded, then:
//! 1. the first matching [`NatureRule`] decides the nature (default acquisition);
//! 2. every matching [`ScoringRule`] adds its weight to its function;
//! 3. the highest score wins, ties going to the earlier entry of
//!    [`Function::ALL`]; nothing above [`MIN_MATCH_SCORE`] means `Unclassified`;
//! 4. [`OverrideRule`]s then force known unambiguous phrases.
//!
//! Classification is pure: the same text and tables always give the same result.

pub mod rules;

use crate::domain::{Function, Nature};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub use rules::{
    NatureRule, OverrideRule, ScoringRule, DEFAULT_NATURE, MIN_MATCH_SCORE, NATURE_RULES,
    OVERRIDE_RULES, SCORING_RULES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub nature: Nature,
    pub function: Function,
}

impl Classification {
    /// `"{nature} - {function}"`
    pub fn category(&self) -> String {
        format!("{} - {}", self.nature, self.function)
    }
}

/// Classifier over a set of rule tables
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    nature_rules: &'static [NatureRule],
    scoring_rules: &'static [ScoringRule],
    overrides: &'static [OverrideRule],
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(NATURE_RULES, SCORING_RULES, OVERRIDE_RULES)
    }
}

impl Classifier {
    pub const fn new(
        nature_rules: &'static [NatureRule],
        scoring_rules: &'static [ScoringRule],
        overrides: &'static [OverrideRule],
    ) -> Self {
        Self {
            nature_rules,
            scoring_rules,
            overrides,
        }
    }

    pub fn classify(&self, description: Option<&str>) -> Classification {
        let text = fold_text(description.unwrap_or_default());

        let nature = self.nature_of(&text);
        let scores = self.score(&text);
        let function = best_function(&scores);

        self.apply_overrides(&text, Classification { nature, function })
    }

    /// Accumulated score per function, in [`Function::ALL`] order.
    /// Expects text already passed through [`fold_text`].
    pub fn score(&self, text: &str) -> Vec<(Function, u32)> {
        let mut scores: Vec<(Function, u32)> = Function::ALL.iter().map(|f| (*f, 0)).collect();
        for rule in self.scoring_rules {
            if contains_any(text, rule.keywords) {
                if let Some(entry) = scores.iter_mut().find(|(f, _)| *f == rule.function) {
                    entry.1 += rule.weight;
                }
            }
        }
        scores
    }

    fn nature_of(&self, text: &str) -> Nature {
        self.nature_rules
            .iter()
            .find(|rule| contains_any(text, rule.keywords))
            .map(|rule| match rule.reroute {
                Some((keywords, nature)) if contains_any(text, keywords) => nature,
                _ => rule.nature,
            })
            .unwrap_or(DEFAULT_NATURE)
    }

    fn apply_overrides(&self, text: &str, mut result: Classification) -> Classification {
        for rule in self.overrides {
            let function_matches = rule.when_function.map_or(true, |f| f == result.function);
            let keywords_match = rule.all_of.iter().all(|group| contains_any(text, group));
            if function_matches && keywords_match {
                result.nature = rule.nature;
                if let Some(function) = rule.function {
                    result.function = function;
                }
            }
        }
        result
    }
}

/// Classifies with the built-in tables
pub fn classify(description: Option<&str>) -> Classification {
    Classifier::default().classify(description)
}

/// Lower-cases and strips diacritics (`"Serviço"` → `"servico"`)
pub fn fold_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// Strict maximum: a later function only wins with a higher score
fn best_function(scores: &[(Function, u32)]) -> Function {
    let mut best: Option<(Function, u32)> = None;
    for &(function, score) in scores {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((function, score));
        }
    }
    match best {
        Some((function, score)) if score >= MIN_MATCH_SCORE => function,
        _ => Function::Unclassified,
    }
}
