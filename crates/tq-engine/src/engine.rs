//! Entropy and information-gain question selection.
//!
//! Entropy is measured over the distribution obtained by grouping candidates
//! by identity (their name). A question `(attribute, value)` splits a set `S`
//! into `M` (candidates whose normalized value equals `value`) and `N`
//! (everyone else, including candidates where the attribute is absent or
//! null). Its gain is `H(S) - |M|/|S|·H(M) - |N|/|S|·H(N)`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tq_core::attributes::normalize_value;
use tq_core::entities::Entity;

use crate::answer::Answer;
use crate::error::EngineError;

/// Gains closer than this are treated as equal.
const GAIN_EPSILON: f64 = 1e-12;

/// A yes/no question: "is `attribute` equal to `value`?".
///
/// `value` is always normalized. Derived per turn, never stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeQuestion {
    pub attribute: String,
    pub value: String,
}

impl AttributeQuestion {
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: &str) -> Self {
        Self {
            attribute: attribute.into(),
            value: normalize_value(value),
        }
    }

    /// Whether `entity` answers yes to this question.
    #[must_use]
    pub fn holds_for(&self, entity: &Entity) -> bool {
        entity.matches(&self.attribute, &self.value)
    }
}

/// One asked question and the answer it got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskedQuestion {
    pub question: AttributeQuestion,
    pub answer: Answer,
}

impl AskedQuestion {
    /// Whether `entity` disagrees with the recorded answer.
    #[must_use]
    pub fn contradicted_by(&self, entity: &Entity) -> bool {
        self.question.holds_for(entity) != self.answer.is_yes()
    }
}

/// Attribute name to the sorted distinct values seen for it.
pub type Vocabulary = BTreeMap<String, BTreeSet<String>>;

/// Holds the candidate snapshot a game is played against.
#[derive(Debug, Default)]
pub struct InformationEngine {
    candidates: Vec<Entity>,
    vocabulary: OnceLock<Vocabulary>,
}

impl InformationEngine {
    /// Build an engine over `candidates`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyDataset` when `candidates` is empty.
    pub fn new(candidates: Vec<Entity>) -> Result<Self, EngineError> {
        let mut engine = Self::default();
        engine.load(candidates)?;
        Ok(engine)
    }

    /// Replace the snapshot. The previous snapshot is kept on error.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyDataset` when `candidates` is empty.
    pub fn load(&mut self, mut candidates: Vec<Entity>) -> Result<(), EngineError> {
        if candidates.is_empty() {
            return Err(EngineError::EmptyDataset);
        }
        candidates.sort_by_key(|e| e.id);
        tracing::debug!(candidates = candidates.len(), "engine snapshot loaded");
        self.candidates = candidates;
        self.vocabulary = OnceLock::new();
        Ok(())
    }

    /// Reload after the store changed (e.g. a newly learned entity).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyDataset` when `candidates` is empty.
    pub fn reload(&mut self, candidates: Vec<Entity>) -> Result<(), EngineError> {
        self.load(candidates)
    }

    /// Current snapshot, ordered by id.
    #[must_use]
    pub fn candidates(&self) -> &[Entity] {
        &self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Every attribute seen in the snapshot with its distinct normalized values.
    ///
    /// Computed once per snapshot.
    pub fn vocabulary(&self) -> &Vocabulary {
        self.vocabulary.get_or_init(|| {
            let mut vocabulary = Vocabulary::new();
            for entity in &self.candidates {
                for (attribute, value) in &entity.attributes {
                    let values = vocabulary.entry(attribute.clone()).or_default();
                    if let Some(value) = value.as_deref() {
                        values.insert(normalize_value(value));
                    }
                }
            }
            vocabulary
        })
    }

    /// Shannon entropy (bits) of `set` grouped by name.
    ///
    /// Empty and singleton sets have entropy 0.
    #[must_use]
    pub fn entropy(set: &[Entity]) -> f64 {
        entropy_of(set.iter())
    }

    /// Expected entropy reduction from asking `question` about `set`.
    ///
    /// Always within `0..=entropy(set)`.
    #[must_use]
    pub fn information_gain(set: &[Entity], question: &AttributeQuestion) -> f64 {
        if set.is_empty() {
            return 0.0;
        }
        let (matching, rest): (Vec<&Entity>, Vec<&Entity>) =
            set.iter().partition(|e| question.holds_for(e));

        #[allow(clippy::cast_precision_loss)]
        let total = set.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let remainder = (matching.len() as f64 / total) * entropy_of(matching.iter().copied())
            + (rest.len() as f64 / total) * entropy_of(rest.iter().copied());

        let whole = Self::entropy(set);
        (whole - remainder).clamp(0.0, whole)
    }

    /// Pick the most informative question to ask about `set`.
    ///
    /// Skips pairs already in `asked`, every pair for an attribute that already
    /// got a yes, and pairs every candidate in `set` would answer yes to.
    /// A no only rules out its own value; the attribute's other values stay askable.
    /// Ties go to the lexicographically smallest `(attribute, value)`.
    /// Returns `None` for sets of size 0 or 1 or when nothing is left to ask.
    #[must_use]
    pub fn select_question(set: &[Entity], asked: &[AskedQuestion]) -> Option<AttributeQuestion> {
        if set.len() <= 1 {
            return None;
        }

        let settled: BTreeSet<&str> = asked
            .iter()
            .filter(|a| a.answer.is_yes())
            .map(|a| a.question.attribute.as_str())
            .collect();
        let already: BTreeSet<&AttributeQuestion> = asked.iter().map(|a| &a.question).collect();

        let mut best: Option<(AttributeQuestion, f64)> = None;
        for question in candidate_questions(set) {
            if settled.contains(question.attribute.as_str()) || already.contains(&question) {
                continue;
            }
            if set.iter().all(|e| question.holds_for(e)) {
                continue;
            }
            let gain = Self::information_gain(set, &question);
            if best
                .as_ref()
                .is_none_or(|(_, best_gain)| gain > best_gain + GAIN_EPSILON)
            {
                best = Some((question, gain));
            }
        }

        if let Some((question, gain)) = &best {
            tracing::debug!(
                attribute = %question.attribute,
                value = %question.value,
                gain,
                candidates = set.len(),
                "question selected"
            );
        }
        best.map(|(question, _)| question)
    }

    /// The part of `set` consistent with `answer` to `question`.
    #[must_use]
    pub fn filter(set: &[Entity], question: &AttributeQuestion, answer: Answer) -> Vec<Entity> {
        set.iter()
            .filter(|e| question.holds_for(e) == answer.is_yes())
            .cloned()
            .collect()
    }

    /// `1/|set|`: 1.0 for a singleton, 0.0 for an empty set.
    #[must_use]
    pub fn confidence(set: &[Entity]) -> f64 {
        if set.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let len = set.len() as f64;
            1.0 / len
        }
    }
}

/// Every `(attribute, normalized value)` present in `set`, sorted.
fn candidate_questions(set: &[Entity]) -> BTreeSet<AttributeQuestion> {
    set.iter()
        .flat_map(|entity| {
            entity.attributes.iter().filter_map(|(attribute, value)| {
                value
                    .as_deref()
                    .map(|v| AttributeQuestion::new(attribute.clone(), v))
            })
        })
        .collect()
}

fn entropy_of<'a>(set: impl Iterator<Item = &'a Entity>) -> f64 {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for entity in set {
        *groups.entry(entity.name.as_str()).or_default() += 1;
    }
    let weights: Vec<usize> = groups.into_values().collect();
    shannon_entropy(&weights)
}

/// Shannon entropy (bits) of a distribution given as non-negative counts.
///
/// Zero counts are ignored; an all-zero or empty input has entropy 0.
#[must_use]
pub fn shannon_entropy(weights: &[usize]) -> f64 {
    let total: usize = weights.iter().sum();
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    weights
        .iter()
        .filter(|&&w| w > 0)
        .map(|&w| {
            #[allow(clippy::cast_precision_loss)]
            let p = w as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>()
        .max(0.0)
}
