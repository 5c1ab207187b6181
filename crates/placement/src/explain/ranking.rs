//! Ordered feature-importance ranking.

use serde::Serialize;

/// One entry of an [`ImportanceRanking`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    /// Position of the feature in the encoded vector.
    pub index: usize,
    pub name: String,
    pub importance: f64,
}

/// Features sorted by descending importance; ties keep ascending index order.
///
/// Global to the model, not specific to any candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ImportanceRanking {
    entries: Vec<RankedFeature>,
}

impl ImportanceRanking {
    /// Rank `scores`, pairing each with the name at the same index.
    pub fn from_scores(names: &[String], scores: &[f64]) -> Self {
        debug_assert_eq!(names.len(), scores.len());
        let mut entries: Vec<RankedFeature> = names
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (name, &importance))| RankedFeature {
                index,
                name: name.clone(),
                importance,
            })
            .collect();
        // Stable: equal scores stay in index order.
        entries.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        Self { entries }
    }

    /// Keep the `k` most important features.
    pub fn top_k(mut self, k: usize) -> Self {
        self.entries.truncate(k);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedFeature> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[RankedFeature] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a ImportanceRanking {
    type Item = &'a RankedFeature;
    type IntoIter = std::slice::Iter<'a, RankedFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
