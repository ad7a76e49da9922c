use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::models::Content;

/// Genres with a one-hot slot in the feature vector. Anything else is dropped.
pub const GENRE_VOCABULARY: [&str; 5] = ["Action", "Comedy", "Drama", "Sci-Fi", "Romance"];

/// rating, release year, then one flag per vocabulary genre
pub const FEATURE_LEN: usize = 2 + GENRE_VOCABULARY.len();

/// Numeric representation of a single content item
pub fn feature_vector(content: &Content) -> [f64; FEATURE_LEN] {
    let mut features = [0.0; FEATURE_LEN];
    features[0] = content.rating;
    features[1] = f64::from(content.release_year);

    for genre in content.genres() {
        if let Some(slot) = GENRE_VOCABULARY.iter().position(|g| *g == genre) {
            features[2 + slot] = 1.0;
        }
    }

    features
}

/// Feature rows aligned with the content ids they were built from
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    ids: Vec<i64>,
    features: Array2<f64>,
}

impl FeatureMatrix {
    pub fn build(contents: &[Content]) -> Self {
        let mut features = Array2::<f64>::zeros((contents.len(), FEATURE_LEN));
        for (mut row, content) in features.axis_iter_mut(Axis(0)).zip(contents) {
            row.assign(&ArrayView1::from(&feature_vector(content)[..]));
        }

        Self {
            ids: contents.iter().map(|c| c.id).collect(),
            features,
        }
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn row(&self, content_id: i64) -> Option<ArrayView1<'_, f64>> {
        self.ids
            .iter()
            .position(|id| *id == content_id)
            .map(|idx| self.features.row(idx))
    }

    /// Mean feature vector of the given items.
    ///
    /// Ids without a row are skipped; returns `None` when none are known.
    pub fn mean_of(&self, content_ids: &[i64]) -> Option<Array1<f64>> {
        let mut sum = Array1::<f64>::zeros(FEATURE_LEN);
        let mut count = 0usize;

        for id in content_ids {
            match self.row(*id) {
                Some(row) => {
                    sum += &row;
                    count += 1;
                }
                None => {
                    tracing::warn!(content_id = id, "Watched content missing from model, skipping")
                }
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}
