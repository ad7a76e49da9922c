use std::collections::HashSet;

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256Plus};

use crate::error::{AppError, AppResult};

/// K-means settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterParams {
    pub n_clusters: usize,
    pub seed: u64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            seed: 42,
        }
    }
}

/// A k-means model fit over one feature matrix, with the label of every row
pub struct ClusterModel {
    model: KMeans<f64, L2Dist>,
    labels: Array1<usize>,
}

impl ClusterModel {
    /// Fits k-means over `features`.
    ///
    /// k is clamped to the number of distinct rows, so small catalogues still
    /// fit. Fails on an empty matrix.
    pub fn fit(features: &Array2<f64>, params: &ClusterParams) -> AppResult<Self> {
        let distinct = distinct_rows(features);
        if distinct == 0 {
            return Err(AppError::Clustering(
                "cannot cluster an empty feature matrix".to_string(),
            ));
        }

        let n_clusters = params.n_clusters.clamp(1, distinct);
        if n_clusters < params.n_clusters {
            tracing::debug!(
                requested = params.n_clusters,
                used = n_clusters,
                "Fewer distinct items than clusters, reducing k"
            );
        }

        let rng = Xoshiro256Plus::seed_from_u64(params.seed);
        let dataset = DatasetBase::from(features.clone());
        let model = KMeans::params_with_rng(n_clusters, rng)
            .fit(&dataset)
            .map_err(|e| AppError::Clustering(e.to_string()))?;

        let labels = model.predict(features);

        Ok(Self { model, labels })
    }

    /// Cluster label of each row of the fitted matrix
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn n_clusters(&self) -> usize {
        self.model.centroids().nrows()
    }

    /// Nearest centroid for a single feature vector
    pub fn predict(&self, point: ArrayView1<'_, f64>) -> usize {
        let observation = point.insert_axis(Axis(0));
        let labels: Array1<usize> = self.model.predict(&observation);
        labels[0]
    }
}

fn distinct_rows(features: &Array2<f64>) -> usize {
    features
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len()
}
