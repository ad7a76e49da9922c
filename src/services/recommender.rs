use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::{
    db::Repository,
    error::{AppError, AppResult},
    models::Content,
};

use super::{ClusterModel, ClusterParams, FeatureMatrix};

/// One immutable build of the content model
pub struct ModelSnapshot {
    features: FeatureMatrix,
    clusters: ClusterModel,
}

impl ModelSnapshot {
    pub fn build(contents: &[Content], params: &ClusterParams) -> AppResult<Self> {
        let features = FeatureMatrix::build(contents);
        let clusters = ClusterModel::fit(features.features(), params)?;
        Ok(Self { features, clusters })
    }

    /// Number of content items the snapshot was built from
    pub fn content_count(&self) -> usize {
        self.features.len()
    }

    #[cfg(test)]
    pub fn cluster_of(&self, content_id: i64) -> Option<usize> {
        self.features
            .ids()
            .iter()
            .position(|id| *id == content_id)
            .map(|idx| self.clusters.labels()[idx])
    }

    /// Cluster nearest to the mean of the watched items, if any are known
    pub fn user_cluster(&self, watched: &[i64]) -> Option<usize> {
        let mean = self.features.mean_of(watched)?;
        Some(self.clusters.predict(mean.view()))
    }

    /// Ids labelled `cluster`, in id order
    pub fn members(&self, cluster: usize) -> Vec<i64> {
        self.features
            .ids()
            .iter()
            .zip(self.clusters.labels().iter())
            .filter(|(_, label)| **label == cluster)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Lazily built, single-writer holder of the current model snapshot.
///
/// A snapshot is reused while the stored content count matches the count it
/// was built from; any difference triggers a rebuild on the next request.
pub struct ModelCache {
    params: ClusterParams,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl ModelCache {
    pub fn new(params: ClusterParams) -> Self {
        Self {
            params,
            snapshot: RwLock::new(None),
        }
    }

    /// Returns a snapshot matching the store, building one if needed.
    ///
    /// `None` when the catalogue is empty.
    pub async fn current(&self, repo: &dyn Repository) -> AppResult<Option<Arc<ModelSnapshot>>> {
        let count = repo.count_content().await?;
        if count == 0 {
            return Ok(None);
        }

        if let Some(snapshot) = self.fresh(count).await {
            return Ok(Some(snapshot));
        }

        let mut guard = self.snapshot.write().await;
        // another request may have rebuilt while we waited for the lock
        if let Some(snapshot) = guard.as_ref().filter(|s| s.content_count() as i64 == count) {
            return Ok(Some(snapshot.clone()));
        }

        if let Some(stale) = guard.as_ref() {
            tracing::info!(
                cached = stale.content_count(),
                stored = count,
                "Content count changed, rebuilding model"
            );
        }

        let start = Instant::now();
        let contents = repo.list_content().await?;
        if contents.is_empty() {
            return Ok(None);
        }

        let snapshot = Arc::new(ModelSnapshot::build(&contents, &self.params)?);
        tracing::info!(
            content = snapshot.content_count(),
            clusters = snapshot.clusters.n_clusters(),
            build_time_ms = start.elapsed().as_millis(),
            "Model built"
        );

        *guard = Some(snapshot.clone());
        Ok(Some(snapshot))
    }

    async fn fresh(&self, count: i64) -> Option<Arc<ModelSnapshot>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| s.content_count() as i64 == count)
            .cloned()
    }
}

/// Cluster-based content recommender
pub struct Recommender {
    cache: ModelCache,
}

impl Recommender {
    pub fn new(params: ClusterParams) -> Self {
        Self {
            cache: ModelCache::new(params),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Up to `limit` items for the user, best rated first.
    ///
    /// Users without a usable watch history get the global top rated items.
    /// Otherwise candidates are the unwatched members of the user's cluster.
    pub async fn recommend(
        &self,
        repo: &dyn Repository,
        user_id: i64,
        limit: usize,
    ) -> AppResult<Vec<Content>> {
        if repo.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }

        let watched: Vec<i64> = repo
            .watch_history(user_id)
            .await?
            .into_iter()
            .map(|edge| edge.content_id)
            .collect();

        let assignment = if watched.is_empty() {
            None
        } else {
            self.cache
                .current(repo)
                .await?
                .and_then(|snapshot| snapshot.user_cluster(&watched).map(|c| (snapshot, c)))
        };

        let Some((snapshot, cluster)) = assignment else {
            tracing::debug!(user_id, "No cluster preference, using top rated content");
            return repo.top_rated(limit).await;
        };

        let watched: HashSet<i64> = watched.into_iter().collect();
        let candidates: Vec<i64> = snapshot
            .members(cluster)
            .into_iter()
            .filter(|id| !watched.contains(id))
            .collect();

        tracing::debug!(
            user_id,
            cluster,
            candidates = candidates.len(),
            "Selecting from user cluster"
        );

        let items = repo.content_by_ids(&candidates).await?;
        Ok(rank_by_rating(items, limit))
    }
}

/// Sorts by rating, highest first, keeping input order among ties, and truncates.
pub fn rank_by_rating(mut items: Vec<Content>, limit: usize) -> Vec<Content> {
    items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    items.truncate(limit);
    items
}
