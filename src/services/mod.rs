pub mod clustering;
pub mod features;
pub mod recommender;

pub use clustering::{ClusterModel, ClusterParams};
pub use features::{feature_vector, FeatureMatrix, FEATURE_LEN, GENRE_VOCABULARY};
pub use recommender::{rank_by_rating, ModelCache, ModelSnapshot, Recommender};
