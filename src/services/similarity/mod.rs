// Similarity Module
// Originality detection organized into:
// - vectorizer: TF-IDF vector space over 1-2 gram token features
// - detector: pairwise / batch corpus comparison with fail-open scoring

pub mod vectorizer;
pub mod detector;

pub use vectorizer::{cosine, fit_transform, SimilarityError, SparseVector, VectorizerSettings};
pub use detector::{blend_originality, SimilarityEngine};
