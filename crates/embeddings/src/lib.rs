mod pack;
pub use pack::{pack_embedding, unpack_embedding};

mod service;
pub use service::{DEFAULT_DIMENSION, DEFAULT_MODEL, EmbeddingConfig, EmbeddingService};

mod similarity;
pub use similarity::{RawEmbedding, cosine_similarity, find_similar};
