pub mod cache;
pub mod store;

pub use cache::LikedCache;
pub use store::{LikeBackend, LikeError, LikeStore};
