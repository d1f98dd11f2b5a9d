//! Persistence seam for normalized feed items.
//!
//! The pipeline itself never touches storage; these types define the
//! contract an adapter fulfills. Stores are explicitly constructed and
//! passed in, never ambient process state.

pub mod in_memory;
pub mod row;
pub mod traits;

pub use in_memory::InMemoryFeedItemStore;
pub use row::{feed_item_to_row, row_to_feed_item, FeedItemRow};
pub use traits::{FeedItemFilters, FeedItemStore};
