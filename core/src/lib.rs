pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod merge;
pub mod persist;
pub mod reorder;
pub mod session;
pub mod store;
mod model;

pub use cache::{CacheState, Lookup, ResultCache};
pub use config::Config;
pub use error::{LookupError, PersistError, StoreError};
pub use merge::{merge, merge_with, MergedEntry, PinOrigin, PointerOrder};
pub use model::*;
pub use reorder::{reorder, DragEvent};
pub use session::{CandidateView, Lookups, Session, View};
pub use store::PointerStore;
