//! View-state controllers.
//!
//! Each controller is a cheap `Clone` handle. Intents go in through `dispatch`
//! (spawned, fire-and-forget) or `handle` (awaited to completion); state comes
//! out as snapshots from `state()` or as a `watch` stream from `subscribe()`.

pub mod categories;
pub mod debounce;
pub mod detail;
pub mod list;
pub mod store;

pub use categories::{CategoriesController, CategoriesIntent, CategoriesState, CategoryDialog};
pub use debounce::Debouncer;
pub use detail::{DetailController, DetailIntent, DetailState};
pub use list::{ListConfig, ListController, ListFilter, ListIntent, ListState, LoadingFlags, Paging};
pub use store::StateStore;
