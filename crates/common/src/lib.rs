//! Types shared between the Stagehand API boundary and the client state machines.
//!
//! `dto` mirrors the JSON the server speaks; `models` holds the domain values the
//! controllers work with. Conversions live next to the wire types.

pub mod dto;
pub mod models;

/// Default number of URLs requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Quiet window before a search keystroke turns into a fetch.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Category id the server interprets as "no category" in list queries and bulk
/// categorize operations.
pub const UNCATEGORIZED_CATEGORY_ID: i32 = 0;

/// Colors offered when creating or editing a category.
pub const PRESET_COLORS: [&str; 18] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
    "#16a085", "#27ae60", "#2980b9", "#8e44ad", "#c0392b", "#d35400", "#7f8c8d", "#95a5a6",
    "#f1c40f", "#e91e63",
];
