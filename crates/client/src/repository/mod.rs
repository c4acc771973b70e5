//! Domain-facing wrappers over [`StagehandApi`](crate::api::StagehandApi).
//!
//! Every call returns a [`RepoResult`](crate::error::RepoResult); transport and
//! decoding failures never travel further up as anything but a message.

mod category_repository;
mod url_repository;

pub use category_repository::CategoryRepository;
pub use url_repository::UrlRepository;
