// imagedeck: pagination and caching layer over a remote entity store
//
// The remote store only answers simple predicate queries through a
// forward-only cursor and charges per request. Everything in this crate
// exists to reconcile that interface with a newest-first, searchable,
// paginated gallery API.

pub mod anchor;
pub mod constants;
pub mod gallery;
pub mod logger;
pub mod materialize;
pub mod pagination;
pub mod progress;
pub mod record;
pub mod remote;
pub mod server;
pub mod session;

pub use gallery::Gallery;
pub use record::ImageMeta;
