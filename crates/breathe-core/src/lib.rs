//! Shared models + mutation service for the breathe dashboard daemon.

pub mod etag;
pub mod fixture;
pub mod model;
pub mod mutations;
pub mod time;
pub mod validate;

pub use etag::*;
pub use fixture::*;
pub use model::*;
pub use mutations::*;
pub use time::*;
pub use validate::*;
