//! LogServ: HTTP access to the tail of append-only log files.
//!
//! The daemon serves `GET /<path>?n=&s=&cont=` queries over the files
//! below its working directory, reading each file backwards in bounded
//! memory and returning the newest matching lines first. Clients page
//! through older lines with opaque continuation tokens. In aggregator
//! mode the same query surface fans out to a configured set of peer
//! LogServ instances and merges their host-tagged responses.
//!
//! Module layout, leaves first:
//!
//! - [`reader`]: fixed-size byte windows from file end toward start.
//! - [`scanner`]: whole lines in reverse order, tagged with offsets.
//! - [`engine`]: the substring filter and result-limit loop.
//! - [`token`]: the base64 continuation token codec.
//! - [`aggregator`]: parallel peer fan-out under a shared deadline.
//! - [`server`]: the axum HTTP surface tying it all together.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod reader;
pub mod scanner;
pub mod server;
pub mod token;

pub use config::SearchOptions;
pub use error::{Error, Result};
pub use model::{Line, LocalResult, Query};
