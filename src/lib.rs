//! Content-addressed static asset publishing.
//!
//! Assets (single resources or whole directories) are altered, filtered,
//! written under a name carrying the MD5 of their content, and exposed
//! through a stable symlink. The [`Manager`] maps those symlinks back to
//! public URLs.
//!
//! ```ignore
//! let manager = Manager::new("assets", "public/static")
//!     .with_server(Server::new(".", "https://cdn.example.com/static"))
//!     .with_filter(Filter::new(Pattern::extensions(["js"]), Arc::new(MinifyJs)))
//!     .with_asset("js", AssetPack::new("js", "js"));
//!
//! manager.dump()?;
//! let url = manager.url("js", &["app.js"]);
//! // https://cdn.example.com/static/js/app.<md5>.js
//! ```

pub mod logger;

pub mod alteration;
pub mod asset;
pub mod config;
pub mod dumper;
pub mod error;
pub mod manager;
pub mod path;
pub mod pattern;
pub mod resource;

pub use asset::{Asset, AssetPack, SingleAsset};
pub use dumper::{Dumper, FileDumper};
pub use error::{Error, Result};
pub use manager::{Filter, Manager, Server};
pub use pattern::Pattern;
pub use resource::{Alteration, AlteredResource, Resource, SharedAlteration};
