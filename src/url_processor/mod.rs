//! URL Processor Module
//!
//! Cleans up URLs for the marketing site. Three fixed operations are supported:
//!
//! - `canonical` strips the query string, the fragment and one trailing `/`
//! - `redirection` does the same, then points the URL at
//!   [`REDIRECT_HOST`] over https and lower-cases the result
//! - `all` behaves exactly like `redirection`
//!
//! # Usage
//!
//! ```rust,ignore
//! use booklib::url_processor;
//!
//! let app = Router::new()
//!     .merge(url_processor::routes())
//!     .with_state(app_state);
//!
//! let cleaned = url_processor::process_url("https://example.com/a/?b=c", "canonical")?;
//! assert_eq!(cleaned, "https://example.com/a");
//! ```

mod handler;
mod normalize;
mod routes;

pub use normalize::{Operation, REDIRECT_HOST, normalize, process_url};
pub use routes::routes;
