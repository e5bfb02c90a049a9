//! Provider system for linkembed
//!
//! A provider turns a URL into oEmbed metadata; the registry decides which
//! provider handles a URL by ordered pattern matching.
//!
//! ## Key Components
//!
//! - [`Provider`] - Trait implemented by anything that resolves URLs
//! - [`EndpointProvider`] - Provider querying a remote oEmbed endpoint
//! - [`ProviderRegistry`] - Ordered pattern -> provider bindings with caching
//! - [`Metadata`] - Decoded, normalized provider response
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkembed::providers::{EndpointProvider, ProviderRegistry};
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(r"https?://vimeo\.com/\S+", Arc::new(EndpointProvider::new(
//!     "https://vimeo.com/api/oembed.json",
//!     fetcher,
//! )))?;
//!
//! let metadata = registry.request("https://vimeo.com/1234", &Params::new()).await?;
//! ```

pub mod bootstrap;
pub mod contrib;
mod endpoint;
mod registry;
mod traits;
mod types;

pub use bootstrap::{
    BootstrapError, BootstrapOptions, bootstrap_basic, bootstrap_embedly, bootstrap_noembed,
    bootstrap_oembed,
};
pub use contrib::{GoogleMapsProvider, ImageProvider};
pub use endpoint::EndpointProvider;
pub use registry::{ProviderRegistry, RegistryError};
pub use traits::{Provider, ProviderError};
pub use types::{MediaType, Metadata, Params};
