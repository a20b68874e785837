//! Upstream platform access: transport, resolver strategies and signature deciphering

pub mod cipher;
pub mod client;
pub mod extractor;
pub mod formats;
pub mod innertube;
pub mod legacy;
pub mod player;
pub mod resolver;
pub mod signature;
pub mod watch;

pub use cipher::*;
pub use client::{FetchedBody, HttpClientConfig, HttpTransport, Transport};
pub use extractor::extract;
pub use formats::*;
pub use innertube::*;
pub use legacy::*;
pub use player::*;
pub use resolver::*;
pub use signature::*;
pub use watch::*;
