//! # Provider Integration
//!
//! Everything needed to talk to the remote insurance provider.
//!
//! - [`credentials`]: secret bundle and the configuration error
//! - [`transport`]: the [`ProviderTransport`] port with direct and proxy adapters
//! - [`http_client`]: reqwest wrapper shared by both transports
//! - [`fields`]: defensive accessors over untyped provider JSON
//! - [`error`]: per-request [`ProviderError`]

pub mod credentials;
pub mod error;
pub mod fields;
pub mod http_client;
pub mod transport;

pub use credentials::{ConfigurationError, ProviderCredentials, ProviderIdentity};
pub use error::{ProviderError, ProviderResult};
pub use http_client::HttpClient;
pub use transport::{
    DirectTransport, HttpMethod, ProviderRequest, ProviderResponse, ProviderTransport,
    ProxyEnvelope, ProxyTransport, TransportMode,
};
