//! Request construction and execution.
//!
//! - [`RestClient`] - Shares a transport and configuration across requests
//! - [`RestRequest`] - One request: headers, cookies, credentials, body and options
//! - [`AbortHandle`] - Cancels an in-flight request from another task
//! - [`Transport`] - The seam between a request and the network; [`ReqwestTransport`] by default

mod abort;
mod executor;
mod request;
mod transport;

pub use abort::{AbortHandle, RequestState};
pub use executor::{RestClient, RestClientBuilder};
pub use request::RestRequest;
pub use transport::{Credentials, ReqwestTransport, Transport, TransportRequest, TransportResponse};
