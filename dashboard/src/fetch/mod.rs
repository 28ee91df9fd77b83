//! Fetcher: one request per resource, failures normalized to empty
//!
//! ```text
//! Poller tick → Fetcher::fetch(kind) → Transport::get_json(/api/<kind>)
//!                     ↓                          ↓
//!               FetchOutcome  ←  decode  ←  JSON body | FetchError
//! ```
//!
//! The transport is the only seam that touches the network. `HttpTransport`
//! talks to the telemetry source over reqwest; tests plug in-memory
//! transports into the same trait.

pub mod fetcher;
pub mod transport;

pub use fetcher::{decode_body, FetchOutcome, Fetcher};
pub use transport::{FetchQuery, HttpTransport, Transport};
