//! Coder Music Core
//!
//! Types shared by the playback controller and the catalog client.
//!
//! The core crate defines:
//! - **Domain Types**: `Track` and its `TrackId`
//! - **Credential Gate**: the access-token holder the catalog needs and playback waits on
//! - **Catalog Boundary**: the `TrackCatalog` trait implemented by catalog clients
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use coder_core::{CredentialGate, Track};
//!
//! let gate = CredentialGate::new();
//! assert!(!gate.has_credential());
//!
//! gate.set_credential("my-api-key").unwrap();
//! assert!(gate.has_credential());
//!
//! let track = Track::new("dQw4w9WgXcQ", "Lo-fi beats to code to");
//! assert_eq!(track.id.as_str(), "dQw4w9WgXcQ");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod credential;
pub mod error;
pub mod track;

pub use catalog::TrackCatalog;
pub use credential::{CredentialGate, CredentialWatch};
pub use error::{CoreError, Result};
pub use track::{Track, TrackId};
