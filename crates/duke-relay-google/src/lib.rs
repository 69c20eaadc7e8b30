//! Google Drive v3 and Sheets v4 clients for duke-relay.
//!
//! [`DriveClient`] implements [`FileStore`](duke_relay_core::FileStore) and
//! [`SheetsClient`] implements [`TableStore`](duke_relay_core::TableStore).
//! Both authenticate as a service account and talk JSON over blocking HTTP.
//!
//! # Architecture
//!
//! ```text
//! Your Rust code
//!     └── DriveClient / SheetsClient (this crate)
//!           └── Transport (HttpTransport: reqwest, bearer token)
//!                 └── ServiceAccountAuth: signed JWT -> access token
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use duke_relay_core::{FileStore, TableStore};
//! use duke_relay_google::{CredentialSource, DriveClient, SheetsClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = CredentialSource::resolve(None, None)?;
//!     let drive = DriveClient::from_credentials(&source)?;
//!     let sheets = SheetsClient::from_credentials(&source)?;
//!
//!     for file in drive.list(None, Some("trashed = false"))? {
//!         println!("{file}");
//!     }
//!     let rows = sheets.read_sheet("spreadsheet-id", None)?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

mod auth;
mod drive;
mod error;
pub mod protocol;
mod sheets;
mod transport;

pub use auth::{
    CredentialSource, ServiceAccountAuth, ServiceAccountKey, CREDENTIALS_ENV, DRIVE_SCOPE,
    SHEETS_SCOPE,
};
pub use drive::{DriveClient, DOWNLOAD_CHUNK_SIZE};
pub use error::AuthError;
pub use sheets::SheetsClient;
pub use transport::{
    path_segment, ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport,
};
