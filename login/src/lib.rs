//! Authentication against the eoex backend.
//!
//! [`AuthClient`] is the seam the shell talks to; [`HttpAuthClient`] is the
//! production implementation that posts credentials to `/auth/login`.

mod client;
mod payload;

pub use client::AuthClient;
pub use client::HttpAuthClient;
pub use client::LoginError;
pub use payload::Credentials;
pub use payload::LoginResponse;
pub use payload::UserPayload;
