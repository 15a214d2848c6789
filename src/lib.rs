//! Authentication edge gateway for the observation console.
//!
//! The gateway sits between the browser and the console backend. Every page
//! request passes through the session gate, which reads the session cookie
//! set and either lets the request through, redirects to the login page, or
//! redirects to the forced password-reset page. The credential exchange with
//! the backend (`/auth/email-login`, `/auth/respond-new-password`) happens
//! here too, and console API traffic is forwarded with the stored bearer
//! token attached.

pub mod backend;
pub mod cli;
pub mod gate;
pub mod store;
pub mod vigil;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
