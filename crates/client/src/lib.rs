//! HTTP side of the Podium console: the REST client, the section-scoped
//! persistence gateway, and the dashboard poller.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod poller;
pub mod resource;
pub mod session;
