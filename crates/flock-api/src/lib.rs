//! HTTP presentation layer over the orchestration engine.
//!
//! [`HttpApi`] mounts one route per engine capability on an axum [`axum::Router`].
//! Handlers delegate to an [`ApiHandler`]; [`EngineAdapter`] is the ready-made
//! implementation over [`flock_core::Engine`]. Every response uses the
//! [`Envelope`] shape: `{"status":"ok","data":..}` or
//! `{"status":"error","kind":..,"message":..}`.
mod adapter;
mod envelope;
mod error;
mod handler;
mod http;

pub use adapter::EngineAdapter;
pub use envelope::Envelope;
pub use error::ApiError;
pub use handler::ApiHandler;
pub use http::{CreateUnitRequest, ExecRequest, HttpApi, ListQuery};
