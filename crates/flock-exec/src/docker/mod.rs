//! Runtime adapter backed by the Docker CLI.
//!
//! Every [`flock_core::RuntimeClient`] call spawns one `docker` invocation through
//! `tokio::process::Command` and classifies its exit status and stderr into a
//! [`flock_core::RuntimeError`].
mod args;
mod config;
mod parse;
mod runtime;

pub use config::{DOCKER_CMD_ENV, DockerConfig};
pub use runtime::DockerRuntime;
