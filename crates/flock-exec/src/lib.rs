mod error;
pub use error::ExecError;

/// Runtime identifier of [`docker::DockerRuntime`].
pub const RUNTIME_DOCKER: &str = "docker";

/// Runtime identifier of [`memory::MemoryRuntime`].
pub const RUNTIME_MEMORY: &str = "memory";

#[cfg(feature = "docker")]
pub mod docker;

#[cfg(feature = "memory")]
pub mod memory;
