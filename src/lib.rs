pub mod args;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use domain::entities::PortResult;
pub use domain::ports::{ContractDescriptor, OperationSignature, PortContract};
pub use errors::{AppError, CompositionError, ConfigError, ContainerError};
pub use infrastructure::{
    bootstrap, default_root, AdapterRegistration, Collaborators, CompositionRoot, ConflictPolicy,
    Container, Lifecycle, Resolver,
};
