//! Core library for incremental feature builds.
//!
//! A run resolves a target's dependency closure, fingerprints each feature
//! from its command, input content and freshly computed dependency
//! fingerprints, and rebuilds only the features whose fingerprint differs
//! from the cached one.

pub mod action;
pub mod cache;
pub mod command_validator;
pub mod config;
pub mod error;
pub mod feature;
pub mod fingerprint;
pub mod graph;
pub mod orchestrator;

pub use action::{BuildAction, ContainerBuildAction, ShellBuildAction};
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use command_validator::CommandValidator;
pub use config::{BuilderConfig, LoadedConfig};
pub use error::{Error, Result};
pub use feature::{Feature, FeatureRegistry};
pub use fingerprint::Fingerprint;
pub use graph::{BuildOrder, DependencyGraph, RegistryGraph};
pub use orchestrator::{BuildOrchestrator, Decision, DecisionKind, RunSummary};
