//! Error types shared across the node.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Outcome of a failed best-effort queue send. The rejected item is handed back.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError<T> {
    #[error("queue full, item dropped")]
    Full(T),
    #[error("queue has no receiver")]
    Disconnected(T),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream buffer full: {requested} bytes requested, {available} free")]
    Full { requested: usize, available: usize },
    #[error("stream buffer shortfall: expected {expected} bytes, got {actual}")]
    Shortfall { expected: usize, actual: usize },
    #[error("stream buffer closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport not connected")]
    NotConnected,
    #[error("transport i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("publish to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn task {task}: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("task {0} terminated abnormally")]
    TaskPanicked(&'static str),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type NodeResult<T> = Result<T, NodeError>;
