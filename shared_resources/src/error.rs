use std::io;

use network_rust::udpnet::link::BcError;
use thiserror::Error;

use crate::links::Subsystem;
use crate::message::MessageKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{kind} may not be sent from {from} to {to}")]
    Unroutable {
        kind: MessageKind,
        from: Subsystem,
        to: Subsystem,
    },
    #[error("link {from} -> {to} is closed")]
    Closed { from: Subsystem, to: Subsystem },
    #[error("{0} has no link to {1}")]
    Missing(Subsystem, Subsystem),
    #[error("transport error: {0}")]
    Transport(#[from] BcError),
    #[error("failed to spawn link thread: {0}")]
    Spawn(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum WorkQueueError {
    #[error("work queue {0} is closed")]
    Closed(String),
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{handler} does not handle {kind}")]
    UnexpectedMessage {
        kind: MessageKind,
        handler: &'static str,
    },
    #[error("unknown elevator {0}")]
    UnknownElevator(usize),
    #[error("no elevator available")]
    NoElevators,
    #[error("floor {floor} outside 0..{num_floors}")]
    FloorOutOfRange { floor: u8, num_floors: u8 },
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Queue(#[from] WorkQueueError),
}
