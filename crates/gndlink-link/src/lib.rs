//! Dictionary-driven dispatch and link session orchestration.
//!
//! Composes the frame codec and port adapters into a running link: inbound
//! bytes are decoded and routed to a command-execution or
//! telemetry-ingestion path, heartbeats keep the link observable, and
//! [`LinkSession`] ties startup and shutdown ordering together. The
//! dictionary, executor and ground-sink collaborators sit behind traits.

pub mod dictionary;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod session;

pub use dictionary::{
    ChannelTemplate, ChannelValue, CommandTemplate, DictionaryHandle, DictionaryService,
    InMemoryDictionary, ValueType,
};
pub use dispatch::{unix_timestamp, CommandDispatcher, TelemetryDispatcher, TelemetrySink};
pub use error::{LinkError, Result};
pub use executor::{CommandExecutor, LoggingExecutor};
pub use session::{LinkConfig, LinkSession};
