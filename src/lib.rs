//! Drive a container CLI with docker-style commands.
//!
//! Logical operations and foreign-dialect command lines are turned into an
//! ordered list of candidate argument vectors, which are tried against the
//! installed backend until one is accepted. Backend output is normalized
//! into a small set of records.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod output;
pub mod process;
pub mod records;

pub use engine::ContainerEngine;
pub use error::{EngineError, Result};
