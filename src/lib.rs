//! jmlbench - LLM annotation benchmark harness
//!
//! jmlbench measures how reliably a generative model can produce formally
//! verifiable JML annotations for a Java source unit, by driving the model
//! through bounded generate→verify→retry cycles against three external
//! verification tools and aggregating the outcomes.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod generate;
pub mod runner;
pub mod storage;
pub mod verify;

pub use error::{JmlBenchError, Result};
