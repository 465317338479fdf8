// src/engine/mod.rs

//! Media engine abstraction.
//!
//! The supervisor never touches media itself; it hands an opaque descriptor
//! string to a [`MediaEngine`], gets back an opaque pipeline handle, and
//! only ever starts, stops, queries and releases it. The engine is expected
//! to run its own delivery threads and to invoke the registered buffer
//! probe once per media unit; that probe is the sole liveness input.
//!
//! - [`descriptor`] builds the three pipeline descriptor families.
//! - [`mock`] is a scriptable engine for tests.
//! - [`sim`] is a tick-driven engine for the harness binary.

pub mod descriptor;
pub mod mock;
pub mod sim;

use thiserror::Error;

use crate::surface::VisualId;

pub use mock::MockEngine;
pub use sim::SimEngine;

/// Opaque handle to a running (or stopped) pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub u64);

/// Opaque handle to a named element inside a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Target states a pipeline can be driven to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Playing,
    Stopped,
}

/// Why a descriptor could not be turned into a pipeline.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("malformed descriptor: {0}")]
    Malformed(String),

    #[error("descriptor rejected by engine: {0}")]
    Rejected(String),
}

/// Callback invoked by the engine for every delivered buffer.
pub type BufferProbe = Box<dyn Fn() + Send + Sync>;

/// Contract with the external media engine.
///
/// All operations are infallible except `build`; a real engine wraps its
/// own error reporting behind logging, the way sink state changes and
/// element lookups behave in practice. `find_element` and `bound_visual`
/// return `None` rather than failing when the pipeline has no such element.
pub trait MediaEngine: Send + Sync {
    /// Parse the descriptor and assemble a pipeline in the stopped state.
    fn build(&self, descriptor: &str) -> Result<PipelineId, BuildError>;

    /// Drive the pipeline to the target state.
    fn set_state(&self, pipeline: PipelineId, state: PipelineState);

    /// Look up a named element inside the pipeline graph.
    fn find_element(&self, pipeline: PipelineId, name: &str) -> Option<ElementId>;

    /// The visual the sink element is bound to, if it exposes one.
    fn bound_visual(&self, element: ElementId) -> Option<VisualId>;

    /// Register a probe invoked once per buffer flowing through `element`.
    fn observe_buffers(&self, element: ElementId, probe: BufferProbe);

    /// Destroy the pipeline and everything it owns. The handle is dead
    /// afterwards.
    fn release(&self, pipeline: PipelineId);
}
