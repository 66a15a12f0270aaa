//! Node builders: the per-kind strategies that turn model nodes into source
//! edits and back.
//!
//! One [`NodeBuilder`] implementation exists per supported construct kind.
//! Each produces (a) a canonical template, (b) a node populated from parsed
//! source, and (c) concrete text edits from a populated node, driven through
//! the [`SourceEditBuilder`] token accumulator. The [`Registry`] owns the
//! kind -> builder mapping and falls back to the generic builder for kinds
//! without a specialized implementation.

pub mod builder;
pub mod context;
pub mod kinds;
pub mod registry;
pub mod source;

pub use builder::NodeBuilder;
pub use context::BuildContext;
pub use registry::Registry;
pub use source::SourceEditBuilder;
