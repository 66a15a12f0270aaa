pub mod codedata;
pub mod edit;
pub mod error;
pub mod node;
pub mod position;
pub mod property;
pub mod value;

// Re-export commonly used types
pub use codedata::Codedata;
pub use edit::{EditSet, FileEdits, TextEdit};
pub use error::SyncError;
pub use node::{DependencyNode, ModelNode, Node, NodeKind};
pub use position::{Location, Position, Span};
pub use property::{Property, PropertyBuilder};
pub use value::{PropertyValue, ValueType};
