//! Provenance metadata linking model entities back to source text.
//!
//! Every property or node that will be echoed back into source carries a
//! [`Codedata`]: the construct kind it originated from, the identifier it had
//! when first read (before any rename in the editing surface), and the span
//! the value was extracted from. Codedata is set once at creation and never
//! mutated afterwards -- renames preserve the original identity so source
//! patching can still find the construct.

use serde::{Deserialize, Serialize};

use crate::node::NodeKind;
use crate::position::Span;

/// Origin tag for a model entity: which construct it came from and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codedata {
    /// Kind of the originating construct.
    pub construct: NodeKind,
    /// Identifier the entity had in source when first extracted, if any.
    /// Preserved across renames in the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Span the value was read from, when extracted from source. `None` for
    /// entities born from a template that have not been materialized yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Codedata {
    /// Provenance for a freshly templated entity of the given construct kind.
    pub fn templated(construct: NodeKind) -> Self {
        Codedata {
            construct,
            original_name: None,
            span: None,
        }
    }

    /// Provenance for an entity extracted from source.
    pub fn extracted(construct: NodeKind, original_name: impl Into<String>, span: Span) -> Self {
        Codedata {
            construct,
            original_name: Some(original_name.into()),
            span: Some(span),
        }
    }

    /// Returns the original identifier, falling back to `current` when this
    /// entity was never named in source.
    pub fn source_name<'a>(&'a self, current: &'a str) -> &'a str {
        self.original_name.as_deref().unwrap_or(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn templated_codedata_has_no_source_identity() {
        let cd = Codedata::templated(NodeKind::Call);
        assert_eq!(cd.construct, NodeKind::Call);
        assert!(cd.original_name.is_none());
        assert!(cd.span.is_none());
    }

    #[test]
    fn source_name_prefers_original() {
        let span = Span::point(Position::new(0, 0));
        let cd = Codedata::extracted(NodeKind::Connection, "backend", span);
        assert_eq!(cd.source_name("renamed"), "backend");

        let fresh = Codedata::templated(NodeKind::Connection);
        assert_eq!(fresh.source_name("renamed"), "renamed");
    }

    #[test]
    fn serde_roundtrip() {
        let cd = Codedata::extracted(
            NodeKind::Agent,
            "planner",
            Span::new(Position::new(2, 0), Position::new(2, 40)),
        );
        let json = serde_json::to_string(&cd).unwrap();
        let back: Codedata = serde_json::from_str(&json).unwrap();
        assert_eq!(cd, back);
    }
}
