//! Per-node inference implementations: one `TypeCheckable` impl per
//! expression and statement kind. Nodes are consumed untyped and rebuilt
//! with `TypeInformation`, so re-entry per node is impossible by
//! construction.

pub mod expression;
pub mod statement;
