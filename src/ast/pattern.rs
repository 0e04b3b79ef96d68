use serde::{Deserialize, Serialize};

use crate::ast::Literal;
use crate::location::Location;

/// Match patterns. Patterns carry no inference slot of their own; the names
/// they bind are typed through the case's scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Wildcard(Location),
    /// Bind the whole discriminant (or the matched field) to a name.
    Binding(String, Location),
    Literal(Literal<()>),
    /// A variant constructor with nested field patterns: `Some(v)`.
    Constructor {
        name: String,
        fields: Vec<Pattern>,
        position: Location,
    },
    Struct {
        fields: Vec<(String, Pattern)>,
        position: Location,
    },
    Tuple(Vec<Pattern>, Location),
}

impl Pattern {
    pub fn position(&self) -> Location {
        match self {
            Pattern::Wildcard(position)
            | Pattern::Binding(_, position)
            | Pattern::Tuple(_, position) => position.clone(),
            Pattern::Literal(literal) => literal.position(),
            Pattern::Constructor { position, .. } | Pattern::Struct { position, .. } => {
                position.clone()
            }
        }
    }
}
