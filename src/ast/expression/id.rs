use serde::{Deserialize, Serialize};

use crate::ast::TypeName;
use crate::location::Location;

/// A name reference. `type_args` is non-empty when the source supplies
/// explicit type arguments (`id<String>`), which forces monomorphization of
/// a generic function at this site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id<I> {
    pub name: String,
    pub type_args: Vec<TypeName>,
    pub info: I,
    pub position: Location,
}

impl Id<()> {
    pub fn new(name: impl ToString) -> Id<()> {
        Id {
            name: name.to_string(),
            type_args: vec![],
            info: (),
            position: Location::default(),
        }
    }
}
