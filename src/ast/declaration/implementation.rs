use serde::{Deserialize, Serialize};

use crate::ast::{MethodDeclaration, TypeName};
use crate::location::Location;

/// A reusable method group. A class pulling it in must cover the required
/// attributes by name and type; the block's methods are then synthesized
/// onto the class as external methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImplDeclaration<I> {
    pub name: String,
    pub required_attributes: Vec<(String, TypeName)>,
    pub methods: Vec<MethodDeclaration<I>>,
    pub position: Location,
}
