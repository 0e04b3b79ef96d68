use std::fmt::Display;

use colored::Colorize;

use crate::location::Location;

use super::types::Type;

/// Non-fatal diagnostics, accumulated on the shared warning sink and handed
/// back alongside the checked tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeCheckWarning {
    /// A safe cast whose operand is already assignable to the target.
    UnnecessaryCast { target: Type, position: Location },
    /// A force cast that cannot be verified.
    UnsafeCast {
        from: Type,
        to: Type,
        position: Location,
    },
    UnusedParameter { name: String, position: Location },
    /// `mutate` applied to a binding that is already mutable.
    RedundantMutate { position: Location },
    /// A class with non-static attributes but no `init` method.
    MissingInitMethod {
        class_name: String,
        position: Location,
    },
}

impl TypeCheckWarning {
    pub fn position(&self) -> Location {
        match self {
            TypeCheckWarning::UnnecessaryCast { position, .. }
            | TypeCheckWarning::UnsafeCast { position, .. }
            | TypeCheckWarning::UnusedParameter { position, .. }
            | TypeCheckWarning::RedundantMutate { position }
            | TypeCheckWarning::MissingInitMethod { position, .. } => position.clone(),
        }
    }

    fn message(&self) -> String {
        match self {
            TypeCheckWarning::UnnecessaryCast { target, .. } => {
                format!("unnecessary safe cast to '{target:?}'")
            }
            TypeCheckWarning::UnsafeCast { from, to, .. } => {
                format!("cast from '{from:?}' to '{to:?}' can not be verified")
            }
            TypeCheckWarning::UnusedParameter { name, .. } => {
                format!("parameter '{name}' is never used")
            }
            TypeCheckWarning::RedundantMutate { .. } => {
                "'mutate' on an already mutable binding".to_string()
            }
            TypeCheckWarning::MissingInitMethod { class_name, .. } => {
                format!("class '{class_name}' has state but no 'init' method")
            }
        }
    }
}

impl Display for TypeCheckWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = "warning".yellow().bold();
        f.write_str(
            self.position()
                .annotate(format!("{prefix}: {}", self.message()))
                .as_str(),
        )
    }
}
