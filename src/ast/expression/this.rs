use serde::{Deserialize, Serialize};

use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct This<I> {
    pub info: I,
    pub position: Location,
}
