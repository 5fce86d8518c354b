use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rectangle;

/// The monitor a layout is being drawn on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub name: String,
    pub working_area: Rectangle,
}

impl Monitor {
    pub fn new(name: impl Into<String>, working_area: Rectangle) -> Self {
        Monitor { name: name.into(), working_area }
    }
}
