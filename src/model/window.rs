use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// An identifier representing a window.
///
/// The identity is what the layout engine compares; it never looks at the
/// window behind it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: u32,
}

impl WindowId {
    pub const fn new(pid: pid_t, idx: u32) -> WindowId { WindowId { pid, idx } }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pid, self.idx)
    }
}

/// The capabilities the layout engine needs from a window owned by the host.
pub trait Window: Send + Sync + fmt::Debug {
    fn id(&self) -> WindowId;

    /// Asks the host to give this window keyboard focus.
    fn focus(&self);

    /// Asks the host to hide this window.
    fn hide(&self);
}

pub type WindowRef = Arc<dyn Window>;
