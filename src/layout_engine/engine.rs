use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum::Display;

use super::Direction;
use crate::model::{Monitor, WindowId, WindowRef};
use crate::sys::geometry::{Point, Rectangle};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Names one layout engine across all the values it produces. Every value
/// returned by an operation keeps the identity of the engine it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayoutEngineIdentity(u64);

impl LayoutEngineIdentity {
    pub fn new() -> Self { Self(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)) }
}

impl Default for LayoutEngineIdentity {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for LayoutEngineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "engine#{}", self.0) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WindowSize {
    #[default]
    Normal,
    Minimized,
}

/// Where one window should be drawn.
#[derive(Clone, Debug)]
pub struct WindowState {
    pub window: WindowRef,
    pub rectangle: Rectangle,
    pub size: WindowSize,
}

impl WindowState {
    pub fn id(&self) -> WindowId { self.window.id() }
}

impl PartialEq for WindowState {
    fn eq(&self, other: &Self) -> bool {
        self.window.id() == other.window.id()
            && self.rectangle == other.rectangle
            && self.size == other.size
    }
}

/// An engine-specific command routed through the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEngineAction {
    pub name: String,
    pub target: LayoutEngineIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("window {0} is already held by this layout engine")]
    DuplicatePhantom(WindowId),
    #[error("window {0} is not a phantom window of this layout engine")]
    NotPhantom(WindowId),
    #[error("action addressed to {expected} was sent to {actual}")]
    IdentityMismatch {
        expected: LayoutEngineIdentity,
        actual: LayoutEngineIdentity,
    },
}

/// The operations a workspace performs on its layout engine.
///
/// Engines are values: every operation leaves `self` untouched and returns
/// the engine that results. When an operation does not apply (unknown
/// window, no neighbour, rejected resize) the returned engine is a cheap
/// clone sharing all of its state with `self`.
pub trait LayoutEngine: Clone + Send + Sync + fmt::Debug {
    fn identity(&self) -> LayoutEngineIdentity;

    fn name(&self) -> &str;

    /// Number of windows held, including phantom and minimized windows.
    fn count(&self) -> usize;

    fn contains(&self, window: WindowId) -> bool;

    fn add(&self, window: WindowRef) -> Self;

    fn remove(&self, window: WindowId) -> Self;

    fn get_first_window(&self) -> Option<WindowRef>;

    /// Focuses the window adjacent to `window`. The returned engine always
    /// shares its state with `self`.
    fn focus_window_in_direction(&self, direction: Direction, window: WindowId) -> Self;

    fn swap_window_in_direction(&self, direction: Direction, window: WindowId) -> Self;

    /// Inserts `window` next to whatever is under `point`, given in unit
    /// coordinates of the layout area. A held window is moved there.
    fn move_window_to_point(&self, window: WindowRef, point: Point) -> Self;

    /// Moves the given edges of `window` by `deltas`, expressed in unit
    /// coordinates of the layout area.
    fn move_window_edges_in_direction(
        &self,
        edges: Direction,
        deltas: Point,
        window: WindowId,
    ) -> Self;

    fn minimize_window_start(&self, window: WindowRef) -> Self;

    fn minimize_window_end(&self, window: WindowRef) -> Self;

    fn do_layout(&self, rectangle: Rectangle, monitor: &Monitor) -> Vec<WindowState>;

    fn add_phantom_window(&self, window: WindowRef) -> Result<Self, LayoutError>;

    fn remove_phantom_window(&self, window: WindowId) -> Result<Self, LayoutError>;

    fn hide_phantom_windows(&self);

    fn perform_custom_action(&self, action: &LayoutEngineAction) -> Result<Self, LayoutError>;
}
