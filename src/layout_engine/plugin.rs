use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::{Direction, LayoutEngineIdentity};
use crate::common::collections::HashMap;
use crate::model::WindowId;

/// What a tree layout engine asks of its host when placing a new window.
///
/// Both answers are read at the start of every insertion and never cached
/// by the engine.
pub trait TreeLayoutContext: Send + Sync + fmt::Debug {
    /// The side of the anchor a new window goes to.
    fn add_window_direction(&self, engine: LayoutEngineIdentity) -> Direction;

    /// The window new windows are placed next to, usually the last focused
    /// window of the workspace that owns `engine`.
    fn last_focused_window(&self, engine: LayoutEngineIdentity) -> Option<WindowId>;
}

/// Host-side state backing [`TreeLayoutContext`] for any number of engines.
#[derive(Debug)]
pub struct TreeLayoutPlugin {
    default_direction: Direction,
    directions: RwLock<HashMap<LayoutEngineIdentity, Direction>>,
    focused: RwLock<HashMap<LayoutEngineIdentity, WindowId>>,
}

impl TreeLayoutPlugin {
    pub fn new(default_direction: Direction) -> Self {
        let default_direction = if default_direction.is_cardinal() {
            default_direction
        } else {
            warn!(%default_direction, "default add direction must be cardinal, using right");
            Direction::RIGHT
        };
        TreeLayoutPlugin {
            default_direction,
            directions: RwLock::new(HashMap::default()),
            focused: RwLock::new(HashMap::default()),
        }
    }

    pub fn default_direction(&self) -> Direction { self.default_direction }

    /// Sets the side new windows of `engine` are added to. Only cardinal
    /// directions are accepted.
    pub fn set_add_window_direction(&self, engine: LayoutEngineIdentity, direction: Direction) {
        if !direction.is_cardinal() {
            warn!(%engine, %direction, "ignoring non-cardinal add direction");
            return;
        }
        debug!(%engine, %direction, "set add window direction");
        self.directions.write().insert(engine, direction);
    }

    pub fn set_last_focused_window(&self, engine: LayoutEngineIdentity, window: Option<WindowId>) {
        let mut focused = self.focused.write();
        match window {
            Some(wid) => {
                focused.insert(engine, wid);
            }
            None => {
                focused.remove(&engine);
            }
        }
    }
}

impl Default for TreeLayoutPlugin {
    fn default() -> Self { Self::new(Direction::RIGHT) }
}

impl TreeLayoutContext for TreeLayoutPlugin {
    fn add_window_direction(&self, engine: LayoutEngineIdentity) -> Direction {
        self.directions.read().get(&engine).copied().unwrap_or(self.default_direction)
    }

    fn last_focused_window(&self, engine: LayoutEngineIdentity) -> Option<WindowId> {
        self.focused.read().get(&engine).copied()
    }
}
