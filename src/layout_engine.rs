pub mod engine;
pub(crate) mod graph;
pub mod plugin;
pub mod script;
pub mod systems;

pub use engine::{
    LayoutEngine, LayoutEngineAction, LayoutEngineIdentity, LayoutError, WindowSize, WindowState,
};
pub use graph::{Direction, DirectionKind, Orientation, ParseDirectionError};
pub use plugin::{TreeLayoutContext, TreeLayoutPlugin};
pub use systems::TreeLayoutEngine;
