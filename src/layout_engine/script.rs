//! Replaying layout operations from a text script.
//!
//! A script holds one RON-encoded [`ScriptStep`] per line. Blank lines and
//! lines starting with `//` are skipped.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Direction, LayoutEngine, TreeLayoutEngine, TreeLayoutPlugin};
use crate::common::collections::HashMap;
use crate::common::config::TreeLayoutSettings;
use crate::model::{Monitor, Window, WindowId, WindowRef};
use crate::sys::geometry::{Point, Rectangle};

/// Windows created by scripts all belong to this process id.
const SCRIPT_PID: i32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Add(u32),
    Remove(u32),
    /// Marks a window as focused, making it the anchor for new windows.
    Focus(u32),
    SetDirection(Direction),
    MoveToPoint { id: u32, x: f64, y: f64 },
    Swap { id: u32, direction: Direction },
    FocusDirection { id: u32, direction: Direction },
    MoveEdges { id: u32, edges: Direction, dx: f64, dy: f64 },
    Minimize(u32),
    Restore(u32),
    Phantom(u32),
    RemovePhantom(u32),
    HidePhantoms,
    Layout,
}

pub fn parse_script(text: &str) -> anyhow::Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let step = ron::from_str(line).with_context(|| format!("line {}: `{line}`", n + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

#[derive(Debug, Default)]
struct Events {
    focused: Vec<WindowId>,
    hidden: Vec<WindowId>,
}

/// A stand-in window that records what the engine asks of it.
#[derive(Debug)]
struct ScriptWindow {
    id: WindowId,
    events: Arc<Mutex<Events>>,
}

impl Window for ScriptWindow {
    fn id(&self) -> WindowId { self.id }

    fn focus(&self) { self.events.lock().focused.push(self.id); }

    fn hide(&self) { self.events.lock().hidden.push(self.id); }
}

pub struct ScriptRunner {
    plugin: Arc<TreeLayoutPlugin>,
    engine: TreeLayoutEngine,
    windows: HashMap<u32, WindowRef>,
    events: Arc<Mutex<Events>>,
    area: Rectangle,
    monitor: Monitor,
}

impl ScriptRunner {
    pub fn new(settings: TreeLayoutSettings, area: Rectangle) -> Self {
        let plugin = Arc::new(TreeLayoutPlugin::new(settings.default_add_direction));
        let engine = TreeLayoutEngine::new(plugin.clone(), settings);
        ScriptRunner {
            plugin,
            engine,
            windows: HashMap::default(),
            events: Arc::default(),
            area,
            monitor: Monitor::new("script", area),
        }
    }

    pub fn engine(&self) -> &TreeLayoutEngine { &self.engine }

    fn window(&mut self, id: u32) -> WindowRef {
        let events = self.events.clone();
        self.windows
            .entry(id)
            .or_insert_with(|| -> WindowRef {
                Arc::new(ScriptWindow { id: Self::wid(id), events })
            })
            .clone()
    }

    fn wid(id: u32) -> WindowId { WindowId::new(SCRIPT_PID, id) }

    pub fn step(&mut self, step: &ScriptStep, out: &mut impl Write) -> anyhow::Result<()> {
        debug!(?step, "replaying");
        let engine = &self.engine;
        let next = match *step {
            ScriptStep::Add(id) => {
                let window = self.window(id);
                self.engine.add(window)
            }
            ScriptStep::Remove(id) => engine.remove(Self::wid(id)),
            ScriptStep::Focus(id) => {
                self.window(id).focus();
                self.engine.clone()
            }
            ScriptStep::SetDirection(direction) => {
                self.plugin.set_add_window_direction(engine.identity(), direction);
                engine.clone()
            }
            ScriptStep::MoveToPoint { id, x, y } => {
                let window = self.window(id);
                self.engine.move_window_to_point(window, Point::new(x, y))
            }
            ScriptStep::Swap { id, direction } => {
                engine.swap_window_in_direction(direction, Self::wid(id))
            }
            ScriptStep::FocusDirection { id, direction } => {
                engine.focus_window_in_direction(direction, Self::wid(id))
            }
            ScriptStep::MoveEdges { id, edges, dx, dy } => {
                engine.move_window_edges_in_direction(edges, Point::new(dx, dy), Self::wid(id))
            }
            ScriptStep::Minimize(id) => {
                let window = self.window(id);
                self.engine.minimize_window_start(window)
            }
            ScriptStep::Restore(id) => {
                let window = self.window(id);
                self.engine.minimize_window_end(window)
            }
            ScriptStep::Phantom(id) => {
                let window = self.window(id);
                self.engine.add_phantom_window(window)?
            }
            ScriptStep::RemovePhantom(id) => engine.remove_phantom_window(Self::wid(id))?,
            ScriptStep::HidePhantoms => {
                engine.hide_phantom_windows();
                engine.clone()
            }
            ScriptStep::Layout => {
                self.write_layout(out)?;
                engine.clone()
            }
        };
        if next.ptr_eq(&self.engine) && step_changes_layout(step) {
            info!(?step, "step left the layout unchanged");
        }
        self.engine = next;
        self.drain_events(out)
    }

    fn drain_events(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let events = std::mem::take(&mut *self.events.lock());
        for wid in events.hidden {
            writeln!(out, "hide {wid}")?;
        }
        if let Some(&wid) = events.focused.last() {
            self.plugin.set_last_focused_window(self.engine.identity(), Some(wid));
        }
        for wid in events.focused {
            writeln!(out, "focus {wid}")?;
        }
        Ok(())
    }

    pub fn write_layout(&self, out: &mut impl Write) -> anyhow::Result<()> {
        write!(out, "{}", self.engine.draw_tree())?;
        for state in self.engine.do_layout(self.area, &self.monitor) {
            let r = state.rectangle;
            writeln!(
                out,
                "{} x={} y={} w={} h={} {}",
                state.id(),
                r.x,
                r.y,
                r.width,
                r.height,
                state.size
            )?;
        }
        Ok(())
    }

    pub fn run(&mut self, steps: &[ScriptStep], out: &mut impl Write) -> anyhow::Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.step(step, out).with_context(|| format!("step {}: {step:?}", i + 1))?;
        }
        Ok(())
    }
}

fn step_changes_layout(step: &ScriptStep) -> bool {
    !matches!(
        step,
        ScriptStep::Focus(_)
            | ScriptStep::SetDirection(_)
            | ScriptStep::FocusDirection { .. }
            | ScriptStep::HidePhantoms
            | ScriptStep::Layout
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn run(script: &str) -> String {
        let steps = parse_script(script).unwrap();
        let mut runner =
            ScriptRunner::new(TreeLayoutSettings::default(), Rectangle::new(0, 0, 100, 100));
        let mut out = Vec::new();
        runner.run(&steps, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_every_step_form() {
        let steps = parse_script(
            r#"
            // set up
            Add(1)
            SetDirection("down")
            MoveToPoint(id: 3, x: 0.7, y: 0.5)
            Swap(id: 1, direction: "right")
            FocusDirection(id: 1, direction: "left_up")
            MoveEdges(id: 2, edges: "left", dx: -0.1, dy: 0.0)
            HidePhantoms

            Layout
            "#,
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Add(1),
                ScriptStep::SetDirection(Direction::DOWN),
                ScriptStep::MoveToPoint { id: 3, x: 0.7, y: 0.5 },
                ScriptStep::Swap { id: 1, direction: Direction::RIGHT },
                ScriptStep::FocusDirection { id: 1, direction: Direction::LEFT_UP },
                ScriptStep::MoveEdges { id: 2, edges: Direction::LEFT, dx: -0.1, dy: 0.0 },
                ScriptStep::HidePhantoms,
                ScriptStep::Layout,
            ]
        );
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse_script("Add(1)\nFrobnicate(2)\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_script("SetDirection(\"north\")").is_err());
    }

    #[test]
    fn layout_prints_rectangles() {
        let out = run("Add(1)\nAdd(2)\nLayout\n");
        assert!(out.contains("1:1 x=0 y=0 w=50 h=100 normal"), "{out}");
        assert!(out.contains("1:2 x=50 y=0 w=50 h=100 normal"), "{out}");
    }

    #[test]
    fn focus_sets_the_anchor() {
        let out = run("Add(1)\nAdd(2)\nFocus(1)\nSetDirection(\"down\")\nAdd(3)\nLayout\n");
        assert!(out.contains("focus 1:1"));
        assert!(out.contains("1:1 x=0 y=0 w=50 h=50 normal"), "{out}");
        assert!(out.contains("1:3 x=0 y=50 w=50 h=50 normal"), "{out}");
    }

    #[test]
    fn focus_direction_reports_focus() {
        let out = run("Add(1)\nAdd(2)\nFocusDirection(id: 1, direction: \"right\")\n");
        assert_eq!(out, "focus 1:2\n");
    }

    #[test]
    fn phantoms_are_hidden_and_rejected_twice() {
        let out = run("Add(1)\nPhantom(2)\nHidePhantoms\nRemovePhantom(2)\nLayout\n");
        assert!(out.contains("hide 1:2"));
        assert!(!out.contains("1:2 x="));

        let steps = parse_script("Add(1)\nPhantom(1)\n").unwrap();
        let mut runner =
            ScriptRunner::new(TreeLayoutSettings::default(), Rectangle::new(0, 0, 100, 100));
        let err = runner.run(&steps, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("already held"));
    }

    #[test]
    fn minimized_windows_are_listed_last() {
        let out = run("Add(1)\nAdd(2)\nMinimize(1)\nLayout\n");
        assert!(out.contains("1:2 x=0 y=0 w=100 h=100 normal"), "{out}");
        assert!(out.contains("1:1 x=0 y=0 w=0 h=0 minimized"), "{out}");
    }
}
