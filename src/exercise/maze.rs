//! Maze exercise
//!
//! A character walks a grid of cells: `0` open, `1` wall, `2` start and
//! `3` target. Learner code drives it with `move`, `turn_left` and
//! `turn_right`; walking into a wall or off the grid is a logic error the
//! learner sees verbatim.

use super::scenario::{expectations, setup, Expect, Scenario, ScenarioKind, VisualScenario};
use super::{no_functions, Exercise, ExerciseDefinition, Task};
use crate::interpreter::Language;
use crate::runtime::{Arity, ExecutionContext, ExternalFunction, Value};
use crate::timeline::Animation;
use serde_json::json;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const MOVE_MS: u64 = 200;
const TURN_MS: u64 = 150;

pub const WALL: u8 = 1;
pub const TARGET: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Counter-clockwise on screen, as seen by the character.
    fn left(self) -> Self {
        match self {
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
        }
    }

    fn right(self) -> Self {
        match self {
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
        }
    }

    /// Rotation in degrees for a character facing this way.
    fn rotation(self) -> i64 {
        match self {
            Direction::Up => 0,
            Direction::Right => 90,
            Direction::Down => 180,
            Direction::Left => -90,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
struct MazeState {
    grid: Vec<Vec<u8>>,
    row: usize,
    col: usize,
    direction: Direction,
    rotation: i64,
    animations: Vec<Animation>,
}

impl MazeState {
    fn animate(&mut self, ctx: &ExecutionContext, duration_ms: u64, transformations: serde_json::Value) {
        self.animations.push(Animation {
            targets: ".character".to_string(),
            offset_ms: ctx.current_time_in_ms(),
            duration_ms: duration_ms as f64,
            transformations,
        });
    }

    fn step(&mut self, ctx: &mut ExecutionContext) -> anyhow::Result<serde_json::Value> {
        let (row, col) = (self.row as i64, self.col as i64);
        let (row, col) = match self.direction {
            Direction::Up => (row - 1, col),
            Direction::Down => (row + 1, col),
            Direction::Left => (row, col - 1),
            Direction::Right => (row, col + 1),
        };

        let cell = usize::try_from(row)
            .ok()
            .zip(usize::try_from(col).ok())
            .and_then(|(r, c)| self.grid.get(r).and_then(|cells| cells.get(c)).map(|cell| (r, c, *cell)));
        let Some((row, col, cell)) = cell else {
            return Err(ctx.logic_error("Cannot move outside the maze!"));
        };
        if cell == WALL {
            return Err(ctx.logic_error("Cannot move into a blocked cell!"));
        }

        self.row = row;
        self.col = col;
        let width = self.grid.first().map_or(1, Vec::len).max(1) as f64;
        let height = self.grid.len().max(1) as f64;
        let left = (col as f64 + 0.5) * 100.0 / width;
        let top = (row as f64 + 0.5) * 100.0 / height;
        self.animate(ctx, MOVE_MS, json!({ "left": left, "top": top }));
        ctx.fast_forward(MOVE_MS);
        Ok(serde_json::Value::Null)
    }

    fn turn(&mut self, ctx: &mut ExecutionContext, left: bool) -> anyhow::Result<serde_json::Value> {
        if left {
            self.rotation -= 90;
            self.direction = self.direction.left();
        } else {
            self.rotation += 90;
            self.direction = self.direction.right();
        }
        self.animate(ctx, TURN_MS, json!({ "rotate": self.rotation }));
        ctx.fast_forward(TURN_MS);
        Ok(serde_json::Value::Null)
    }
}

pub struct MazeExercise {
    state: Rc<RefCell<MazeState>>,
}

impl MazeExercise {
    pub fn new() -> Self {
        MazeExercise {
            state: Rc::new(RefCell::new(MazeState {
                grid: Vec::new(),
                row: 0,
                col: 0,
                direction: Direction::Down,
                rotation: Direction::Down.rotation(),
                animations: Vec::new(),
            })),
        }
    }

    pub fn setup_grid(&mut self, grid: Vec<Vec<u8>>) {
        self.state.borrow_mut().grid = grid;
    }

    pub fn setup_position(&mut self, row: usize, col: usize) {
        let mut state = self.state.borrow_mut();
        state.row = row;
        state.col = col;
    }

    pub fn setup_direction(&mut self, direction: Direction) {
        let mut state = self.state.borrow_mut();
        state.direction = direction;
        state.rotation = direction.rotation();
    }

    pub fn position(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.row, state.col)
    }

    pub fn direction(&self) -> Direction {
        self.state.borrow().direction
    }

    /// `Some("win")` once the character stands on the target.
    pub fn game_result(&self) -> Option<&'static str> {
        let state = self.state.borrow();
        let cell = state.grid.get(state.row).and_then(|cells| cells.get(state.col));
        (cell == Some(&TARGET)).then_some("win")
    }
}

impl Default for MazeExercise {
    fn default() -> Self {
        MazeExercise::new()
    }
}

impl Exercise for MazeExercise {
    fn slug(&self) -> &'static str {
        "maze"
    }

    fn available_functions(&self) -> Vec<ExternalFunction> {
        let mover = Rc::clone(&self.state);
        let left = Rc::clone(&self.state);
        let right = Rc::clone(&self.state);
        vec![
            ExternalFunction::new("move", Arity::Exact(0), move |ctx, _: &[Value]| {
                mover.borrow_mut().step(ctx)
            })
            .with_description("Move the character forward one cell"),
            ExternalFunction::new("turn_left", Arity::Exact(0), move |ctx, _: &[Value]| {
                left.borrow_mut().turn(ctx, true)
            })
            .with_description("Turn the character 90 degrees left"),
            ExternalFunction::new("turn_right", Arity::Exact(0), move |ctx, _: &[Value]| {
                right.borrow_mut().turn(ctx, false)
            })
            .with_description("Turn the character 90 degrees right"),
        ]
    }

    fn state(&self) -> serde_json::Value {
        let (row, col) = self.position();
        json!({
            "position": format!("{},{}", row, col),
            "direction": self.direction().to_string(),
            "gameResult": self.game_result().unwrap_or("playing"),
        })
    }

    fn animations(&self) -> Vec<Animation> {
        self.state.borrow().animations.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn factory() -> Box<dyn Exercise> {
    Box::new(MazeExercise::new())
}

fn maze_scenario(
    slug: &str,
    name: &str,
    task_id: &str,
    grid: Vec<Vec<u8>>,
    start: (usize, usize),
    direction: Direction,
    target: (usize, usize),
) -> Scenario {
    let visual = VisualScenario {
        setup: Some(setup(move |maze: &mut MazeExercise| {
            maze.setup_grid(grid.clone());
            maze.setup_position(start.0, start.1);
            maze.setup_direction(direction);
        })),
        expectations: expectations(move |maze: &MazeExercise| {
            vec![Expect::new(
                maze.position() == target,
                "You didn't reach the end of the maze.",
            )]
        }),
        code_checks: Vec::new(),
        function_call: None,
        random_seed: None,
    };
    Scenario {
        slug: slug.to_string(),
        name: name.to_string(),
        description: String::new(),
        task_id: task_id.to_string(),
        kind: ScenarioKind::Visual(visual),
    }
}

const JIKISCRIPT_STUB: &str = "// Guide the character to the target\nmove()\n";
const JAVASCRIPT_STUB: &str = "// Guide the character to the target\nmove();\n";

pub fn definition() -> ExerciseDefinition {
    let straight = vec![
        vec![1, 2, 1],
        vec![1, 0, 1],
        vec![1, 0, 1],
        vec![1, 3, 1],
    ];
    let corner = vec![
        vec![2, 0, 0],
        vec![1, 1, 0],
        vec![1, 1, 3],
    ];

    ExerciseDefinition {
        slug: "maze",
        title: "Solve the Maze",
        instructions: "Use move(), turn_left() and turn_right() to reach the target cell.",
        factory: Some(factory),
        functions: no_functions,
        tasks: vec![
            Task::new("straight-path", "A straight path", "Move forward to the end of the maze.")
                .with_hints(&["Call move() once per cell"])
                .requiring(&["straight-down"]),
            Task::new("corner", "Around the corner", "Turn to follow the path.")
                .with_hints(&["Turning left while facing right points you up"]),
        ],
        scenarios: vec![
            maze_scenario(
                "straight-down",
                "Walk down a straight corridor",
                "straight-path",
                straight,
                (0, 1),
                Direction::Down,
                (3, 1),
            ),
            maze_scenario(
                "corner",
                "Turn the corner",
                "corner",
                corner,
                (0, 0),
                Direction::Right,
                (2, 2),
            ),
        ],
        stubs: vec![
            (Language::JikiScript, JIKISCRIPT_STUB),
            (Language::JavaScript, JAVASCRIPT_STUB),
        ],
    }
}
