//! JikiScript executor
//!
//! Walks the AST statement by statement, recording one frame per observable
//! step through the [`ExecutionContext`]. The first runtime error becomes the
//! trace's final ERROR frame and execution stops.
//!
//! Split across files with `impl Executor` blocks:
//! - this module: state, function hoisting, calls and frame recording
//! - `statements`: one method per statement form, loops included
//! - `expressions`: expression evaluation, indexing and operators

mod expressions;
mod statements;

use super::ast::{FunctionDecl, Program, Statement};
use crate::interpreter::InterpretOptions;
use crate::runtime::describe::Step;
use crate::runtime::frame::FrameResult;
use crate::runtime::scope::{Environment, GlobalAccess};
use crate::runtime::{
    ExecutionContext, ExternalFunction, FrozenValue, RunOutput, RuntimeError, RuntimeErrorKind,
    Value,
};
use crate::syntax::SourceLocation;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Deepest chain of learner function calls before the run is stopped.
pub(crate) const MAX_CALL_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// How a loop body ended.
pub(crate) enum LoopBodyResult {
    /// Ran to completion or hit `next`/`continue`.
    Continue,
    /// Hit `break`.
    Break,
    /// A `return` is unwinding through the loop.
    Exit,
}

pub struct Executor<'a> {
    pub(crate) ctx: ExecutionContext,
    pub(crate) env: Environment,
    functions: FxHashMap<String, &'a FunctionDecl>,
    externals: FxHashMap<String, ExternalFunction>,
    pub(crate) control_flow: ControlFlow,
    /// Loops open in the current function body (or at top level).
    pub(crate) loop_depth: usize,
}

impl<'a> Executor<'a> {
    pub fn new(source: &str, options: &InterpretOptions) -> Self {
        let ctx = options.context(source);
        let env = Environment::new(GlobalAccess::Hidden, ctx.features().allow_shadowing);
        let externals = options
            .external_functions
            .iter()
            .map(|func| (func.name.clone(), func.clone()))
            .collect();

        Executor {
            ctx,
            env,
            functions: FxHashMap::default(),
            externals,
            control_flow: ControlFlow::Normal,
            loop_depth: 0,
        }
    }

    /// Run every top-level statement. Returns `false` if execution stopped
    /// at an ERROR frame.
    pub fn execute(&mut self, program: &'a Program) -> bool {
        let outcome = self
            .hoist_functions(program)
            .and_then(|()| self.execute_top_level(program));

        match outcome {
            Ok(()) => true,
            Err(error) => {
                self.fail(&error);
                false
            }
        }
    }

    /// Call a learner function by name from the host, outside any statement.
    ///
    /// The call is attributed to a synthetic location (line 0) and records
    /// no frame of its own; the function body records its frames as usual.
    pub fn call_entry(&mut self, name: &str, args: Vec<Value>) -> Option<Value> {
        match self.call_function(name, args, SourceLocation::default()) {
            Ok(value) => Some(value),
            Err(error) => {
                self.fail(&error);
                None
            }
        }
    }

    pub fn finish(self) -> RunOutput {
        self.ctx.finish()
    }

    /// Register top-level declarations so they can be called from anywhere,
    /// including before their definition.
    fn hoist_functions(&mut self, program: &'a Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            let Statement::Function(decl) = statement else {
                continue;
            };

            if self.externals.contains_key(&decl.name) || self.functions.contains_key(&decl.name) {
                return Err(RuntimeErrorKind::FunctionAlreadyDefined {
                    name: decl.name.clone(),
                }
                .at(decl.location));
            }

            for (i, param) in decl.params.iter().enumerate() {
                if decl.params[..i].contains(param) {
                    return Err(RuntimeErrorKind::DuplicateParameterName {
                        parameter: param.clone(),
                    }
                    .at(decl.location));
                }
            }

            self.functions.insert(decl.name.clone(), decl);
        }

        debug!(count = self.functions.len(), "hoisted functions");
        Ok(())
    }

    fn execute_top_level(&mut self, program: &'a Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            if let Statement::Function(_) = statement {
                continue;
            }
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    /// Resolve a call: learner functions first, then external functions.
    pub(crate) fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Some(decl) = self.functions.get(name).copied() {
            return self.call_user_function(decl, args, location);
        }

        if let Some(func) = self.externals.get(name).cloned() {
            let value = func
                .invoke(&mut self.ctx, &args)
                .map_err(|kind| kind.at(location))?;
            self.ctx
                .guard_execution_time()
                .map_err(|kind| kind.at(location))?;
            return Ok(value);
        }

        Err(RuntimeErrorKind::FunctionNotFound {
            name: name.to_string(),
        }
        .at(location))
    }

    fn call_user_function(
        &mut self,
        decl: &'a FunctionDecl,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if args.len() != decl.params.len() {
            return Err(RuntimeErrorKind::InvalidNumberOfArguments {
                function: decl.name.clone(),
                expected: decl.params.len().to_string(),
                got: args.len(),
            }
            .at(location));
        }
        if self.env.call_depth() >= MAX_CALL_DEPTH {
            return Err(RuntimeErrorKind::InfiniteRecursion {
                name: decl.name.clone(),
            }
            .at(location));
        }

        self.env.push_call();
        for (param, arg) in decl.params.iter().zip(args) {
            // arguments are passed by value
            self.env
                .declare(param, arg.deep_clone())
                .map_err(|kind| kind.at(location))?;
        }

        let outer_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        for statement in &decl.body {
            self.execute_statement(statement)?;
            if matches!(self.control_flow, ControlFlow::Return(_)) {
                break;
            }
        }
        self.loop_depth = outer_loop_depth;

        let value = match std::mem::replace(&mut self.control_flow, ControlFlow::Normal) {
            ControlFlow::Return(value) => value,
            _ => Value::None,
        };
        self.env.pop_call();
        Ok(value)
    }

    /// Record a SUCCESS frame for `statement` with the current bindings.
    pub(crate) fn record(
        &mut self,
        statement: &Statement,
        value: Option<FrozenValue>,
        step: Step,
    ) -> Result<(), RuntimeError> {
        let location = statement.location();
        let result = FrameResult {
            kind: statement.kind(),
            value,
        };
        let variables = self.env.snapshot();
        self.ctx.add_success_frame(location, result, step, variables);
        self.ctx
            .guard_execution_time()
            .map_err(|kind| kind.at(location))
    }

    fn fail(&mut self, error: &RuntimeError) {
        debug!(error = %error, "JikiScript run stopped");
        let variables = self.env.snapshot();
        self.ctx.add_error_frame(error, variables);
    }
}
