//! JavaScript subset executor
//!
//! Same frame discipline as the JikiScript executor, with JavaScript's
//! scoping: function bodies see (and may update) globals, `let`/`const` are
//! block scoped and arrays index from 0. Coercion, truthiness and loose
//! equality are each gated by a [`LanguageFeatures`] flag.
//!
//! [`LanguageFeatures`]: crate::runtime::LanguageFeatures

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
const MAX_CALL_DEPTH: usize = 64;

/// Names provided by the runtime itself; learner functions may not reuse them.
const BUILTIN_FUNCTIONS: &[&str] = &["console"];

#[derive(Debug, Clone)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub(crate) enum LoopBodyResult {
    Continue,
    Break,
    Exit,
}

pub struct Executor<'a> {
    pub(crate) ctx: ExecutionContext,
    pub(crate) env: Environment,
    functions: FxHashMap<String, &'a FunctionDecl>,
    externals: FxHashMap<String, ExternalFunction>,
    pub(crate) control_flow: ControlFlow,
    pub(crate) loop_depth: usize,
}

impl<'a> Executor<'a> {
    pub fn new(source: &str, options: &InterpretOptions) -> Self {
        let ctx = options.context(source);
        let env = Environment::new(GlobalAccess::Visible, ctx.features().allow_shadowing);
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

    pub fn execute(&mut self, program: &'a Program) -> bool {
        let outcome = self.hoist_functions(program).and_then(|()| {
            for statement in &program.statements {
                if let Statement::Function(_) = statement {
                    continue;
                }
                self.execute_statement(statement)?;
            }
            Ok(())
        });

        match outcome {
            Ok(()) => true,
            Err(error) => {
                self.fail(&error);
                false
            }
        }
    }

    /// Call a learner function from the host at a synthetic location.
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

    fn hoist_functions(&mut self, program: &'a Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            let Statement::Function(decl) = statement else {
                continue;
            };

            let taken = BUILTIN_FUNCTIONS.contains(&decl.name.as_str())
                || self.externals.contains_key(&decl.name)
                || self.functions.contains_key(&decl.name);
            if taken {
                return Err(RuntimeErrorKind::FunctionAlreadyDefined {
                    name: decl.name.clone(),
                }
                .at(decl.location));
            }

            if let Some(duplicate) = decl
                .params
                .iter()
                .enumerate()
                .find(|(i, param)| decl.params[..*i].contains(param))
                .map(|(_, param)| param)
            {
                return Err(RuntimeErrorKind::DuplicateParameterName {
                    parameter: duplicate.clone(),
                }
                .at(decl.location));
            }

            self.functions.insert(decl.name.clone(), decl);
        }

        debug!(count = self.functions.len(), "hoisted functions");
        Ok(())
    }

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

        // objects and arrays are passed by reference
        self.env.push_call();
        for (param, arg) in decl.params.iter().zip(args) {
            self.env
                .declare(param, arg)
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
        debug!(error = %error, "JavaScript run stopped");
        let variables = self.env.snapshot();
        self.ctx.add_error_frame(error, variables);
    }
}
