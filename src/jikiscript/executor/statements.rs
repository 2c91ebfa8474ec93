//! Statement execution
//!
//! Frames are recorded after a statement's effect, so each frame's variable
//! snapshot already shows what the statement did. Loop headers record one
//! frame per iteration before the body runs; a loop that never iterates
//! records a single skipped-loop frame.

use super::{ControlFlow, Executor, LoopBodyResult};
use crate::jikiscript::ast::{Expression, Statement};
use crate::runtime::describe::Step;
use crate::runtime::{ops, RuntimeError, RuntimeErrorKind, Value};

impl<'a> Executor<'a> {
    pub(crate) fn execute_statement(&mut self, statement: &'a Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Set {
                name,
                value,
                location,
            } => {
                let value = self.evaluate(value)?;
                self.env
                    .declare(name, value.clone())
                    .map_err(|kind| kind.at(*location))?;
                let frozen = value.freeze();
                self.record(
                    statement,
                    Some(frozen.clone()),
                    Step::Declare {
                        name: name.clone(),
                        value: frozen,
                    },
                )
            }

            Statement::Change {
                name,
                value,
                location,
            } => {
                let value = self.evaluate(value)?;
                self.env
                    .assign(name, value.clone())
                    .map_err(|kind| kind.at(*location))?;
                let frozen = value.freeze();
                self.record(
                    statement,
                    Some(frozen.clone()),
                    Step::Assign {
                        name: name.clone(),
                        value: frozen,
                    },
                )
            }

            Statement::ChangeElement {
                object,
                index,
                value,
                location,
            } => {
                let target = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                self.set_element(&target, &index, value.clone())
                    .map_err(|kind| kind.at(*location))?;
                let frozen = value.freeze();
                self.record(
                    statement,
                    Some(frozen.clone()),
                    Step::ChangeElement {
                        name: root_name(object),
                        index: index.freeze(),
                        value: frozen,
                    },
                )
            }

            Statement::Log { value, .. } => {
                let value = self.evaluate(value)?;
                self.ctx.log(value.to_output_string());
                let frozen = value.freeze();
                self.record(statement, Some(frozen.clone()), Step::Log { value: frozen })
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => {
                let value = self.evaluate(condition)?;
                let allow_truthiness = self.ctx.features().allow_truthiness;
                let result = ops::condition(&value, allow_truthiness)
                    .map_err(|kind| kind.at(*location))?;
                self.record(
                    statement,
                    Some(value.freeze()),
                    Step::Condition {
                        kind: "if",
                        value: result,
                    },
                )?;

                if result {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(())
                }
            }

            Statement::Repeat { count, body, .. } => {
                let count_location = count.location();
                let count = self.evaluate(count)?;
                let max = self.ctx.features().max_total_loop_iterations;
                let total = repeat_total(&count, max).map_err(|kind| kind.at(count_location))?;
                self.execute_repeat(statement, total, body)
            }

            Statement::Foreach {
                element,
                iterable,
                body,
                location,
            } => {
                let iterable = self.evaluate(iterable)?;
                let items: Vec<Value> = match &iterable {
                    Value::List(items) => items.borrow().clone(),
                    Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
                    other => {
                        return Err(RuntimeErrorKind::ForeachNotIterable {
                            value: other.to_string(),
                        }
                        .at(*location))
                    }
                };
                self.execute_foreach(statement, element, items, body)
            }

            Statement::Block { body, .. } => self.execute_block(body),

            Statement::Function(decl) => Err(RuntimeErrorKind::NestedFunctionDeclaration {
                name: decl.name.clone(),
            }
            .at(decl.location)),

            Statement::Return { value, location } => {
                if !self.env.in_function() {
                    return Err(RuntimeErrorKind::ReturnOutsideFunction.at(*location));
                }
                let value = match value {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::None,
                };
                let frozen = value.freeze();
                self.record(
                    statement,
                    Some(frozen.clone()),
                    Step::Return {
                        value: Some(frozen),
                    },
                )?;
                self.control_flow = ControlFlow::Return(value);
                Ok(())
            }

            Statement::Break { location } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeErrorKind::BreakOutsideLoop.at(*location));
                }
                self.record(statement, None, Step::Break)?;
                self.control_flow = ControlFlow::Break;
                Ok(())
            }

            Statement::Continue { lexeme, location } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeErrorKind::ContinueOutsideLoop {
                        lexeme: lexeme.clone(),
                    }
                    .at(*location));
                }
                self.record(statement, None, Step::Continue)?;
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }

            Statement::Expression { expression, .. } => {
                let step_and_value = match expression {
                    Expression::Call {
                        callee,
                        args,
                        location,
                    } => {
                        let args = self.evaluate_arguments(args)?;
                        let frozen_args = args.iter().map(Value::freeze).collect();
                        let result = self.call_function(callee, args, *location)?.freeze();
                        let step = Step::Call {
                            name: callee.clone(),
                            args: frozen_args,
                            result: result.clone(),
                        };
                        (step, result)
                    }
                    other => {
                        let value = self.evaluate(other)?.freeze();
                        (Step::Expression { value: value.clone() }, value)
                    }
                };
                let (step, value) = step_and_value;
                self.record(statement, Some(value), step)
            }
        }
    }

    /// Run `body` in its own scope. Control flow signals pass through.
    pub(crate) fn execute_block(&mut self, body: &'a [Statement]) -> Result<(), RuntimeError> {
        self.env.push_scope();
        for statement in body {
            self.execute_statement(statement)?;
            if !matches!(self.control_flow, ControlFlow::Normal) {
                break;
            }
        }
        self.env.pop_scope();
        Ok(())
    }

    /// Run one iteration's statements; the caller owns the scope.
    fn execute_loop_body(&mut self, body: &'a [Statement]) -> Result<LoopBodyResult, RuntimeError> {
        for statement in body {
            self.execute_statement(statement)?;
            match self.control_flow {
                ControlFlow::Normal => {}
                ControlFlow::Break => {
                    self.control_flow = ControlFlow::Normal;
                    return Ok(LoopBodyResult::Break);
                }
                ControlFlow::Continue => {
                    self.control_flow = ControlFlow::Normal;
                    return Ok(LoopBodyResult::Continue);
                }
                ControlFlow::Return(_) => return Ok(LoopBodyResult::Exit),
            }
        }
        Ok(LoopBodyResult::Continue)
    }

    fn execute_repeat(
        &mut self,
        statement: &'a Statement,
        total: usize,
        body: &'a [Statement],
    ) -> Result<(), RuntimeError> {
        if total == 0 {
            return self.record(statement, None, Step::SkippedLoop { kind: "repeat" });
        }

        self.loop_depth += 1;
        for iteration in 1..=total {
            self.ctx
                .guard_loop_iteration()
                .map_err(|kind| kind.at(statement.location()))?;

            self.env.push_scope();
            self.record(statement, None, Step::Repeat { iteration, total })?;
            let outcome = self.execute_loop_body(body)?;
            self.env.pop_scope();

            match outcome {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        self.loop_depth -= 1;
        Ok(())
    }

    fn execute_foreach(
        &mut self,
        statement: &'a Statement,
        element: &str,
        items: Vec<Value>,
        body: &'a [Statement],
    ) -> Result<(), RuntimeError> {
        let location = statement.location();
        if items.is_empty() {
            return self.record(statement, None, Step::SkippedLoop { kind: "for each" });
        }

        self.loop_depth += 1;
        for (index, item) in items.into_iter().enumerate() {
            self.ctx
                .guard_loop_iteration()
                .map_err(|kind| kind.at(location))?;

            self.env.push_scope();
            let frozen = item.freeze();
            self.env
                .declare(element, item)
                .map_err(|kind| kind.at(location))?;
            self.record(
                statement,
                Some(frozen.clone()),
                Step::Foreach {
                    name: element.to_string(),
                    value: frozen,
                    index: index + 1,
                },
            )?;
            let outcome = self.execute_loop_body(body)?;
            self.env.pop_scope();

            match outcome {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        self.loop_depth -= 1;
        Ok(())
    }

    /// `change target[index] to value`, mutating the shared list or
    /// dictionary in place so every alias sees it.
    fn set_element(&self, target: &Value, index: &Value, value: Value) -> Result<(), RuntimeErrorKind> {
        match target {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let position = list_position(index, items.len(), |index, length| {
                    RuntimeErrorKind::IndexOutOfBoundsInChange {
                        index,
                        length,
                        data_type: "list",
                    }
                })?;
                items[position] = value;
                Ok(())
            }
            Value::Dict(entries) => {
                let key = index
                    .as_str()
                    .ok_or_else(|| RuntimeErrorKind::KeyNotFound {
                        key: index.to_string(),
                    })?
                    .to_string();
                let mut entries = entries.borrow_mut();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                Ok(())
            }
            _ => Err(RuntimeErrorKind::TargetNotModifiable),
        }
    }
}

/// Convert a 1-based index into a position in a sequence of `length`.
pub(crate) fn list_position(
    index: &Value,
    length: usize,
    out_of_bounds: impl FnOnce(i64, usize) -> RuntimeErrorKind,
) -> Result<usize, RuntimeErrorKind> {
    let n = index.as_number().ok_or_else(|| RuntimeErrorKind::IndexMustBeNumber {
        type_name: index.type_name().to_string(),
    })?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(RuntimeErrorKind::IndexMustBeInteger {
            index: index.to_string(),
        });
    }
    let i = n as i64;
    if i == 0 {
        return Err(RuntimeErrorKind::IndexIsOneBased);
    }
    if i < 0 || i as usize > length {
        return Err(out_of_bounds(i, length));
    }
    Ok(i as usize - 1)
}

/// Number of iterations for a `repeat` count, checked before the loop starts.
fn repeat_total(count: &Value, max: u64) -> Result<usize, RuntimeErrorKind> {
    let Some(n) = count.as_number().filter(|n| !n.is_nan()) else {
        return Err(RuntimeErrorKind::RepeatCountMustBeNumber {
            value: count.to_string(),
        });
    };
    if n < 0.0 {
        return Err(RuntimeErrorKind::RepeatCountMustBeNonNegative {
            count: count.to_string(),
        });
    }
    if n > max as f64 {
        return Err(RuntimeErrorKind::RepeatCountTooHigh {
            count: count.to_string(),
            max,
        });
    }
    if n.fract() != 0.0 {
        return Err(RuntimeErrorKind::RepeatCountMustBeInteger {
            count: count.to_string(),
        });
    }
    Ok(n as usize)
}

/// Name of the variable at the root of an index chain, for descriptions.
fn root_name(expression: &Expression) -> String {
    match expression {
        Expression::Variable { name, .. } => name.clone(),
        Expression::Index { object, .. } => root_name(object),
        _ => "the list".to_string(),
    }
}
