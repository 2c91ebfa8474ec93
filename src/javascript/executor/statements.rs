use super::{ControlFlow, Executor, LoopBodyResult};
use crate::javascript::ast::{DeclarationKind, Expression, Statement};
use crate::runtime::describe::Step;
use crate::runtime::{ops, FrozenValue, RuntimeError, RuntimeErrorKind, Value};

impl<'a> Executor<'a> {
    pub(crate) fn execute_statement(&mut self, statement: &'a Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::VariableDeclaration {
                kind,
                name,
                init,
                location,
            } => {
                let value = match init {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::None,
                };
                let declared = match kind {
                    DeclarationKind::Let => self.env.declare(name, value.clone()),
                    DeclarationKind::Const => self.env.declare_const(name, value.clone()),
                };
                declared.map_err(|kind| kind.at(*location))?;
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

            Statement::Expression { expression, .. } => {
                self.execute_expression_statement(statement, expression)
            }

            Statement::Block { body, .. } => {
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

            Statement::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                let result = self.evaluate_condition(statement, test, "if")?;
                if result {
                    self.execute_statement(consequent)
                } else if let Some(alternate) = alternate {
                    self.execute_statement(alternate)
                } else {
                    Ok(())
                }
            }

            Statement::While { test, body, .. } => {
                self.loop_depth += 1;
                loop {
                    if !self.evaluate_condition(statement, test, "while")? {
                        break;
                    }
                    self.ctx
                        .guard_loop_iteration()
                        .map_err(|kind| kind.at(statement.location()))?;
                    match self.execute_loop_body(body)? {
                        LoopBodyResult::Continue => {}
                        LoopBodyResult::Break | LoopBodyResult::Exit => break,
                    }
                }
                self.loop_depth -= 1;
                Ok(())
            }

            Statement::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                // the loop variable lives in a scope around the whole loop
                self.env.push_scope();
                if let Some(init) = init {
                    self.execute_statement(init)?;
                }

                self.loop_depth += 1;
                loop {
                    if let Some(test) = test {
                        if !self.evaluate_condition(statement, test, "for")? {
                            break;
                        }
                    }
                    self.ctx
                        .guard_loop_iteration()
                        .map_err(|kind| kind.at(statement.location()))?;
                    match self.execute_loop_body(body)? {
                        LoopBodyResult::Continue => {}
                        LoopBodyResult::Break | LoopBodyResult::Exit => break,
                    }
                    if let Some(update) = update {
                        self.evaluate(update)?;
                    }
                }
                self.loop_depth -= 1;
                self.env.pop_scope();
                Ok(())
            }

            Statement::ForOf {
                kind,
                name,
                iterable,
                body,
                location,
            } => {
                let iterable = self.evaluate(iterable)?;
                let items: Vec<Value> = match &iterable {
                    Value::List(items) => items.borrow().clone(),
                    Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
                    other => {
                        return Err(RuntimeErrorKind::ForOfLoopTargetNotIterable {
                            type_name: other.type_name().to_string(),
                        }
                        .at(*location))
                    }
                };

                if items.is_empty() {
                    return self.record(statement, None, Step::SkippedLoop { kind: "for...of" });
                }

                self.loop_depth += 1;
                for (index, item) in items.into_iter().enumerate() {
                    self.ctx
                        .guard_loop_iteration()
                        .map_err(|kind| kind.at(*location))?;

                    self.env.push_scope();
                    let frozen = item.freeze();
                    let declared = match kind {
                        DeclarationKind::Let => self.env.declare(name, item),
                        DeclarationKind::Const => self.env.declare_const(name, item),
                    };
                    declared.map_err(|kind| kind.at(*location))?;
                    self.record(
                        statement,
                        Some(frozen.clone()),
                        Step::Foreach {
                            name: name.clone(),
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

            Statement::Continue { location } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeErrorKind::ContinueOutsideLoop {
                        lexeme: "continue".to_string(),
                    }
                    .at(*location));
                }
                self.record(statement, None, Step::Continue)?;
                self.control_flow = ControlFlow::Continue;
                Ok(())
            }
        }
    }

    /// Evaluate a loop or `if` test and record its frame.
    fn evaluate_condition(
        &mut self,
        statement: &Statement,
        test: &Expression,
        kind: &'static str,
    ) -> Result<bool, RuntimeError> {
        let value = self.evaluate(test)?;
        let result = ops::condition(&value, self.ctx.features().allow_truthiness)
            .map_err(|err| err.at(test.location()))?;
        self.record(
            statement,
            Some(value.freeze()),
            Step::Condition {
                kind,
                value: result,
            },
        )?;
        Ok(result)
    }

    /// The body of a `while`/`for`/`for...of` is itself a statement, usually
    /// a block that opens its own scope.
    fn execute_loop_body(&mut self, body: &'a Statement) -> Result<LoopBodyResult, RuntimeError> {
        self.execute_statement(body)?;
        let outcome = match self.control_flow {
            ControlFlow::Normal | ControlFlow::Continue => LoopBodyResult::Continue,
            ControlFlow::Break => LoopBodyResult::Break,
            ControlFlow::Return(_) => return Ok(LoopBodyResult::Exit),
        };
        self.control_flow = ControlFlow::Normal;
        Ok(outcome)
    }

    fn execute_expression_statement(
        &mut self,
        statement: &Statement,
        expression: &Expression,
    ) -> Result<(), RuntimeError> {
        match expression {
            Expression::Call { callee, args, location } => {
                let args = self.evaluate_arguments(args)?;
                let name = callee.callee_name().unwrap_or_default();

                if name == "console.log" {
                    let output = args
                        .iter()
                        .map(Value::to_output_string)
                        .collect::<Vec<_>>()
                        .join(" ");
                    self.ctx.log(output.clone());
                    let frozen = FrozenValue::String(output);
                    return self.record(statement, Some(frozen.clone()), Step::Log { value: frozen });
                }

                let frozen_args = args.iter().map(Value::freeze).collect();
                let result = self.call_callee(callee, args, *location)?.freeze();
                self.record(
                    statement,
                    Some(result.clone()),
                    Step::Call {
                        name,
                        args: frozen_args,
                        result,
                    },
                )
            }

            Expression::Assignment { .. } | Expression::Update { .. } => {
                let (_, stored, name) = self.evaluate_store(expression)?;
                let stored = stored.freeze();
                self.record(
                    statement,
                    Some(stored.clone()),
                    Step::Assign { name, value: stored },
                )
            }

            other => {
                let value = self.evaluate(other)?.freeze();
                self.record(statement, Some(value.clone()), Step::Expression { value })
            }
        }
    }
}
