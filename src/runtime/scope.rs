//! Lexical environment
//!
//! The environment is a stack of call frames. Frame 0 holds the globals;
//! every function call pushes a fresh frame holding its parameters and
//! locals. Inside a frame, blocks push scopes onto a scope stack:
//!
//! - a name declared in a block is removed again when the block closes
//! - a name that shadowed an outer binding has the outer binding restored
//!   unchanged when the block closes
//!
//! Whether a function frame can see the globals depends on the language
//! ([`GlobalAccess`]). Redeclaration and shadowing rules are enforced here so
//! both executors report the same errors.

use super::errors::RuntimeErrorKind;
use super::value::{FrozenValue, Value};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAccess {
    /// Function bodies read and write globals (JavaScript).
    Visible,
    /// Function bodies only see their parameters and locals (JikiScript).
    Hidden,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    is_const: bool,
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    shadowed: Vec<(String, Binding)>,
    declared: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct CallFrame {
    locals: FxHashMap<String, Binding>,
    scope_stack: Vec<ScopeData>,
}

impl CallFrame {
    /// True when `name` was declared by the innermost open scope.
    fn declared_in_current_scope(&self, name: &str) -> bool {
        match self.scope_stack.last() {
            Some(scope) => scope.declared.iter().any(|n| n == name),
            None => self.locals.contains_key(name),
        }
    }

    fn insert(&mut self, name: String, binding: Binding) {
        match self.scope_stack.last_mut() {
            Some(scope) => {
                if let Some(outer) = self.locals.insert(name.clone(), binding) {
                    scope.shadowed.push((name.clone(), outer));
                }
                scope.declared.push(name);
            }
            None => {
                self.locals.insert(name, binding);
            }
        }
    }

    fn push_scope(&mut self) {
        self.scope_stack.push(ScopeData::default());
    }

    fn pop_scope(&mut self) {
        if let Some(scope) = self.scope_stack.pop() {
            for name in scope.declared {
                self.locals.remove(&name);
            }
            for (name, binding) in scope.shadowed {
                self.locals.insert(name, binding);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<CallFrame>,
    global_access: GlobalAccess,
    allow_shadowing: bool,
}

impl Environment {
    pub fn new(global_access: GlobalAccess, allow_shadowing: bool) -> Self {
        Environment {
            frames: vec![CallFrame::default()],
            global_access,
            allow_shadowing,
        }
    }

    pub fn in_function(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push_scope(&mut self) {
        self.current_mut().push_scope();
    }

    pub fn pop_scope(&mut self) {
        self.current_mut().pop_scope();
    }

    /// Enter a function body with a fresh, empty frame.
    pub fn push_call(&mut self) {
        self.frames.push(CallFrame::default());
    }

    pub fn pop_call(&mut self) {
        if self.in_function() {
            self.frames.pop();
        }
    }

    fn current(&self) -> &CallFrame {
        // frame 0 is never popped
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut CallFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn globals(&self) -> &CallFrame {
        &self.frames[0]
    }

    fn globals_visible(&self) -> bool {
        !self.in_function() || self.global_access == GlobalAccess::Visible
    }

    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        self.declare_binding(name, value, false)
    }

    pub fn declare_const(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        self.declare_binding(name, value, true)
    }

    fn declare_binding(
        &mut self,
        name: &str,
        value: Value,
        is_const: bool,
    ) -> Result<(), RuntimeErrorKind> {
        if self.current().declared_in_current_scope(name) {
            return Err(RuntimeErrorKind::VariableAlreadyDeclared {
                name: name.to_string(),
            });
        }

        let visible_outside = self.current().locals.contains_key(name)
            || (self.in_function() && self.globals_visible() && self.globals().locals.contains_key(name));
        if visible_outside && !self.allow_shadowing {
            return Err(RuntimeErrorKind::ShadowingDisabled {
                name: name.to_string(),
            });
        }

        self.current_mut()
            .insert(name.to_string(), Binding { value, is_const });
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        if let Some(binding) = self.current().locals.get(name) {
            return Some(binding);
        }
        if self.in_function() && self.globals_visible() {
            return self.globals().locals.get(name);
        }
        None
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        let visible = self.in_function() && self.globals_visible();
        let last = self.frames.len() - 1;
        if self.frames[last].locals.contains_key(name) {
            return self.frames[last].locals.get_mut(name);
        }
        if visible {
            return self.frames[0].locals.get_mut(name);
        }
        None
    }

    fn missing(&self, name: &str) -> RuntimeErrorKind {
        if self.in_function() && self.globals().locals.contains_key(name) {
            RuntimeErrorKind::VariableNotAccessibleInFunction {
                name: name.to_string(),
            }
        } else {
            RuntimeErrorKind::VariableNotDeclared {
                name: name.to_string(),
            }
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Read a binding. Lists and dictionaries come back as aliases of the
    /// stored cell.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeErrorKind> {
        match self.lookup(name) {
            Some(binding) => Ok(binding.value.clone()),
            None => Err(self.missing(name)),
        }
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        match self.lookup_mut(name) {
            Some(binding) if binding.is_const => Err(RuntimeErrorKind::AssignmentToConstant {
                name: name.to_string(),
            }),
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => Err(self.missing(name)),
        }
    }

    /// Freeze every binding visible from the current position.
    pub fn snapshot(&self) -> BTreeMap<String, FrozenValue> {
        let mut variables = BTreeMap::new();
        if self.in_function() && self.globals_visible() {
            for (name, binding) in &self.globals().locals {
                variables.insert(name.clone(), binding.value.freeze());
            }
        }
        for (name, binding) in &self.current().locals {
            variables.insert(name.clone(), binding.value.freeze());
        }
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_scope_redeclaration_is_rejected() {
        let mut env = Environment::new(GlobalAccess::Visible, true);
        env.declare("x", Value::Number(1.0)).unwrap();
        assert_eq!(
            env.declare("x", Value::Number(2.0)),
            Err(RuntimeErrorKind::VariableAlreadyDeclared { name: "x".into() })
        );
    }

    #[test]
    fn shadowing_in_block_is_gated() {
        let mut env = Environment::new(GlobalAccess::Visible, false);
        env.declare("x", Value::Number(5.0)).unwrap();
        env.push_scope();
        assert_eq!(
            env.declare("x", Value::Number(10.0)),
            Err(RuntimeErrorKind::ShadowingDisabled { name: "x".into() })
        );
    }

    #[test]
    fn shadowed_binding_is_restored_on_block_exit() {
        let mut env = Environment::new(GlobalAccess::Visible, true);
        env.declare("x", Value::Number(5.0)).unwrap();
        env.push_scope();
        env.declare("x", Value::Number(10.0)).unwrap();
        env.declare("y", Value::Number(1.0)).unwrap();
        assert_eq!(env.get("x").unwrap().as_number(), Some(10.0));
        env.pop_scope();
        assert_eq!(env.get("x").unwrap().as_number(), Some(5.0));
        assert!(!env.is_declared("y"));
    }

    #[test]
    fn hidden_globals_are_reported_inside_functions() {
        let mut env = Environment::new(GlobalAccess::Hidden, false);
        env.declare("count", Value::Number(1.0)).unwrap();
        env.push_call();
        assert_eq!(
            env.get("count").unwrap_err(),
            RuntimeErrorKind::VariableNotAccessibleInFunction {
                name: "count".into()
            }
        );
        // a local of the same name is allowed since the global is invisible
        env.declare("count", Value::Number(2.0)).unwrap();
        env.pop_call();
        assert_eq!(env.get("count").unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn constants_reject_assignment() {
        let mut env = Environment::new(GlobalAccess::Visible, false);
        env.declare_const("limit", Value::Number(3.0)).unwrap();
        assert_eq!(
            env.assign("limit", Value::Number(4.0)),
            Err(RuntimeErrorKind::AssignmentToConstant {
                name: "limit".into()
            })
        );
    }

    #[test]
    fn snapshot_includes_visible_globals() {
        let mut env = Environment::new(GlobalAccess::Visible, false);
        env.declare("g", Value::Number(1.0)).unwrap();
        env.push_call();
        env.declare("a", Value::Number(2.0)).unwrap();
        let names: Vec<_> = env.snapshot().into_keys().collect();
        assert_eq!(names, vec!["a".to_string(), "g".to_string()]);
    }
}
