//! Runtime error taxonomy shared by the executors
//!
//! Every variant's `Display` output is the exact message recorded on the
//! terminal ERROR frame, in the `Kind: key: value` shape the exercises match
//! against. [`RuntimeErrorKind::kind`] returns the bare kind name.
//!
//! Runtime errors never escape `interpret()`: the executor converts the first
//! one into an ERROR frame and stops.

use crate::syntax::SourceLocation;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Broad class of a frame error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    SyntaxError,
    RuntimeError,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("VariableNotDeclared: name: {name}")]
    VariableNotDeclared { name: String },

    #[error("VariableAlreadyDeclared: name: {name}")]
    VariableAlreadyDeclared { name: String },

    #[error("VariableNotAccessibleInFunction: name: {name}")]
    VariableNotAccessibleInFunction { name: String },

    #[error("ShadowingDisabled: name: {name}")]
    ShadowingDisabled { name: String },

    #[error("AssignmentToConstant: name: {name}")]
    AssignmentToConstant { name: String },

    #[error("TypeCoercionNotAllowed: operator: {operator}{}", coercion_sides(.left, .right))]
    TypeCoercionNotAllowed {
        operator: String,
        left: Option<String>,
        right: Option<String>,
    },

    #[error("ComparisonRequiresNumber: operator: {operator}: {side}: {type_name}")]
    ComparisonRequiresNumber {
        operator: String,
        side: &'static str,
        type_name: String,
    },

    #[error("OperandMustBeNumber: value: {value}")]
    OperandMustBeNumber { value: String },

    #[error("TruthinessDisabled: value: {type_name}")]
    TruthinessDisabled { type_name: String },

    #[error("StrictEqualityRequired: operator: {operator}")]
    StrictEqualityRequired { operator: String },

    #[error("TypeErrorCannotCompareListObjects")]
    CannotCompareListObjects,

    #[error("InvalidNumberOfArguments: function: {function}: expected: {expected}: got: {got}")]
    InvalidNumberOfArguments {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("FunctionExecutionError: function: {function}: message: {message}")]
    FunctionExecutionError { function: String, message: String },

    #[error("{message}")]
    LogicErrorInExecution { message: String },

    #[error("FunctionNotFound: name: {name}")]
    FunctionNotFound { name: String },

    #[error("FunctionAlreadyDefined: name: {name}")]
    FunctionAlreadyDefined { name: String },

    #[error("NestedFunctionDeclaration: name: {name}")]
    NestedFunctionDeclaration { name: String },

    #[error("DuplicateParameterName: parameter: {parameter}")]
    DuplicateParameterName { parameter: String },

    #[error("ReturnOutsideFunction")]
    ReturnOutsideFunction,

    #[error("BreakOutsideLoop")]
    BreakOutsideLoop,

    #[error("ContinueOutsideLoop: lexeme: {lexeme}")]
    ContinueOutsideLoop { lexeme: String },

    #[error("ForeachNotIterable: value: {value}")]
    ForeachNotIterable { value: String },

    #[error("ForOfLoopTargetNotIterable: type: {type_name}")]
    ForOfLoopTargetNotIterable { type_name: String },

    #[error("RepeatCountMustBeNumber: value: {value}")]
    RepeatCountMustBeNumber { value: String },

    #[error("RangeErrorRepeatCountMustBeNonNegative: count: {count}")]
    RepeatCountMustBeNonNegative { count: String },

    #[error("RangeErrorRepeatCountMustBeInteger: count: {count}")]
    RepeatCountMustBeInteger { count: String },

    #[error("RangeErrorRepeatCountTooHighForExecution: count: {count}, max: {max}")]
    RepeatCountTooHigh { count: String, max: u64 },

    #[error("IndexMustBeNumber: type: {type_name}")]
    IndexMustBeNumber { type_name: String },

    #[error("IndexMustBeInteger: index: {index}")]
    IndexMustBeInteger { index: String },

    #[error("RangeErrorArrayIndexIsZeroBased")]
    IndexIsOneBased,

    #[error("IndexOutOfBoundsInGet: index: {index}, length: {length}, dataType: {data_type}")]
    IndexOutOfBoundsInGet {
        index: i64,
        length: usize,
        data_type: &'static str,
    },

    #[error("IndexOutOfBoundsInChange: index: {index}, length: {length}, dataType: {data_type}")]
    IndexOutOfBoundsInChange {
        index: i64,
        length: usize,
        data_type: &'static str,
    },

    #[error("TypeErrorCannotIndex: type: {type_name}")]
    CannotIndex { type_name: String },

    #[error("KeyNotFound: key: {key}")]
    KeyNotFound { key: String },

    #[error("PropertyNotFound: property: {property}")]
    PropertyNotFound { property: String },

    #[error("InvalidChangeTargetNotModifiable")]
    TargetNotModifiable,

    #[error("StateErrorInfiniteRecursionDetectedInFunction: name: {name}")]
    InfiniteRecursion { name: String },

    #[error("MaxIterationsReached: max: {max}")]
    MaxIterationsReached { max: u64 },

    #[error("MaxTotalExecutionTimeReached: max: {max}")]
    MaxTotalExecutionTimeReached { max: u64 },
}

fn coercion_sides(left: &Option<String>, right: &Option<String>) -> String {
    let mut sides = String::new();
    if let Some(left) = left {
        sides.push_str(&format!(": left: {}", left));
    }
    if let Some(right) = right {
        sides.push_str(&format!(": right: {}", right));
    }
    sides
}

impl RuntimeErrorKind {
    /// Bare kind name, e.g. `VariableNotDeclared`.
    pub fn kind(&self) -> &'static str {
        use RuntimeErrorKind::*;
        match self {
            VariableNotDeclared { .. } => "VariableNotDeclared",
            VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            VariableNotAccessibleInFunction { .. } => "VariableNotAccessibleInFunction",
            ShadowingDisabled { .. } => "ShadowingDisabled",
            AssignmentToConstant { .. } => "AssignmentToConstant",
            TypeCoercionNotAllowed { .. } => "TypeCoercionNotAllowed",
            ComparisonRequiresNumber { .. } => "ComparisonRequiresNumber",
            OperandMustBeNumber { .. } => "OperandMustBeNumber",
            TruthinessDisabled { .. } => "TruthinessDisabled",
            StrictEqualityRequired { .. } => "StrictEqualityRequired",
            CannotCompareListObjects => "TypeErrorCannotCompareListObjects",
            InvalidNumberOfArguments { .. } => "InvalidNumberOfArguments",
            FunctionExecutionError { .. } => "FunctionExecutionError",
            LogicErrorInExecution { .. } => "LogicErrorInExecution",
            FunctionNotFound { .. } => "FunctionNotFound",
            FunctionAlreadyDefined { .. } => "FunctionAlreadyDefined",
            NestedFunctionDeclaration { .. } => "NestedFunctionDeclaration",
            DuplicateParameterName { .. } => "DuplicateParameterName",
            ReturnOutsideFunction => "ReturnOutsideFunction",
            BreakOutsideLoop => "BreakOutsideLoop",
            ContinueOutsideLoop { .. } => "ContinueOutsideLoop",
            ForeachNotIterable { .. } => "ForeachNotIterable",
            ForOfLoopTargetNotIterable { .. } => "ForOfLoopTargetNotIterable",
            RepeatCountMustBeNumber { .. } => "RepeatCountMustBeNumber",
            RepeatCountMustBeNonNegative { .. } => "RangeErrorRepeatCountMustBeNonNegative",
            RepeatCountMustBeInteger { .. } => "RangeErrorRepeatCountMustBeInteger",
            RepeatCountTooHigh { .. } => "RangeErrorRepeatCountTooHighForExecution",
            IndexMustBeNumber { .. } => "IndexMustBeNumber",
            IndexMustBeInteger { .. } => "IndexMustBeInteger",
            IndexIsOneBased => "RangeErrorArrayIndexIsZeroBased",
            IndexOutOfBoundsInGet { .. } => "IndexOutOfBoundsInGet",
            IndexOutOfBoundsInChange { .. } => "IndexOutOfBoundsInChange",
            CannotIndex { .. } => "TypeErrorCannotIndex",
            KeyNotFound { .. } => "KeyNotFound",
            PropertyNotFound { .. } => "PropertyNotFound",
            TargetNotModifiable => "InvalidChangeTargetNotModifiable",
            InfiniteRecursion { .. } => "StateErrorInfiniteRecursionDetectedInFunction",
            MaxIterationsReached { .. } => "MaxIterationsReached",
            MaxTotalExecutionTimeReached { .. } => "MaxTotalExecutionTimeReached",
        }
    }

    /// Structured details for the frame's error context.
    pub fn context(&self) -> serde_json::Value {
        use RuntimeErrorKind::*;
        match self {
            VariableNotDeclared { name }
            | VariableAlreadyDeclared { name }
            | VariableNotAccessibleInFunction { name }
            | ShadowingDisabled { name }
            | AssignmentToConstant { name }
            | FunctionNotFound { name }
            | FunctionAlreadyDefined { name }
            | NestedFunctionDeclaration { name }
            | InfiniteRecursion { name } => json!({ "name": name }),
            TypeCoercionNotAllowed {
                operator,
                left,
                right,
            } => json!({ "operator": operator, "left": left, "right": right }),
            ComparisonRequiresNumber {
                operator,
                side,
                type_name,
            } => {
                let mut context = json!({ "operator": operator });
                context[*side] = json!(type_name);
                context
            }
            TruthinessDisabled { type_name }
            | ForOfLoopTargetNotIterable { type_name }
            | IndexMustBeNumber { type_name }
            | CannotIndex { type_name } => json!({ "value": type_name }),
            OperandMustBeNumber { value }
            | ForeachNotIterable { value }
            | RepeatCountMustBeNumber { value } => json!({ "value": value }),
            RepeatCountMustBeNonNegative { count } | RepeatCountMustBeInteger { count } => {
                json!({ "count": count })
            }
            RepeatCountTooHigh { count, max } => json!({ "count": count, "max": max }),
            IndexMustBeInteger { index } => json!({ "index": index }),
            StrictEqualityRequired { operator } => json!({ "operator": operator }),
            InvalidNumberOfArguments {
                function,
                expected,
                got,
            } => json!({ "function": function, "expected": expected, "got": got }),
            FunctionExecutionError { function, message } => {
                json!({ "function": function, "message": message })
            }
            LogicErrorInExecution { message } => json!({ "message": message }),
            DuplicateParameterName { parameter } => json!({ "parameter": parameter }),
            ContinueOutsideLoop { lexeme } => json!({ "lexeme": lexeme }),
            IndexOutOfBoundsInGet {
                index,
                length,
                data_type,
            }
            | IndexOutOfBoundsInChange {
                index,
                length,
                data_type,
            } => json!({ "index": index, "length": length, "dataType": data_type }),
            KeyNotFound { key } => json!({ "key": key }),
            PropertyNotFound { property } => json!({ "property": property }),
            MaxIterationsReached { max } | MaxTotalExecutionTimeReached { max } => {
                json!({ "max": max })
            }
            CannotCompareListObjects
            | ReturnOutsideFunction
            | BreakOutsideLoop
            | IndexIsOneBased
            | TargetNotModifiable => json!({}),
        }
    }

    pub fn at(self, location: SourceLocation) -> RuntimeError {
        RuntimeError {
            kind: self,
            location,
        }
    }
}

/// A runtime failure pinned to the node that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at line {}", location.line)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub location: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_message_names_both_sides_for_plus() {
        let kind = RuntimeErrorKind::TypeCoercionNotAllowed {
            operator: "+".into(),
            left: Some("number".into()),
            right: Some("boolean".into()),
        };
        assert_eq!(
            kind.to_string(),
            "TypeCoercionNotAllowed: operator: +: left: number: right: boolean"
        );
        assert_eq!(kind.kind(), "TypeCoercionNotAllowed");
    }

    #[test]
    fn coercion_message_names_single_side() {
        let kind = RuntimeErrorKind::TypeCoercionNotAllowed {
            operator: "*".into(),
            left: None,
            right: Some("boolean".into()),
        };
        assert_eq!(kind.to_string(), "TypeCoercionNotAllowed: operator: *: right: boolean");
    }

    #[test]
    fn logic_errors_are_verbatim() {
        let kind = RuntimeErrorKind::LogicErrorInExecution {
            message: "Cannot move outside the maze!".into(),
        };
        assert_eq!(kind.to_string(), "Cannot move outside the maze!");
    }
}
