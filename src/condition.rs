//! The condition algebra: a small tree-shaped predicate language over a
//! single event, with a staged `AndThen` operator whose evaluation consumes
//! one event at a time and returns a residual condition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::Event;

/// A condition tree.
///
/// Build conditions with the smart constructors ([`value`], [`field`],
/// [`is_type`], [`c_true`], [`c_false`], [`c_and`], [`c_or`], [`equals`],
/// [`and_then`]) rather than the variants directly — they simplify on
/// construction so that `Value(true)` remains canonical for "done".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// A literal JSON payload.
    Value(Value),
    /// Reads a named field from the event under evaluation.
    Field(String),
    /// True iff the event's nominal type equals `t`.
    IsType(String),
    /// Recursive equality of two sub-conditions' evaluations.
    Equals(Box<Condition>, Box<Condition>),
    /// Logical conjunction.
    And(Box<Condition>, Box<Condition>),
    /// Logical disjunction.
    Or(Box<Condition>, Box<Condition>),
    /// Staged: `b` is considered only once `a` has been satisfied by a
    /// prior event.
    AndThen(Box<Condition>, Box<Condition>),
}

/// A literal condition wrapping a JSON payload.
pub fn value(x: impl Into<Value>) -> Condition {
    Condition::Value(x.into())
}

/// Reads a named field from the event under evaluation.
pub fn field(name: impl Into<String>) -> Condition {
    Condition::Field(name.into())
}

/// True iff the event's nominal type equals `t`.
pub fn is_type(t: impl Into<String>) -> Condition {
    Condition::IsType(t.into())
}

/// The canonical "always satisfied" condition.
pub fn c_true() -> Condition {
    Condition::Value(Value::Bool(true))
}

/// The canonical "never satisfied" condition.
pub fn c_false() -> Condition {
    Condition::Value(Value::Bool(false))
}

fn is_literal_true(c: &Condition) -> bool {
    matches!(c, Condition::Value(Value::Bool(true)))
}

fn is_literal_false(c: &Condition) -> bool {
    matches!(c, Condition::Value(Value::Bool(false)))
}

/// Logical conjunction, simplifying `c_and(c_true(), x) == x` (and
/// symmetrically) on construction.
pub fn c_and(a: Condition, b: Condition) -> Condition {
    if is_literal_true(&a) {
        b
    } else if is_literal_true(&b) {
        a
    } else if is_literal_false(&a) || is_literal_false(&b) {
        c_false()
    } else {
        Condition::And(Box::new(a), Box::new(b))
    }
}

/// Logical disjunction, simplifying `c_or(c_true(), _) == c_true()` (and
/// symmetrically) on construction.
pub fn c_or(a: Condition, b: Condition) -> Condition {
    if is_literal_true(&a) || is_literal_true(&b) {
        c_true()
    } else if is_literal_false(&a) {
        b
    } else if is_literal_false(&b) {
        a
    } else {
        Condition::Or(Box::new(a), Box::new(b))
    }
}

/// Recursive equality of two sub-conditions' evaluations.
pub fn equals(a: Condition, b: Condition) -> Condition {
    Condition::Equals(Box::new(a), Box::new(b))
}

/// Staged conjunction: `b` only becomes active once `a` is satisfied,
/// simplifying `and_then(c_true(), b) == b` and `and_then(a, c_true()) == a`
/// on construction.
pub fn and_then(a: Condition, b: Condition) -> Condition {
    if is_literal_true(&a) {
        b
    } else if is_literal_true(&b) {
        a
    } else {
        Condition::AndThen(Box::new(a), Box::new(b))
    }
}

/// `c_and(is_type(ty), equals(field(field_name), value(x)))` — the common
/// case of matching an event's type and one field's value together.
pub fn event_field_equals(
    ty: impl Into<String>,
    field_name: impl Into<String>,
    x: impl Into<Value>,
) -> Condition {
    c_and(is_type(ty), equals(field(field_name), value(x)))
}

/// The outcome of evaluating a condition against one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Eval {
    /// The condition is fully satisfied.
    Done,
    /// The condition is not yet satisfied; the residual obligation replaces
    /// the original condition for the next event.
    Rest(Condition),
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Interprets a condition tree as a JSON value against one event, treating
/// `AndThen` as an ordinary (unstaged) conjunction. This is the helper used
/// both for non-`AndThen` evaluation and to test `AndThen`'s left-hand side.
fn eval_value(cond: &Condition, event: &dyn Event) -> Value {
    match cond {
        Condition::Value(v) => v.clone(),
        Condition::Field(name) => event.field(name),
        Condition::IsType(t) => Value::Bool(event.event_type() == t),
        Condition::Equals(a, b) => {
            Value::Bool(eval_value(a, event) == eval_value(b, event))
        }
        Condition::And(a, b) => {
            Value::Bool(truthy(&eval_value(a, event)) && truthy(&eval_value(b, event)))
        }
        Condition::Or(a, b) => {
            Value::Bool(truthy(&eval_value(a, event)) || truthy(&eval_value(b, event)))
        }
        Condition::AndThen(a, b) => {
            Value::Bool(truthy(&eval_value(a, event)) && truthy(&eval_value(b, event)))
        }
    }
}

/// Evaluates a condition against one event, returning `Done` when the
/// condition is fully satisfied or `Rest` with the remaining obligation.
///
/// This is a total function: missing fields resolve to `Value::Null`, no
/// errors are raised.
pub fn eval(cond: &Condition, event: &dyn Event) -> Eval {
    match cond {
        Condition::AndThen(a, b) => {
            if truthy(&eval_value(a, event)) {
                match eval(b, event) {
                    Eval::Done => Eval::Done,
                    Eval::Rest(rest) => Eval::Rest(rest),
                }
            } else {
                Eval::Rest(cond.clone())
            }
        }
        other => {
            if truthy(&eval_value(other, event)) {
                Eval::Done
            } else {
                Eval::Rest(other.clone())
            }
        }
    }
}

/// The number of nodes in the condition tree, used by the residual-shrinks
/// property: evaluating a condition never grows it.
pub fn size(cond: &Condition) -> usize {
    match cond {
        Condition::Value(_) | Condition::Field(_) | Condition::IsType(_) => 1,
        Condition::Equals(a, b)
        | Condition::And(a, b)
        | Condition::Or(a, b)
        | Condition::AndThen(a, b) => 1 + size(a) + size(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RecordEvent;
    use test_case::test_case;

    #[test_case(Value::Null => false; "null is falsy")]
    #[test_case(Value::Bool(true) => true; "true is truthy")]
    #[test_case(Value::Bool(false) => false; "false is falsy")]
    #[test_case(Value::from(0) => false; "zero is falsy")]
    #[test_case(Value::from(1) => true; "nonzero number is truthy")]
    #[test_case(Value::from("") => false; "empty string is falsy")]
    #[test_case(Value::from("x") => true; "nonempty string is truthy")]
    #[test_case(Value::Array(vec![]) => false; "empty array is falsy")]
    #[test_case(Value::Array(vec![Value::Null]) => true; "nonempty array is truthy")]
    fn truthy_classifies_json_values(input: Value) -> bool {
        truthy(&input)
    }

    #[test]
    fn smart_constructors_simplify() {
        assert_eq!(c_and(c_true(), is_type("A")), is_type("A"));
        assert_eq!(c_and(is_type("A"), c_true()), is_type("A"));
        assert_eq!(c_or(c_true(), is_type("A")), c_true());
        assert_eq!(and_then(c_true(), is_type("A")), is_type("A"));
        assert_eq!(and_then(is_type("A"), c_true()), is_type("A"));
    }

    #[test]
    fn is_type_matches_nominal_type() {
        let e = RecordEvent::new("EventA");
        assert_eq!(eval(&is_type("EventA"), &e), Eval::Done);
        assert_eq!(eval(&is_type("EventB"), &e), Eval::Rest(is_type("EventB")));
    }

    #[test]
    fn missing_field_is_null_and_falsy() {
        let e = RecordEvent::new("EventA");
        let cond = field("missing");
        assert_eq!(eval(&cond, &e), Eval::Rest(cond));
    }

    #[test]
    fn equals_compares_structurally() {
        let e = RecordEvent::new("EventA").with_field("a", 3);
        let cond = equals(field("a"), value(3));
        assert_eq!(eval(&cond, &e), Eval::Done);
    }

    #[test]
    fn and_then_stages_across_events() {
        let cond = and_then(is_type("A"), is_type("B"));
        let a = RecordEvent::new("A");
        let b = RecordEvent::new("B");
        let other = RecordEvent::new("C");

        // a hasn't arrived yet: unchanged
        assert_eq!(eval(&cond, &other), Eval::Rest(cond.clone()));

        // a arrives: obligation becomes just `is_type("B")`
        match eval(&cond, &a) {
            Eval::Rest(rest) => assert_eq!(rest, is_type("B")),
            Eval::Done => panic!("should not be done yet"),
        }

        // feeding b directly to the residual completes it
        assert_eq!(eval(&is_type("B"), &b), Eval::Done);

        // a and b in the same event also completes (a satisfied, b then satisfied)
        assert_eq!(eval(&cond, &a), eval(&cond, &a));
    }

    #[test]
    fn residual_never_grows() {
        let cond = and_then(is_type("A"), c_and(is_type("B"), is_type("C")));
        let other = RecordEvent::new("Z");
        match eval(&cond, &other) {
            Eval::Rest(rest) => assert!(size(&rest) <= size(&cond)),
            Eval::Done => panic!("should not be done"),
        }

        let a = RecordEvent::new("A");
        match eval(&cond, &a) {
            Eval::Rest(rest) => assert!(size(&rest) < size(&cond)),
            Eval::Done => panic!("should not be done on partial match"),
        }
    }
}
