//! Operator tokens recognised in entity text.
//!
//! Text is parsed into these enums once per scan; evaluation then matches on the
//! variant instead of comparing strings against every registered name.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Abs,
    Max,
    Min,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    Neq,
    And,
    Or,
    Not,
    Xor,
    Random,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringOp {
    Upper,
    Lower,
    Len,
    Copy,
    Split,
    Replace,
    Concat,
}

/// Variadic function over the text of predecessor nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedFunction {
    Math(MathOp),
    String(StringOp),
}

/// Function that needs stage context (geometry, camera, mouse, clock) rather than plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentFunction {
    Rgb,
    Rgba,
    GetLocation,
    SetLocation,
    GetSize,
    GetMouseLocation,
    GetCameraLocation,
    SetCameraLocation,
    GetCameraScale,
    SetCameraScale,
    IsCollision,
    GetTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOperator {
    Named(NamedFunction),
    Environment(EnvironmentFunction),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeOperator {
    /// `[source, target]` fed to the binary function.
    Binary(MathOp),
    /// Token followed by a constant, e.g. `+5`: `[source, operand]`.
    Shorthand { op: MathOp, operand: f64 },
}

const NAMED_FUNCTIONS: &[(&str, NamedFunction)] = &[
    ("##ADD##", NamedFunction::Math(MathOp::Add)),
    ("##SUBTRACT##", NamedFunction::Math(MathOp::Subtract)),
    ("##MULTIPLY##", NamedFunction::Math(MathOp::Multiply)),
    ("##DIVIDE##", NamedFunction::Math(MathOp::Divide)),
    ("##MODULO##", NamedFunction::Math(MathOp::Modulo)),
    ("##ABS##", NamedFunction::Math(MathOp::Abs)),
    ("##MAX##", NamedFunction::Math(MathOp::Max)),
    ("##MIN##", NamedFunction::Math(MathOp::Min)),
    ("##FLOOR##", NamedFunction::Math(MathOp::Floor)),
    ("##CEIL##", NamedFunction::Math(MathOp::Ceil)),
    ("##ROUND##", NamedFunction::Math(MathOp::Round)),
    ("##SQRT##", NamedFunction::Math(MathOp::Sqrt)),
    ("##SIN##", NamedFunction::Math(MathOp::Sin)),
    ("##COS##", NamedFunction::Math(MathOp::Cos)),
    ("##TAN##", NamedFunction::Math(MathOp::Tan)),
    ("##LT##", NamedFunction::Math(MathOp::Lt)),
    ("##GT##", NamedFunction::Math(MathOp::Gt)),
    ("##LTE##", NamedFunction::Math(MathOp::Lte)),
    ("##GTE##", NamedFunction::Math(MathOp::Gte)),
    ("##EQ##", NamedFunction::Math(MathOp::Eq)),
    ("##NEQ##", NamedFunction::Math(MathOp::Neq)),
    ("##RANDOM##", NamedFunction::Math(MathOp::Random)),
    ("##AND##", NamedFunction::Math(MathOp::And)),
    ("##OR##", NamedFunction::Math(MathOp::Or)),
    ("##NOT##", NamedFunction::Math(MathOp::Not)),
    ("##XOR##", NamedFunction::Math(MathOp::Xor)),
    ("##COUNT##", NamedFunction::Math(MathOp::Count)),
    ("##UPPER##", NamedFunction::String(StringOp::Upper)),
    ("##LOWER##", NamedFunction::String(StringOp::Lower)),
    ("##LEN##", NamedFunction::String(StringOp::Len)),
    ("##COPY##", NamedFunction::String(StringOp::Copy)),
    ("##SPLIT##", NamedFunction::String(StringOp::Split)),
    ("##REPLACE##", NamedFunction::String(StringOp::Replace)),
    ("##CONCAT##", NamedFunction::String(StringOp::Concat)),
    ("##CONNECT##", NamedFunction::String(StringOp::Concat)),
];

const ENVIRONMENT_FUNCTIONS: &[(&str, EnvironmentFunction)] = &[
    ("##RGB##", EnvironmentFunction::Rgb),
    ("##RGBA##", EnvironmentFunction::Rgba),
    ("##GET_LOCATION##", EnvironmentFunction::GetLocation),
    ("##SET_LOCATION##", EnvironmentFunction::SetLocation),
    ("##GET_SIZE##", EnvironmentFunction::GetSize),
    ("##GET_MOUSE_LOCATION##", EnvironmentFunction::GetMouseLocation),
    ("##GET_CAMERA_LOCATION##", EnvironmentFunction::GetCameraLocation),
    ("##SET_CAMERA_LOCATION##", EnvironmentFunction::SetCameraLocation),
    ("##GET_CAMERA_SCALE##", EnvironmentFunction::GetCameraScale),
    ("##SET_CAMERA_SCALE##", EnvironmentFunction::SetCameraScale),
    ("##IS_COLLISION##", EnvironmentFunction::IsCollision),
    ("##GET_TIME##", EnvironmentFunction::GetTime),
];

/// Ordered longest-first so `<=` wins over `<` and `^^` over `^` when parsing shorthand.
const SIMPLE_OPERATORS: &[(&str, MathOp)] = &[
    ("<=", MathOp::Lte),
    (">=", MathOp::Gte),
    ("==", MathOp::Eq),
    ("!=", MathOp::Neq),
    ("^^", MathOp::Xor),
    ("+", MathOp::Add),
    ("-", MathOp::Subtract),
    ("*", MathOp::Multiply),
    ("/", MathOp::Divide),
    ("%", MathOp::Modulo),
    ("^", MathOp::Power),
    ("<", MathOp::Lt),
    (">", MathOp::Gt),
    ("&", MathOp::And),
    ("|", MathOp::Or),
    ("!", MathOp::Not),
];

impl NamedFunction {
    pub fn parse(text: &str) -> Option<Self> {
        NAMED_FUNCTIONS.iter().find(|(token, _)| *token == text).map(|(_, function)| *function)
    }
}

impl EnvironmentFunction {
    pub fn parse(text: &str) -> Option<Self> {
        ENVIRONMENT_FUNCTIONS.iter().find(|(token, _)| *token == text).map(|(_, function)| *function)
    }

    pub fn token(self) -> &'static str {
        ENVIRONMENT_FUNCTIONS.iter().find(|(_, function)| *function == self).map(|(token, _)| *token).unwrap_or("")
    }
}

impl NodeOperator {
    /// Exact, case-sensitive match against the named and environment tables.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(function) = NamedFunction::parse(text) {
            return Some(NodeOperator::Named(function));
        }
        EnvironmentFunction::parse(text).map(NodeOperator::Environment)
    }
}

impl EdgeOperator {
    /// Either an exact simple token, or a token followed by a finite number (`+5`, `<=10`, `*-2`).
    /// Anything else, including a non-numeric suffix, is not an operator.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(op) = simple_operator(text) {
            return Some(EdgeOperator::Binary(op));
        }
        SIMPLE_OPERATORS.iter().find_map(|(token, op)| {
            let suffix = text.strip_prefix(token)?.trim();
            let operand = suffix.parse::<f64>().ok().filter(|value| value.is_finite())?;
            Some(EdgeOperator::Shorthand { op: *op, operand })
        })
    }
}

pub fn simple_operator(text: &str) -> Option<MathOp> {
    SIMPLE_OPERATORS.iter().find(|(token, _)| *token == text).map(|(_, op)| *op)
}

pub fn named_tokens() -> impl Iterator<Item = &'static str> {
    NAMED_FUNCTIONS.iter().map(|(token, _)| *token)
}

pub fn environment_tokens() -> impl Iterator<Item = &'static str> {
    ENVIRONMENT_FUNCTIONS.iter().map(|(token, _)| *token)
}

pub fn simple_tokens() -> impl Iterator<Item = &'static str> {
    SIMPLE_OPERATORS.iter().map(|(token, _)| *token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_tables_are_disjoint() {
        let named: HashSet<_> = named_tokens().collect();
        let environment: HashSet<_> = environment_tokens().collect();
        let simple: HashSet<_> = simple_tokens().collect();
        assert!(named.is_disjoint(&environment));
        assert!(named.is_disjoint(&simple));
        assert!(environment.is_disjoint(&simple));
    }

    #[test]
    fn node_tokens_require_exact_text() {
        assert_eq!(NodeOperator::parse("##ADD##"), Some(NodeOperator::Named(NamedFunction::Math(MathOp::Add))));
        assert_eq!(
            NodeOperator::parse("##GET_TIME##"),
            Some(NodeOperator::Environment(EnvironmentFunction::GetTime))
        );
        assert_eq!(NodeOperator::parse(" ##ADD##"), None);
        assert_eq!(NodeOperator::parse("##add##"), None);
        assert_eq!(NodeOperator::parse("ADD"), None);
        assert_eq!(EnvironmentFunction::GetTime.token(), "##GET_TIME##");
    }

    #[test]
    fn edge_shorthand_prefers_longest_token() {
        assert_eq!(EdgeOperator::parse("+"), Some(EdgeOperator::Binary(MathOp::Add)));
        assert_eq!(EdgeOperator::parse("^^"), Some(EdgeOperator::Binary(MathOp::Xor)));
        assert_eq!(EdgeOperator::parse("+5"), Some(EdgeOperator::Shorthand { op: MathOp::Add, operand: 5.0 }));
        assert_eq!(EdgeOperator::parse("<=10"), Some(EdgeOperator::Shorthand { op: MathOp::Lte, operand: 10.0 }));
        assert_eq!(
            EdgeOperator::parse("*-2.5"),
            Some(EdgeOperator::Shorthand { op: MathOp::Multiply, operand: -2.5 })
        );
        assert_eq!(EdgeOperator::parse("-3"), Some(EdgeOperator::Shorthand { op: MathOp::Subtract, operand: 3.0 }));
    }

    #[test]
    fn zero_operand_is_still_a_shorthand() {
        assert_eq!(EdgeOperator::parse("*0"), Some(EdgeOperator::Shorthand { op: MathOp::Multiply, operand: 0.0 }));
        assert_eq!(EdgeOperator::parse("+ 0"), Some(EdgeOperator::Shorthand { op: MathOp::Add, operand: 0.0 }));
    }

    #[test]
    fn non_numeric_shorthand_is_not_an_operator() {
        assert_eq!(EdgeOperator::parse("+abc"), None);
        assert_eq!(EdgeOperator::parse("+inf"), None);
        assert_eq!(EdgeOperator::parse("label"), None);
        assert_eq!(EdgeOperator::parse(""), None);
    }
}
