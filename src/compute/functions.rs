//! Pure operator functions. Numeric entries work on `f64` and are lifted to strings
//! through [`call_named`]; every entry is total so a bad operand never aborts a tick.

use crate::compute::operator::{MathOp, NamedFunction, StringOp};
use rand::Rng;

pub const TRUE: f64 = 1.0;
pub const FALSE: f64 = 0.0;

/// Parse an operand, coercing anything non-numeric (or non-finite) to `0`.
pub fn string_to_number(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// `NaN` renders as `"NaN"`, integral values drop the fraction and `-0` renders as `"0"`.
pub fn number_to_string(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

pub fn call_named<R: Rng + ?Sized>(function: NamedFunction, args: &[String], rng: &mut R) -> Vec<String> {
    match function {
        NamedFunction::Math(op) => {
            let numbers: Vec<f64> = args.iter().map(|arg| string_to_number(arg)).collect();
            apply_math(op, &numbers, rng).into_iter().map(number_to_string).collect()
        }
        NamedFunction::String(op) => apply_string(op, args),
    }
}

pub fn apply_math<R: Rng + ?Sized>(op: MathOp, args: &[f64], rng: &mut R) -> Vec<f64> {
    match op {
        MathOp::Add => vec![args.iter().sum::<f64>()],
        MathOp::Subtract => vec![fold_first(args, |acc, x| acc - x)],
        MathOp::Multiply => {
            if args.is_empty() {
                vec![0.0]
            } else {
                vec![args.iter().product::<f64>()]
            }
        }
        MathOp::Divide => vec![fold_first(args, |acc, x| if x == 0.0 { f64::NAN } else { acc / x })],
        MathOp::Modulo => vec![fold_first(args, |acc, x| if x == 0.0 { f64::NAN } else { acc % x })],
        MathOp::Power => vec![fold_first(args, f64::powf)],
        MathOp::Abs => args.iter().map(|x| x.abs()).collect(),
        MathOp::Floor => args.iter().map(|x| x.floor()).collect(),
        MathOp::Ceil => args.iter().map(|x| x.ceil()).collect(),
        // Half-way values round toward positive infinity.
        MathOp::Round => args.iter().map(|x| (x + 0.5).floor()).collect(),
        MathOp::Sqrt => args.iter().map(|x| x.sqrt()).collect(),
        MathOp::Sin => args.iter().map(|x| x.sin()).collect(),
        MathOp::Cos => args.iter().map(|x| x.cos()).collect(),
        MathOp::Tan => args.iter().map(|x| x.tan()).collect(),
        MathOp::Max => vec![args.iter().copied().reduce(f64::max).unwrap_or(0.0)],
        MathOp::Min => vec![args.iter().copied().reduce(f64::min).unwrap_or(0.0)],
        MathOp::Lt => vec![chain(args, |a, b| a < b)],
        MathOp::Gt => vec![chain(args, |a, b| a > b)],
        MathOp::Lte => vec![chain(args, |a, b| a <= b)],
        MathOp::Gte => vec![chain(args, |a, b| a >= b)],
        MathOp::Eq => vec![chain(args, |a, b| a == b)],
        MathOp::Neq => {
            let distinct = args.iter().enumerate().all(|(i, a)| args[i + 1..].iter().all(|b| a != b));
            vec![bool_value(distinct)]
        }
        MathOp::And => vec![bool_value(args.iter().all(|x| truthy(*x)))],
        MathOp::Or => vec![bool_value(args.iter().any(|x| truthy(*x)))],
        MathOp::Not => args.iter().map(|x| bool_value(!truthy(*x))).collect(),
        MathOp::Xor => vec![bool_value(args.iter().filter(|x| truthy(**x)).count() % 2 == 1)],
        MathOp::Count => vec![args.len() as f64],
        MathOp::Random => vec![random(args, rng)],
    }
}

pub fn apply_string(op: StringOp, args: &[String]) -> Vec<String> {
    match op {
        StringOp::Upper => args.iter().map(|s| s.to_uppercase()).collect(),
        StringOp::Lower => args.iter().map(|s| s.to_lowercase()).collect(),
        StringOp::Len => args.iter().map(|s| s.chars().count().to_string()).collect(),
        StringOp::Copy => args.to_vec(),
        StringOp::Split => {
            let Some(text) = args.first() else {
                return Vec::new();
            };
            match args.get(1).map(String::as_str) {
                None => text.split_whitespace().map(str::to_string).collect(),
                Some("") => text.chars().map(|c| c.to_string()).collect(),
                Some(separator) => text.split(separator).map(str::to_string).collect(),
            }
        }
        StringOp::Replace => {
            let Some(text) = args.first() else {
                return Vec::new();
            };
            let from = args.get(1).map(String::as_str).unwrap_or("");
            let to = args.get(2).map(String::as_str).unwrap_or("");
            if from.is_empty() {
                return vec![text.clone()];
            }
            vec![text.replace(from, to)]
        }
        StringOp::Concat => vec![args.concat()],
    }
}

fn fold_first(args: &[f64], f: impl Fn(f64, f64) -> f64) -> f64 {
    match args.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, x| f(acc, *x)),
        None => 0.0,
    }
}

fn chain(args: &[f64], f: impl Fn(f64, f64) -> bool) -> f64 {
    bool_value(args.windows(2).all(|pair| f(pair[0], pair[1])))
}

fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn bool_value(value: bool) -> f64 {
    if value {
        TRUE
    } else {
        FALSE
    }
}

/// No operands: `[0, 1)`. One operand `n`: `[0, n)`. Two or more: between the first two.
fn random<R: Rng + ?Sized>(args: &[f64], rng: &mut R) -> f64 {
    let (low, high) = match args {
        [] => (0.0, 1.0),
        [high] => (0.0, *high),
        [a, b, ..] => (*a, *b),
    };
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    if low == high {
        return low;
    }
    if (high - low).is_finite() {
        return rng.gen_range(low..high);
    }
    // The span overflows, so sample over the halved bounds and scale back up.
    let (half_low, half_high) = (low / 2.0, high / 2.0);
    ((half_low + rng.gen::<f64>() * (half_high - half_low)) * 2.0).clamp(low, high)
}
