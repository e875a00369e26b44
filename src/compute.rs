pub mod engine;
pub mod environment;
pub mod functions;
pub mod operator;

pub use engine::{AutoComputeEngine, TickReport};
pub use environment::ComputeEnvironment;
pub use operator::{EdgeOperator, EnvironmentFunction, MathOp, NamedFunction, NodeOperator, StringOp};
