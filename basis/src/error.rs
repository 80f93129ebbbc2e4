use thiserror::Error;

/// Misuse of one of the enumeration protocols. These are programmer errors:
/// callers are expected to propagate them and stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("sub-iterator advanced before init()")]
    NotInitialized,
    #[error("sub-iterator advanced past its last element ({count} elements)")]
    Exhausted { count: usize },
    #[error("sub-iterator has no current element")]
    NoCurrent,
    #[error("derivative index iterator advanced past its last index (range rank {range_rank})")]
    DerivIndexExhausted { range_rank: usize },
}

/// A shell-quartet fixture that cannot be used for a verification run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixtureError {
    #[error("vector length must be at least 1")]
    EmptyVector,
    #[error("contraction depth must be at least 1")]
    EmptyContraction,
    #[error("shell {shell}: expected {expected} {what}, found {found}")]
    Shape {
        shell: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("shell {shell}, lane {lane}, primitive {prim}: exponent {value} is not positive")]
    Exponent {
        shell: usize,
        lane: usize,
        prim: usize,
        value: f64,
    },
}
