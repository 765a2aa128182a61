use crate::types::BinaryOp;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How the lexer decides where a `sin(`/`cos(` argument ends.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CallScan {
    /// The argument runs up to the *last* `)` of the remaining input and must
    /// not be empty. `sin(0)+(1)` therefore captures `0)+(1`, which later
    /// fails as an unexpected close bracket.
    #[default]
    Greedy,
    /// The argument runs up to the `)` matching the call's `(`.
    Balanced,
}

/// Order in which operator passes run over a scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Precedence {
    /// One pass per operator: `^`, `*`, `/`, `+`, `-`.
    /// `5-2+1` is `5-(2+1) = 2` and `8/2*2` is `8/(2*2) = 2`.
    #[default]
    Sequential,
    /// `^`, then `*` and `/` together, then `+` and `-` together.
    /// `5-2+1` is `4` and `8/2*2` is `8`.
    Conventional,
}

const SEQUENTIAL: &[&[BinaryOp]] = &[
    &[BinaryOp::Pow],
    &[BinaryOp::Mul],
    &[BinaryOp::Div],
    &[BinaryOp::Add],
    &[BinaryOp::Sub],
];

const CONVENTIONAL: &[&[BinaryOp]] = &[
    &[BinaryOp::Pow],
    &[BinaryOp::Mul, BinaryOp::Div],
    &[BinaryOp::Add, BinaryOp::Sub],
];

impl Precedence {
    /// Operators reduced by each pass, in pass order.
    pub fn passes(self) -> &'static [&'static [BinaryOp]] {
        match self {
            Precedence::Sequential => SEQUENTIAL,
            Precedence::Conventional => CONVENTIONAL,
        }
    }
}

/// Knobs for [`crate::evaluate_with`]. The default reproduces the classic
/// behaviour: greedy call arguments and one pass per operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    pub call_scan: CallScan,
    pub precedence: Precedence,
    /// Maximum nesting of brackets and calls before giving up.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            call_scan: CallScan::default(),
            precedence: Precedence::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalOptions {
    pub fn with_call_scan(mut self, call_scan: CallScan) -> Self {
        self.call_scan = call_scan;
        self
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EvalOptions::default();
        assert_eq!(options.call_scan, CallScan::Greedy);
        assert_eq!(options.precedence, Precedence::Sequential);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_every_operator_has_exactly_one_pass() {
        for precedence in [Precedence::Sequential, Precedence::Conventional] {
            for op in [
                BinaryOp::Add,
                BinaryOp::Sub,
                BinaryOp::Mul,
                BinaryOp::Div,
                BinaryOp::Pow,
            ] {
                let count = precedence
                    .passes()
                    .iter()
                    .filter(|pass| pass.contains(&op))
                    .count();
                assert_eq!(count, 1, "{:?} in {:?}", op, precedence);
            }
        }
    }

    #[test]
    fn test_builders() {
        let options = EvalOptions::default()
            .with_call_scan(CallScan::Balanced)
            .with_precedence(Precedence::Conventional)
            .with_max_depth(3);
        assert_eq!(options.call_scan, CallScan::Balanced);
        assert_eq!(options.precedence, Precedence::Conventional);
        assert_eq!(options.max_depth, 3);
    }
}
