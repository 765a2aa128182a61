use std::fmt;

/// The five infix operators. Each one is reduced in its own pass, see
/// [`crate::options::Precedence`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Plain IEEE-754 arithmetic: `1 / 0` is infinity and `0 / 0` is NaN,
    /// neither is an error.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Pow => left.powf(right),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Pow => '^',
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Built-in unary functions, called as `name(<expression>)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Func {
    Sin,
    Cos,
}

impl Func {
    pub const ALL: [Func; 2] = [Func::Sin, Func::Cos];

    // Arguments are radians
    pub fn apply(self, argument: f64) -> f64 {
        match self {
            Func::Sin => argument.sin(),
            Func::Cos => argument.cos(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
