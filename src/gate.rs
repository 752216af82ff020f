//! `ifok` / `ifnot` line prefixes.

pub const KEYWORDS: [&str; 2] = ["ifok", "ifnot"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `ifok`: run only after a zero status.
    Ok,
    /// `ifnot`: run only after a nonzero status.
    Not,
}

impl Condition {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "ifok" => Some(Condition::Ok),
            "ifnot" => Some(Condition::Not),
            _ => None,
        }
    }

    fn holds(self, last_status: u8) -> bool {
        match self {
            Condition::Ok => last_status == 0,
            Condition::Not => last_status != 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue with these tokens (meta-token removed, if there was one).
    Proceed(Vec<String>),
    /// Drop the line; the status is left as it was.
    Skip(Condition),
}

pub fn evaluate(tokens: Vec<String>, last_status: u8) -> GateDecision {
    let condition = match tokens.first().and_then(|t| Condition::parse(t)) {
        Some(condition) => condition,
        None => return GateDecision::Proceed(tokens),
    };

    if condition.holds(last_status) {
        GateDecision::Proceed(tokens.into_iter().skip(1).collect())
    } else {
        log::debug!("{:?} gate closed (last status {})", condition, last_status);
        GateDecision::Skip(condition)
    }
}
