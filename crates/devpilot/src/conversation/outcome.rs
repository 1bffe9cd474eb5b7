/// How one exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The model produced a final answer. Empty when it replied with nothing.
    Answered(String),
    /// Transport or configuration failure; the message was shown to the user.
    Failed(String),
    /// The operator stopped the exchange.
    Stopped,
    /// The round cap was reached before a final answer.
    IterationLimit { iterations: u32 },
}

impl ExchangeOutcome {
    pub fn answer(&self) -> Option<&str> {
        match self {
            ExchangeOutcome::Answered(text) => Some(text),
            _ => None,
        }
    }
}
