//! Operator confirmation before mutating a high-stakes network.

use std::io::{BufRead, Write};

use crate::Network;

/// The answer that lets a high-stakes deployment proceed.
const AFFIRMATIVE: &str = "yes";

/// What the operator decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Declined,
}

/// Ask for confirmation when `network` is high-stakes.
///
/// Only an exact `yes` (any case, line terminator ignored) proceeds. An
/// empty answer, a closed input or a read error declines. Networks that are not
/// high-stakes proceed without prompting.
pub fn confirm<R: BufRead, W: Write>(
    network: Network,
    input: &mut R,
    output: &mut W,
) -> GateDecision {
    if !network.is_high_stakes() {
        return GateDecision::Proceed;
    }

    tracing::warn!("WARNING: You are deploying to {}!", network.to_string().to_uppercase());
    tracing::warn!("This will cost real funds and cannot be undone.");

    if write!(output, "Type '{}' to continue: ", AFFIRMATIVE)
        .and_then(|_| output.flush())
        .is_err()
    {
        return GateDecision::Declined;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) if answer
            .trim_end_matches(['\r', '\n'])
            .eq_ignore_ascii_case(AFFIRMATIVE) =>
        {
            GateDecision::Proceed
        }
        Ok(_) => GateDecision::Declined,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read confirmation");
            GateDecision::Declined
        }
    }
}
