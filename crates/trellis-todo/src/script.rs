//! Command-line interaction steps

use crate::state::{Filter, UnknownFilter};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One simulated user interaction. Positions count from 1 over the
/// currently visible items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Add(String),
    Toggle(usize),
    Destroy(usize),
    Edit(usize, String),
    ToggleAll,
    ClearCompleted,
    Filter(Filter),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepParseError {
    #[error("unknown step `{0}`")]
    Unknown(String),

    #[error("step `{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("`{0}` is not a position (positions start at 1)")]
    BadPosition(String),

    #[error(transparent)]
    Filter(#[from] UnknownFilter),
}

fn position(raw: &str) -> Result<usize, StepParseError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StepParseError::BadPosition(raw.to_string())),
    }
}

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let require = |step: &'static str| arg.ok_or(StepParseError::MissingArgument(step));

        match name {
            "add" => Ok(Step::Add(require("add")?.to_string())),
            "toggle" => Ok(Step::Toggle(position(require("toggle")?)?)),
            "destroy" => Ok(Step::Destroy(position(require("destroy")?)?)),
            "edit" => {
                let (n, text) = require("edit")?
                    .split_once(':')
                    .ok_or(StepParseError::MissingArgument("edit"))?;
                Ok(Step::Edit(position(n)?, text.to_string()))
            }
            "toggle-all" => Ok(Step::ToggleAll),
            "clear-completed" => Ok(Step::ClearCompleted),
            "filter" => Ok(Step::Filter(require("filter")?.parse()?)),
            _ => Err(StepParseError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Add(text) => write!(f, "add:{text}"),
            Step::Toggle(n) => write!(f, "toggle:{n}"),
            Step::Destroy(n) => write!(f, "destroy:{n}"),
            Step::Edit(n, text) => write!(f, "edit:{n}:{text}"),
            Step::ToggleAll => f.write_str("toggle-all"),
            Step::ClearCompleted => f.write_str("clear-completed"),
            Step::Filter(filter) => write!(f, "filter:{filter}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("add:buy milk", Step::Add("buy milk".into()))]
    #[test_case("add:a:b", Step::Add("a:b".into()) ; "text keeps colons")]
    #[test_case("toggle:2", Step::Toggle(2))]
    #[test_case("destroy:1", Step::Destroy(1))]
    #[test_case("edit:3:walk dog", Step::Edit(3, "walk dog".into()))]
    #[test_case("edit:1:", Step::Edit(1, String::new()) ; "blank edit")]
    #[test_case("toggle-all", Step::ToggleAll)]
    #[test_case("clear-completed", Step::ClearCompleted)]
    #[test_case("filter:active", Step::Filter(Filter::Active))]
    fn parses(input: &str, expected: Step) {
        assert_eq!(input.parse::<Step>(), Ok(expected));
    }

    #[test_case("toggle:0", StepParseError::BadPosition("0".into()) ; "zero")]
    #[test_case("toggle:x", StepParseError::BadPosition("x".into()) ; "not a number")]
    #[test_case("destroy", StepParseError::MissingArgument("destroy"))]
    #[test_case("edit:2", StepParseError::MissingArgument("edit") ; "edit without text")]
    #[test_case("filter:done", StepParseError::Filter(UnknownFilter("done".into())))]
    #[test_case("undo", StepParseError::Unknown("undo".into()))]
    fn rejects(input: &str, expected: StepParseError) {
        assert_eq!(input.parse::<Step>(), Err(expected));
    }

    #[test]
    fn display_parses_back() {
        for step in [
            Step::Add("x".into()),
            Step::Edit(2, "y".into()),
            Step::ToggleAll,
            Step::Filter(Filter::Completed),
        ] {
            assert_eq!(step.to_string().parse::<Step>(), Ok(step));
        }
    }
}
