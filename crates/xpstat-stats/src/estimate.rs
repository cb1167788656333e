use serde::Serialize;

/// Why a statistic could not be computed for otherwise valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// A sample has no variation (every value is equal).
    #[display("input is constant")]
    ConstantInput,
    /// Not enough observations for the procedure.
    #[display("too few observations")]
    TooFewObservations,
    /// Every group is internally constant, so the F ratio has a zero denominator.
    #[display("zero within-group variance")]
    ZeroWithinGroupVariance,
    /// A contingency table with a single row or column has no degrees of freedom.
    #[display("degenerate contingency table")]
    DegenerateTable,
}

/// The result of a statistical procedure that may be undefined.
///
/// # Examples
///
/// ```
/// use xpstat_stats::{Estimate, UndefinedReason};
///
/// let defined: Estimate<f64> = Estimate::Defined(0.5);
/// assert_eq!(defined.defined(), Some(&0.5));
///
/// let undefined: Estimate<f64> = Estimate::Undefined {
///     reason: UndefinedReason::ConstantInput,
/// };
/// assert!(undefined.is_undefined());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Estimate<T> {
    Defined(T),
    Undefined { reason: UndefinedReason },
}

impl<T> Estimate<T> {
    #[must_use]
    pub fn undefined(reason: UndefinedReason) -> Self {
        Self::Undefined { reason }
    }

    /// Returns the computed value, if any.
    #[must_use]
    pub fn defined(&self) -> Option<&T> {
        match self {
            Self::Defined(value) => Some(value),
            Self::Undefined { .. } => None,
        }
    }

    #[must_use]
    pub fn into_defined(self) -> Option<T> {
        match self {
            Self::Defined(value) => Some(value),
            Self::Undefined { .. } => None,
        }
    }

    /// Returns the reason the value is undefined, if it is.
    #[must_use]
    pub fn reason(&self) -> Option<UndefinedReason> {
        match self {
            Self::Defined(_) => None,
            Self::Undefined { reason } => Some(*reason),
        }
    }

    pub fn map<U, F>(self, f: F) -> Estimate<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Defined(value) => Estimate::Defined(f(value)),
            Self::Undefined { reason } => Estimate::Undefined { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_reason() {
        let e: Estimate<i32> = Estimate::undefined(UndefinedReason::DegenerateTable);
        let mapped = e.map(|v| v * 2);
        assert_eq!(mapped.reason(), Some(UndefinedReason::DegenerateTable));
    }

    #[test]
    fn test_serialize_tagged() {
        let e: Estimate<f64> = Estimate::undefined(UndefinedReason::ConstantInput);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"status":"undefined","reason":"constant_input"}"#);
    }
}
