/// Main error type
///
/// Every variant describes a structurally invalid configuration. Numerical degeneracies of single
/// candidate designs never surface as errors, they are scored with an infinite cost instead.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// A value is required to be strictly positive.
    #[error("{field} must be > 0 but is {value}")]
    NonPositive {
        /// Name of the field.
        field: &'static str,
        /// Found value.
        value: f64,
    },
    /// A value lies outside its closed admissible range.
    #[error("{field} must be within [{min}, {max}] but is {value}")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// Found value.
        value: f64,
        /// Lower end of the admissible range.
        min: f64,
        /// Upper end of the admissible range.
        max: f64,
    },
    /// The lower end of an interval is greater than its upper end.
    #[error("interval [{lower_name}, {upper_name}] is empty: {lower} > {upper}")]
    InvalidInterval {
        /// Name of the lower end.
        lower_name: &'static str,
        /// Name of the upper end.
        upper_name: &'static str,
        /// Value of the lower end.
        lower: f64,
        /// Value of the upper end.
        upper: f64,
    },
    /// Two given matrices do not have the same shape.
    #[error("mat {mat1} with shape {shape1:?} and {mat2} with {shape2:?} do not match")]
    ShapeMismatch {
        /// Name of matrix 1.
        mat1: &'static str,
        /// Name of matrix 2.
        mat2: &'static str,
        /// Shape of matrix 1.
        shape1: (usize, usize),
        /// Shape of matrix 2.
        shape2: (usize, usize),
    },
    /// Less PLDs requested than parameters to estimate.
    #[error("npld is {npld} but at least {min} PLDs are required to estimate CBF and ATT")]
    TooFewPlds {
        /// Requested number of PLDs.
        npld: usize,
        /// Minimal number of PLDs.
        min: usize,
    },
    /// The PLD grid contains less distinct values than PLDs requested.
    #[error("cannot draw {npld} distinct PLDs from a grid of {available} values")]
    TooFewGridPoints {
        /// Requested number of PLDs.
        npld: usize,
        /// Number of values on the PLD grid.
        available: usize,
    },
    /// Even the shortest admissible PLD set does not fit into the scan duration once.
    #[error("scan duration {duration}s is shorter than the {required}s needed for one repeat")]
    ScanTooShort {
        /// Total scan duration.
        duration: f64,
        /// Duration of one repeat of the shortest PLD set.
        required: f64,
    },
    /// Exhaustive search would have to score more candidates than allowed.
    #[error("exhaustive search requires {candidates} candidates but the limit is {max}")]
    SearchSpaceTooLarge {
        /// Number of candidate PLD sets.
        candidates: u128,
        /// Allowed maximum.
        max: u128,
    },
}

impl Error {
    /// Returns true if the error was caused by the configuration of the search.
    ///
    /// All current variants describe configuration errors.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::NonPositive { .. }
            | Error::OutOfRange { .. }
            | Error::InvalidInterval { .. }
            | Error::ShapeMismatch { .. }
            | Error::TooFewPlds { .. }
            | Error::TooFewGridPoints { .. }
            | Error::ScanTooShort { .. }
            | Error::SearchSpaceTooLarge { .. } => true,
        }
    }
}

/// Main result type
pub type Result<T> = std::result::Result<T, Error>;

/// Returns [Error::NonPositive] unless `value` is finite and > 0.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(Error::NonPositive { field, value })
    }
}

/// Returns [Error::OutOfRange] unless `value` lies within `[min, max]`.
pub(crate) fn ensure_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Returns [Error::InvalidInterval] unless `lower <= upper`.
pub(crate) fn ensure_interval(
    lower_name: &'static str,
    upper_name: &'static str,
    lower: f64,
    upper: f64,
) -> Result<()> {
    if lower <= upper {
        Ok(())
    } else {
        Err(Error::InvalidInterval {
            lower_name,
            upper_name,
            lower,
            upper,
        })
    }
}
