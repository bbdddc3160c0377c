use thiserror::Error;

/// Errors constructing or shifting typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A calendar or clock component outside its valid range, including
    /// day-of-month combinations that name no real date.
    #[error("{component} out of range")]
    ComponentRange { component: &'static str },
    /// Calendar arithmetic left the representable date range.
    #[error("calendar arithmetic overflow")]
    Overflow,
}
