#[derive(Debug)]
pub enum StatementTableError {
    /// The page has fewer tables than the statement layout needs.
    Missing { index: usize, found: usize },
    NoBody,
}

impl std::fmt::Display for StatementTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementTableError::Missing { index, found } => write!(
                f,
                "Statement table #{} not found, the page only has {} table(s)!",
                index + 1,
                found
            ),
            StatementTableError::NoBody => write!(f, "The statement table has no tbody!"),
        }
    }
}

impl std::error::Error for StatementTableError {}
