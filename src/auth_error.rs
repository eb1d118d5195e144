use std::path::PathBuf;

#[derive(Debug)]
pub enum AuthError {
    /// Another holder of the jar panicked while it was locked.
    CookieJarPoisoned,
    CookieFile { path: PathBuf, details: String },
    Prompt(std::io::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::CookieJarPoisoned => write!(f, "The session cookie jar is poisoned!"),
            AuthError::CookieFile { path, details } => {
                write!(f, "Cookie file {} is unusable: {}", path.display(), details)
            }
            AuthError::Prompt(e) => write!(f, "Could not read from the terminal: {e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Prompt(e) => Some(e),
            _ => None,
        }
    }
}
