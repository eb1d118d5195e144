use std::io::{self, BufRead, Write};

use crate::{AuthCodeSource, AuthError, Credentials};

fn prompt_line(label: &str) -> Result<String, AuthError> {
    print!("{label}: ");
    io::stdout().flush().map_err(AuthError::Prompt)?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(AuthError::Prompt)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

impl Credentials {
    /// Asks for the id (echoed) and the password (masked).
    pub fn prompt() -> Result<Self, AuthError> {
        let identifier = prompt_line("ID")?;
        let secret = rpassword::prompt_password("Password: ").map_err(AuthError::Prompt)?;
        Ok(Self { identifier, secret })
    }
}

/// Reads the one-time code from the terminal.
pub struct StdinAuthCode;

impl AuthCodeSource for StdinAuthCode {
    fn auth_code(&mut self) -> Result<String, AuthError> {
        prompt_line("Auth code")
    }
}
