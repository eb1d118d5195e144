mod auth_error;
mod config;
mod cookie_jar;
mod csv_export;
mod history;
mod login;
mod page_context;
mod prompt;
mod requests;
mod statement_table_error;
mod text_manipulators;

pub use auth_error::AuthError;
pub use config::{LoadFromEnv, PortalEndpoints, ScrapingConfig};
pub use cookie_jar::{load_cookie_jar, save_cookie_jar};
pub use csv_export::write_history_csv;
pub use history::{
    HISTORY_FIELDS, HistoryFetcher, HistoryRow, YearMonth, parse_history, statement_table,
};
pub use login::{
    AuthCodeSource, AuthenticatedSession, Credentials, LoginFlow, SessionAuthenticator,
};
pub use page_context::PageContext;
pub use prompt::StdinAuthCode;
pub use requests::RequestClient;
pub use statement_table_error::StatementTableError;
