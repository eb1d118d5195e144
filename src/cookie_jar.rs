use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
    sync::Arc,
};

use cookie_store::CookieStore;
use log::info;
use reqwest_cookie_store::CookieStoreMutex;

use crate::AuthError;

/// Restores the jar saved by a previous run, or starts an empty one.
pub fn load_cookie_jar(path: &Path) -> Result<Arc<CookieStoreMutex>, AuthError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Arc::new(CookieStoreMutex::new(CookieStore::default())));
        }
        Err(e) => return Err(cookie_file_error(path, e)),
    };
    let store = cookie_store::serde::json::load(BufReader::new(file))
        .map_err(|e| cookie_file_error(path, e))?;
    info!("Restored cookies from {}", path.display());
    Ok(Arc::new(CookieStoreMutex::new(store)))
}

/// Replaces whatever the file held with the jar's current cookies.
pub fn save_cookie_jar(jar: &CookieStoreMutex, path: &Path) -> Result<(), AuthError> {
    let store = jar.lock().map_err(|_| AuthError::CookieJarPoisoned)?;
    let file = File::create(path).map_err(|e| cookie_file_error(path, e))?;
    let mut writer = BufWriter::new(file);
    cookie_store::serde::json::save(&store, &mut writer).map_err(|e| cookie_file_error(path, e))?;
    writer.flush().map_err(|e| cookie_file_error(path, e))?;
    Ok(())
}

fn cookie_file_error(path: &Path, e: impl std::fmt::Display) -> AuthError {
    AuthError::CookieFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    }
}
