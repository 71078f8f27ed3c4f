//! CLI session command handlers for login, status, and logout.

use crate::error::Result;
use crate::session::{FileSessionStore, SessionStore, SessionUpdate};

pub(crate) fn open_store(profile: &str) -> Result<FileSessionStore> {
    Ok(FileSessionStore::for_profile(
        &FileSessionStore::default_dir(),
        profile,
    )?)
}

/// Handle `authgate session login`.
pub fn handle_login(
    profile: &str,
    access_token: &str,
    refresh_token: Option<String>,
) -> Result<()> {
    let store = open_store(profile)?;
    let has_refresh = refresh_token.is_some();
    store.set(SessionUpdate::login(access_token, refresh_token));
    println!("Session stored at {}", store.path().display());
    if !has_refresh {
        println!("No refresh token given; the session ends when the access token expires.");
    }
    Ok(())
}

/// Handle `authgate session status`.
pub fn handle_status(profile: &str) -> Result<()> {
    let store = open_store(profile)?;
    let state = store.get();
    println!("Profile:         {profile}");
    println!(
        "Access token:    {}",
        if state.access_token.is_some() { "present" } else { "none" }
    );
    println!(
        "Refresh token:   {}",
        if state.refresh_token.is_some() { "present" } else { "none" }
    );
    println!("Token validated: {}", state.token_validated);
    Ok(())
}

/// Handle `authgate session logout`.
pub fn handle_logout(profile: &str) -> Result<()> {
    let store = open_store(profile)?;
    store.purge()?;
    println!("Logged out ({profile})");
    Ok(())
}
