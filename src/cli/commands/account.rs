//! Account commands: signup and signin against the task backend.

use crate::backend::AuthClient;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use console::Term;
use std::time::Duration;

/// Create a new account on the task backend.
pub async fn run_signup(email: &str, settings: Settings) -> Result<()> {
    let term = Term::stdout();
    term.write_str("Password: ")?;
    let password = term.read_secure_line()?;

    let auth = auth_client(&settings)?;
    let user = auth.signup(email, &password).await?;

    Output::success(&format!("Account created for {} (id {})", user.email, user.id));
    Output::info("Sign in with: syssel signin <email>");
    Ok(())
}

/// Sign in and print a bearer token for later use.
pub async fn run_signin(email: &str, settings: Settings) -> Result<()> {
    let term = Term::stdout();
    term.write_str("Password: ")?;
    let password = term.read_secure_line()?;

    let auth = auth_client(&settings)?;
    let token = auth.signin(email, &password).await?;

    Output::success("Signed in.");
    println!("{}", token.access_token);
    Output::info("Export it for chat sessions: export SYSSEL_TOKEN=<token>");
    Ok(())
}

fn auth_client(settings: &Settings) -> Result<AuthClient> {
    AuthClient::new(
        &settings.backend.base_url,
        Duration::from_secs(settings.backend.timeout_seconds),
    )
}
