//! Sign-in handlers: magic link request, verification, session display.

use serde::Serialize;

use dealdrop_core::{Market, Role, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Session fields safe to print; the token stays out.
#[derive(Serialize)]
struct SessionView<'a> {
    user_id: &'a str,
    email: &'a str,
    name: Option<&'a str>,
    role: Role,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(s: &'a Session) -> Self {
        Self {
            user_id: s.user_id.as_str(),
            email: &s.email,
            name: s.name.as_deref(),
            role: s.role,
        }
    }
}

fn print_session(session: &Session, global: &GlobalOpts) {
    let view = SessionView::from(session);
    let out = output::render_single(
        &global.output,
        &view,
        |v| format!("{} <{}> ({})", v.name.unwrap_or(v.email), v.email, v.role),
        |v| v.user_id.to_owned(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn login(market: &Market, email: &str, global: &GlobalOpts) -> Result<(), CliError> {
    market.request_login(email).await?;
    output::notice(
        global,
        format!("Sign-in link sent to {email}. Run: dealdrop verify <token>"),
    );
    Ok(())
}

pub async fn verify(market: &Market, token: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let session = market.verify_login(token).await?;
    output::notice(global, format!("Signed in as {}", session.display_name()));
    print_session(&session, global);
    Ok(())
}

pub fn logout(market: &Market, global: &GlobalOpts) -> Result<(), CliError> {
    market.logout()?;
    output::notice(global, "Signed out");
    Ok(())
}

pub fn whoami(market: &Market, global: &GlobalOpts) -> Result<(), CliError> {
    let session = market.session().ok_or(CliError::NotSignedIn)?;
    print_session(&session, global);
    Ok(())
}
