//! Session command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use forgeguard_core::api::SessionUser;
use forgeguard_core::navigation::NavigationSet;
use serde_json::json;

use super::print_json;
use crate::cli::app::App;

/// Password from the flag/env, else one line of stdin.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

fn welcome(user: &SessionUser) {
    println!("Logged in as {} ({}).", user.display_name(), user.role);
}

pub async fn login(app: &mut App, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let user = app.store_mut().login(email.trim(), &password).await?;
    welcome(&user);
    Ok(())
}

pub async fn register(
    app: &mut App,
    email: &str,
    name: &str,
    password: Option<String>,
) -> Result<()> {
    let password = resolve_password(password)?;
    let user = app
        .store_mut()
        .register(email.trim(), &password, name.trim())
        .await?;
    println!("Account created.");
    welcome(&user);
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    let was_authenticated = app.store().is_authenticated();
    app.store_mut().logout().await;
    if was_authenticated {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn whoami(app: &App, json: bool) -> Result<()> {
    let state = app.store().state();
    let Some(user) = state.user.as_ref().filter(|_| state.is_authenticated()) else {
        if json {
            return print_json(&json!({ "authenticated": false }));
        }
        println!("Not logged in.");
        return Ok(());
    };

    if json {
        return print_json(&json!({
            "authenticated": true,
            "user": user,
            "is_admin": state.is_admin(),
        }));
    }

    println!("{} <{}>", user.display_name(), user.email);
    println!("Role: {}", user.role);
    println!();
    for item in NavigationSet::for_session(&state).items() {
        println!("  {:<18} {}", item.label, item.command);
    }
    Ok(())
}
