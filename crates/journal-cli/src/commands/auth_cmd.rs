use std::io::{self, BufRead, IsTerminal, Write};

use journal_core::router::LOGIN_PATH;

use crate::app::App;
use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, app: &App) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { username, password } => {
            run_login(app, &username, password).await
        }
        AuthCommands::Status => {
            run_status(app);
            Ok(())
        }
        AuthCommands::Logout => run_logout(app),
    }
}

async fn run_login(app: &App, username: &str, password: Option<String>) -> Result<(), CliError> {
    let location = app.enter(LOGIN_PATH)?;
    if location.path != LOGIN_PATH {
        if let Some(user) = app.auth.user() {
            println!(
                "Profile '{}' is already signed in as {}",
                app.profile_name, user.username
            );
        }
        return Ok(());
    }

    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };
    let session = app.auth.login(username, &password).await?;
    println!(
        "Signed in profile '{}' as {}",
        app.profile_name, session.user.username
    );
    tracing::debug!("Continuing at {}", app.router.post_login_target());
    Ok(())
}

fn run_status(app: &App) {
    match app.auth.user() {
        Some(user) => println!(
            "Profile '{}' is signed in as {} (user id {}) at {}",
            app.profile_name, user.username, user.id, app.config.api_base_url
        ),
        None => println!("Profile '{}' is not signed in.", app.profile_name),
    }
}

fn run_logout(app: &App) -> Result<(), CliError> {
    app.auth.logout()?;
    app.diaries.reset();
    app.router.navigate(LOGIN_PATH);
    println!("Signed out profile '{}'", app.profile_name);
    Ok(())
}

/// One line from stdin, with a prompt when attached to a terminal.
fn read_password() -> Result<String, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        io::stderr().flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
