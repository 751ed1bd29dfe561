//! Interactive mode for the server.
//!
//! Asks for the listen address, the fixture to serve and an optional API
//! token, shows what will be started, and then hands over to
//! [`super::run_server`] through the usual environment variables.

use dialoguer::{Confirm, Input, Password};

use crate::ServerError;

/// Answers collected from the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Answers {
    bind_addr: String,
    port: u16,
    fixture: Option<String>,
    api_token: Option<String>,
}

impl Answers {
    /// Environment variables that make [`crate::ServerConfig::from_env`]
    /// reproduce these answers.
    fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("BIND_ADDR", self.bind_addr.clone()),
            ("PORT", self.port.to_string()),
        ];
        if let Some(fixture) = &self.fixture {
            vars.push(("MUNIFOR_FIXTURE", fixture.clone()));
        }
        if let Some(token) = &self.api_token {
            vars.push(("MUNIFOR_API_TOKEN", token.clone()));
        }
        vars
    }

    fn summary(&self) -> String {
        format!(
            "Serve {} on {}:{} ({})?",
            self.fixture.as_deref().unwrap_or("built-in data"),
            self.bind_addr,
            self.port,
            if self.api_token.is_some() {
                "token required"
            } else {
                "no authentication"
            }
        )
    }
}

fn non_blank(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn prompt() -> Result<Answers, ServerError> {
    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(8080)
        .interact_text()?;

    let fixture: String = Input::new()
        .with_prompt("Fixture file (empty for built-in data)")
        .allow_empty(true)
        .interact_text()?;

    let api_token = Password::new()
        .with_prompt("API token clients must send (empty to disable)")
        .allow_empty_password(true)
        .interact()?;

    Ok(Answers {
        bind_addr: bind_addr.trim().to_string(),
        port,
        fixture: non_blank(fixture),
        api_token: non_blank(api_token),
    })
}

/// Runs the server in interactive mode, prompting for configuration.
///
/// # Errors
///
/// Returns [`ServerError`] if a prompt fails or the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("MuniFor development server");
    println!();

    let answers = prompt()?;

    if !Confirm::new()
        .with_prompt(answers.summary())
        .default(true)
        .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    // SAFETY: called before the server spawns any threads; the variables
    // are read once during startup.
    unsafe {
        for (key, value) in answers.env_vars() {
            std::env::set_var(key, value);
        }
    }

    super::run_server().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerConfig;

    #[test]
    fn answers_round_trip_through_server_config() {
        let answers = Answers {
            bind_addr: "0.0.0.0".to_string(),
            port: 9000,
            fixture: Some("data/map.json".to_string()),
            api_token: Some("secret".to_string()),
        };
        let vars = answers.env_vars();
        let config = ServerConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.fixture.as_deref(), Some(std::path::Path::new("data/map.json")));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn blank_answers_are_left_unset() {
        assert_eq!(non_blank("   ".to_string()), None);
        let answers = Answers {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            fixture: None,
            api_token: None,
        };
        let keys: Vec<_> = answers.env_vars().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["BIND_ADDR", "PORT"]);
        assert!(answers.summary().contains("no authentication"));
    }
}
