use crate::cli::actions::Action;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        backend_url: matches
            .get_one("backend-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --backend-url"))?,
        cookie_secure: matches.get_flag("cookie-secure"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_builds_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "vigil",
            "--backend-url",
            "https://api.console.tld",
        ]);

        let Action::Server {
            port,
            backend_url,
            cookie_secure,
        } = handler(&matches)?;

        assert_eq!(port, 8080);
        assert_eq!(backend_url, "https://api.console.tld");
        assert!(!cookie_secure);

        Ok(())
    }
}
