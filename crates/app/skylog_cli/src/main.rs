// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use skylog_core::auth::jwt::{MAX_TOKEN_TTL_SECS, TokenIssuer, TokenVerifier};
use skylog_core::auth::password::{hash_password_with_cost, verify_password};
use skylog_core::models::auth::{Identity, Role};
use skylog_core::uuid::parse_id;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::GenSecret { length } => {
            println!("{}", gen_secret(length.into()));
        }
        Commands::HashPassword { password, cost } => {
            println!("{}", hash_password_with_cost(&password, cost)?);
        }
        Commands::VerifyPassword { password, hash } => {
            if !verify_password(&password, &hash) {
                return Err(Error::Custom("password does not match".into()));
            }
            println!("ok");
        }
        Commands::IssueToken {
            secret,
            sub,
            email,
            name,
            role,
            ttl_secs,
        } => {
            let mut identity = Identity::new(&email, &name, String::new());
            if let Some(raw) = sub {
                identity.id = parse_id(&raw)
                    .ok_or_else(|| Error::Custom(format!("invalid subject id: {raw}")))?;
            }
            identity.role = role.parse::<Role>().map_err(Error::Custom)?;

            let ttl = token_ttl(ttl_secs)?;
            let issuer = TokenIssuer::new(secret.as_bytes(), ttl.max(Duration::seconds(1)))?;
            let token = issuer.issue_at(&identity, Utc::now(), ttl)?;
            log::debug!("issued token for {}", identity.id);
            println!("{token}");
        }
        Commands::InspectToken {
            token,
            secret,
            previous,
        } => {
            let mut secrets = vec![secret];
            secrets.extend(previous.into_iter().filter(|s| !s.trim().is_empty()));
            let verifier = TokenVerifier::new(&secrets)?;
            let claims = verifier
                .verify(token.trim())
                .map_err(|e| Error::Custom(e.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
            if let Some(exp) = DateTime::<Utc>::from_timestamp(claims.exp, 0) {
                println!("valid until {}", exp.to_rfc3339());
            }
        }
    }

    Ok(())
}

/// Token lifetime from `--ttl-secs`. Negative values mint expired tokens.
fn token_ttl(ttl_secs: i64) -> Result<Duration> {
    if ttl_secs.unsigned_abs() > MAX_TOKEN_TTL_SECS.unsigned_abs() {
        return Err(Error::Custom(format!(
            "--ttl-secs must be within ±{MAX_TOKEN_TTL_SECS}"
        )));
    }
    Ok(Duration::seconds(ttl_secs))
}

/// Random alphanumeric secret of `length` characters.
fn gen_secret(length: usize) -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_requested_length() {
        let secret = gen_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ttl_is_bounded() {
        assert_eq!(token_ttl(600).unwrap(), Duration::seconds(600));
        assert_eq!(token_ttl(-60).unwrap(), Duration::seconds(-60));
        assert!(token_ttl(MAX_TOKEN_TTL_SECS).is_ok());
        assert!(token_ttl(10_000_000_000_000).is_err());
        assert!(token_ttl(i64::MIN).is_err());
    }
}
