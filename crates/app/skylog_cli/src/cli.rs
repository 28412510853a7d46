use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "skylog", version, about = "Skylog operator tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version.
    Version,

    /// Generate a random signing secret.
    GenSecret {
        /// Number of characters.
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(32..))]
        length: u16,
    },

    /// Hash a password with bcrypt.
    HashPassword {
        password: String,

        /// bcrypt cost (4-31).
        #[arg(long, default_value_t = skylog_core::auth::password::BCRYPT_COST)]
        cost: u32,
    },

    /// Check a password against a bcrypt hash.
    VerifyPassword { password: String, hash: String },

    /// Sign a token for an arbitrary subject.
    IssueToken {
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,

        /// Subject id; a fresh one is generated when omitted.
        #[arg(long)]
        sub: Option<String>,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "user")]
        role: String,

        /// Lifetime in seconds. Negative values mint an expired token.
        #[arg(long, allow_negative_numbers = true, default_value_t = skylog_core::auth::jwt::DEFAULT_TOKEN_TTL_SECS)]
        ttl_secs: i64,
    },

    /// Verify a token and print its claims.
    InspectToken {
        token: String,

        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,

        /// Retired secrets to try after the primary one.
        #[arg(long = "previous", env = "JWT_PREVIOUS_SECRETS", hide_env_values = true, value_delimiter = ',')]
        previous: Vec<String>,
    },
}
