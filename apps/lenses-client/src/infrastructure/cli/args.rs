//! Command line arguments for the `lenses` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::quota::{CONSUMER_BYTE_RATE, PRODUCER_BYTE_RATE, REQUEST_PERCENTAGE};

/// Lenses command line client.
#[derive(Debug, Parser)]
#[command(name = "lenses", version, about = "Query and administer a Lenses server", long_about = None)]
pub struct Cli {
    /// Server host, e.g. https://lenses.example.com
    #[arg(long, env = "LENSES_HOST", global = true)]
    pub host: Option<String>,

    /// Authentication token.
    #[arg(long, env = "LENSES_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress success messages.
    #[arg(long, global = true)]
    pub silent: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a SQL query and print every message as a JSON line.
    Query(QueryArgs),

    /// List all available quotas.
    Quotas(ListQuotasArgs),

    /// Create, update or delete a quota.
    Quota {
        /// Quota scope.
        #[command(subcommand)]
        scope: QuotaScope,
    },
}

/// `lenses query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// SQL text to execute.
    pub sql: String,

    /// Keep the query running and stream new records.
    #[arg(long)]
    pub live: bool,

    /// Stats interval in seconds.
    #[arg(long, default_value_t = 0)]
    pub stats: u32,
}

/// `lenses quotas`.
#[derive(Debug, Args)]
pub struct ListQuotasArgs {
    /// Print the raw JSON listing.
    #[arg(long)]
    pub json: bool,
}

/// `lenses quota <scope>`.
#[derive(Debug, Subcommand)]
pub enum QuotaScope {
    /// Work with user quotas.
    Users {
        /// Action to perform.
        #[command(subcommand)]
        action: UserQuotaAction,
    },

    /// Work with client quotas.
    Clients {
        /// Action to perform.
        #[command(subcommand)]
        action: ClientQuotaAction,
    },
}

/// `lenses quota users <action>`.
#[derive(Debug, Subcommand)]
pub enum UserQuotaAction {
    /// Create or update the default user quota or a specific user quota
    /// (and/or client(s)).
    #[command(visible_aliases = ["create", "update"])]
    Set(UserSetArgs),

    /// Delete the default user quota or a specific quota for a user (and
    /// client).
    Delete(UserDeleteArgs),
}

/// `lenses quota clients <action>`.
#[derive(Debug, Subcommand)]
pub enum ClientQuotaAction {
    /// Create or update the default client quota or a specific client quota.
    #[command(visible_aliases = ["create", "update"])]
    Set(ClientSetArgs),

    /// Delete the default client quota or a specific one.
    Delete(ClientDeleteArgs),
}

/// Quota config sources shared by the `set` commands.
#[derive(Debug, Clone, Default, Args)]
pub struct PayloadArgs {
    /// Quota config as inline JSON or a path to a JSON/YAML file.
    #[arg(long = "quota-config")]
    pub quota_config: Option<String>,

    /// YAML/JSON file with `Config`, `User` and `Client` fields.
    #[arg(long, conflicts_with = "quota_config")]
    pub file: Option<PathBuf>,
}

/// `lenses quota users set`.
#[derive(Debug, Args)]
pub struct UserSetArgs {
    /// User name; omit for the default user quota.
    #[arg(long = "quota-user")]
    pub quota_user: Option<String>,

    /// Client id, `all` or `*` for every client of the user.
    #[arg(long = "quota-client")]
    pub quota_client: Option<String>,

    /// Quota config source.
    #[command(flatten)]
    pub payload: PayloadArgs,
}

/// `lenses quota users delete`.
#[derive(Debug, Args)]
pub struct UserDeleteArgs {
    /// User name; omit for the default user quota.
    #[arg(long = "quota-user")]
    pub quota_user: Option<String>,

    /// Client id, `all` or `*` for every client of the user.
    #[arg(long = "quota-client")]
    pub quota_client: Option<String>,

    /// Config keys to remove; none removes the whole quota.
    #[arg(value_parser = [PRODUCER_BYTE_RATE, CONSUMER_BYTE_RATE, REQUEST_PERCENTAGE])]
    pub keys: Vec<String>,
}

/// `lenses quota clients set`.
#[derive(Debug, Args)]
pub struct ClientSetArgs {
    /// Client id; omit, `all` or `*` for the default client quota.
    #[arg(long = "quota-client")]
    pub quota_client: Option<String>,

    /// Quota config source.
    #[command(flatten)]
    pub payload: PayloadArgs,
}

/// `lenses quota clients delete`.
#[derive(Debug, Args)]
pub struct ClientDeleteArgs {
    /// Client id; omit, `all` or `*` for the default client quota.
    #[arg(long = "quota-client")]
    pub quota_client: Option<String>,

    /// Config keys to remove; none removes the whole quota.
    #[arg(value_parser = [PRODUCER_BYTE_RATE, CONSUMER_BYTE_RATE, REQUEST_PERCENTAGE])]
    pub keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_live_query() {
        let cli = Cli::try_parse_from([
            "lenses", "--host", "http://h", "--token", "t", "query", "SELECT * FROM t", "--live",
            "--stats", "2",
        ])
        .unwrap();

        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.sql, "SELECT * FROM t");
        assert!(args.live);
        assert_eq!(args.stats, 2);
        assert_eq!(cli.host.as_deref(), Some("http://h"));
    }

    #[test]
    fn parses_user_set_alias() {
        let cli = Cli::try_parse_from([
            "lenses",
            "quota",
            "users",
            "create",
            "--quota-user",
            "bob",
            "--quota-client",
            "*",
            "--quota-config",
            r#"{"producer_byte_rate":"1"}"#,
        ])
        .unwrap();

        let Command::Quota {
            scope: QuotaScope::Users {
                action: UserQuotaAction::Set(args),
            },
        } = cli.command
        else {
            panic!("expected users set");
        };
        assert_eq!(args.quota_user.as_deref(), Some("bob"));
        assert_eq!(args.quota_client.as_deref(), Some("*"));
        assert!(args.payload.quota_config.is_some());
    }

    #[test]
    fn delete_keys_are_validated() {
        let ok = Cli::try_parse_from([
            "lenses",
            "quota",
            "clients",
            "delete",
            "--quota-client",
            "app",
            "producer_byte_rate",
            "request_percentage",
        ]);
        assert!(ok.is_ok());

        let bad = Cli::try_parse_from(["lenses", "quota", "clients", "delete", "bogus_key"]);
        assert!(bad.is_err());
    }

    #[test]
    fn file_conflicts_with_inline_config() {
        let result = Cli::try_parse_from([
            "lenses",
            "quota",
            "clients",
            "set",
            "--quota-config",
            "{}",
            "--file",
            "q.yaml",
        ]);
        assert!(result.is_err());
    }
}
