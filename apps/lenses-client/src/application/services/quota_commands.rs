//! Quota Commands
//!
//! Turns `quota users|clients set|delete` requests into quota port calls
//! and produces the outcome message shown to the operator.

use thiserror::Error;

use crate::application::ports::{QuotaError, QuotaPort};
use crate::domain::quota::{Quota, QuotaConfig, QuotaTarget, delete_verb};

/// Errors from quota commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A required flag was not given.
    #[error("required flag \"{0}\" not set")]
    MissingFlag(&'static str),

    /// The payload could not be read or parsed.
    #[error("invalid quota payload: {0}")]
    InvalidPayload(String),

    /// The server refused the action; the message is operator facing.
    #[error("{0}")]
    Rejected(String),

    /// Any other quota API failure.
    #[error(transparent)]
    Quota(#[from] QuotaError),
}

/// Quota administration use cases.
#[derive(Debug)]
pub struct QuotaCommands<P> {
    port: P,
}

impl<P: QuotaPort> QuotaCommands<P> {
    /// Create the commands over a quota port.
    pub const fn new(port: P) -> Self {
        Self { port }
    }

    /// List every quota.
    pub async fn list(&self) -> Result<Vec<Quota>, CommandError> {
        Ok(self.port.list_quotas().await?)
    }

    /// `quota users set`.
    pub async fn set_user_quota(
        &self,
        user: Option<&str>,
        client: Option<&str>,
        config: Option<&QuotaConfig>,
    ) -> Result<String, CommandError> {
        let config = config.ok_or(CommandError::MissingFlag("quota-config"))?;
        let target = QuotaTarget::for_users(user, client);

        self.port.set_quota(&target, config).await?;
        tracing::debug!(quota = %target, "Quota set");

        Ok(match target {
            QuotaTarget::UserAllClients(user) => format!("Quota for user {user} and all clients set"),
            QuotaTarget::UserClient { user, client } => {
                format!("Quota for user {user} and client {client} set")
            }
            QuotaTarget::User(user) => format!("Quota for user {user} created/updated"),
            _ => "Default user quota created/updated".to_string(),
        })
    }

    /// `quota clients set`.
    pub async fn set_client_quota(
        &self,
        client: Option<&str>,
        config: Option<&QuotaConfig>,
    ) -> Result<String, CommandError> {
        let config = config.ok_or(CommandError::MissingFlag("quota-config"))?;
        let target = QuotaTarget::for_clients(client);

        self.port.set_quota(&target, config).await?;
        tracing::debug!(quota = %target, "Quota set");

        Ok(match target {
            QuotaTarget::Client(client) => format!("Quota for client {client} created/updated"),
            _ => "Default client quota created/updated".to_string(),
        })
    }

    /// `quota users delete`.
    pub async fn delete_user_quota(
        &self,
        user: Option<&str>,
        client: Option<&str>,
        keys: &[String],
    ) -> Result<String, CommandError> {
        let verb = delete_verb(keys);
        let target = QuotaTarget::for_users(user, client);

        if let Err(err) = self.port.delete_quota(&target, keys).await {
            return Err(friendly(err, verb, &target));
        }
        tracing::debug!(quota = %target, keys = ?keys, "Quota deleted");

        Ok(match target {
            QuotaTarget::UserAllClients(user) => {
                format!("Quota for user {user} {verb}d for all clients")
            }
            QuotaTarget::UserClient { user, client } => {
                format!("Quota for user {user} {verb}d for client {client}")
            }
            QuotaTarget::User(user) => format!("Quota for user {user} {verb}d"),
            _ => format!("Default user quota {verb}d"),
        })
    }

    /// `quota clients delete`.
    pub async fn delete_client_quota(
        &self,
        client: Option<&str>,
        keys: &[String],
    ) -> Result<String, CommandError> {
        let verb = delete_verb(keys);
        let target = QuotaTarget::for_clients(client);

        if let Err(err) = self.port.delete_quota(&target, keys).await {
            return Err(friendly(err, verb, &target));
        }
        tracing::debug!(quota = %target, keys = ?keys, "Quota deleted");

        Ok(match target {
            QuotaTarget::Client(client) => format!("Quota for client {client} {verb}d"),
            _ => format!("Default client quota {verb}d"),
        })
    }
}

/// Rewrite not-found and not-accessible faults of a delete into operator
/// messages. Default quotas keep the raw not-found error.
fn friendly(err: QuotaError, verb: &str, target: &QuotaTarget) -> CommandError {
    match (err, target) {
        (QuotaError::NotAccessible, _) => CommandError::Rejected(format!(
            "unable to {verb} quota, user has no rights for this action"
        )),
        (QuotaError::NotFound, QuotaTarget::User(user) | QuotaTarget::UserAllClients(user)) => {
            CommandError::Rejected(format!(
                "unable to {verb}, quota for user: '{user}' does not exist"
            ))
        }
        (QuotaError::NotFound, QuotaTarget::UserClient { user, client }) => {
            CommandError::Rejected(format!(
                "unable to {verb}, quota for user: '{user}' and client: '{client}' does not exist"
            ))
        }
        (QuotaError::NotFound, QuotaTarget::Client(client)) => CommandError::Rejected(format!(
            "unable to {verb}, quota for client: '{client}' does not exist"
        )),
        (err, _) => CommandError::Quota(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockQuotaPort;
    use mockall::predicate::eq;

    fn config() -> QuotaConfig {
        QuotaConfig {
            producer_byte_rate: Some("100000".into()),
            consumer_byte_rate: Some("200000".into()),
            request_percentage: Some("75".into()),
        }
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn set_requires_config() {
        let commands = QuotaCommands::new(MockQuotaPort::new());

        let err = commands
            .set_user_quota(Some("bob"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::MissingFlag("quota-config")));
        assert_eq!(err.to_string(), "required flag \"quota-config\" not set");

        let err = commands.set_client_quota(None, None).await.unwrap_err();
        assert!(matches!(err, CommandError::MissingFlag("quota-config")));
    }

    #[tokio::test]
    async fn set_user_quota_messages() {
        let mut port = MockQuotaPort::new();
        port.expect_set_quota()
            .with(eq(QuotaTarget::UserAllClients("bob".into())), eq(config()))
            .times(1)
            .returning(|_, _| Ok(()));
        port.expect_set_quota()
            .with(
                eq(QuotaTarget::UserClient {
                    user: "bob".into(),
                    client: "app".into(),
                }),
                eq(config()),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        port.expect_set_quota()
            .with(eq(QuotaTarget::User("bob".into())), eq(config()))
            .times(1)
            .returning(|_, _| Ok(()));
        port.expect_set_quota()
            .with(eq(QuotaTarget::AllUsers), eq(config()))
            .times(1)
            .returning(|_, _| Ok(()));

        let commands = QuotaCommands::new(port);
        let c = config();

        assert_eq!(
            commands
                .set_user_quota(Some("bob"), Some("*"), Some(&c))
                .await
                .unwrap(),
            "Quota for user bob and all clients set"
        );
        assert_eq!(
            commands
                .set_user_quota(Some("bob"), Some("app"), Some(&c))
                .await
                .unwrap(),
            "Quota for user bob and client app set"
        );
        assert_eq!(
            commands
                .set_user_quota(Some("bob"), None, Some(&c))
                .await
                .unwrap(),
            "Quota for user bob created/updated"
        );
        assert_eq!(
            commands.set_user_quota(None, None, Some(&c)).await.unwrap(),
            "Default user quota created/updated"
        );
    }

    #[tokio::test]
    async fn set_client_quota_messages() {
        let mut port = MockQuotaPort::new();
        port.expect_set_quota()
            .with(eq(QuotaTarget::Client("app".into())), eq(config()))
            .times(1)
            .returning(|_, _| Ok(()));
        port.expect_set_quota()
            .with(eq(QuotaTarget::AllClients), eq(config()))
            .times(2)
            .returning(|_, _| Ok(()));

        let commands = QuotaCommands::new(port);
        let c = config();

        assert_eq!(
            commands.set_client_quota(Some("app"), Some(&c)).await.unwrap(),
            "Quota for client app created/updated"
        );
        assert_eq!(
            commands.set_client_quota(Some("all"), Some(&c)).await.unwrap(),
            "Default client quota created/updated"
        );
        assert_eq!(
            commands.set_client_quota(None, Some(&c)).await.unwrap(),
            "Default client quota created/updated"
        );
    }

    #[tokio::test]
    async fn delete_verb_depends_on_keys() {
        let mut port = MockQuotaPort::new();
        port.expect_delete_quota().returning(|_, _| Ok(()));
        let commands = QuotaCommands::new(port);

        assert_eq!(
            commands.delete_user_quota(Some("bob"), None, &[]).await.unwrap(),
            "Quota for user bob deleted"
        );
        assert_eq!(
            commands
                .delete_user_quota(Some("bob"), None, &keys(&["producer_byte_rate"]))
                .await
                .unwrap(),
            "Quota for user bob updated"
        );
        assert_eq!(
            commands.delete_user_quota(None, None, &[]).await.unwrap(),
            "Default user quota deleted"
        );
        assert_eq!(
            commands
                .delete_client_quota(Some("app"), &keys(&["request_percentage"]))
                .await
                .unwrap(),
            "Quota for client app updated"
        );
        assert_eq!(
            commands.delete_client_quota(Some("*"), &[]).await.unwrap(),
            "Default client quota deleted"
        );
    }

    #[tokio::test]
    async fn delete_user_client_messages() {
        let mut port = MockQuotaPort::new();
        port.expect_delete_quota().returning(|_, _| Ok(()));
        let commands = QuotaCommands::new(port);

        assert_eq!(
            commands
                .delete_user_quota(Some("bob"), Some("all"), &[])
                .await
                .unwrap(),
            "Quota for user bob deleted for all clients"
        );
        assert_eq!(
            commands
                .delete_user_quota(Some("bob"), Some("app"), &[])
                .await
                .unwrap(),
            "Quota for user bob deleted for client app"
        );
        assert_eq!(
            commands
                .delete_user_quota(Some("bob"), Some("app"), &keys(&["producer_byte_rate"]))
                .await
                .unwrap(),
            "Quota for user bob updated for client app"
        );
        assert_eq!(
            commands
                .delete_user_quota(Some("bob"), Some("*"), &keys(&["consumer_byte_rate"]))
                .await
                .unwrap(),
            "Quota for user bob updated for all clients"
        );
    }

    #[tokio::test]
    async fn delete_forwards_keys() {
        let mut port = MockQuotaPort::new();
        port.expect_delete_quota()
            .withf(|target, keys| {
                *target == QuotaTarget::Client("app".into())
                    && keys == ["producer_byte_rate".to_string(), "consumer_byte_rate".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let commands = QuotaCommands::new(port);

        commands
            .delete_client_quota(
                Some("app"),
                &keys(&["producer_byte_rate", "consumer_byte_rate"]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn not_found_becomes_friendly() {
        let mut port = MockQuotaPort::new();
        port.expect_delete_quota()
            .returning(|_, _| Err(QuotaError::NotFound));
        let commands = QuotaCommands::new(port);

        let err = commands
            .delete_user_quota(Some("bob"), None, &[])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to delete, quota for user: 'bob' does not exist"
        );

        let err = commands
            .delete_user_quota(Some("bob"), Some("app"), &keys(&["request_percentage"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to update, quota for user: 'bob' and client: 'app' does not exist"
        );

        let err = commands
            .delete_client_quota(Some("app"), &[])
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to delete, quota for client: 'app' does not exist"
        );

        let err = commands.delete_client_quota(None, &[]).await.unwrap_err();
        assert!(matches!(err, CommandError::Quota(QuotaError::NotFound)));
    }

    #[tokio::test]
    async fn not_accessible_becomes_friendly() {
        let mut port = MockQuotaPort::new();
        port.expect_delete_quota()
            .returning(|_, _| Err(QuotaError::NotAccessible));
        let commands = QuotaCommands::new(port);

        let err = commands
            .delete_user_quota(None, None, &keys(&["producer_byte_rate"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to update quota, user has no rights for this action"
        );
    }

    #[tokio::test]
    async fn api_errors_pass_through() {
        let mut port = MockQuotaPort::new();
        port.expect_set_quota().returning(|_, _| {
            Err(QuotaError::Api {
                status: 400,
                message: "bad value".into(),
            })
        });
        let commands = QuotaCommands::new(port);

        let err = commands
            .set_client_quota(Some("app"), Some(&config()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Quota(QuotaError::Api { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn list_returns_quotas() {
        let mut port = MockQuotaPort::new();
        port.expect_list_quotas().times(1).returning(|| {
            Ok(vec![Quota {
                entity_type: "USER".into(),
                entity_name: "bob".into(),
                ..Quota::default()
            }])
        });
        let commands = QuotaCommands::new(port);

        let quotas = commands.list().await.unwrap();
        assert_eq!(quotas.len(), 1);
        assert_eq!(quotas[0].entity_name, "bob");
    }
}
