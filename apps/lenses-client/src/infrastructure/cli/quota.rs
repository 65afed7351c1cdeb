//! `lenses quota` and `lenses quotas` handlers.

use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use super::args::{ClientQuotaAction, ListQuotasArgs, PayloadArgs, QuotaScope, UserQuotaAction};
use crate::application::ports::QuotaPort;
use crate::application::services::{CommandError, QuotaCommands};
use crate::domain::quota::{Quota, QuotaConfig};

/// Contents of a `--file` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuotaPayload {
    /// Quota limits.
    #[serde(rename = "Config", default)]
    pub config: QuotaConfig,
    /// User name.
    #[serde(rename = "User", default)]
    pub user: Option<String>,
    /// Client id; `all` or `*` means every client.
    #[serde(rename = "Client", default)]
    pub client: Option<String>,
}

/// Resolve the config and the effective user and client for a `set`.
///
/// `--file` supplies all three; explicit `--quota-user` and
/// `--quota-client` flags win over the file. Without `--file`, the config
/// comes from `--quota-config`, read as a path if one exists and as inline
/// JSON otherwise.
pub fn resolve_payload(
    payload: &PayloadArgs,
    user: Option<&str>,
    client: Option<&str>,
) -> Result<(Option<QuotaConfig>, Option<String>, Option<String>), CommandError> {
    if let Some(path) = &payload.file {
        let file = read_payload_file(path)?;
        return Ok((
            Some(file.config),
            user.map(str::to_string).or(file.user),
            client.map(str::to_string).or(file.client),
        ));
    }

    let config = payload
        .quota_config
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_quota_config)
        .transpose()?;

    Ok((config, user.map(str::to_string), client.map(str::to_string)))
}

fn read_payload_file(path: &Path) -> Result<QuotaPayload, CommandError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CommandError::InvalidPayload(format!("{}: {e}", path.display())))?;
    serde_yaml_bw::from_str(&text)
        .map_err(|e| CommandError::InvalidPayload(format!("{}: {e}", path.display())))
}

/// Parse `--quota-config`: a path to a JSON/YAML file, or inline JSON.
pub fn parse_quota_config(raw: &str) -> Result<QuotaConfig, CommandError> {
    let path = Path::new(raw);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CommandError::InvalidPayload(format!("{raw}: {e}")))?;
        return serde_yaml_bw::from_str(&text)
            .map_err(|e| CommandError::InvalidPayload(format!("{raw}: {e}")));
    }

    serde_json::from_str(raw).map_err(|e| CommandError::InvalidPayload(e.to_string()))
}

/// Run `lenses quota users|clients ...` and return the outcome message.
pub async fn run_quota<P: QuotaPort>(
    commands: &QuotaCommands<P>,
    scope: QuotaScope,
) -> Result<String, CommandError> {
    match scope {
        QuotaScope::Users { action } => match action {
            UserQuotaAction::Set(args) => {
                let (config, user, client) = resolve_payload(
                    &args.payload,
                    args.quota_user.as_deref(),
                    args.quota_client.as_deref(),
                )?;
                commands
                    .set_user_quota(user.as_deref(), client.as_deref(), config.as_ref())
                    .await
            }
            UserQuotaAction::Delete(args) => {
                commands
                    .delete_user_quota(
                        args.quota_user.as_deref(),
                        args.quota_client.as_deref(),
                        &args.keys,
                    )
                    .await
            }
        },
        QuotaScope::Clients { action } => match action {
            ClientQuotaAction::Set(args) => {
                let (config, _, client) =
                    resolve_payload(&args.payload, None, args.quota_client.as_deref())?;
                commands
                    .set_client_quota(client.as_deref(), config.as_ref())
                    .await
            }
            ClientQuotaAction::Delete(args) => {
                commands
                    .delete_client_quota(args.quota_client.as_deref(), &args.keys)
                    .await
            }
        },
    }
}

/// Run `lenses quotas`, writing the listing to `out`.
pub async fn run_list<P: QuotaPort, W: Write + Send>(
    commands: &QuotaCommands<P>,
    args: &ListQuotasArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let quotas = commands.list().await?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &quotas)?;
        writeln!(out)?;
        return Ok(());
    }

    for quota in &quotas {
        writeln!(out, "{}", format_quota(quota))?;
    }
    Ok(())
}

/// One listing line: entity, optional client, then sorted properties.
#[must_use]
pub fn format_quota(quota: &Quota) -> String {
    let mut props: Vec<_> = quota.properties.iter().collect();
    props.sort();
    let props = props
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = format!("{} {}", quota.entity_type, quota.entity_name);
    if let Some(child) = &quota.child {
        line.push_str(&format!(" client={child}"));
    }
    if !props.is_empty() {
        line.push(' ');
        line.push_str(&props);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write as _;

    #[test]
    fn inline_config_is_json() {
        let config = parse_quota_config(r#"{"producer_byte_rate":"100000"}"#).unwrap();
        assert_eq!(config.producer_byte_rate.as_deref(), Some("100000"));
    }

    #[test]
    fn config_path_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "consumer_byte_rate: \"200000\"").unwrap();

        let config = parse_quota_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.consumer_byte_rate.as_deref(), Some("200000"));
    }

    #[test]
    fn invalid_inline_config_is_rejected() {
        let err = parse_quota_config("{not json").unwrap_err();
        assert!(matches!(err, CommandError::InvalidPayload(_)));
    }

    #[test]
    fn file_payload_supplies_user_and_client() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Config:\n  producer_byte_rate: \"100000\"\n  request_percentage: \"75\"\nUser: bob\nClient: \"*\""
        )
        .unwrap();

        let payload = PayloadArgs {
            quota_config: None,
            file: Some(file.path().to_path_buf()),
        };
        let (config, user, client) = resolve_payload(&payload, None, None).unwrap();

        let config = config.unwrap();
        assert_eq!(config.producer_byte_rate.as_deref(), Some("100000"));
        assert_eq!(config.request_percentage.as_deref(), Some("75"));
        assert_eq!(user.as_deref(), Some("bob"));
        assert_eq!(client.as_deref(), Some("*"));
    }

    #[test]
    fn flags_override_file_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Config: {{}}\nUser: bob").unwrap();

        let payload = PayloadArgs {
            quota_config: None,
            file: Some(file.path().to_path_buf()),
        };
        let (_, user, _) = resolve_payload(&payload, Some("alice"), None).unwrap();
        assert_eq!(user.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_config_resolves_to_none() {
        let (config, _, _) = resolve_payload(&PayloadArgs::default(), None, None).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn formats_listing_line() {
        let quota = Quota {
            entity_type: "USERCLIENT".into(),
            entity_name: "bob".into(),
            child: Some("app".into()),
            properties: HashMap::from([
                ("request_percentage".to_string(), "75".to_string()),
                ("producer_byte_rate".to_string(), "100".to_string()),
            ]),
            ..Quota::default()
        };
        assert_eq!(
            format_quota(&quota),
            "USERCLIENT bob client=app producer_byte_rate=100 request_percentage=75"
        );
    }
}
