use crate::output::SheetTarget;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// The configuration file, a JSON object using the same keys as the environment-style names
/// Teamwork and Google hand out. Unknown keys (like `SCOPES`, only needed for an interactive
/// OAuth flow) are ignored.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The Teamwork domain, e.g. `acme.teamwork.com`.
    #[serde(rename = "TEAMWORK_DOMAIN")]
    pub domain: String,
    /// The API key, which may instead come from the `TEAMWORK_API_KEY` environment variable.
    #[serde(rename = "TEAMWORK_API_KEY", default)]
    pub api_key: Option<String>,
    /// The spreadsheet to write to with `--format gsheet`.
    #[serde(rename = "SPREADSHEET_ID", default)]
    pub spreadsheet_id: Option<String>,
    /// The range within that spreadsheet to write to.
    #[serde(rename = "RANGE_NAME", default)]
    pub range_name: Option<String>,
}
impl Config {
    /// Reads and parses the configuration file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Works out the API key to use, preferring the given environment value over the file.
    pub fn api_key(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| anyhow!("no `TEAMWORK_API_KEY` in the config file or the environment"))
    }

    /// The spreadsheet range to write rows to.
    pub fn sheet_target(&self) -> Result<SheetTarget> {
        match (&self.spreadsheet_id, &self.range_name) {
            (Some(spreadsheet_id), Some(range)) => Ok(SheetTarget {
                spreadsheet_id: spreadsheet_id.clone(),
                range: range.clone(),
            }),
            _ => Err(anyhow!(
                "writing to a spreadsheet needs `SPREADSHEET_ID` and `RANGE_NAME` in the config file"
            )),
        }
    }
}

/// A cached Google credential. Only the access token is used, refreshing it is not this tool's
/// job.
#[derive(Deserialize)]
struct GoogleCredentials {
    #[serde(alias = "token")]
    access_token: String,
}

/// Finds a Google access token, preferring the credentials file over the environment value.
pub fn google_access_token(
    credentials_file: Option<&Path>,
    env_value: Option<String>,
) -> Result<String> {
    if let Some(path) = credentials_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read credentials file {}", path.display()))?;
        let creds: GoogleCredentials = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse credentials file {}", path.display()))?;
        return Ok(creds.access_token);
    }

    env_value
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow!("no Google access token, pass `--credentials-file` or set `GOOGLE_ACCESS_TOKEN`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_config_file() {
        let file = write_temp(
            r#"{
                "TEAMWORK_DOMAIN": "acme.teamwork.com",
                "TEAMWORK_API_KEY": "twp_key",
                "SPREADSHEET_ID": "1AbC",
                "RANGE_NAME": "Summary!A1",
                "SCOPES": ["https://www.googleapis.com/auth/spreadsheets"]
            }"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config,
            Config {
                domain: "acme.teamwork.com".to_string(),
                api_key: Some("twp_key".to_string()),
                spreadsheet_id: Some("1AbC".to_string()),
                range_name: Some("Summary!A1".to_string()),
            }
        );
        assert_eq!(
            config.sheet_target().unwrap(),
            SheetTarget {
                spreadsheet_id: "1AbC".to_string(),
                range: "Summary!A1".to_string(),
            }
        );
    }

    #[test]
    fn missing_domain_is_an_error() {
        let file = write_temp(r#"{"TEAMWORK_API_KEY": "twp_key"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn environment_key_wins() {
        let config = Config {
            domain: "acme.teamwork.com".to_string(),
            api_key: Some("from_file".to_string()),
            spreadsheet_id: None,
            range_name: None,
        };
        assert_eq!(config.api_key(Some("from_env".to_string())).unwrap(), "from_env");
        assert_eq!(config.api_key(Some(" ".to_string())).unwrap(), "from_file");
        assert_eq!(config.api_key(None).unwrap(), "from_file");

        let keyless = Config {
            api_key: None,
            ..config
        };
        assert!(keyless.api_key(None).is_err());
        assert!(keyless.sheet_target().is_err());
    }

    #[test]
    fn access_token_from_file_or_environment() {
        let file = write_temp(r#"{"access_token": "ya29.token", "refresh_token": "1//r"}"#);
        assert_eq!(
            google_access_token(Some(file.path()), Some("env".to_string())).unwrap(),
            "ya29.token"
        );
        assert_eq!(google_access_token(None, Some("env".to_string())).unwrap(), "env");
        assert!(google_access_token(None, None).is_err());
    }
}
