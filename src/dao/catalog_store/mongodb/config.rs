use std::time::Duration;

use mongodb::options::{ClientOptions, Credential};
use url::Url;

use super::error::{MongoDaoError, MongoResult};
use crate::config::MongoSettings;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Driver options plus the database holding the catalog collections.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    /// Database holding the `games`, `platforms` and `gamegenres` collections.
    pub database_name: String,
}

impl MongoConfig {
    /// Resolve `settings` into driver options.
    ///
    /// `user`/`password` become a [`Credential`] authenticating against the catalog database,
    /// unless the connection string already carries credentials. Values present in the URI
    /// (`appName`, `serverSelectionTimeoutMS`) win over the built-in defaults.
    pub async fn from_settings(settings: &MongoSettings) -> MongoResult<Self> {
        let uri = settings.connection_uri();
        let mut options = ClientOptions::parse(&uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: redacted(&uri),
                source,
            })?;

        if options.credential.is_none() {
            options.credential = settings.user().map(|user| {
                Credential::builder()
                    .username(user.to_owned())
                    .password(settings.password.clone())
                    .source(settings.database.clone())
                    .build()
            });
        }
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());
        options
            .server_selection_timeout
            .get_or_insert(SERVER_SELECTION_TIMEOUT);

        Ok(Self {
            options,
            database_name: settings.database.clone(),
        })
    }
}

/// Connection string safe to log: the password, if any, is masked.
fn redacted(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparsable connection string>".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_masks_the_password_only() {
        assert_eq!(
            redacted("mongodb://admin:s3cret@db:27017/mcdb"),
            "mongodb://admin:***@db:27017/mcdb"
        );
        assert_eq!(redacted("mongodb://db:27017/mcdb"), "mongodb://db:27017/mcdb");
    }

    #[tokio::test]
    async fn settings_fill_in_driver_defaults() {
        let settings = MongoSettings {
            database: "catalog".into(),
            ..MongoSettings::default()
        };
        let config = MongoConfig::from_settings(&settings).await.unwrap();
        assert_eq!(config.database_name, "catalog");
        assert_eq!(config.options.app_name.as_deref(), Some(APP_NAME));
        assert_eq!(
            config.options.server_selection_timeout,
            Some(SERVER_SELECTION_TIMEOUT)
        );
        assert!(config.options.credential.is_none());
    }

    #[tokio::test]
    async fn user_and_password_become_a_credential() {
        let settings = MongoSettings {
            user: Some("admin".into()),
            password: Some("p@ss:word".into()),
            ..MongoSettings::default()
        };
        let config = MongoConfig::from_settings(&settings).await.unwrap();
        let credential = config.options.credential.unwrap();
        assert_eq!(credential.username.as_deref(), Some("admin"));
        assert_eq!(credential.password.as_deref(), Some("p@ss:word"));
        assert_eq!(credential.source.as_deref(), Some("mcdb"));
    }

    #[tokio::test]
    async fn credentials_in_the_uri_are_kept() {
        let settings = MongoSettings {
            uri: Some("mongodb://root:secret@db:27017/?authSource=admin".into()),
            user: Some("ignored".into()),
            ..MongoSettings::default()
        };
        let config = MongoConfig::from_settings(&settings).await.unwrap();
        let credential = config.options.credential.unwrap();
        assert_eq!(credential.username.as_deref(), Some("root"));
        assert_eq!(credential.source.as_deref(), Some("admin"));
    }
}
