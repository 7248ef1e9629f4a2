//! SMS alerts via the Free Mobile notification API.
//!
//! Credentials come from `SMS_USER` / `SMS_PASS`. Without them the notifier
//! is a logged no-op so the daemon stays useful on a bench with no SIM.

use url::Url;

use crate::error::WatchError;

#[derive(Clone)]
pub struct SmsCredentials {
    pub user: String,
    pub pass: String,
}

pub struct SmsNotifier {
    host: String,
    credentials: Option<SmsCredentials>,
}

impl SmsNotifier {
    /// Build from the environment. Missing or partial credentials disable
    /// sending.
    pub fn from_env(host: &str) -> Self {
        let credentials = match (std::env::var("SMS_USER"), std::env::var("SMS_PASS")) {
            (Ok(user), Ok(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some(SmsCredentials { user, pass })
            }
            _ => {
                log::info!("SMS_USER/SMS_PASS not set, SMS alerts disabled");
                None
            }
        };
        Self::with_credentials(host, credentials)
    }

    pub fn with_credentials(host: &str, credentials: Option<SmsCredentials>) -> Self {
        Self {
            host: host.to_string(),
            credentials,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send an alert, logging the outcome. Transport failures are swallowed:
    /// a dead SMS gateway must not take the detection loop down with it.
    pub fn send(&self, message: &str) {
        match self.try_send(message) {
            Ok(Some(status)) => log::info!("sms sent ({status}): {message}"),
            Ok(None) => log::debug!("sms disabled, dropping: {message}"),
            Err(e) => log::warn!("sms failed: {e}"),
        }
    }

    fn try_send(&self, message: &str) -> Result<Option<u16>, WatchError> {
        let Some(creds) = &self.credentials else {
            return Ok(None);
        };
        let mut endpoint = Url::parse(&format!("https://{}/sendmsg", self.host))
            .map_err(|e| WatchError::NotificationTransport(e.to_string()))?;
        endpoint
            .query_pairs_mut()
            .append_pair("user", &creds.user)
            .append_pair("pass", &creds.pass)
            .append_pair("msg", message);

        let response = ureq::get(endpoint.as_str())
            .timeout(std::time::Duration::from_secs(10))
            .call()
            .map_err(|e| WatchError::NotificationTransport(e.to_string()))?;
        Ok(Some(response.status()))
    }
}
