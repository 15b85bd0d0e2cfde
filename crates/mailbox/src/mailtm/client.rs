//! Mail.tm API HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic. No internal
//! retries; every failure maps to a typed error for the caller to absorb.

use serde_json::json;

use super::{Remote, api};
use crate::error::{Error, Result};
use crate::models::{Domain, MessageDetail, MessageId, MessageSummary};

/// Mail.tm API client
pub struct MailTm {
    base_url: String,
}

impl Default for MailTm {
    fn default() -> Self {
        Self::new()
    }
}

impl MailTm {
    /// Mail.tm API base URL
    const BASE_URL: &'static str = "https://api.mail.tm";

    /// Create a client against the production API
    pub fn new() -> Self {
        Self {
            base_url: Self::BASE_URL.to_string(),
        }
    }

    /// Create a client against a different base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

impl Remote for MailTm {
    fn list_domains(&self) -> Result<Vec<Domain>> {
        let url = format!("{}/domains", self.base_url);

        let mut response = ureq::get(&url).call()?;
        let list: api::HydraList<Domain> = response.body_mut().read_json()?;
        Ok(list.member)
    }

    fn create_account(&self, address: &str, password: &str) -> Result<api::Account> {
        let url = format!("{}/accounts", self.base_url);

        // Status errors handled by hand so the problem body's detail
        // (e.g. "address already in use") reaches the user.
        let mut response = ureq::post(&url)
            .config()
            .http_status_as_error(false)
            .build()
            .send_json(json!({ "address": address, "password": password }))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .body_mut()
                .read_json::<api::Problem>()
                .ok()
                .and_then(|p| p.detail)
                .unwrap_or_else(|| "account creation rejected".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.body_mut().read_json()?)
    }

    fn get_token(&self, address: &str, password: &str) -> Result<api::Token> {
        let url = format!("{}/token", self.base_url);

        let mut response =
            ureq::post(&url).send_json(json!({ "address": address, "password": password }))?;
        Ok(response.body_mut().read_json()?)
    }

    fn get_account(&self, id: &str, token: &str) -> Result<api::Account> {
        let url = format!("{}/accounts/{}", self.base_url, urlencoding::encode(id));

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(token))
            .call()?;
        Ok(response.body_mut().read_json()?)
    }

    fn list_messages(&self, token: &str) -> Result<Vec<MessageSummary>> {
        let url = format!("{}/messages", self.base_url);

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(token))
            .call()?;
        let list: api::HydraList<MessageSummary> = response.body_mut().read_json()?;
        Ok(list.member)
    }

    fn get_message(&self, id: &MessageId, token: &str) -> Result<MessageDetail> {
        let url = format!(
            "{}/messages/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(token))
            .call()?;
        Ok(response.body_mut().read_json()?)
    }

    fn delete_message(&self, id: &MessageId, token: &str) -> Result<()> {
        let url = format!(
            "{}/messages/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        );

        ureq::delete(&url)
            .header("Authorization", &Self::bearer(token))
            .call()?;
        Ok(())
    }

    fn delete_account(&self, id: &str, token: &str) -> Result<()> {
        let url = format!("{}/accounts/{}", self.base_url, urlencoding::encode(id));

        ureq::delete(&url)
            .header("Authorization", &Self::bearer(token))
            .call()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        assert_eq!(MailTm::bearer("abc"), "Bearer abc");
    }

    #[test]
    fn test_custom_base_url() {
        let client = MailTm::with_base_url("http://localhost:8025");
        assert_eq!(client.base_url, "http://localhost:8025");
    }
}
