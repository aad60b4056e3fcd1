use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use tracing::info;

const SCRAPE_URL: &str = "https://api.rtrvr.ai/scrape";
const RESEARCH_TIMEOUT: Duration = Duration::from_secs(120);

// Freemail providers get Google-only seeding; their domain says nothing
// about the prospect's company
const PERSONAL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
];

/// rtrvr.ai research client. A single /scrape call extracts person and
/// company intel from a short list of seed URLs; the response is kept as an
/// opaque JSON payload and stored verbatim.
pub struct Rtrvr {
    http: reqwest::Client,
    api_key: String,
}

impl Rtrvr {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("RTRVR_API_KEY")
            .map_err(|_| anyhow!("RTRVR_API_KEY environment variable must be set"))?;
        Ok(Rtrvr {
            http: reqwest::Client::new(),
            api_key,
        })
    }

    /// Research a prospect by email. Blocking single attempt with a fixed
    /// timeout; transport and HTTP errors propagate to the caller.
    pub async fn research(&self, email: &str) -> Result<serde_json::Value> {
        let domain = email.split_once('@').map(|(_, d)| d).unwrap_or("");
        let urls = seed_urls(email);
        info!(email, ?urls, "researching prospect");

        let body = json!({
            "input": format!(
                "Extract the following about the person with email {email} \
                 and their company ({domain}):\n\
                 1. Person's full name, job title, seniority\n\
                 2. Company name, what they do, main products/services\n\
                 3. Company size, funding, HQ location\n\
                 4. Recent news or announcements\n\
                 5. Key pain points or challenges the company faces"
            ),
            "urls": urls,
            "response": {"verbosity": "final", "max_inline_output_bytes": 100_000},
        });

        let resp = self
            .http
            .post(SCRAPE_URL)
            .bearer_auth(&self.api_key)
            .timeout(RESEARCH_TIMEOUT)
            .json(&body)
            .send()
            .await
            .context("rtrvr.ai request failed")?
            .error_for_status()?;

        let data = resp.json().await.context("rtrvr.ai returned invalid JSON")?;
        Ok(data)
    }
}

/// Seed URLs for the scrape. Corporate domains get the company site plus a
/// targeted people search; freemail or malformed addresses fall back to
/// plain Google queries.
fn seed_urls(email: &str) -> Vec<String> {
    let (username, domain) = email.split_once('@').unwrap_or((email, ""));
    let company_name = domain.split('.').next().unwrap_or("");

    if !domain.is_empty() && !PERSONAL_DOMAINS.contains(&domain) {
        vec![
            format!("https://{domain}"),
            format!(
                "https://www.google.com/search?q=%22{username}%22+%22{company_name}%22+site:linkedin.com+OR+CEO+OR+founder"
            ),
        ]
    } else {
        vec![
            format!("https://www.google.com/search?q=%22{email}%22"),
            format!("https://www.google.com/search?q=%22{company_name}%22+company"),
        ]
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corporate_domain_seeds_company_site() {
        let urls = seed_urls("satya@microsoft.com");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://microsoft.com");
        assert!(urls[1].contains("%22satya%22"));
        assert!(urls[1].contains("%22microsoft%22"));
        assert!(urls[1].contains("linkedin.com"));
    }

    #[test]
    fn personal_domain_seeds_google_only() {
        let urls = seed_urls("jane.doe@gmail.com");
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("google.com/search"));
        assert!(urls[0].contains("jane.doe%40gmail.com") || urls[0].contains("jane.doe@gmail.com"));
        assert!(urls[1].contains("google.com/search"));
    }

    #[test]
    fn missing_at_sign_seeds_google_only() {
        let urls = seed_urls("not-an-email");
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.contains("google.com/search")));
    }
}
