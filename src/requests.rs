use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use reqwest::{Client, ClientBuilder, Response};
use reqwest_cookie_store::CookieStoreMutex;

/// The portal serves Shift_JIS pages, often without saying so.
const FALLBACK_CHARSET: &str = "Shift_JIS";

pub struct RequestClient {
    client: Client,
    cookie_jar: Arc<CookieStoreMutex>,
    politeness_delay: Duration,
}

impl RequestClient {
    pub fn new(
        cookie_jar: Arc<CookieStoreMutex>,
        politeness_delay: Duration,
    ) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .cookie_provider(Arc::clone(&cookie_jar))
            .build()?;
        Ok(Self {
            client,
            cookie_jar,
            politeness_delay,
        })
    }

    pub fn cookie_jar(&self) -> &Arc<CookieStoreMutex> {
        &self.cookie_jar
    }

    pub async fn get_page(&self, url: &str) -> anyhow::Result<String> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        self.read_body(response).await
    }

    pub async fn post_form(&self, url: &str, form: &[(&str, String)]) -> anyhow::Result<String> {
        debug!("POST {url} ({} fields)", form.len());
        let response = self.client.post(url).form(form).send().await?;
        self.read_body(response).await
    }

    async fn read_body(&self, response: Response) -> anyhow::Result<String> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered with {status}", response.url());
        }
        let body = response.text_with_charset(FALLBACK_CHARSET).await?;

        // Every page load is followed by a fixed pause before we look at it.
        tokio::time::sleep(self.politeness_delay).await;
        Ok(body)
    }
}
