use crate::config::ScrapeConfig;
use anyhow::anyhow;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{error::Error, thread::sleep, time::Duration};

/// Where page HTML comes from.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

pub struct HttpPageSource {
    config: ScrapeConfig,
}

impl HttpPageSource {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let url_parsed = reqwest::Url::parse(url)?;
        let iden = format!(
            "{}{}",
            url_parsed.host_str().unwrap_or_default(),
            url_parsed.path()
        );

        let client = reqwest::blocking::Client::builder()
            .user_agent(&self.config.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;

        let mut last_error = anyhow!("{iden}: no attempts made");
        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                log::debug!("{iden}: retrying");
            }

            log::debug!("{iden}: requesting");

            let resp = match client.get(url_parsed.clone()).send() {
                Ok(r) => r,
                Err(err) => {
                    log::error!("{iden}: {err}: {:#?}", get_error(&err));
                    last_error = anyhow!("{iden}: {}", get_error(&err));
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                let bytes = resp.bytes()?;
                return Ok(String::from_utf8_lossy(&bytes).to_string());
            }

            log::debug!("{iden}: {status}");
            last_error = anyhow!("{iden}: http status {status}");

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.config.max_attempts {
                    sleep(Duration::from_millis(
                        attempt as u64 * self.config.retry_backoff_ms,
                    ));
                }
                continue;
            }

            if status.is_client_error() {
                // no need to try again, it's over...
                return Err(last_error);
            }
        }

        Err(last_error)
    }
}

/// Page details used to prefill a new link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub page_type: String,
}

/// Reads title, description and `og:type` from the document head.
pub fn get_data_from_page(html: &str) -> PageMeta {
    let document = scraper::Html::parse_document(html);

    let (Ok(meta_selector), Ok(title_selector)) = (
        scraper::Selector::parse("meta"),
        scraper::Selector::parse("title"),
    ) else {
        return PageMeta::default();
    };

    let mut description = None;
    let mut title = None;
    let mut page_type = None;

    for element in document.select(&meta_selector) {
        let meta_prop = element.attr("property").unwrap_or_default();
        let meta_key = element.attr("name").unwrap_or(meta_prop);
        let meta_value = element.attr("content").unwrap_or_default().trim();

        if meta_value.is_empty() {
            continue;
        }

        // description, og:description, then twitter:description
        if ["description", "og:description", "twitter:description"]
            .iter()
            .any(|name| name.eq_ignore_ascii_case(meta_key))
        {
            let rank = match meta_key.to_lowercase().as_str() {
                "description" => 0,
                "og:description" => 1,
                _ => 2,
            };
            match description {
                Some((current, _)) if current <= rank => {}
                _ => description = Some((rank, meta_value.to_string())),
            }
        }

        if page_type.is_none() && meta_key.eq_ignore_ascii_case("og:type") {
            page_type = Some(meta_value.to_string());
        }
    }

    if let Some(element) = document.select(&title_selector).next() {
        let title_text = element.text().collect::<String>().trim().to_string();
        if !title_text.is_empty() {
            title = Some(title_text);
        }
    }

    PageMeta {
        title,
        description: description.map(|(_, d)| d),
        page_type: page_type.unwrap_or_else(|| "website".to_string()),
    }
}
