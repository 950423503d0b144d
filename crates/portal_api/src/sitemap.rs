use anyhow::Result;
use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};
use quick_xml::se::to_string;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Public pages advertised to search engines, home page first.
pub const PUBLIC_PATHS: [&str; 9] = [
    "/",
    "/about",
    "/services",
    "/news",
    "/complaints",
    "/complaints/anonymous",
    "/complaints/anonymous/status",
    "/feedback",
    "/contact",
];

#[derive(Debug, Serialize)]
#[serde(rename = "urlset")]
struct UrlSet {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,

    #[serde(rename = "url")]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Serialize)]
struct UrlEntry {
    loc: String,
    changefreq: &'static str,
    priority: &'static str,
}

pub fn render(site_url: &str) -> Result<String> {
    let base = site_url.trim_end_matches('/');
    let urlset = UrlSet {
        xmlns: "http://www.sitemaps.org/schemas/sitemap/0.9",
        urls: PUBLIC_PATHS
            .iter()
            .map(|path| UrlEntry {
                loc: if *path == "/" {
                    format!("{base}/")
                } else {
                    format!("{base}{path}")
                },
                changefreq: "monthly",
                priority: if *path == "/" { "1.0" } else { "0.8" },
            })
            .collect(),
    };

    let xml_body = to_string(&urlset)
        .map_err(|e| anyhow::anyhow!("Failed to serialize sitemap: {}", e))?;
    Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, xml_body))
}

pub async fn sitemap(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let xml = render(&state.site_url).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, "application/xml")], xml))
}
