use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use super::loader::read_csv;
use super::model::Table;

// ---------------------------------------------------------------------------
// Data source: where tables come from
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    /// Catalog lookup or download failed (network, missing dataset, ...).
    #[error("data source unavailable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
    /// The dataset exists but offers no CSV-formatted resource.
    #[error("no CSV-formatted resource found among the dataset's resources")]
    FormatUnrecognized,
}

/// Anything that can produce a table. The pipeline never cares where rows
/// come from; the UI picks a source and hands the result over.
pub trait DataSource {
    fn fetch_table(&self) -> Result<Table, SourceError>;
}

// ---------------------------------------------------------------------------
// CKAN-style catalog source
// ---------------------------------------------------------------------------

/// Default catalog endpoint and dataset: WRI's urban inequality index for
/// Mexico, resolved through the CKAN `package_show` action.
pub const DEFAULT_API_URL: &str = "https://datasets.wri.org/api/3/action/package_show";
pub const DEFAULT_DATASET_ID: &str = "index-urban-inequality-mexico";

/// Resolves a dataset id through a catalog API, picks the first resource
/// whose declared format is CSV, downloads and parses it. One synchronous
/// call per fetch; no retry.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub api_url: String,
    pub dataset_id: String,
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource {
            api_url: DEFAULT_API_URL.to_string(),
            dataset_id: DEFAULT_DATASET_ID.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageShowResponse {
    result: PackageResult,
}

#[derive(Debug, Deserialize)]
struct PackageResult {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    url: String,
    #[serde(default)]
    format: String,
}

/// The original dashboards' selection rule: first resource declaring CSV.
fn first_csv_url(resources: &[Resource]) -> Option<&str> {
    resources
        .iter()
        .find(|r| r.format.eq_ignore_ascii_case("csv"))
        .map(|r| r.url.as_str())
}

impl CatalogSource {
    fn package_resources(&self) -> anyhow::Result<Vec<Resource>> {
        let response = reqwest::blocking::Client::new()
            .get(&self.api_url)
            .query(&[("id", self.dataset_id.as_str())])
            .send()
            .context("requesting catalog metadata")?
            .error_for_status()
            .context("catalog request rejected")?;
        let parsed: PackageShowResponse = response.json().context("parsing catalog response")?;
        Ok(parsed.result.resources)
    }

    fn download_csv(&self, url: &str) -> anyhow::Result<Table> {
        let response = reqwest::blocking::get(url)
            .with_context(|| format!("downloading {url}"))?
            .error_for_status()
            .context("resource download rejected")?;
        let text = response.text().context("reading resource body")?;
        read_csv(text.as_bytes())
    }
}

impl DataSource for CatalogSource {
    fn fetch_table(&self) -> Result<Table, SourceError> {
        let resources = self
            .package_resources()
            .map_err(SourceError::Unavailable)?;
        log::info!(
            "catalog '{}' lists {} resources",
            self.dataset_id,
            resources.len()
        );
        let url = first_csv_url(&resources)
            .ok_or(SourceError::FormatUnrecognized)?
            .to_string();
        let table = self.download_csv(&url).map_err(SourceError::Unavailable)?;
        Ok(table.drop_blank_rows())
    }
}
