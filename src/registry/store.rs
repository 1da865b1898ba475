// src/registry/store.rs
use super::endpoint::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const REGISTRY_HEADER: [&str; 4] = ["Name", "URL", "Webhook", "SSL_Expiry_Threshold"];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("a site named '{0}' is already registered")]
    DuplicateName(String),

    #[error("site name must not be empty")]
    EmptyName,

    #[error("invalid URL '{url}' for site '{name}': {source}")]
    InvalidUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid SSL expiry threshold '{value}' for site '{name}'")]
    InvalidThreshold { name: String, value: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "Webhook", default)]
    webhook: Option<String>,
    #[serde(rename = "SSL_Expiry_Threshold", default)]
    ssl_expiry_threshold: Option<String>,
}

impl From<&Endpoint> for RegistryRow {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            name: endpoint.name.trim().to_string(),
            url: endpoint.url.to_string(),
            webhook: endpoint.webhook().map(str::to_string),
            ssl_expiry_threshold: Some(endpoint.ssl_threshold_days.to_string()),
        }
    }
}

pub fn parse_url(name: &str, raw: &str) -> Result<Url, RegistryError> {
    Url::parse(raw.trim()).map_err(|source| RegistryError::InvalidUrl {
        name: name.to_string(),
        url: raw.to_string(),
        source,
    })
}

fn parse_threshold(name: &str, raw: &str) -> Result<i64, RegistryError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RegistryError::InvalidThreshold {
            name: name.to_string(),
            value: raw.to_string(),
        })
}

/// CSV-backed list of monitored endpoints.
///
/// Every mutation goes straight to disk; removal rewrites the whole file.
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
    default_threshold: i64,
}

impl Registry {
    /// Open the registry, creating the file with its header row if absent.
    pub fn open(path: impl Into<PathBuf>, default_threshold: i64) -> Result<Self, RegistryError> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(REGISTRY_HEADER)?;
            writer.flush()?;
            info!("Created site registry at {}", path.display());
        }

        Ok(Self { path, default_threshold })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All endpoints in file order.
    pub fn list(&self) -> Result<Vec<Endpoint>, RegistryError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut endpoints = Vec::new();
        for row in reader.deserialize::<RegistryRow>() {
            endpoints.push(self.endpoint_from_row(row?)?);
        }

        debug!("Loaded {} sites from {}", endpoints.len(), self.path.display());
        Ok(endpoints)
    }

    pub fn get(&self, name: &str) -> Result<Option<Endpoint>, RegistryError> {
        Ok(self.list()?.into_iter().find(|e| e.name == name))
    }

    /// Append `endpoint`. Names are compared the way `list` reads them back,
    /// with surrounding whitespace removed.
    pub fn add(&self, endpoint: &Endpoint) -> Result<(), RegistryError> {
        let name = endpoint.name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.get(name)?.is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(RegistryRow::from(endpoint))?;
        writer.flush()?;

        info!(
            "Added site {} -> {} (webhook: {}, SSL expiry threshold: {} days)",
            name,
            endpoint.url,
            endpoint.webhook().unwrap_or("none"),
            endpoint.ssl_threshold_days
        );
        Ok(())
    }

    /// Remove `name`, returning whether it was present.
    pub fn remove(&self, name: &str) -> Result<bool, RegistryError> {
        let endpoints = self.list()?;
        let before = endpoints.len();
        let kept: Vec<Endpoint> = endpoints.into_iter().filter(|e| e.name != name).collect();

        if kept.len() == before {
            return Ok(false);
        }

        self.write_all(&kept)?;
        info!("Removed site {}", name);
        Ok(true)
    }

    fn write_all(&self, endpoints: &[Endpoint]) -> Result<(), RegistryError> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)?;
            writer.write_record(REGISTRY_HEADER)?;
            for endpoint in endpoints {
                writer.serialize(RegistryRow::from(endpoint))?;
            }
            writer.flush()?;
        }
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    fn endpoint_from_row(&self, row: RegistryRow) -> Result<Endpoint, RegistryError> {
        let url = parse_url(&row.name, &row.url)?;
        let threshold = match row.ssl_expiry_threshold.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_threshold(&row.name, raw)?,
            _ => self.default_threshold,
        };

        let mut endpoint = Endpoint::new(row.name, url).with_ssl_threshold(threshold);
        if let Some(webhook) = row.webhook {
            endpoint = endpoint.with_webhook(webhook);
        }
        Ok(endpoint)
    }
}

/// Names that appear more than once, in first-seen order.
pub fn duplicate_names(endpoints: &[Endpoint]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for endpoint in endpoints {
        if !seen.insert(endpoint.name.as_str()) && !dupes.contains(&endpoint.name) {
            dupes.push(endpoint.name.clone());
        }
    }
    dupes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DEFAULT_SSL_THRESHOLD_DAYS;
    use tempfile::tempdir;

    fn endpoint(name: &str, url: &str) -> Endpoint {
        Endpoint::new(name, Url::parse(url).unwrap())
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");

        let registry = Registry::open(&path, DEFAULT_SSL_THRESHOLD_DAYS).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), "Name,URL,Webhook,SSL_Expiry_Threshold");
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn written_endpoints_read_back_identically() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();

        let written = vec![
            endpoint("api", "https://api.example.com/health"),
            endpoint("blog", "http://blog.example.com/")
                .with_webhook("https://discord.com/api/webhooks/1/abc"),
            endpoint("shop", "https://shop.example.com/").with_ssl_threshold(7),
        ];
        for e in &written {
            registry.add(e).unwrap();
        }

        assert_eq!(registry.list().unwrap(), written);
    }

    #[test]
    fn missing_optional_columns_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(
            &path,
            "Name,URL,Webhook,SSL_Expiry_Threshold\n\
             bare,https://bare.example.com/\n\
             blank,https://blank.example.com/,,\n",
        )
        .unwrap();

        let registry = Registry::open(&path, 45).unwrap();
        let endpoints = registry.list().unwrap();

        assert_eq!(endpoints.len(), 2);
        for e in &endpoints {
            assert_eq!(e.webhook(), None);
            assert_eq!(e.ssl_threshold_days, 45);
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();
        registry.add(&endpoint("api", "https://a.example.com/")).unwrap();

        let err = registry.add(&endpoint("api", "https://b.example.com/")).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "api"));
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn padded_name_counts_as_duplicate() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();
        registry.add(&endpoint("api", "https://a.example.com/")).unwrap();

        let mut padded = endpoint("api", "https://b.example.com/");
        padded.name = " api ".to_string();
        let err = registry.add(&padded).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "api"));
        assert!(duplicate_names(&registry.list().unwrap()).is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();

        let err = registry.add(&endpoint("   ", "https://a.example.com/")).unwrap_err();

        assert!(matches!(err, RegistryError::EmptyName));
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn padded_webhook_reads_back_identically() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();
        let written = endpoint(" hooked ", "https://h.example.com/").with_webhook(" https://hook/ ");

        registry.add(&written).unwrap();

        assert_eq!(registry.list().unwrap(), vec![written]);
    }

    #[test]
    fn remove_rewrites_without_the_named_site() {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("sites.csv"), 30).unwrap();
        registry.add(&endpoint("a", "https://a.example.com/")).unwrap();
        registry.add(&endpoint("b", "https://b.example.com/")).unwrap();
        registry.add(&endpoint("c", "https://c.example.com/")).unwrap();

        assert!(registry.remove("b").unwrap());
        assert!(!registry.remove("b").unwrap());

        let names: Vec<_> = registry.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn bad_threshold_is_reported_with_site_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(&path, "Name,URL,Webhook,SSL_Expiry_Threshold\nx,https://x.example.com/,,soon\n").unwrap();

        let err = Registry::open(&path, 30).unwrap().list().unwrap_err();

        assert!(matches!(err, RegistryError::InvalidThreshold { ref name, .. } if name == "x"));
    }

    #[test]
    fn duplicate_names_are_listed_once() {
        let endpoints = vec![
            endpoint("a", "https://a.example.com/"),
            endpoint("a", "https://a2.example.com/"),
            endpoint("b", "https://b.example.com/"),
            endpoint("a", "https://a3.example.com/"),
        ];
        assert_eq!(duplicate_names(&endpoints), vec!["a".to_string()]);
    }
}
