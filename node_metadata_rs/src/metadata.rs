//! EC2 instance identity over IMDSv2
//!
//! A fetch is two kinds of exchange with the link-local metadata service:
//!
//! ```text
//! PUT /latest/api/token          - Get a session token
//! GET /latest/meta-data/FIELD    - Read a field using that token
//! ```
//!
//! Every call builds its own client and token, nothing is cached between
//! fetches and no request is retried.
use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use slog_scope::debug;

use crate::errors::*;

/// Link-local address of the instance metadata service
pub const DEFAULT_BASE_URL: &str = "http://169.254.169.254";

const TOKEN_PATH: &str = "/latest/api/token";
const META_DATA_PATH: &str = "/latest/meta-data/";

const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_SECS: u32 = 600;

/// Bound on each individual request, not on the whole fetch
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const INSTANCE_ID_FIELD: &str = "instance-id";
pub const LIFECYCLE_FIELD: &str = "instance-life-cycle";

/// Lifecycle reported when the service can't tell us
pub const DEFAULT_LIFECYCLE: &str = "on-demand";

/// Naming of the labels produced by a fetch
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LabelScheme {
    /// Node labels as applied by eksctl
    Eksctl,
    Plain,
}

impl LabelScheme {
    pub fn instance_id_key(self) -> &'static str {
        match self {
            LabelScheme::Eksctl => "alpha.eksctl.io/instance-id",
            LabelScheme::Plain => "instance-id",
        }
    }

    pub fn lifecycle_key(self) -> &'static str {
        match self {
            LabelScheme::Eksctl => "node-lifecycle",
            LabelScheme::Plain => "instance-lifecycle",
        }
    }
}

impl Default for LabelScheme {
    fn default() -> LabelScheme {
        LabelScheme::Eksctl
    }
}

#[derive(Clone, Debug)]
pub struct MetadataFetcher {
    base_url: String,
    scheme: LabelScheme,
}

impl MetadataFetcher {
    /// Creates a fetcher talking to the real metadata service.
    pub fn new(scheme: LabelScheme) -> MetadataFetcher {
        MetadataFetcher::with_base_url(DEFAULT_BASE_URL, scheme)
    }

    /// Creates a fetcher talking to `base_url` instead, e.g. a local mock.
    pub fn with_base_url(base_url: &str, scheme: LabelScheme) -> MetadataFetcher {
        MetadataFetcher {
            base_url: base_url.trim_end_matches('/').to_owned(),
            scheme,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    /// Fetch the instance-id and lifecycle labels.
    ///
    /// Failing to get a token or the instance-id fails the whole fetch. A
    /// missing lifecycle is reported as `on-demand` instead.
    pub fn fetch_instance_metadata(&self) -> Result<HashMap<String, String>> {
        // IMDS is link-local, an environment proxy can never reach it
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()?;

        let token = self
            .acquire_token(&client)
            .chain_err(|| ErrorKind::TokenAcquisition)?;

        let instance_id = self
            .read_field(&client, &token, INSTANCE_ID_FIELD)
            .chain_err(|| ErrorKind::InstanceId)?;

        let lifecycle = self
            .read_field(&client, &token, LIFECYCLE_FIELD)
            .unwrap_or_else(|e| {
                debug!("Lifecycle unavailable, assuming {}", DEFAULT_LIFECYCLE;
                       "error" => %e);
                DEFAULT_LIFECYCLE.to_owned()
            });

        let mut metadata = HashMap::with_capacity(2);
        metadata.insert(self.scheme.instance_id_key().to_owned(), instance_id);
        metadata.insert(self.scheme.lifecycle_key().to_owned(), lifecycle);
        Ok(metadata)
    }

    fn acquire_token(&self, client: &Client) -> Result<String> {
        let resp = client
            .put(&format!("{}{}", self.base_url, TOKEN_PATH))
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECS.to_string())
            .send()?;
        if resp.status() != StatusCode::OK {
            return Err(ErrorKind::TokenStatus(resp.status().as_u16()).into());
        }
        Ok(resp.text()?)
    }

    fn read_field(&self, client: &Client, token: &str, field: &str) -> Result<String> {
        let resp = client
            .get(&format!("{}{}{}", self.base_url, META_DATA_PATH, field))
            .header(TOKEN_HEADER, token)
            .send()?;
        if resp.status() != StatusCode::OK {
            return Err(ErrorKind::FieldStatus(field.to_owned(), resp.status().as_u16()).into());
        }
        Ok(resp.text()?)
    }
}

/// Fetch this instance's labels from the metadata service, named the eksctl way
pub fn get_ec2_instance_metadata() -> Result<HashMap<String, String>> {
    MetadataFetcher::new(LabelScheme::Eksctl).fetch_instance_metadata()
}
