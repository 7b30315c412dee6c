//! Fetching GenBank records from a remote nucleotide database.
//!
//! The [`Entrez`] fetcher downloads records from NCBI's E-utilities `efetch`
//! endpoint (`db=nuccore`, `rettype=gbwithparts`, `retmode=text`) with a
//! blocking HTTP client. Each request is bounded by a timeout.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::info;

use crate::record::genbank;

/// The default E-utilities base URL.
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// The default timeout of a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The tool name reported to NCBI.
pub const TOOL: &str = env!("CARGO_PKG_NAME");

/// An error related to fetching a record.
#[derive(Debug)]
pub enum Error {
    /// The request could not be completed.
    Request(reqwest::Error),
    /// The server answered with an unsuccessful status.
    Status(StatusCode),
    /// The response could not be parsed as a record.
    Unparsable(genbank::ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Request(err) => write!(f, "request error: {}", err),
            Error::Status(status) => write!(f, "unsuccessful response: {}", status),
            Error::Unparsable(err) => write!(f, "unparsable response: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// A source of GenBank text by accession.
///
/// Fetchers are shared by reference between workers.
pub trait Fetch: Send + Sync {
    /// Fetches the GenBank text of an accession.
    fn fetch(&self, accession: &str) -> Result<String, Error>;
}

/// A fetcher for NCBI's E-utilities.
#[derive(Clone, Debug)]
pub struct Entrez {
    /// The HTTP client.
    client: Client,

    /// The base URL of the E-utilities.
    base_url: String,

    /// An optional NCBI API key.
    api_key: Option<String>,

    /// An optional contact email.
    email: Option<String>,
}

impl Entrez {
    /// Creates a new fetcher with default settings.
    pub fn try_new() -> Result<Self, Error> {
        Builder::default().try_build()
    }

    /// Gets the URL of the `efetch` endpoint.
    pub fn efetch_url(&self) -> String {
        format!("{}/efetch.fcgi", self.base_url.trim_end_matches('/'))
    }
}

impl Fetch for Entrez {
    fn fetch(&self, accession: &str) -> Result<String, Error> {
        info!("fetching {} from {}", accession, self.base_url);

        let mut params = vec![
            ("db", "nuccore"),
            ("id", accession),
            ("rettype", "gbwithparts"),
            ("retmode", "text"),
            ("tool", TOOL),
        ];

        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.as_str()));
        }

        if let Some(email) = &self.email {
            params.push(("email", email.as_str()));
        }

        let response = self
            .client
            .get(self.efetch_url())
            .query(&params)
            .send()
            .map_err(Error::Request)?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }

        response.text().map_err(Error::Request)
    }
}

/// A builder for an [`Entrez`] fetcher.
#[derive(Clone, Debug)]
pub struct Builder {
    /// The base URL of the E-utilities.
    base_url: String,

    /// The timeout of a single request.
    timeout: Duration,

    /// An optional NCBI API key.
    api_key: Option<String>,

    /// An optional contact email.
    email: Option<String>,
}

impl Builder {
    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout of a single request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the NCBI API key.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the contact email.
    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Builds the fetcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use annohit::fetch;
    ///
    /// let fetcher = fetch::Builder::default()
    ///     .base_url("http://localhost:8080/eutils/")
    ///     .timeout(Duration::from_secs(5))
    ///     .try_build()?;
    ///
    /// assert_eq!(fetcher.efetch_url(), "http://localhost:8080/eutils/efetch.fcgi");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Entrez, Error> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(Error::Request)?;

        Ok(Entrez {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
            email: self.email,
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            email: None,
        }
    }
}
