/// Synchronous client for the **Bank of Japan time-series statistics search API**.
///
/// Three endpoints are covered: code lookup (`getDataCode`), hierarchical
/// lookup (`getDataLayer`), and metadata lookup (`getMetadata`). Results come
/// back as tidy `models::ObservationRow` / `models::MetadataRow` rows.
///
/// ### Notes
/// - A single physical request accepts at most 250 series codes; `get_data_all`
///   splits larger queries into chunks and follows `NEXTPOSITION` continuation
///   tokens automatically.
/// - Consecutive requests through one client are spaced by a configurable
///   minimum interval (default 1s) to keep load on the server down. The
///   spacing is enforced per client instance, also across threads.
/// - Network timeouts default to 30s per physical call and can be adjusted
///   via [`Client::timeout`].
///
/// Typical usage:
/// ```no_run
/// # use bojstat_rs::{Client, Lang};
/// let client = Client::new(Lang::En);
/// let rows = client.get_data("FM01", &["STRDCLUCON".into()], Some("202501"), None, None)?;
/// # Ok::<(), bojstat_rs::Error>(())
/// ```
use crate::error::{Error, MAX_CODES_PER_REQUEST};
use crate::models::{
    Envelope, Frequency, Lang, LayerSpec, MetadataRow, ObservationRow, normalize_metadata,
    normalize_observations,
};
use crate::reference;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Base URL of the live API.
pub const BASE_URL: &str = "https://api.stat-search.boj.or.jp/v1";

const ENDPOINT_DATA_CODE: &str = "getDataCode";
const ENDPOINT_DATA_LAYER: &str = "getDataLayer";
const ENDPOINT_METADATA: &str = "getMetadata";

/// The HTTP boundary: one GET against a named endpoint, returning the parsed
/// JSON body. Implemented by [`HttpTransport`] in production; tests substitute
/// scripted pages to drive the paginator without a network.
pub trait Transport: Send + Sync {
    fn perform(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<Value, Error>;
}

/// Production [`Transport`] over a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pub base_url: String,
    http: HttpClient,
}

impl Default for HttpTransport {
    fn default() -> Self {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("bojstat_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: BASE_URL.into(),
            http,
        }
    }
}

impl HttpTransport {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Transport for HttpTransport {
    fn perform(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<Value, Error> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {} {:?}", url, params);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .timeout(timeout)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

/// Client for the BOJ time-series statistics API.
///
/// All query operations block until their physical HTTP call(s) complete or
/// fail; a failure at any page aborts the whole logical query and discards
/// rows accumulated so far.
pub struct Client {
    /// Output language, selects the `_J` or plain response field set.
    pub lang: Lang,
    /// Timeout per physical HTTP call.
    pub timeout: Duration,
    /// Minimum spacing between consecutive physical calls.
    pub request_interval: Duration,
    transport: Box<dyn Transport>,
    /// Completion time of the last physical call; guarded so concurrent
    /// callers through one instance still observe the spacing.
    last_request: Mutex<Option<Instant>>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Lang::default())
    }
}

impl Client {
    pub fn new(lang: Lang) -> Self {
        Self::with_transport(lang, Box::new(HttpTransport::default()))
    }

    /// Build a client over a custom [`Transport`]. Used by tests; also the
    /// hook for callers that need their own HTTP stack.
    pub fn with_transport(lang: Lang, transport: Box<dyn Transport>) -> Self {
        Self {
            lang,
            timeout: Duration::from_secs(30),
            request_interval: Duration::from_secs(1),
            transport,
            last_request: Mutex::new(None),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// One rate-limited physical call: wait out the inter-request interval,
    /// perform the transport call, decode the envelope, surface a non-200
    /// `STATUS` as [`Error::Server`].
    fn request(&self, endpoint: &str, mut params: Vec<(String, String)>) -> Result<Envelope, Error> {
        params.push(("format".into(), "json".into()));
        params.push(("lang".into(), self.lang.as_str().into()));

        let mut last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.request_interval {
                std::thread::sleep(self.request_interval - elapsed);
            }
        }
        let result = self.transport.perform(endpoint, &params, self.timeout);
        *last = Some(Instant::now());
        drop(last);

        let env: Envelope = serde_json::from_value(result?)?;
        if env.status != 200 {
            return Err(Error::Server {
                status: env.status,
                message_id: env.message_id.unwrap_or_default(),
                message: env.message.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(env)
    }

    /// Fetch observations for up to 250 series codes in one physical call.
    ///
    /// - `db`: database code (e.g. `"FM08"`), case-insensitive.
    /// - `codes`: series codes **without** the database prefix (e.g.
    ///   `"MADR1Z@D"`, not `"IR01'MADR1Z@D"`). All must share one frequency.
    /// - `start` / `end`: inclusive period bounds in the frequency's format
    ///   (`YYYYMM`, `YYYYQQ`, `YYYYHH`, or `YYYY`); the server validates them.
    /// - `start_position`: continuation token from a previous response's
    ///   `NEXTPOSITION`, for manual paging.
    ///
    /// ### Errors
    /// [`Error::EmptyCodes`] / [`Error::TooManyCodes`] before any network
    /// traffic; [`Error::UnknownDatabase`]; transport, server, and decode
    /// errors from the call itself.
    pub fn get_data(
        &self,
        db: &str,
        codes: &[String],
        start: Option<&str>,
        end: Option<&str>,
        start_position: Option<&str>,
    ) -> Result<Vec<ObservationRow>, Error> {
        if codes.is_empty() {
            return Err(Error::EmptyCodes);
        }
        if codes.len() > MAX_CODES_PER_REQUEST {
            return Err(Error::TooManyCodes(codes.len()));
        }
        let db = reference::validate_database(db)?;
        let params = code_params(&db, codes, start, end, start_position)?;
        let env = self.request(ENDPOINT_DATA_CODE, params)?;
        normalize_observations(&env.result_set, self.lang)
    }

    /// Fetch observations for any number of series codes, splitting into
    /// chunks of 250 and following `NEXTPOSITION` tokens until the server
    /// stops returning one. Chunk order is preserved in the output.
    ///
    /// A token that repeats without progress fails the whole query with
    /// [`Error::PaginationLoop`]; the protocol carries no page count, so a
    /// repeated token is the only sign the loop would never terminate.
    pub fn get_data_all(
        &self,
        db: &str,
        codes: &[String],
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<ObservationRow>, Error> {
        if codes.is_empty() {
            return Err(Error::EmptyCodes);
        }
        let db = reference::validate_database(db)?;
        let mut out = Vec::new();
        for chunk in codes.chunks(MAX_CODES_PER_REQUEST) {
            let mut position: Option<String> = None;
            loop {
                let params = code_params(&db, chunk, start, end, position.as_deref())?;
                let env = self.request(ENDPOINT_DATA_CODE, params)?;
                out.extend(normalize_observations(&env.result_set, self.lang)?);
                match env.next_position {
                    Some(next) => {
                        if position.as_deref() == Some(next.as_str()) {
                            return Err(Error::PaginationLoop(next));
                        }
                        position = Some(next);
                    }
                    None => break,
                }
            }
        }
        Ok(out)
    }

    /// Fetch observations by hierarchical position instead of series codes.
    ///
    /// - `frequency`: `"CY"`, `"FY"`, `"CH"`, `"FH"`, `"Q"`, `"M"`, `"W"`
    ///   (or `"W1"`..`"W7"`), `"D"`; case-insensitive.
    /// - `layer`: 1-5 comma-separated components, each a position or `*`
    ///   (e.g. `"1,*,1"`).
    ///
    /// One physical call per invocation; pass the response's continuation
    /// token back via `start_position` to page manually.
    pub fn get_layer(
        &self,
        db: &str,
        frequency: &str,
        layer: &str,
        start: Option<&str>,
        end: Option<&str>,
        start_position: Option<&str>,
    ) -> Result<Vec<ObservationRow>, Error> {
        let db = reference::validate_database(db)?;
        let frequency = Frequency::parse(frequency)?;
        let layer: LayerSpec = layer.parse()?;
        let params = layer_params(&db, frequency, &layer, start, end, start_position);
        let env = self.request(ENDPOINT_DATA_LAYER, params)?;
        normalize_observations(&env.result_set, self.lang)
    }

    /// Fetch the metadata of every series in a database (one call, no
    /// pagination by contract).
    pub fn get_metadata(&self, db: &str) -> Result<Vec<MetadataRow>, Error> {
        let db = reference::validate_database(db)?;
        let env = self.request(ENDPOINT_METADATA, vec![("db".into(), db)])?;
        normalize_metadata(&env.result_set, self.lang)
    }

    /// Search a database's series by case-insensitive substring match on the
    /// localized series name. No keyword returns the full metadata set.
    pub fn search_series(
        &self,
        db: &str,
        keyword: Option<&str>,
    ) -> Result<Vec<MetadataRow>, Error> {
        let meta = self.get_metadata(db)?;
        let Some(keyword) = keyword else {
            return Ok(meta);
        };
        let kw = keyword.to_lowercase();
        Ok(meta
            .into_iter()
            .filter(|m| {
                m.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&kw))
            })
            .collect())
    }
}

fn push_opt(params: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        params.push((key.into(), v.into()));
    }
}

/// Query parameters for the code lookup endpoint. Absent optionals are
/// omitted entirely, never sent empty. The 250-code cap is re-checked here so
/// the limit holds no matter which path built the chunk.
fn code_params(
    db: &str,
    codes: &[String],
    start: Option<&str>,
    end: Option<&str>,
    start_position: Option<&str>,
) -> Result<Vec<(String, String)>, Error> {
    if codes.len() > MAX_CODES_PER_REQUEST {
        return Err(Error::TooManyCodes(codes.len()));
    }
    let mut params = vec![
        ("db".to_string(), db.to_string()),
        ("code".to_string(), codes.join(",")),
    ];
    push_opt(&mut params, "startDate", start);
    push_opt(&mut params, "endDate", end);
    push_opt(&mut params, "startPosition", start_position);
    Ok(params)
}

/// Query parameters for the hierarchical lookup endpoint.
fn layer_params(
    db: &str,
    frequency: Frequency,
    layer: &LayerSpec,
    start: Option<&str>,
    end: Option<&str>,
    start_position: Option<&str>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("db".to_string(), db.to_string()),
        ("frequency".to_string(), frequency.to_query_param()),
        ("layer".to_string(), layer.to_query_param()),
    ];
    push_opt(&mut params, "startDate", start);
    push_opt(&mut params, "endDate", end);
    push_opt(&mut params, "startPosition", start_position);
    params
}
