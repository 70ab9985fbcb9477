// Copyright 2024-2026, NVIDIA CORPORATION & AFFILIATES. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//  * Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//  * Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//  * Neither the name of NVIDIA CORPORATION nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS ``AS IS'' AND ANY
// EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED.  IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY
// OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The main inference client implementation.
//!
//! [`InferenceClient`] provides an ergonomic async API for communicating
//! with a KServe-v2-protocol inference server (such as NVIDIA Triton) over
//! gRPC. It wraps the auto-generated gRPC stubs and exposes high-level
//! methods for health checks, metadata queries, synchronous and asynchronous
//! inference, and statistics.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> infer_client::error::Result<()> {
//! use infer_client::client::InferenceClient;
//! use infer_client::infer::{DataType, InferInput, InferRequestBuilder};
//!
//! let client = InferenceClient::connect("http://localhost:8001").await?;
//!
//! // Check server health
//! let live = client.is_server_live().await?;
//! let ready = client.is_server_ready().await?;
//!
//! // Run inference
//! let input = InferInput::new("INPUT0", vec![1, 16], DataType::Int32)
//!     .with_data(&[0_i32; 16]);
//!
//! let request = InferRequestBuilder::new("simple")
//!     .input(input)
//!     .output("OUTPUT0")
//!     .build();
//!
//! let result = client.infer(request).await?;
//! let values = result.output_as::<i32>("OUTPUT0")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tonic::codec::CompressionEncoding;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::debug;

use crate::error::{Error, RequestError, Result};
use crate::generated::inference::{
    self, grpc_inference_service_client::GrpcInferenceServiceClient,
};
use crate::infer::{InferRequest, InferResult, ModelMetadata, ServerMetadata, TensorMetadata};

/// Default maximum message size for gRPC (128 MiB).
const DEFAULT_MAX_MESSAGE_SIZE: usize = 128 * 1024 * 1024;

/// Channels reused by clients connected with
/// [`ClientOptions::use_cached_channel`], keyed by endpoint URL.
static CHANNEL_CACHE: Lazy<Mutex<HashMap<String, Channel>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

/// Message compression applied to gRPC calls.
///
/// The chosen algorithm is used for outgoing messages, and the client
/// advertises it for responses as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// No compression (the default).
    #[default]
    None,
    /// Gzip compression.
    Gzip,
    /// Zstandard compression.
    Zstd,
}

impl Compression {
    pub(crate) fn encoding(self) -> Option<CompressionEncoding> {
        match self {
            Self::None => None,
            Self::Gzip => Some(CompressionEncoding::Gzip),
            Self::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        })
    }
}

/// Error returned when parsing an unknown compression algorithm name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCompressionError(String);

impl std::fmt::Display for ParseCompressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported compression algorithm '{}': 'gzip', 'zstd' and 'none' are supported",
            self.0
        )
    }
}

impl std::error::Error for ParseCompressionError {}

impl std::str::FromStr for Compression {
    type Err = ParseCompressionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "gzip" => Ok(Self::Gzip),
            "zstd" => Ok(Self::Zstd),
            other => Err(ParseCompressionError(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// TLS options
// ---------------------------------------------------------------------------

/// TLS material for an encrypted connection.
///
/// All fields are optional: leaving everything unset uses the platform
/// trust roots without a client certificate. The private key and the
/// certificate chain must be provided together.
///
/// # Example
///
/// ```rust
/// use infer_client::client::TlsOptions;
///
/// let tls = TlsOptions::default()
///     .root_certificates("ca.pem")
///     .private_key("client.key")
///     .certificate_chain("client.pem");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    root_certificates: Option<PathBuf>,
    private_key: Option<PathBuf>,
    certificate_chain: Option<PathBuf>,
}

impl TlsOptions {
    /// Sets the PEM file holding the root certificates used to verify the
    /// server.
    #[must_use]
    pub fn root_certificates(self, path: impl Into<PathBuf>) -> Self {
        Self {
            root_certificates: Some(path.into()),
            ..self
        }
    }

    /// Sets the PEM file holding the client's private key.
    #[must_use]
    pub fn private_key(self, path: impl Into<PathBuf>) -> Self {
        Self {
            private_key: Some(path.into()),
            ..self
        }
    }

    /// Sets the PEM file holding the client's certificate chain.
    #[must_use]
    pub fn certificate_chain(self, path: impl Into<PathBuf>) -> Self {
        Self {
            certificate_chain: Some(path.into()),
            ..self
        }
    }

    fn read_pem(path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path)
            .map_err(|e| Error::Connection(format!("unable to read {}: {e}", path.display())))
    }

    pub(crate) fn into_tls_config(self) -> Result<ClientTlsConfig> {
        let mut config = ClientTlsConfig::new();

        if let Some(path) = &self.root_certificates {
            let pem = Self::read_pem(path)?;
            config = config.ca_certificate(Certificate::from_pem(pem));
        }

        match (&self.certificate_chain, &self.private_key) {
            (Some(chain), Some(key)) => {
                let chain_pem = Self::read_pem(chain)?;
                let key_pem = Self::read_pem(key)?;
                config = config.identity(Identity::from_pem(chain_pem, key_pem));
            }
            (None, None) => {}
            _ => {
                return Err(Error::Connection(
                    "client TLS identity requires both a private key and a certificate chain"
                        .into(),
                ));
            }
        }

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Client options
// ---------------------------------------------------------------------------

/// Options for configuring the client connection.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infer_client::client::{ClientOptions, Compression};
///
/// let options = ClientOptions::default()
///     .connect_timeout(Duration::from_secs(10))
///     .header("authorization", "Bearer abc123")
///     .compression(Compression::Gzip)
///     .use_cached_channel(false);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    max_message_size: usize,
    keep_alive_interval: Option<Duration>,
    keep_alive_timeout: Option<Duration>,
    tls: Option<TlsOptions>,
    headers: Vec<(String, String)>,
    compression: Compression,
    use_cached_channel: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(5)),
            request_timeout: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            keep_alive_interval: None,
            keep_alive_timeout: None,
            tls: None,
            headers: Vec::new(),
            compression: Compression::None,
            use_cached_channel: true,
        }
    }
}

impl ClientOptions {
    /// Sets the timeout for establishing the initial connection.
    #[must_use]
    pub fn connect_timeout(self, timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
            ..self
        }
    }

    /// Sets a timeout applied to every RPC issued through this client.
    ///
    /// A per-request timeout set via
    /// [`InferRequestBuilder::timeout`](crate::infer::InferRequestBuilder::timeout)
    /// applies on top of this channel-wide limit.
    #[must_use]
    pub fn request_timeout(self, timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
            ..self
        }
    }

    /// Sets the maximum gRPC message size in bytes.
    ///
    /// Default: 128 MiB.
    #[must_use]
    pub fn max_message_size(self, size: usize) -> Self {
        Self {
            max_message_size: size,
            ..self
        }
    }

    /// Sets the HTTP/2 keep-alive interval.
    #[must_use]
    pub fn keep_alive_interval(self, interval: Duration) -> Self {
        Self {
            keep_alive_interval: Some(interval),
            ..self
        }
    }

    /// Sets the HTTP/2 keep-alive timeout.
    #[must_use]
    pub fn keep_alive_timeout(self, timeout: Duration) -> Self {
        Self {
            keep_alive_timeout: Some(timeout),
            ..self
        }
    }

    /// Enables TLS with the given materials.
    ///
    /// The URL passed to [`InferenceClient::connect_with_options`] must use
    /// the `https` scheme when TLS is enabled.
    #[must_use]
    pub fn tls(self, tls: TlsOptions) -> Self {
        Self {
            tls: Some(tls),
            ..self
        }
    }

    /// Attaches a custom metadata header to every RPC issued through this
    /// client.
    ///
    /// May be called repeatedly to attach several headers. Names and values
    /// are validated when the client is created.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the compression algorithm for gRPC messages.
    ///
    /// Default: [`Compression::None`].
    #[must_use]
    pub fn compression(self, compression: Compression) -> Self {
        Self {
            compression,
            ..self
        }
    }

    /// Controls whether the underlying channel is shared through a
    /// process-wide cache keyed by URL.
    ///
    /// When enabled (the default), clients connecting to the same URL reuse
    /// one HTTP/2 connection. When disabled, a dedicated channel is dialed
    /// and left out of the cache.
    #[must_use]
    pub fn use_cached_channel(self, use_cached_channel: bool) -> Self {
        Self {
            use_cached_channel,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Client statistics
// ---------------------------------------------------------------------------

/// Cumulative statistics kept by the client about its own requests.
///
/// Counters cover every completed inference request, successful or not,
/// from both the synchronous and the asynchronous flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferStat {
    /// Number of inference requests that ran to completion.
    pub completed_request_count: u64,
    /// Total wall-clock time spent in completed requests, in nanoseconds.
    pub cumulative_total_request_time_ns: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    completed_request_count: AtomicU64,
    cumulative_total_request_time_ns: AtomicU64,
}

impl StatCounters {
    fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.completed_request_count.fetch_add(1, Ordering::Relaxed);
        self.cumulative_total_request_time_ns
            .fetch_add(nanos, Ordering::Relaxed);
    }

    fn snapshot(&self) -> InferStat {
        InferStat {
            completed_request_count: self.completed_request_count.load(Ordering::Relaxed),
            cumulative_total_request_time_ns: self
                .cumulative_total_request_time_ns
                .load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// InferenceClient
// ---------------------------------------------------------------------------

/// A client for communicating with a KServe-v2-protocol inference server
/// via gRPC.
///
/// The client is cheaply cloneable -- clones share the same underlying gRPC
/// channel, statistics, and runtime handle, and can be used concurrently
/// from multiple tasks or threads.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> infer_client::error::Result<()> {
/// use infer_client::client::InferenceClient;
///
/// let client = InferenceClient::connect("http://localhost:8001").await?;
/// let metadata = client.server_metadata().await?;
/// println!("Server: {} v{}", metadata.name, metadata.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InferenceClient {
    inner: GrpcInferenceServiceClient<Channel>,
    headers: Arc<[(AsciiMetadataKey, AsciiMetadataValue)]>,
    stats: Arc<StatCounters>,
    runtime: Handle,
}

impl InferenceClient {
    /// Connects to an inference server at the given URL with default
    /// options.
    ///
    /// # Arguments
    ///
    /// * `url` -- The gRPC endpoint URL (e.g. `"http://localhost:8001"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_options(url, ClientOptions::default()).await
    }

    /// Connects to an inference server with custom options.
    ///
    /// Must be called from within a tokio runtime; asynchronous requests
    /// issued later are spawned onto the runtime that performed the
    /// connection.
    ///
    /// # Arguments
    ///
    /// * `url` -- The gRPC endpoint URL (e.g. `"http://localhost:8001"`).
    /// * `options` -- Connection and transport configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed custom headers and
    /// [`Error::Connection`] or [`Error::Transport`] if the connection
    /// cannot be established.
    pub async fn connect_with_options(url: &str, options: ClientOptions) -> Result<Self> {
        // Validate headers before any network work.
        let headers = Self::build_metadata(&options.headers)?;

        let channel = if options.use_cached_channel {
            Self::cached_channel(url, &options).await?
        } else {
            Self::dial(url, &options).await?
        };

        let mut inner = GrpcInferenceServiceClient::new(channel)
            .max_decoding_message_size(options.max_message_size)
            .max_encoding_message_size(options.max_message_size);

        if let Some(encoding) = options.compression.encoding() {
            inner = inner.send_compressed(encoding).accept_compressed(encoding);
        }

        Ok(Self {
            inner,
            headers,
            stats: Arc::new(StatCounters::default()),
            runtime: Handle::current(),
        })
    }

    fn build_metadata(
        headers: &[(String, String)],
    ) -> Result<Arc<[(AsciiMetadataKey, AsciiMetadataValue)]>> {
        let mut metadata = Vec::with_capacity(headers.len());
        for (name, value) in headers {
            let key = name
                .parse::<AsciiMetadataKey>()
                .map_err(|_| Error::InvalidInput(format!("invalid header name: {name}")))?;
            let value = value
                .parse::<AsciiMetadataValue>()
                .map_err(|_| Error::InvalidInput(format!("invalid value for header {name}")))?;
            metadata.push((key, value));
        }
        Ok(metadata.into())
    }

    async fn dial(url: &str, options: &ClientOptions) -> Result<Channel> {
        let mut endpoint = Endpoint::from_shared(url.to_owned())
            .map_err(|e| Error::Connection(format!("invalid URL: {e}")))?;

        if let Some(timeout) = options.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }
        if let Some(timeout) = options.request_timeout {
            endpoint = endpoint.timeout(timeout);
        }
        if let Some(interval) = options.keep_alive_interval {
            endpoint = endpoint.keep_alive_while_idle(true);
            endpoint = endpoint.http2_keep_alive_interval(interval);
        }
        if let Some(timeout) = options.keep_alive_timeout {
            endpoint = endpoint.keep_alive_timeout(timeout);
        }
        if let Some(tls) = options.tls.clone() {
            endpoint = endpoint.tls_config(tls.into_tls_config()?)?;
        }

        debug!("Dialing inference server at {url}");
        Ok(endpoint.connect().await?)
    }

    async fn cached_channel(url: &str, options: &ClientOptions) -> Result<Channel> {
        {
            let cache = CHANNEL_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(channel) = cache.get(url) {
                debug!("Reusing cached channel for {url}");
                return Ok(channel.clone());
            }
        }

        // The lock is not held while dialing. If two connections race, the
        // first channel inserted wins and the other is dropped.
        let channel = Self::dial(url, options).await?;
        let mut cache = CHANNEL_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(url.to_owned()).or_insert(channel).clone())
    }

    fn grpc_request<T>(&self, message: T, timeout: Option<Duration>) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        for (key, value) in self.headers.iter() {
            request.metadata_mut().insert(key.clone(), value.clone());
        }
        if let Some(timeout) = timeout {
            request.set_timeout(timeout);
        }
        request
    }

    // -----------------------------------------------------------------------
    // Health checks
    // -----------------------------------------------------------------------

    /// Checks whether the server is live (i.e. the process is running).
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn is_server_live(&self) -> Result<bool> {
        let response = self
            .inner
            .clone()
            .server_live(self.grpc_request(inference::ServerLiveRequest {}, None))
            .await?;
        Ok(response.into_inner().live)
    }

    /// Checks whether the server is ready to accept inference requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn is_server_ready(&self) -> Result<bool> {
        let response = self
            .inner
            .clone()
            .server_ready(self.grpc_request(inference::ServerReadyRequest {}, None))
            .await?;
        Ok(response.into_inner().ready)
    }

    /// Checks whether a specific model (and optionally version) is ready.
    ///
    /// # Arguments
    ///
    /// * `model_name` -- The name of the model.
    /// * `model_version` -- The version to check. Pass `""` for the default
    ///   version.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn is_model_ready(&self, model_name: &str, model_version: &str) -> Result<bool> {
        let response = self
            .inner
            .clone()
            .model_ready(self.grpc_request(
                inference::ModelReadyRequest {
                    name: model_name.to_owned(),
                    version: model_version.to_owned(),
                },
                None,
            ))
            .await?;
        Ok(response.into_inner().ready)
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Retrieves server metadata including name, version, and supported
    /// extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn server_metadata(&self) -> Result<ServerMetadata> {
        let response = self
            .inner
            .clone()
            .server_metadata(self.grpc_request(inference::ServerMetadataRequest {}, None))
            .await?;
        let md = response.into_inner();
        Ok(ServerMetadata {
            name: md.name,
            version: md.version,
            extensions: md.extensions,
        })
    }

    /// Retrieves metadata for a specific model.
    ///
    /// # Arguments
    ///
    /// * `model_name` -- The name of the model.
    /// * `model_version` -- The version to query. Pass `""` for the default
    ///   version.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn model_metadata(
        &self,
        model_name: &str,
        model_version: &str,
    ) -> Result<ModelMetadata> {
        let response = self
            .inner
            .clone()
            .model_metadata(self.grpc_request(
                inference::ModelMetadataRequest {
                    name: model_name.to_owned(),
                    version: model_version.to_owned(),
                },
                None,
            ))
            .await?;
        let md = response.into_inner();
        Ok(ModelMetadata {
            name: md.name,
            versions: md.versions,
            platform: md.platform,
            inputs: md
                .inputs
                .into_iter()
                .map(|t| TensorMetadata {
                    name: t.name,
                    datatype: t.datatype,
                    shape: t.shape,
                })
                .collect(),
            outputs: md
                .outputs
                .into_iter()
                .map(|t| TensorMetadata {
                    name: t.name,
                    datatype: t.datatype,
                    shape: t.shape,
                })
                .collect(),
        })
    }

    // -----------------------------------------------------------------------
    // Inference
    // -----------------------------------------------------------------------

    /// Performs a single inference request and waits for the result.
    ///
    /// Use [`InferRequestBuilder`](crate::infer::InferRequestBuilder) to
    /// construct the request. A timeout set on the request is enforced by
    /// the transport. The request is counted in
    /// [`client_statistics`](Self::client_statistics) whether it succeeds
    /// or fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn infer(&self, request: InferRequest) -> Result<InferResult> {
        let InferRequest { message, timeout } = request;
        let start = Instant::now();
        let outcome = self
            .inner
            .clone()
            .model_infer(self.grpc_request(message, timeout))
            .await;
        self.stats.record(start.elapsed());

        let response = outcome?;
        Ok(InferResult::from_response(response.into_inner()))
    }

    /// Starts an inference request without waiting for it and invokes
    /// `handler` with the [`InferResult`] once the request completes.
    ///
    /// The request runs on the runtime captured at connection time, so this
    /// method may be called from any thread, including ones outside the
    /// runtime. The handler runs on a runtime worker thread and receives a
    /// result for every completion: a response, a request failure, or a
    /// cancellation. Use the primitives in
    /// [`completion`](crate::completion) to get results back to a waiting
    /// thread.
    ///
    /// The returned [`PendingInfer`] can be used to cancel the request; it
    /// may be dropped freely when cancellation is not needed.
    pub fn async_infer<F>(&self, request: InferRequest, handler: F) -> PendingInfer
    where
        F: FnOnce(InferResult) + Send + 'static,
    {
        let InferRequest { message, timeout } = request;
        let grpc_request = self.grpc_request(message, timeout);
        let mut inner = self.inner.clone();
        let stats = Arc::clone(&self.stats);
        let token = CancellationToken::new();
        let task_token = token.clone();

        self.runtime.spawn(async move {
            let start = Instant::now();
            let result = tokio::select! {
                () = task_token.cancelled() => InferResult::from_error(RequestError::Cancelled),
                outcome = inner.model_infer(grpc_request) => match outcome {
                    Ok(response) => InferResult::from_response(response.into_inner()),
                    Err(status) => InferResult::from_error(RequestError::from(status)),
                },
            };
            stats.record(start.elapsed());
            handler(result);
        });

        PendingInfer { token }
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Returns the statistics this client has recorded about its own
    /// inference requests.
    ///
    /// Counters are shared between clones of the same client.
    #[must_use]
    pub fn client_statistics(&self) -> InferStat {
        self.stats.snapshot()
    }

    /// Retrieves cumulative inference statistics for a model from the
    /// server.
    ///
    /// # Arguments
    ///
    /// * `model_name` -- The name of the model. Pass `""` for all models.
    /// * `model_version` -- The version to query. Pass `""` for all
    ///   versions.
    ///
    /// # Errors
    ///
    /// Returns an error if the gRPC call fails.
    pub async fn model_statistics(
        &self,
        model_name: &str,
        model_version: &str,
    ) -> Result<inference::ModelStatisticsResponse> {
        let response = self
            .inner
            .clone()
            .model_statistics(self.grpc_request(
                inference::ModelStatisticsRequest {
                    name: model_name.to_owned(),
                    version: model_version.to_owned(),
                },
                None,
            ))
            .await?;
        Ok(response.into_inner())
    }
}

// ---------------------------------------------------------------------------
// PendingInfer
// ---------------------------------------------------------------------------

/// Handle to an in-flight asynchronous inference request.
///
/// Dropping the handle does not affect the request. Cancelling delivers a
/// result with [`RequestError::Cancelled`] to the completion handler; a
/// request that already completed is unaffected.
#[derive(Debug, Clone)]
pub struct PendingInfer {
    token: CancellationToken,
}

impl PendingInfer {
    /// Requests cancellation of the in-flight request.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
