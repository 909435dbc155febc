//! HTTP sink
//!
//! Ships each batch as one request body. Requests are made by a worker
//! thread fed through a bounded channel, so `write_batch` only renders the
//! body and enqueues it; it never waits on the network. A full queue is
//! reported as [`LoggerError::QueueFull`] and the batch is dropped.

use crate::core::{ErrorCallback, LoggerError, Result, Sink};
use crossbeam_channel::{bounded, Sender, TrySendError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// HTTP request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Batches waiting for the worker before new ones are dropped
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Turns a batch of lines into a request body
pub type BodyFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Settings for an [`HttpSink`]
#[derive(Clone)]
pub struct HttpConfig {
    pub url: String,
    /// Defaults to `POST`
    pub method: String,
    pub headers: Vec<(String, String)>,
    /// Defaults to the lines concatenated
    pub body: Option<BodyFn>,
    /// Receives failed requests and error statuses
    pub on_error: Option<ErrorCallback>,
    pub timeout: Duration,
    pub queue_capacity: usize,
}

impl HttpConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            headers: Vec::new(),
            body: None,
            on_error: None,
            timeout: DEFAULT_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    fn render_body(&self, batch: &[String]) -> String {
        match self.body {
            Some(ref body) => body(batch),
            None => batch.concat(),
        }
    }
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfig")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

enum Job {
    Post(String),
    /// Acknowledged once every earlier post has completed
    Flush(Sender<()>),
}

/// Posts batches to an HTTP endpoint from a background thread
///
/// # Example
///
/// ```no_run
/// use rust_batch_logger::sinks::{HttpConfig, HttpSink};
///
/// let sink = HttpSink::new(
///     HttpConfig::new("http://localhost:9200/logs")
///         .header("Authorization", "Bearer token")
///         .on_error(|e| eprintln!("log shipping failed: {}", e)),
/// )
/// .unwrap();
/// ```
pub struct HttpSink {
    config: HttpConfig,
    sender: Option<Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl HttpSink {
    /// Validate the configuration and start the worker thread
    pub fn new(config: HttpConfig) -> Result<Self> {
        let method = Method::from_bytes(config.method.as_bytes()).map_err(|_| {
            LoggerError::config("http sink", format!("invalid method '{}'", config.method))
        })?;
        let headers = header_map(&config.headers)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        let (sender, receiver) = bounded::<Job>(config.queue_capacity.max(1));
        let poster = Poster {
            client,
            method,
            headers,
            url: config.url.clone(),
            on_error: config.on_error.clone(),
        };

        let worker = thread::Builder::new()
            .name("log-http-sink".to_string())
            .spawn(move || {
                for job in receiver.iter() {
                    match job {
                        Job::Post(body) => poster.post(body),
                        Job::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                tracing::debug!(url = %poster.url, "http sink worker stopped");
            })
            .map_err(|e| LoggerError::io_operation("starting http sink worker", e.to_string(), e))?;

        Ok(Self {
            config,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Batches queued and not yet posted
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, |sender| sender.len())
    }
}

impl Sink for HttpSink {
    fn write_batch(&self, batch: &[String]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| LoggerError::sink_closed(self.name()))?;

        match sender.try_send(Job::Post(self.config.render_body(batch))) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LoggerError::queue_full(
                sender.len(),
                self.config.queue_capacity,
            )),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::sink_closed(self.name())),
        }
    }

    /// Wait, at most one request timeout, for queued batches to be posted
    fn flush(&self) -> Result<()> {
        let Some(ref sender) = self.sender else {
            return Ok(());
        };
        let (ack, acked) = bounded(1);
        sender
            .send_timeout(Job::Flush(ack), self.config.timeout)
            .map_err(|_| LoggerError::sink(self.name(), "timed out queueing flush"))?;
        acked
            .recv_timeout(self.config.timeout)
            .map_err(|_| LoggerError::sink(self.name(), "timed out waiting for pending requests"))
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl Drop for HttpSink {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!(url = %self.config.url, "http sink worker panicked");
            }
        }
    }
}

/// Worker-side half of the sink
struct Poster {
    client: Client,
    method: Method,
    headers: HeaderMap,
    url: String,
    on_error: Option<ErrorCallback>,
}

impl Poster {
    fn post(&self, body: String) {
        let response = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone())
            .body(body)
            .send();

        match response {
            Ok(response) if response.status().as_u16() >= 400 => {
                self.report(LoggerError::http_status(&self.url, response.status().as_u16()))
            }
            Ok(_) => {}
            Err(e) => self.report(e.into()),
        }
    }

    fn report(&self, error: LoggerError) {
        match self.on_error {
            Some(ref callback) => callback(&error),
            None => tracing::warn!(url = %self.url, error = %error, "failed to ship log batch"),
        }
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            LoggerError::config("http sink", format!("invalid header name '{}'", name))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            LoggerError::config("http sink", format!("invalid value for header '{}'", name))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Minimal HTTP/1.1 endpoint for exercising the sink in tests
#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    /// A request as seen by the server
    #[derive(Debug, Clone)]
    pub struct Captured {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl Captured {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Serve `requests` requests with `status`, reporting each on the channel
    pub fn spawn(status: u16, requests: usize) -> (String, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ingest", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let stream = stream.unwrap();
                let captured = read_request(&stream);
                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status
                )
                .unwrap();
                stream.flush().unwrap();
                let _ = tx.send(captured);
            }
        });

        (url, rx)
    }

    fn read_request(stream: &TcpStream) -> Captured {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        }
    }
}
