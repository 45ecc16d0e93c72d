use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT_ENCODING, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::Method;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::request::Request;
use crate::response::{Response, is_complete, parse_response, reads_until_close};
use crate::RequestError;

const SUPPORTED_ENCODINGS: &str = "gzip, deflate";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// Minimal HTTP/1.1 client. Each call is one attempt on a fresh connection.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn request(&self, request: Request) -> Result<Response, RequestError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.execute(request))
            .await
            .map_err(|_| RequestError::Timeout(timeout))?
    }

    async fn execute(&self, request: Request) -> Result<Response, RequestError> {
        let uri = request.uri.clone();
        let scheme = uri.scheme_str().unwrap_or("http").to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(RequestError::UnsupportedScheme(scheme));
        }
        let host = uri
            .host()
            .ok_or_else(|| RequestError::InvalidUrl(format!("`{uri}` has no host")))?;
        let authority = uri
            .authority()
            .map(|authority| authority.as_str().to_string())
            .unwrap_or_else(|| host.to_string());
        let connect_host = host.trim_start_matches('[').trim_end_matches(']').to_string();
        let port = uri
            .port_u16()
            .unwrap_or(if scheme == "https" { 443 } else { 80 });
        let target = uri.path_and_query().map(|value| value.as_str()).unwrap_or("/");
        let head_only = request.method == Method::HEAD;
        let request_bytes = serialize_request(&request, &authority, target);

        let tcp = TcpStream::connect((connect_host.as_str(), port))
            .await
            .map_err(|err| RequestError::Connect(format!("{connect_host}:{port}: {err}")))?;

        let response_bytes = if scheme == "https" {
            let connector = self.tls_connector()?;
            let mut stream = connector
                .connect(&connect_host, tcp)
                .await
                .map_err(|err| RequestError::Tls(err.to_string()))?;
            exchange(&mut stream, &request_bytes, head_only).await?
        } else {
            let mut stream = tcp;
            exchange(&mut stream, &request_bytes, head_only).await?
        };

        parse_response(&response_bytes, head_only)
    }

    fn tls_connector(&self) -> Result<tokio_native_tls::TlsConnector, RequestError> {
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .request_alpns(&["http/1.1"])
            .build()
            .map_err(|err| RequestError::Tls(err.to_string()))?;
        Ok(tokio_native_tls::TlsConnector::from(connector))
    }
}

async fn exchange<S>(stream: &mut S, request: &[u8], head_only: bool) -> Result<Vec<u8>, RequestError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request)
        .await
        .map_err(|err| RequestError::Io(err.to_string()))?;
    stream
        .flush()
        .await
        .map_err(|err| RequestError::Io(err.to_string()))?;

    let mut buffer = vec![0u8; 8192];
    let mut response_bytes = Vec::new();
    loop {
        match stream.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                response_bytes.extend_from_slice(&buffer[..n]);
                if is_complete(&response_bytes, head_only) {
                    break;
                }
            }
            // Peers that skip close_notify surface as an error at the end of a
            // close-delimited body.
            Err(_) if reads_until_close(&response_bytes, head_only) => break,
            Err(err) => return Err(RequestError::Io(err.to_string())),
        }
    }
    if response_bytes.is_empty() {
        return Err(RequestError::Io("connection closed before response".to_string()));
    }
    Ok(response_bytes)
}

pub(crate) fn serialize_request(request: &Request, authority: &str, target: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(format!("{} {} HTTP/1.1\r\n", request.method, target).as_bytes());
    if !request.headers.contains_key(HOST) {
        bytes.extend_from_slice(format!("host: {authority}\r\n").as_bytes());
    }
    let mut wrote_encoding = false;
    for (name, value) in request.headers.iter() {
        if name == CONNECTION || name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            continue;
        }
        if name == ACCEPT_ENCODING {
            if !wrote_encoding {
                bytes.extend_from_slice(format!("accept-encoding: {SUPPORTED_ENCODINGS}\r\n").as_bytes());
                wrote_encoding = true;
            }
            continue;
        }
        bytes.extend_from_slice(name.as_str().as_bytes());
        bytes.extend_from_slice(b": ");
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }
    if !request.body.is_empty() || matches!(request.method, Method::POST | Method::PUT | Method::PATCH) {
        bytes.extend_from_slice(format!("content-length: {}\r\n", request.body.len()).as_bytes());
    }
    bytes.extend_from_slice(b"connection: close\r\n\r\n");
    bytes.extend_from_slice(&request.body);
    bytes
}
