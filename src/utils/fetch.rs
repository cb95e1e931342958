use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use clap::ValueEnum;
use log::{debug, info};
use reqwest::Client;
use tokio::process::Command;
use url::Url;
use urlencoding::encode;

use crate::error::{Result, ResultError};
use crate::models::StudentQuery;

pub const DEFAULT_RESULT_URL: &str =
    "https://result19.comillaboard.gov.bd/2025/individual/result_marks_details.php";
pub const CURL: &str = "curl";
const FORM_CONTENT_TYPE: &str = "content-type: application/x-www-form-urlencoded";
const RESULT_FILE: &str = "ssc_result.html";

/// How the result page is downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Shell out to the `curl` program
    Curl,
    /// Use the built-in HTTP client
    Http,
}

// Body of the form POST the board expects.
fn form_body(student: &StudentQuery) -> String {
    format!("roll={}&reg={}", encode(&student.roll), encode(&student.reg))
}

pub struct CurlFetcher {
    program: String,
    endpoint: Url,
}

impl CurlFetcher {
    pub fn new(endpoint: Url) -> Self {
        Self::with_program(CURL, endpoint)
    }

    pub fn with_program(program: impl Into<String>, endpoint: Url) -> Self {
        CurlFetcher { program: program.into(), endpoint }
    }

    pub async fn is_available(&self) -> bool {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        matches!(status, Ok(s) if s.success())
    }

    fn args(&self, student: &StudentQuery, out: &Path) -> Vec<OsString> {
        vec![
            "-s".into(),
            self.endpoint.as_str().into(),
            "-H".into(),
            FORM_CONTENT_TYPE.into(),
            "--data-raw".into(),
            form_body(student).into(),
            "-o".into(),
            out.as_os_str().to_owned(),
        ]
    }

    pub async fn fetch(&self, student: &StudentQuery) -> Result<String> {
        // Removed together with its contents when dropped, on every return path.
        let dir = tempfile::Builder::new().prefix("sscres").tempdir()?;
        let out = dir.path().join(RESULT_FILE);

        debug!("Running {} for roll {}", self.program, student.roll);
        let status = Command::new(&self.program)
            .args(self.args(student, &out))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ResultError::Transfer(format!("could not run {}: {}", self.program, e)))?;
        if !status.success() {
            return Err(ResultError::Transfer(format!("{} exited with {}", self.program, status)));
        }

        let bytes = tokio::fs::read(&out).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
}

impl HttpFetcher {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client, endpoint })
    }

    pub async fn fetch(&self, student: &StudentQuery) -> Result<String> {
        let form = [("roll", student.roll.as_str()), ("reg", student.reg.as_str())];
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

pub enum Fetcher {
    Curl(CurlFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    pub fn new(backend: Backend, endpoint: Url) -> Result<Self> {
        Ok(match backend {
            Backend::Curl => Fetcher::Curl(CurlFetcher::new(endpoint)),
            Backend::Http => Fetcher::Http(HttpFetcher::new(endpoint)?),
        })
    }

    // Refuses to go on when the download tool isn't installed.
    pub async fn ensure_available(&self) -> Result<()> {
        if let Fetcher::Curl(curl) = self {
            if !curl.is_available().await {
                return Err(ResultError::CapabilityMissing(CURL));
            }
        }
        Ok(())
    }

    pub async fn fetch(&self, student: &StudentQuery) -> Result<String> {
        let html = match self {
            Fetcher::Curl(curl) => curl.fetch(student).await?,
            Fetcher::Http(http) => http.fetch(student).await?,
        };
        info!("Fetched {} bytes of result page", html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "<td class=\"bg_grey\">101</td>";

    fn student() -> StudentQuery {
        StudentQuery { roll: "152205".into(), reg: "2211210980".into() }
    }

    fn result_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/result.php", server.uri())).unwrap()
    }

    // Board that answers only the expected form POST.
    async fn board(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/result.php"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("roll=152205&reg=2211210980"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn closed_port_url() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}/result.php")).unwrap()
    }

    #[test]
    fn form_body_is_url_encoded() {
        let student = StudentQuery { roll: "12 34".into(), reg: "a&b".into() };
        assert_eq!(form_body(&student), "roll=12%2034&reg=a%26b");
    }

    #[test]
    fn curl_args_post_the_form() {
        let curl = CurlFetcher::new(Url::parse(DEFAULT_RESULT_URL).unwrap());
        let args = curl.args(&student(), Path::new("/tmp/out.html"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-s",
                DEFAULT_RESULT_URL,
                "-H",
                "content-type: application/x-www-form-urlencoded",
                "--data-raw",
                "roll=152205&reg=2211210980",
                "-o",
                "/tmp/out.html",
            ]
        );
    }

    #[tokio::test]
    async fn missing_downloader_is_reported() {
        let url = Url::parse(DEFAULT_RESULT_URL).unwrap();
        let fetcher = Fetcher::Curl(CurlFetcher::with_program("sscres-no-such-downloader", url));
        assert!(matches!(fetcher.ensure_available().await, Err(ResultError::CapabilityMissing(CURL))));
    }

    #[tokio::test]
    async fn http_backend_needs_no_downloader() {
        let fetcher = Fetcher::new(Backend::Http, Url::parse(DEFAULT_RESULT_URL).unwrap()).unwrap();
        assert!(fetcher.ensure_available().await.is_ok());
    }

    #[tokio::test]
    async fn http_backend_posts_form() {
        let server = board(200, PAGE).await;
        let fetcher = Fetcher::new(Backend::Http, result_url(&server)).unwrap();
        assert_eq!(fetcher.fetch(&student()).await.unwrap(), PAGE);
    }

    #[tokio::test]
    async fn http_backend_rejects_error_status() {
        let server = board(500, "oops").await;
        let fetcher = Fetcher::new(Backend::Http, result_url(&server)).unwrap();
        assert!(matches!(fetcher.fetch(&student()).await, Err(ResultError::Transfer(_))));
    }

    #[tokio::test]
    async fn http_backend_connection_refused() {
        let fetcher = Fetcher::new(Backend::Http, closed_port_url()).unwrap();
        assert!(matches!(fetcher.fetch(&student()).await, Err(ResultError::Transfer(_))));
    }

    #[tokio::test]
    async fn curl_backend_posts_form() {
        let curl = CurlFetcher::new(Url::parse(DEFAULT_RESULT_URL).unwrap());
        if !curl.is_available().await {
            return;
        }
        let server = board(200, PAGE).await;
        let fetcher = Fetcher::Curl(CurlFetcher::new(result_url(&server)));
        assert_eq!(fetcher.fetch(&student()).await.unwrap(), PAGE);
    }

    #[tokio::test]
    async fn curl_backend_transfer_error() {
        let curl = CurlFetcher::new(closed_port_url());
        if !curl.is_available().await {
            return;
        }
        assert!(matches!(curl.fetch(&student()).await, Err(ResultError::Transfer(_))));
    }

    #[tokio::test]
    async fn curl_backend_cannot_spawn() {
        let curl = CurlFetcher::with_program("sscres-no-such-downloader", closed_port_url());
        assert!(matches!(curl.fetch(&student()).await, Err(ResultError::Transfer(_))));
    }
}
