//! LanguageTool grammar checker client and local server.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::rule_based::{CheckOutcome, GrammarChecker};
use crate::error::{CheckerError, ConfigError};
use crate::types::{Language, LanguageToolSettings};

const SERVER_MAIN_CLASS: &str = "org.languagetool.server.HTTPServer";
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);
const CHECK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RuleMatch>,
}

/// A single issue reported by LanguageTool.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleMatch {
    /// Offset in UTF-16 code units
    pub offset: usize,
    /// Length in UTF-16 code units
    pub length: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
    pub value: String,
}

/// Apply the first suggestion of every match, left to right, skipping
/// matches that overlap an earlier one or point outside the text.
pub fn apply_replacements(text: &str, matches: &[RuleMatch]) -> String {
    // Byte offset for every UTF-16 position that starts a character.
    let mut utf16_to_byte = vec![None; text.encode_utf16().count() + 1];
    let mut utf16_pos = 0;
    for (byte_pos, ch) in text.char_indices() {
        utf16_to_byte[utf16_pos] = Some(byte_pos);
        utf16_pos += ch.len_utf16();
    }
    utf16_to_byte[utf16_pos] = Some(text.len());

    let mut ordered: Vec<&RuleMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| m.offset);

    let mut corrected = String::with_capacity(text.len());
    let mut cursor = 0;
    for rule_match in ordered {
        let Some(replacement) = rule_match.replacements.first() else {
            continue;
        };
        let start = utf16_to_byte.get(rule_match.offset).copied().flatten();
        let end = utf16_to_byte
            .get(rule_match.offset + rule_match.length)
            .copied()
            .flatten();
        let (Some(start), Some(end)) = (start, end) else {
            continue;
        };
        if start < cursor {
            continue;
        }
        corrected.push_str(&text[cursor..start]);
        corrected.push_str(&replacement.value);
        cursor = end;
    }
    corrected.push_str(&text[cursor..]);
    corrected
}

/// Claim `port` on the loopback interface (0 picks a free one) and release
/// it for the server to bind.
fn reserve_port(port: u16) -> Result<u16, CheckerError> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", port)).map_err(|e| {
        CheckerError::Io(std::io::Error::new(
            e.kind(),
            format!("LanguageTool port {port} is unavailable: {e}"),
        ))
    })?;
    Ok(listener.local_addr()?.port())
}

fn ensure_running(child: &mut Child) -> Result<(), CheckerError> {
    match child.try_wait()? {
        Some(status) => Err(CheckerError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("LanguageTool server exited during startup with {status}"),
        ))),
        None => Ok(()),
    }
}

/// A LanguageTool server launched and owned by this process.
///
/// The child process is killed on [`shutdown`](Self::shutdown) or when the
/// value is dropped.
pub struct LanguageToolServer {
    child: Mutex<Option<Child>>,
    url: String,
}

impl LanguageToolServer {
    /// Launch the server jar with an explicit JDK and wait until it answers.
    ///
    /// A `port` of 0 picks a free port. A port that is already taken is an
    /// error, so the checker never adopts a server it did not start.
    pub async fn start(settings: &LanguageToolSettings, jar_path: &Path) -> Result<Self, CheckerError> {
        let java = match &settings.java_home {
            Some(home) => home.join("bin").join("java"),
            None => PathBuf::from("java"),
        };
        let port = reserve_port(settings.port)?;
        let url = format!("http://127.0.0.1:{port}");

        let mut command = Command::new(&java);
        command
            .arg("-cp")
            .arg(jar_path)
            .arg(SERVER_MAIN_CLASS)
            .arg("--port")
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(home) = &settings.java_home {
            command.env("JAVA_HOME", home);
        }

        info!(java = %java.display(), jar = %jar_path.display(), port, "Starting LanguageTool server");
        let mut child = command.spawn()?;

        let client = Client::builder().timeout(Duration::from_secs(2)).build()?;
        let probe = format!("{url}/v2/languages");
        let timeout = settings.startup_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            ensure_running(&mut child)?;
            let ready = match client.get(&probe).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            };
            if ready {
                // Only our own, still running child counts as ready.
                ensure_running(&mut child)?;
                break;
            }
            if Instant::now() >= deadline {
                let _ = child.kill().await;
                return Err(CheckerError::StartupTimeout(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }

        info!(url = %url, "LanguageTool server ready");
        Ok(Self {
            child: Mutex::new(Some(child)),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(&self) {
        if let Some(mut child) = self.child.lock().await.take() {
            match child.kill().await {
                Ok(()) => info!("LanguageTool server stopped"),
                Err(e) => warn!(error = %e, "Failed to stop LanguageTool server"),
            }
        }
    }
}

/// Grammar checker talking to LanguageTool's `/v2/check` API.
pub struct LanguageToolChecker {
    client: Client,
    base_url: String,
    server: Option<LanguageToolServer>,
}

impl LanguageToolChecker {
    /// Client for a server at `url`, without contacting it.
    pub fn remote(url: &str) -> Result<Self, CheckerError> {
        Ok(Self {
            client: Client::builder().timeout(CHECK_TIMEOUT).build()?,
            base_url: url.trim_end_matches('/').to_string(),
            server: None,
        })
    }

    /// Use an already running server, failing if it does not answer.
    pub async fn connect(url: &str) -> Result<Self, CheckerError> {
        let checker = Self::remote(url)?;
        checker.ping().await?;
        info!(url = %checker.base_url, "Connected to LanguageTool server");
        Ok(checker)
    }

    /// Launch a local server owned by the returned checker.
    pub async fn launch(settings: &LanguageToolSettings, jar_path: &Path) -> Result<Self, CheckerError> {
        let server = LanguageToolServer::start(settings, jar_path).await?;
        let mut checker = Self::remote(server.url())?;
        checker.server = Some(server);
        Ok(checker)
    }

    /// Build a checker from settings: a configured URL wins over a local jar.
    pub async fn from_settings(settings: &LanguageToolSettings) -> Result<Self, ConfigError> {
        if let Some(url) = &settings.url {
            return Self::connect(url)
                .await
                .map_err(ConfigError::CheckerUnavailable);
        }
        match &settings.jar_path {
            Some(jar) => Self::launch(settings, jar)
                .await
                .map_err(ConfigError::CheckerUnavailable),
            None => Err(ConfigError::MissingCollaborator(
                "LanguageTool server (set languagetool.url or languagetool.jar_path)",
            )),
        }
    }

    async fn ping(&self) -> Result<(), CheckerError> {
        let response = self
            .client
            .get(format!("{}/v2/languages", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckerError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn owns_server(&self) -> bool {
        self.server.is_some()
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    async fn check(&self, sentence: &str, language: Language) -> Result<CheckOutcome, CheckerError> {
        let url = format!("{}/v2/check", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("text", sentence), ("language", language.languagetool_code())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CheckerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CheckResponse =
            serde_json::from_str(&body).map_err(|e| CheckerError::MalformedResponse(e.to_string()))?;

        debug!(issues = parsed.matches.len(), "Checked sentence");
        Ok(CheckOutcome {
            corrected_sentence: apply_replacements(sentence, &parsed.matches),
            issue_count: parsed.matches.len(),
        })
    }

    async fn shutdown(&self) {
        if let Some(server) = &self.server {
            server.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port, serve};
    use axum::extract::Form;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn rule(offset: usize, length: usize, replacements: &[&str]) -> RuleMatch {
        RuleMatch {
            offset,
            length,
            message: String::new(),
            replacements: replacements
                .iter()
                .map(|v| Replacement { value: v.to_string() })
                .collect(),
        }
    }

    #[test]
    fn test_apply_single_replacement() {
        let corrected = apply_replacements("Teh cat sat.", &[rule(0, 3, &["The", "Ten"])]);
        assert_eq!(corrected, "The cat sat.");
    }

    #[test]
    fn test_apply_out_of_order_matches() {
        let text = "I has a apple.";
        let matches = [rule(6, 1, &["an"]), rule(2, 3, &["have"])];
        assert_eq!(apply_replacements(text, &matches), "I have an apple.");
    }

    #[test]
    fn test_overlapping_and_empty_matches_skipped() {
        let text = "abcdef";
        let matches = [rule(0, 3, &["X"]), rule(2, 2, &["Y"]), rule(4, 1, &[])];
        assert_eq!(apply_replacements(text, &matches), "Xdef");
    }

    #[test]
    fn test_utf16_offsets() {
        // The emoji takes two UTF-16 code units.
        let text = "😀 Teh çay.";
        let corrected = apply_replacements(text, &[rule(3, 3, &["The"])]);
        assert_eq!(corrected, "😀 The çay.");
    }

    #[test]
    fn test_out_of_range_match_ignored() {
        assert_eq!(apply_replacements("short", &[rule(10, 2, &["x"])]), "short");
    }

    #[test]
    fn test_parse_check_response() {
        let body = r#"{"software":{"name":"LanguageTool"},"matches":[
            {"message":"Possible spelling mistake","offset":0,"length":3,
             "replacements":[{"value":"The"}],"rule":{"id":"MORFOLOGIK_RULE_EN_US"}}]}"#;
        let parsed: CheckResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].replacements[0].value, "The");
    }

    #[tokio::test]
    async fn test_settings_without_server_are_rejected() {
        let result = LanguageToolChecker::from_settings(&LanguageToolSettings::default()).await;
        assert!(matches!(result, Err(ConfigError::MissingCollaborator(_))));
    }

    async fn fake_check(Form(params): Form<HashMap<String, String>>) -> Response {
        if params.get("language").map(String::as_str) != Some("en-US") {
            return (StatusCode::BAD_REQUEST, "unsupported language").into_response();
        }
        let matches = if params.get("text").map(String::as_str) == Some("Teh cat.") {
            json!([{"message": "Possible typo", "offset": 0, "length": 3, "replacements": [{"value": "The"}]}])
        } else {
            json!([])
        };
        Json(json!({ "matches": matches })).into_response()
    }

    async fn fake_server() -> String {
        let app = Router::new()
            .route("/v2/languages", get(|| async { Json(json!([{"code": "en-US"}])) }))
            .route("/v2/check", post(fake_check));
        serve(app).await
    }

    #[tokio::test]
    async fn test_connect_to_running_server() {
        let base = fake_server().await;
        let settings = LanguageToolSettings {
            url: Some(format!("{base}/")),
            ..Default::default()
        };
        let checker = LanguageToolChecker::from_settings(&settings).await.unwrap();
        assert_eq!(checker.base_url(), base);
        assert!(!checker.owns_server());
    }

    #[tokio::test]
    async fn test_unreachable_url_is_checker_unavailable() {
        let settings = LanguageToolSettings {
            url: Some(format!("http://127.0.0.1:{}", closed_port())),
            ..Default::default()
        };
        let result = LanguageToolChecker::from_settings(&settings).await;
        assert!(matches!(result, Err(ConfigError::CheckerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_check_posts_sentence_and_language() {
        let checker = LanguageToolChecker::connect(&fake_server().await).await.unwrap();

        let outcome = checker.check("Teh cat.", Language::English).await.unwrap();
        assert_eq!(outcome.corrected_sentence, "The cat.");
        assert_eq!(outcome.issue_count, 1);

        let outcome = checker.check("The cat.", Language::English).await.unwrap();
        assert_eq!(outcome.corrected_sentence, "The cat.");
        assert_eq!(outcome.issue_count, 0);
    }

    #[tokio::test]
    async fn test_check_error_status() {
        let checker = LanguageToolChecker::connect(&fake_server().await).await.unwrap();
        match checker.check("Kedi.", Language::Turkish).await {
            Err(CheckerError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "unsupported language");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_refuses_port_already_in_use() {
        // Something else already answers on the configured port.
        let base = fake_server().await;
        let port: u16 = base.rsplit(':').next().unwrap().parse().unwrap();
        let settings = LanguageToolSettings {
            port,
            startup_timeout_secs: 5,
            ..Default::default()
        };

        let result = LanguageToolServer::start(&settings, Path::new("languagetool-server.jar")).await;
        assert!(matches!(result, Err(CheckerError::Io(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_fails_when_server_process_exits() {
        let java_home = tempfile::tempdir().unwrap();
        std::fs::create_dir(java_home.path().join("bin")).unwrap();
        let exit_failure = ["/bin/false", "/usr/bin/false"]
            .into_iter()
            .find(|p| Path::new(p).exists())
            .unwrap();
        std::os::unix::fs::symlink(exit_failure, java_home.path().join("bin").join("java")).unwrap();

        let settings = LanguageToolSettings {
            java_home: Some(java_home.path().to_path_buf()),
            port: 0,
            startup_timeout_secs: 10,
            ..Default::default()
        };
        let result = LanguageToolServer::start(&settings, Path::new("languagetool-server.jar")).await;
        match result {
            Err(CheckerError::Io(e)) => assert!(e.to_string().contains("exited during startup")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("a server whose process exited must not start"),
        }
    }
}
