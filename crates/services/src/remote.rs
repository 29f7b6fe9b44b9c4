use std::collections::BTreeSet;
use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    AttemptRecord, ChoiceLabel, Difficulty, Question, QuestionError, QuestionId,
};
use storage::repository::{ProgressSink, QuestionSource, StorageError};

/// Connection settings for the quiz REST API.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `None` unless `QUIZ_API_URL` is set to a non-empty value.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_API_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let token = env::var("QUIZ_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self { base_url, token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Question source and progress sink backed by the quiz REST API.
#[derive(Clone)]
pub struct RemoteQuizApi {
    client: Client,
    config: RemoteConfig,
}

impl RemoteQuizApi {
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Distinct categories across the whole remote bank, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` on transport failures or a
    /// non-success status, `StorageError::Serialization` on a malformed body.
    pub async fn list_categories(&self) -> Result<Vec<String>, StorageError> {
        let request = self.client.get(self.config.url("/api/questions/all"));
        let rows: Vec<QuestionDto> = decode(self.send(request).await?).await?;
        let categories: BTreeSet<String> = rows.into_iter().map(|row| row.category).collect();
        Ok(categories.into_iter().collect())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StorageError> {
        let request = match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|err| {
            tracing::warn!(error = %err, "quiz api request failed");
            StorageError::Connection(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "quiz api returned an error status");
            return Err(StorageError::Connection(format!("http status {status}")));
        }
        Ok(response)
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, StorageError> {
    response
        .json()
        .await
        .map_err(|err| StorageError::Serialization(err.to_string()))
}

#[async_trait]
impl QuestionSource for RemoteQuizApi {
    async fn fetch_questions(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, StorageError> {
        let request = self
            .client
            .get(self.config.url("/api/questions"))
            .query(&[("category", category), ("difficulty", difficulty.as_str())]);
        let rows: Vec<QuestionDto> = decode(self.send(request).await?).await?;
        rows.into_iter()
            .map(|row| row.into_question(difficulty))
            .collect()
    }
}

#[async_trait]
impl ProgressSink for RemoteQuizApi {
    async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<(), StorageError> {
        let payload = ProgressPayload {
            score: attempt.score(),
            total_questions: attempt.total(),
            category: attempt.category(),
            difficulty: attempt.difficulty().as_str(),
        };
        let request = self
            .client
            .post(self.config.url("/api/progress/save"))
            .json(&payload);
        self.send(request).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    #[serde(default)]
    id: Option<u64>,
    question_text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_answer: String,
    category: String,
    #[serde(default)]
    difficulty: Option<String>,
}

impl QuestionDto {
    /// Rows without a difficulty take the one they were requested at.
    fn into_question(self, requested: Difficulty) -> Result<Question, StorageError> {
        let correct: ChoiceLabel = self.correct_answer.parse().map_err(malformed)?;
        let difficulty = match self.difficulty.as_deref() {
            Some(text) => text.parse().map_err(malformed)?,
            None => requested,
        };

        let question = Question::new(
            self.question_text,
            [self.option_a, self.option_b, self.option_c, self.option_d],
            correct,
            self.category,
            difficulty,
        );
        Ok(match self.id {
            Some(id) => question.with_id(QuestionId::new(id)),
            None => question,
        })
    }
}

fn malformed(err: QuestionError) -> StorageError {
    StorageError::Serialization(err.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPayload<'a> {
    score: u32,
    total_questions: u32,
    category: &'a str,
    difficulty: &'a str,
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use super::*;

    fn dto(json: &str) -> QuestionDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn converts_camel_case_rows() {
        let row = dto(
            r#"{"id": 7, "questionText": "JVM stands for?", "optionA": "Java Virtual Machine",
                "optionB": "Joint", "optionC": "Just", "optionD": "None",
                "correctAnswer": "a", "category": "Java", "difficulty": "easy"}"#,
        );
        let question = row.into_question(Difficulty::Hard).unwrap();
        assert_eq!(question.id(), Some(QuestionId::new(7)));
        assert_eq!(question.correct(), ChoiceLabel::A);
        assert_eq!(question.difficulty(), Difficulty::Easy);
        assert_eq!(question.choice(ChoiceLabel::A), "Java Virtual Machine");
    }

    #[test]
    fn missing_difficulty_uses_requested() {
        let row = dto(
            r#"{"questionText": "q", "optionA": "a", "optionB": "b", "optionC": "c",
                "optionD": "d", "correctAnswer": "D", "category": "History"}"#,
        );
        let question = row.into_question(Difficulty::Medium).unwrap();
        assert_eq!(question.difficulty(), Difficulty::Medium);
        assert_eq!(question.id(), None);
    }

    #[test]
    fn bad_label_is_a_serialization_error() {
        let row = dto(
            r#"{"questionText": "q", "optionA": "a", "optionB": "b", "optionC": "c",
                "optionD": "d", "correctAnswer": "E", "category": "History"}"#,
        );
        assert!(matches!(
            row.into_question(Difficulty::Easy),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn progress_payload_is_camel_case() {
        let payload = ProgressPayload {
            score: 3,
            total_questions: 5,
            category: "Java",
            difficulty: "Easy",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"score": 3, "totalQuestions": 5, "category": "Java", "difficulty": "Easy"})
        );
    }

    #[test]
    fn config_url_joins_paths() {
        let config = RemoteConfig::new("http://localhost:8080/").with_token("t");
        assert_eq!(config.url("/api/questions"), "http://localhost:8080/api/questions");
        assert_eq!(config.token.as_deref(), Some("t"));
    }

    fn attempt() -> AttemptRecord {
        AttemptRecord::from_persisted(
            "Java".into(),
            Difficulty::Easy,
            3,
            5,
            quiz_core::time::fixed_now(),
        )
        .unwrap()
    }

    /// Base URL of a local port with nothing listening on it.
    fn unreachable_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Serve `requests` connections, answering each with `status_line` and an empty JSON body.
    fn serve_status(status_line: &'static str, requests: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\n\
                     content-length: 2\r\nconnection: close\r\n\r\n[]"
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}")
    }

    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + body_len {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let api = RemoteQuizApi::new(RemoteConfig::new(unreachable_base_url()));

        assert!(matches!(
            api.fetch_questions("Java", Difficulty::Easy).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(
            api.record_attempt(&attempt()).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(api.list_categories().await, Err(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn error_status_is_a_connection_error() {
        let base_url = serve_status("500 Internal Server Error", 2);
        let api = RemoteQuizApi::new(RemoteConfig::new(base_url).with_token("secret"));

        assert_eq!(
            api.fetch_questions("Java", Difficulty::Easy).await.unwrap_err(),
            StorageError::Connection("http status 500 Internal Server Error".into())
        );
        assert_eq!(
            api.record_attempt(&attempt()).await.unwrap_err(),
            StorageError::Connection("http status 500 Internal Server Error".into())
        );
    }

    #[tokio::test]
    async fn success_status_decodes_the_body() {
        let base_url = serve_status("200 OK", 1);
        let api = RemoteQuizApi::new(RemoteConfig::new(base_url));
        assert_eq!(api.fetch_questions("Java", Difficulty::Easy).await.unwrap(), Vec::new());
    }
}
