use crate::state::messages::{RecordRequest, RecordResponse};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use reqwest::Client;
use scoreboard_engine::FinalScore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Where finished matches are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSink {
    /// Appends one JSON object per line.
    JsonLines(PathBuf),
    /// POSTs each record as JSON.
    Webhook(String),
}

impl fmt::Display for ScoreSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreSink::JsonLines(path) => write!(f, "{}", path.display()),
            ScoreSink::Webhook(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub recorded_at: DateTime<Utc>,
    /// Winning team name, absent for a tie.
    pub winner: Option<String>,
    #[serde(flatten)]
    pub result: FinalScore,
}

impl ScoreRecord {
    pub fn new(result: FinalScore, recorded_at: DateTime<Utc>) -> Self {
        let winner = result.winner().map(|side| match side {
            scoreboard_engine::Side::Home => result.home.name.clone(),
            scoreboard_engine::Side::Away => result.away.name.clone(),
        });
        Self {
            recorded_at,
            winner,
            result,
        }
    }
}

#[derive(Debug)]
pub enum RecordError {
    Io(std::io::Error, PathBuf),
    Serialize(serde_json::Error),
    Http(reqwest::Error, String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Io(e, path) => write!(f, "Write error for {}: {e}", path.display()),
            RecordError::Serialize(e) => write!(f, "Could not encode score: {e}"),
            RecordError::Http(e, url) => write!(f, "Upload error for {url}: {e}"),
        }
    }
}

pub struct ScoreRecorder {
    client: Client,
    sink: ScoreSink,
    requests: mpsc::Receiver<RecordRequest>,
    responses: mpsc::Sender<RecordResponse>,
}

impl ScoreRecorder {
    pub fn new(
        sink: ScoreSink,
        requests: mpsc::Receiver<RecordRequest>,
        responses: mpsc::Sender<RecordResponse>,
    ) -> Self {
        let client = Client::builder()
            .user_agent("obie-scoreboard/0.1")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            sink,
            requests,
            responses,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let response = match request {
                RecordRequest::SaveFinalScore { result } => {
                    match self.record(ScoreRecord::new(result, Utc::now())).await {
                        Ok(()) => RecordResponse::Saved {
                            destination: self.sink.to_string(),
                        },
                        Err(e) => {
                            error!("{e}");
                            RecordResponse::Error {
                                message: e.to_string(),
                            }
                        }
                    }
                }
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send record response: {e}");
                break;
            }
        }
    }

    pub async fn record(&self, record: ScoreRecord) -> Result<(), RecordError> {
        debug!("recording {} result to {}", record.result.sport, self.sink);
        match &self.sink {
            ScoreSink::JsonLines(path) => append_line(path, &record).await?,
            ScoreSink::Webhook(url) => self.post(url, &record).await?,
        }
        info!(
            "recorded {} {} - {} {}",
            record.result.home.name,
            record.result.home.score,
            record.result.away.score,
            record.result.away.name
        );
        Ok(())
    }

    async fn post(&self, url: &str, record: &ScoreRecord) -> Result<(), RecordError> {
        self.client
            .post(url)
            .json(record)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RecordError::Http(e, url.to_owned()))?;
        Ok(())
    }
}

async fn append_line(path: &Path, record: &ScoreRecord) -> Result<(), RecordError> {
    let mut line = serde_json::to_string(record).map_err(RecordError::Serialize)?;
    line.push('\n');

    let io_err = |e| RecordError::Io(e, path.to_path_buf());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(line.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scoreboard_engine::{Sport, TeamResult};

    fn result(home: u32, away: u32) -> FinalScore {
        FinalScore {
            sport: Sport::Bocce,
            home: TeamResult {
                name: "Teal".into(),
                score: home,
            },
            away: TeamResult {
                name: "Pink".into(),
                score: away,
            },
            rounds_played: 6,
        }
    }

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 13, 12, 0, 0).unwrap()
    }

    fn recorder(sink: ScoreSink) -> ScoreRecorder {
        let (_req_tx, req_rx) = mpsc::channel(1);
        let (resp_tx, _resp_rx) = mpsc::channel(1);
        ScoreRecorder::new(sink, req_rx, resp_tx)
    }

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("obie-recorder-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("nested").join("scores.jsonl")
    }

    #[test]
    fn record_names_the_winner_and_flattens_the_result() {
        let record = ScoreRecord::new(result(12, 9), at_noon());
        assert_eq!(record.winner.as_deref(), Some("Teal"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sport"], "Bocce");
        assert_eq!(json["home"]["score"], 12);
        assert_eq!(json["rounds_played"], 6);
        assert_eq!(json["recorded_at"], "2026-06-13T12:00:00Z");

        assert_eq!(ScoreRecord::new(result(4, 4), at_noon()).winner, None);
    }

    #[tokio::test]
    async fn json_lines_appends_one_record_per_match() {
        let path = scratch_file("append");
        let recorder = recorder(ScoreSink::JsonLines(path.clone()));

        recorder.record(ScoreRecord::new(result(12, 9), at_noon())).await.unwrap();
        recorder.record(ScoreRecord::new(result(3, 11), at_noon())).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<ScoreRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].winner.as_deref(), Some("Pink"));
        assert_eq!(records[1].result, result(3, 11));
    }

    #[tokio::test]
    async fn webhook_posts_the_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/scores")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "winner": "Teal",
                "home": { "name": "Teal", "score": 12 },
            })))
            .with_status(201)
            .create_async()
            .await;

        let url = format!("{}/scores", server.url());
        let recorder = recorder(ScoreSink::Webhook(url));
        recorder.record(ScoreRecord::new(result(12, 9), at_noon())).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/scores")
            .with_status(503)
            .create_async()
            .await;

        let url = format!("{}/scores", server.url());
        let recorder = recorder(ScoreSink::Webhook(url.clone()));
        let err = recorder
            .record(ScoreRecord::new(result(1, 0), at_noon()))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::Http(_, ref u) if *u == url));
        assert!(err.to_string().starts_with("Upload error for"));
    }

    #[tokio::test]
    async fn worker_answers_each_request() {
        let path = scratch_file("worker");
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(4);
        let worker = ScoreRecorder::new(ScoreSink::JsonLines(path.clone()), req_rx, resp_tx);
        let task = tokio::spawn(worker.run());

        req_tx
            .send(RecordRequest::SaveFinalScore { result: result(5, 2) })
            .await
            .unwrap();
        match resp_rx.recv().await {
            Some(RecordResponse::Saved { destination }) => {
                assert_eq!(destination, path.display().to_string());
            }
            other => panic!("unexpected response: {other:?}"),
        }

        drop(req_tx);
        task.await.unwrap();
    }
}
