//! HTTP client for the external narrative generator.
//!
//! The generator is optional and untrusted: every response is validated and
//! clamped before it can reach the simulation.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::events::catalogue::VillageSummary;
use crate::events::{EventCategory, EventDraft};

/// Largest resource change an external event may carry.
pub const MAX_RESOURCE_DELTA: f64 = 500.0;
/// Largest population change an external event may carry.
pub const MAX_POPULATION_DELTA: i32 = 5;
pub const MAX_MESSAGE_CHARS: usize = 280;

#[derive(Debug)]
pub enum NarrativeError {
    Http(String),
    Status(u16),
    Timeout,
    Malformed(String),
}

impl fmt::Display for NarrativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeError::Http(e) => write!(f, "Narrative request failed: {}", e),
            NarrativeError::Status(code) => write!(f, "Narrative service returned status {}", code),
            NarrativeError::Timeout => write!(f, "Narrative request timed out"),
            NarrativeError::Malformed(e) => write!(f, "Malformed narrative response: {}", e),
        }
    }
}

impl std::error::Error for NarrativeError {}

impl From<reqwest::Error> for NarrativeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NarrativeError::Timeout
        } else if e.is_decode() {
            NarrativeError::Malformed(e.to_string())
        } else {
            NarrativeError::Http(e.to_string())
        }
    }
}

/// Wire shape of `/api/generate-event`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventResponse {
    pub message: String,
    #[serde(rename = "type", default)]
    pub category: String,
    #[serde(rename = "deltaFood", default)]
    pub delta_food: f64,
    #[serde(rename = "deltaWood", default)]
    pub delta_wood: f64,
    #[serde(rename = "deltaGold", default)]
    pub delta_gold: f64,
    #[serde(rename = "deltaPop", default)]
    pub delta_pop: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VillageStatus {
    pub is_starving: bool,
    pub population: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BioRequest {
    pub name: String,
    pub age: u32,
    pub job: String,
    pub season: String,
    pub year: u32,
    pub village: VillageStatus,
}

#[derive(Debug, Deserialize)]
struct BioResponse {
    bio: String,
}

/// Final figures sent to `/api/generate-ending`.
#[derive(Debug, Clone, Serialize)]
pub struct EndingRequest {
    pub ending: String,
    pub reason: Option<String>,
    pub population: usize,
    pub average_happiness: f64,
    pub technologies: usize,
    pub buildings: u32,
    pub total_births: u32,
    pub total_deaths: u32,
    pub festivals_held: u32,
    pub invasions_repelled: u32,
    pub raids_survived: u32,
    pub score: f64,
    pub rank: String,
}

#[derive(Debug, Deserialize)]
struct EndingResponse {
    summary: String,
}

/// Validate and clamp an external event into a pool draft.
pub fn sanitize_event(response: EventResponse) -> Result<EventDraft, NarrativeError> {
    let message: String = response.message.trim().chars().take(MAX_MESSAGE_CHARS).collect();
    if message.is_empty() {
        return Err(NarrativeError::Malformed("event message is empty".into()));
    }
    let clamp = |v: f64| {
        if v.is_finite() {
            v.clamp(-MAX_RESOURCE_DELTA, MAX_RESOURCE_DELTA)
        } else {
            0.0
        }
    };
    let pop = response
        .delta_pop
        .clamp(-(MAX_POPULATION_DELTA as i64), MAX_POPULATION_DELTA as i64) as i32;
    Ok(EventDraft::external(
        message,
        EventCategory::parse_lenient(&response.category),
        clamp(response.delta_food),
        clamp(response.delta_wood),
        clamp(response.delta_gold),
        pop,
    ))
}

fn non_empty(text: String, what: &str) -> Result<String, NarrativeError> {
    let text = text.trim().to_string();
    if text.is_empty() {
        Err(NarrativeError::Malformed(format!("{} is empty", what)))
    } else {
        Ok(text)
    }
}

/// Async client for the narrative service.
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    client: Client,
    base_url: String,
}

impl NarrativeClient {
    /// Every request made through this client is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NarrativeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, NarrativeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(NarrativeError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| NarrativeError::Malformed(e.to_string()))
    }

    pub async fn generate_event(&self, summary: &VillageSummary) -> Result<EventDraft, NarrativeError> {
        let response: EventResponse = self.post("/api/generate-event", summary).await?;
        sanitize_event(response)
    }

    pub async fn generate_bio(&self, request: &BioRequest) -> Result<String, NarrativeError> {
        let response: BioResponse = self.post("/api/generate-bio", request).await?;
        non_empty(response.bio, "bio")
    }

    pub async fn generate_ending(&self, request: &EndingRequest) -> Result<String, NarrativeError> {
        let response: EndingResponse = self.post("/api/generate-ending", request).await?;
        non_empty(response.summary, "summary")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rules::Season;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn response(message: &str, category: &str, food: f64, pop: i64) -> EventResponse {
        EventResponse {
            message: message.into(),
            category: category.into(),
            delta_food: food,
            delta_wood: 0.0,
            delta_gold: 0.0,
            delta_pop: pop,
        }
    }

    fn summary() -> VillageSummary {
        VillageSummary {
            season: Season::Summer,
            population: 20,
            average_happiness: 60.0,
            food: 400.0,
        }
    }

    /// Serve one canned HTTP response on a local port and return the base URL.
    pub(crate) async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}", addr)
    }

    /// Hold every response until `connections` requests have arrived, then
    /// answer them all with `body`.
    pub(crate) async fn serve_together(connections: usize, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        tokio::spawn(async move {
            let mut waiting = Vec::with_capacity(connections);
            while waiting.len() < connections {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request_complete(&request) {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                waiting.push(socket);
            }
            for mut socket in waiting {
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });
        format!("http://{}", addr)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + length
    }

    #[test]
    fn sanitize_clamps_deltas() {
        let draft = sanitize_event(response("Dragons!", "danger", -5000.0, -40)).unwrap();
        assert_eq!(draft.delta_food, -500.0);
        assert_eq!(draft.delta_pop, -5);
        assert_eq!(draft.category, EventCategory::Danger);
    }

    #[test]
    fn unknown_category_becomes_info() {
        let draft = sanitize_event(response("Odd lights", "mystic", 0.0, 0)).unwrap();
        assert_eq!(draft.category, EventCategory::Info);
    }

    #[test]
    fn empty_message_is_malformed() {
        let err = sanitize_event(response("   ", "info", 0.0, 0)).unwrap_err();
        assert!(matches!(err, NarrativeError::Malformed(_)));
    }

    #[test]
    fn non_finite_deltas_are_zeroed() {
        let draft = sanitize_event(response("Strange", "info", f64::NAN, 0)).unwrap();
        assert_eq!(draft.delta_food, 0.0);
    }

    #[tokio::test]
    async fn generate_event_parses_wire_format() {
        let body = r#"{"message":"A bard arrives","type":"success","deltaFood":20,"deltaWood":0,"deltaGold":15,"deltaPop":1}"#;
        let url = serve_once("200 OK", body).await;
        let client = NarrativeClient::new(&url, Duration::from_secs(5)).unwrap();
        let draft = client.generate_event(&summary()).await.unwrap();
        assert_eq!(draft.message, "A bard arrives");
        assert_eq!(draft.delta_gold, 15.0);
        assert_eq!(draft.delta_pop, 1);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let client = NarrativeClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.generate_event(&summary()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Status(503)));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let url = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let client = NarrativeClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.generate_event(&summary()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Malformed(_)));
    }

    #[tokio::test]
    async fn bio_response_is_trimmed() {
        let url = serve_once("200 OK", r#"{"bio":"  Tended the orchards.  "}"#).await;
        let client = NarrativeClient::new(&url, Duration::from_secs(5)).unwrap();
        let request = BioRequest {
            name: "Ada·Reed".into(),
            age: 30,
            job: "farmer".into(),
            season: "summer".into(),
            year: 1,
            village: VillageStatus {
                is_starving: false,
                population: 20,
            },
        };
        assert_eq!(client.generate_bio(&request).await.unwrap(), "Tended the orchards.");
    }
}
