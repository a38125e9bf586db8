//! Live call session.
//!
//! A session is a handful of flags flipped by voice-SDK events the browser forwards,
//! plus a deadline: once `time_duration` minutes have elapsed since the call started the
//! session ends on its own. Ending a session is reported exactly once so the caller can
//! persist `is_ended` on the response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::responses::service::save_response;

/// Ended sessions stay readable for this long before the sweeper drops them.
const ENDED_RETENTION: Duration = Duration::from_secs(600);
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Agent,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Hangup,
    Error,
    TimeLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptTurn {
    pub role: String,
    pub content: String,
}

/// Events forwarded by the browser client. The first six mirror the voice SDK callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    CallStarted,
    CallEnded,
    AgentStartTalking,
    AgentStopTalking,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    Update {
        #[serde(default)]
        transcript: Vec<TranscriptTurn>,
    },
    TabSwitched {
        count: i32,
    },
}

#[derive(Debug, Clone)]
pub struct CallSession {
    pub call_id: String,
    pub interview_id: String,
    time_limit: Duration,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    pub is_started: bool,
    pub is_calling: bool,
    pub is_ended: bool,
    pub active_turn: Option<Turn>,
    pub last_interviewer_response: String,
    pub last_user_response: String,
    pub tab_switch_count: i32,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub call_id: String,
    pub interview_id: String,
    pub is_started: bool,
    pub is_calling: bool,
    pub is_ended: bool,
    pub active_turn: Option<Turn>,
    pub last_interviewer_response: String,
    pub last_user_response: String,
    pub tab_switch_count: i32,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub end_reason: Option<EndReason>,
}

impl CallSession {
    /// A session for a freshly registered call; the clock starts now.
    pub fn started(call_id: String, interview_id: String, minutes: u64, now: Instant) -> Self {
        Self {
            call_id,
            interview_id,
            time_limit: Duration::from_secs(minutes.max(1) * 60),
            started_at: Some(now),
            ended_at: None,
            is_started: true,
            is_calling: true,
            is_ended: false,
            active_turn: None,
            last_interviewer_response: String::new(),
            last_user_response: String::new(),
            tab_switch_count: 0,
            end_reason: None,
        }
    }

    /// Applies one event. Returns `true` when this event ended the session.
    pub fn apply(&mut self, event: SessionEvent, now: Instant) -> bool {
        if self.is_ended {
            return false;
        }

        match event {
            SessionEvent::CallStarted => {
                self.is_calling = true;
                self.is_started = true;
                self.started_at.get_or_insert(now);
            }
            SessionEvent::CallEnded => return self.end(EndReason::Hangup, now),
            SessionEvent::AgentStartTalking => self.active_turn = Some(Turn::Agent),
            SessionEvent::AgentStopTalking => self.active_turn = Some(Turn::User),
            SessionEvent::Error { message } => {
                warn!(
                    "Call {} reported an SDK error: {}",
                    self.call_id,
                    message.as_deref().unwrap_or("unknown")
                );
                return self.end(EndReason::Error, now);
            }
            SessionEvent::Update { transcript } => {
                // Last utterance per role wins.
                for turn in transcript {
                    match turn.role.as_str() {
                        "agent" => self.last_interviewer_response = turn.content,
                        "user" => self.last_user_response = turn.content,
                        _ => {}
                    }
                }
            }
            SessionEvent::TabSwitched { count } => {
                self.tab_switch_count = self.tab_switch_count.max(count);
            }
        }

        self.check_deadline(now)
    }

    /// Ends the session once the elapsed whole seconds reach the time limit.
    pub fn check_deadline(&mut self, now: Instant) -> bool {
        if self.is_ended || !self.is_calling {
            return false;
        }
        if self.elapsed(now).as_secs() >= self.time_limit.as_secs() {
            info!("Call {} reached its time limit", self.call_id);
            return self.end(EndReason::TimeLimit, now);
        }
        false
    }

    fn end(&mut self, reason: EndReason, now: Instant) -> bool {
        self.is_calling = false;
        self.is_ended = true;
        self.ended_at = Some(now);
        self.end_reason = Some(reason);
        true
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let until = self.ended_at.unwrap_or(now);
        self.started_at
            .map(|start| until.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let elapsed = self.elapsed(now);
        SessionSnapshot {
            call_id: self.call_id.clone(),
            interview_id: self.interview_id.clone(),
            is_started: self.is_started,
            is_calling: self.is_calling,
            is_ended: self.is_ended,
            active_turn: self.active_turn,
            last_interviewer_response: self.last_interviewer_response.clone(),
            last_user_response: self.last_user_response.clone(),
            tab_switch_count: self.tab_switch_count,
            elapsed_secs: elapsed.as_secs(),
            remaining_secs: self.time_limit.saturating_sub(elapsed).as_secs(),
            end_reason: self.end_reason,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.ended_at
            .map(|ended| now.saturating_duration_since(ended) >= ENDED_RETENTION)
            .unwrap_or(false)
    }
}

/// Outcome of routing an event to a session.
#[derive(Debug)]
pub struct EventOutcome {
    pub snapshot: SessionSnapshot,
    pub ended_now: bool,
}

/// In-memory registry of live sessions, keyed by call id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, CallSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, session: CallSession) {
        let mut sessions = self.inner.write().await;
        sessions.insert(session.call_id.clone(), session);
    }

    pub async fn apply(&self, call_id: &str, event: SessionEvent) -> Option<EventOutcome> {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(call_id)?;
        let ended_now = session.apply(event, now);
        Some(EventOutcome {
            snapshot: session.snapshot(now),
            ended_now,
        })
    }

    pub async fn snapshot(&self, call_id: &str) -> Option<SessionSnapshot> {
        let sessions = self.inner.read().await;
        sessions.get(call_id).map(|s| s.snapshot(Instant::now()))
    }

    /// Ends overdue sessions and drops long-ended ones.
    /// Returns `(call_id, tab_switch_count)` for every session ended by this sweep.
    pub async fn sweep(&self, now: Instant) -> Vec<(String, i32)> {
        let mut sessions = self.inner.write().await;
        let mut ended = Vec::new();
        for session in sessions.values_mut() {
            if session.check_deadline(now) {
                ended.push((session.call_id.clone(), session.tab_switch_count));
            }
        }
        sessions.retain(|_, s| !s.expired(now));
        ended
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Persists the end of a session on its response row.
pub async fn persist_session_end(pool: &PgPool, call_id: &str, tab_switch_count: i32) {
    if let Err(e) = save_response(pool, call_id, tab_switch_count).await {
        warn!("Failed to mark response for call {call_id} as ended: {e}");
    }
}

/// Background task: once a second, end sessions that ran past their time limit.
pub async fn run_sweeper(sessions: SessionRegistry, pool: PgPool) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        for (call_id, tab_switch_count) in sessions.sweep(Instant::now()).await {
            persist_session_end(&pool, &call_id, tab_switch_count).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(minutes: u64, now: Instant) -> CallSession {
        CallSession::started("call_1".to_string(), "iv_1".to_string(), minutes, now)
    }

    #[test]
    fn test_turn_taking_flags() {
        let now = Instant::now();
        let mut s = session(5, now);
        assert!(!s.apply(SessionEvent::AgentStartTalking, now));
        assert_eq!(s.active_turn, Some(Turn::Agent));
        s.apply(SessionEvent::AgentStopTalking, now);
        assert_eq!(s.active_turn, Some(Turn::User));
    }

    #[test]
    fn test_update_keeps_last_utterance_per_role() {
        let now = Instant::now();
        let mut s = session(5, now);
        let event: SessionEvent = serde_json::from_str(
            r#"{"event":"update","transcript":[
                {"role":"agent","content":"Hi, I'm Lisa."},
                {"role":"user","content":"Hello!"},
                {"role":"agent","content":"Tell me about yourself."}
            ]}"#,
        )
        .unwrap();
        s.apply(event, now);
        assert_eq!(s.last_interviewer_response, "Tell me about yourself.");
        assert_eq!(s.last_user_response, "Hello!");
    }

    #[test]
    fn test_call_ended_reports_once() {
        let now = Instant::now();
        let mut s = session(5, now);
        assert!(s.apply(SessionEvent::CallEnded, now));
        assert!(s.is_ended);
        assert!(!s.is_calling);
        assert!(!s.apply(SessionEvent::CallEnded, now));
        assert_eq!(s.end_reason, Some(EndReason::Hangup));
    }

    #[test]
    fn test_error_ends_session() {
        let now = Instant::now();
        let mut s = session(5, now);
        assert!(s.apply(SessionEvent::Error { message: None }, now));
        assert_eq!(s.end_reason, Some(EndReason::Error));
    }

    #[test]
    fn test_events_after_end_are_ignored() {
        let now = Instant::now();
        let mut s = session(5, now);
        s.apply(SessionEvent::CallEnded, now);
        s.apply(SessionEvent::AgentStartTalking, now);
        assert_eq!(s.active_turn, None);
    }

    #[test]
    fn test_deadline_ends_at_time_limit() {
        let start = Instant::now();
        let mut s = session(1, start);
        assert!(!s.check_deadline(start + Duration::from_millis(59_999)));
        assert!(s.check_deadline(start + Duration::from_secs(60)));
        assert_eq!(s.end_reason, Some(EndReason::TimeLimit));
        let snap = s.snapshot(start + Duration::from_secs(90));
        assert_eq!(snap.elapsed_secs, 60);
        assert_eq!(snap.remaining_secs, 0);
    }

    #[test]
    fn test_tab_switch_count_never_decreases() {
        let now = Instant::now();
        let mut s = session(5, now);
        s.apply(SessionEvent::TabSwitched { count: 3 }, now);
        s.apply(SessionEvent::TabSwitched { count: 2 }, now);
        assert_eq!(s.tab_switch_count, 3);
    }

    #[test]
    fn test_event_wire_format() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"event":"agent_start_talking"}"#).unwrap();
        assert_eq!(event, SessionEvent::AgentStartTalking);
        let event: SessionEvent =
            serde_json::from_str(r#"{"event":"tab_switched","count":4}"#).unwrap();
        assert_eq!(event, SessionEvent::TabSwitched { count: 4 });
    }

    #[tokio::test]
    async fn test_registry_sweep_ends_overdue_and_prunes() {
        let registry = SessionRegistry::new();
        let start = Instant::now();
        registry.open(session(1, start)).await;
        let mut other = session(10, start);
        other.call_id = "call_2".to_string();
        registry.open(other).await;

        let ended = registry.sweep(start + Duration::from_secs(61)).await;
        assert_eq!(ended, vec![("call_1".to_string(), 0)]);
        assert_eq!(registry.len().await, 2);

        // already ended; not reported again, then pruned after retention
        assert!(registry.sweep(start + Duration::from_secs(62)).await.is_empty());
        registry
            .sweep(start + Duration::from_secs(61) + ENDED_RETENTION)
            .await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_registry_apply_unknown_call() {
        let registry = SessionRegistry::new();
        assert!(registry
            .apply("missing", SessionEvent::CallStarted)
            .await
            .is_none());
    }
}
