use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::calls::session::SessionRegistry;
use crate::config::Config;
use crate::email::InvitationSender;
use crate::llm_client::LlmClient;
use crate::voice_client::VoiceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Backs the per-call proctoring boards.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub voice: VoiceClient,
    /// Invitation delivery. Default: SMTP/file `EmailService`.
    pub mailer: Arc<dyn InvitationSender>,
    /// Live call sessions, keyed by call id.
    pub sessions: SessionRegistry,
    pub config: Config,
}
