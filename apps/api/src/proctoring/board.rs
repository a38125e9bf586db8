//! Per-call warning board in Redis. Each frame replaces the previous warning set; the
//! key expires when frames stop arriving.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::errors::AppError;
use crate::proctoring::detection::newly_raised;

const KEY_PREFIX: &str = "proctoring:warnings:";

pub fn board_key(call_id: &str) -> String {
    format!("{KEY_PREFIX}{call_id}")
}

#[derive(Clone)]
pub struct WarningBoard {
    client: Client,
    ttl_secs: u64,
}

impl WarningBoard {
    pub fn new(client: Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    async fn conn(&self) -> Result<MultiplexedConnection, AppError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Stores the frame's warnings and returns those not present on the previous board.
    pub async fn publish(&self, call_id: &str, warnings: &[String]) -> Result<Vec<String>, AppError> {
        let mut conn = self.conn().await?;
        let serialized =
            serde_json::to_string(warnings).map_err(|e| AppError::Internal(e.into()))?;

        // SET .. GET returns the previous board in the same command
        let previous: Option<String> = redis::cmd("SET")
            .arg(board_key(call_id))
            .arg(serialized)
            .arg("EX")
            .arg(self.ttl_secs)
            .arg("GET")
            .query_async(&mut conn)
            .await?;

        let previous = parse_board(previous.as_deref());
        Ok(newly_raised(&previous, warnings))
    }

    pub async fn current(&self, call_id: &str) -> Result<Vec<String>, AppError> {
        let mut conn = self.conn().await?;
        let stored: Option<String> = conn.get(board_key(call_id)).await?;
        Ok(parse_board(stored.as_deref()))
    }

    pub async fn clear(&self, call_id: &str) -> Result<(), AppError> {
        let mut conn = self.conn().await?;
        let _: () = conn.del(board_key(call_id)).await?;
        Ok(())
    }
}

/// Missing or unreadable boards read as empty.
fn parse_board(stored: Option<&str>) -> Vec<String> {
    stored
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_key() {
        assert_eq!(board_key("call_123"), "proctoring:warnings:call_123");
    }

    #[test]
    fn test_parse_board() {
        assert!(parse_board(None).is_empty());
        assert!(parse_board(Some("not json")).is_empty());
        assert_eq!(
            parse_board(Some(r#"["📱 Cell phone detected"]"#)),
            vec!["📱 Cell phone detected".to_string()]
        );
    }
}
