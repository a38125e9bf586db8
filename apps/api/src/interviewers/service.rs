use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::interviewers::prompts::AGENT_GENERAL_PROMPT;
use crate::models::interviewer::InterviewerRow;
use crate::voice_client::VoiceClient;

pub const SLIDER_MAX: i32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct NewInterviewer {
    pub name: String,
    pub description: String,
    pub image: String,
    pub audio: Option<String>,
    /// Provider voice, e.g. `11labs-Chloe`.
    pub voice_id: String,
    pub empathy: i32,
    pub exploration: i32,
    pub rapport: i32,
    pub speed: i32,
}

/// Stock personas offered to every organization.
pub fn preset_interviewers() -> [NewInterviewer; 2] {
    [
        NewInterviewer {
            name: "Explorer Lisa".to_string(),
            description: "Hi! I'm Lisa, an enthusiastic and empathetic interviewer who loves to \
                explore. With a perfect balance of empathy and rapport, I delve deep into \
                conversations while maintaining a steady pace. Let's embark on this journey \
                together and uncover meaningful insights!"
                .to_string(),
            image: "/interviewers/Lisa.png".to_string(),
            audio: Some("Lisa.wav".to_string()),
            voice_id: "11labs-Chloe".to_string(),
            empathy: 7,
            exploration: 10,
            rapport: 7,
            speed: 5,
        },
        NewInterviewer {
            name: "Empathetic Bob".to_string(),
            description: "Hi! I'm Bob, your go-to empathetic interviewer. I excel at \
                understanding and connecting with people on a deeper level, ensuring every \
                conversation is insightful and meaningful. With a focus on empathy, I'm here \
                to listen and learn from you. Let's create a genuine connection!"
                .to_string(),
            image: "/interviewers/Bob.png".to_string(),
            audio: Some("Bob.wav".to_string()),
            voice_id: "11labs-Brian".to_string(),
            empathy: 10,
            exploration: 7,
            rapport: 7,
            speed: 5,
        },
    ]
}

pub fn validate_new_interviewer(data: &NewInterviewer) -> Result<(), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if data.voice_id.trim().is_empty() {
        return Err(AppError::Validation("voice_id cannot be empty".to_string()));
    }
    for (field, value) in [
        ("empathy", data.empathy),
        ("exploration", data.exploration),
        ("rapport", data.rapport),
        ("speed", data.speed),
    ] {
        if !(0..=SLIDER_MAX).contains(&value) {
            return Err(AppError::Validation(format!(
                "{field} must be between 0 and {SLIDER_MAX}"
            )));
        }
    }
    Ok(())
}

pub async fn list_interviewers(pool: &PgPool) -> Result<Vec<InterviewerRow>, AppError> {
    Ok(
        sqlx::query_as::<_, InterviewerRow>("SELECT * FROM interviewer ORDER BY id")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_interviewer(pool: &PgPool, id: i64) -> Result<InterviewerRow, AppError> {
    sqlx::query_as::<_, InterviewerRow>("SELECT * FROM interviewer WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interviewer {id} not found")))
}

/// Registers a voice agent for the persona, then stores it.
pub async fn create_interviewer(
    pool: &PgPool,
    voice: &VoiceClient,
    data: &NewInterviewer,
) -> Result<InterviewerRow, AppError> {
    validate_new_interviewer(data)?;

    let agent_id = voice
        .create_agent(data.name.trim(), &data.voice_id, AGENT_GENERAL_PROMPT, None)
        .await
        .map_err(|e| AppError::Voice(format!("Failed to create agent for {}: {e}", data.name)))?;

    let row = sqlx::query_as::<_, InterviewerRow>(
        r#"
        INSERT INTO interviewer
            (agent_id, name, description, image, audio, empathy, exploration, rapport, speed)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&agent_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(&data.image)
    .bind(&data.audio)
    .bind(data.empathy)
    .bind(data.exploration)
    .bind(data.rapport)
    .bind(data.speed)
    .fetch_one(pool)
    .await?;

    info!("Created interviewer {} ({}) with agent {agent_id}", row.id, row.name);
    Ok(row)
}

pub async fn create_preset_interviewers(
    pool: &PgPool,
    voice: &VoiceClient,
) -> Result<Vec<InterviewerRow>, AppError> {
    let mut created = Vec::with_capacity(2);
    for preset in preset_interviewers() {
        created.push(create_interviewer(pool, voice, &preset).await?);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in preset_interviewers() {
            assert!(validate_new_interviewer(&preset).is_ok(), "{}", preset.name);
        }
    }

    #[test]
    fn test_preset_personas() {
        let [lisa, bob] = preset_interviewers();
        assert_eq!((lisa.rapport, lisa.exploration, lisa.empathy, lisa.speed), (7, 10, 7, 5));
        assert_eq!(lisa.voice_id, "11labs-Chloe");
        assert_eq!((bob.rapport, bob.exploration, bob.empathy, bob.speed), (7, 7, 10, 5));
        assert_eq!(bob.voice_id, "11labs-Brian");
    }

    #[test]
    fn test_slider_out_of_range() {
        let [mut lisa, _] = preset_interviewers();
        lisa.speed = 11;
        let err = validate_new_interviewer(&lisa).unwrap_err();
        assert!(err.to_string().contains("speed"));

        lisa.speed = -1;
        assert!(validate_new_interviewer(&lisa).is_err());
    }

    #[test]
    fn test_agent_prompt_placeholders() {
        for key in ["{{mins}}", "{{name}}", "{{objective}}", "{{questions}}"] {
            assert!(AGENT_GENERAL_PROMPT.contains(key), "{key}");
        }
    }
}
