use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{TOPIC_BUMP_SCORE, TOPIC_PLAYER_MOVE, TOPIC_REMOVE_COIN, TOPIC_UPDATE_COINS};

/// The four message kinds of the session, decoded once at the transport
/// boundary so the rest of the protocol matches exhaustively instead of
/// comparing topic strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Full position batch, one entry per alive coin in id order. An entry
    /// is `None` when that slot was malformed on the wire; the slot is
    /// skipped on apply without shifting alignment.
    UpdateCoins { updates: Vec<Option<(f32, f32)>> },
    PlayerMove { x: f32, y: f32 },
    RemoveCoin { coin: u32 },
    BumpScore { bump: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("unknown topic {0:?}")]
    UnknownTopic(String),
    #[error("bad {topic} payload: {source}")]
    BadPayload {
        topic: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize)]
struct UpdateCoinsPayload {
    updates: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
struct PlayerMovePayload {
    p1_x: f32,
    p1_y: f32,
}

#[derive(Serialize, Deserialize)]
struct RemoveCoinPayload {
    coin: u32,
}

#[derive(Serialize, Deserialize)]
struct BumpScorePayload {
    bump: u64,
}

impl Message {
    pub fn topic(&self) -> &'static str {
        match self {
            Message::UpdateCoins { .. } => TOPIC_UPDATE_COINS,
            Message::PlayerMove { .. } => TOPIC_PLAYER_MOVE,
            Message::RemoveCoin { .. } => TOPIC_REMOVE_COIN,
            Message::BumpScore { .. } => TOPIC_BUMP_SCORE,
        }
    }

    pub fn to_payload(&self) -> Value {
        match self {
            Message::UpdateCoins { updates } => {
                let entries: Vec<Value> = updates
                    .iter()
                    .map(|entry| match entry {
                        Some((x, y)) => json!([x, y]),
                        None => Value::Null,
                    })
                    .collect();
                json!({ "updates": entries })
            }
            Message::PlayerMove { x, y } => json!({ "p1_x": x, "p1_y": y }),
            Message::RemoveCoin { coin } => json!({ "coin": coin }),
            Message::BumpScore { bump } => json!({ "bump": bump }),
        }
    }

    /// Decode one inbound payload. Unknown topics and unusable payloads are
    /// errors for the caller to log and drop; a malformed entry inside an
    /// `update_coins` batch only voids that entry.
    pub fn decode(topic: &str, payload: &Value) -> Result<Self, WireError> {
        match topic {
            TOPIC_UPDATE_COINS => {
                let batch: UpdateCoinsPayload =
                    from_payload(TOPIC_UPDATE_COINS, payload.clone())?;
                let updates = batch.updates.iter().map(coord_pair).collect();
                Ok(Message::UpdateCoins { updates })
            }
            TOPIC_PLAYER_MOVE => {
                let p: PlayerMovePayload = from_payload(TOPIC_PLAYER_MOVE, payload.clone())?;
                Ok(Message::PlayerMove { x: p.p1_x, y: p.p1_y })
            }
            TOPIC_REMOVE_COIN => {
                let p: RemoveCoinPayload = from_payload(TOPIC_REMOVE_COIN, payload.clone())?;
                Ok(Message::RemoveCoin { coin: p.coin })
            }
            TOPIC_BUMP_SCORE => {
                let p: BumpScorePayload = from_payload(TOPIC_BUMP_SCORE, payload.clone())?;
                Ok(Message::BumpScore { bump: p.bump })
            }
            other => Err(WireError::UnknownTopic(other.to_string())),
        }
    }
}

fn from_payload<T: serde::de::DeserializeOwned>(
    topic: &'static str,
    payload: Value,
) -> Result<T, WireError> {
    serde_json::from_value(payload).map_err(|source| WireError::BadPayload { topic, source })
}

fn coord_pair(value: &Value) -> Option<(f32, f32)> {
    let entry = value.as_array()?;
    let x = entry.first()?.as_f64()?;
    let y = entry.get(1)?.as_f64()?;
    Some((x as f32, y as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_coins_roundtrip() {
        let message = Message::UpdateCoins {
            updates: vec![Some((1.5, 2.5)), Some((3.0, 4.0))],
        };

        let decoded = Message::decode(message.topic(), &message.to_payload()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn malformed_batch_entry_becomes_none() {
        let payload = json!({ "updates": [[1.0, 2.0], "garbage", [3.0], [5.0, 6.0]] });

        let decoded = Message::decode(TOPIC_UPDATE_COINS, &payload).unwrap();
        assert_eq!(
            decoded,
            Message::UpdateCoins {
                updates: vec![Some((1.0, 2.0)), None, None, Some((5.0, 6.0))],
            }
        );
    }

    #[test]
    fn batch_without_updates_field_is_rejected() {
        let payload = json!({ "coins": [] });

        let err = Message::decode(TOPIC_UPDATE_COINS, &payload).unwrap_err();
        assert!(matches!(err, WireError::BadPayload { topic, .. } if topic == TOPIC_UPDATE_COINS));
    }

    #[test]
    fn player_move_decodes() {
        let payload = json!({ "p1_x": 120.0, "p1_y": 48.5 });

        let decoded = Message::decode(TOPIC_PLAYER_MOVE, &payload).unwrap();
        assert_eq!(decoded, Message::PlayerMove { x: 120.0, y: 48.5 });
    }

    #[test]
    fn remove_and_bump_decode() {
        let remove = Message::decode(TOPIC_REMOVE_COIN, &json!({ "coin": 12 })).unwrap();
        assert_eq!(remove, Message::RemoveCoin { coin: 12 });

        let bump = Message::decode(TOPIC_BUMP_SCORE, &json!({ "bump": 1 })).unwrap();
        assert_eq!(bump, Message::BumpScore { bump: 1 });
    }

    #[test]
    fn wrongly_typed_single_field_is_rejected() {
        let err = Message::decode(TOPIC_REMOVE_COIN, &json!({ "coin": "three" })).unwrap_err();
        assert!(matches!(err, WireError::BadPayload { .. }));
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let err = Message::decode("set_difficulty", &json!({})).unwrap_err();
        assert!(matches!(err, WireError::UnknownTopic(t) if t == "set_difficulty"));
    }
}
