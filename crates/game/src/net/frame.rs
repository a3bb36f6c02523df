use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the broker protocol. Peers send a `Subscribe` once after
/// connecting, then `Publish` frames; the broker fans each `Publish` out to
/// every connection subscribed to its topic, the publisher included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusFrame {
    Subscribe { topics: Vec<String> },
    Publish { topic: String, payload: Value },
}

impl BusFrame {
    pub fn publish(topic: impl Into<String>, payload: Value) -> Self {
        BusFrame::Publish {
            topic: topic.into(),
            payload,
        }
    }

    pub fn encode_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn decode_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_roundtrip() {
        let frame = BusFrame::Subscribe {
            topics: vec!["update_coins".into(), "p1_move".into()],
        };

        let line = frame.encode_line().unwrap();
        assert!(line.ends_with('\n'));

        match BusFrame::decode_line(&line).unwrap() {
            BusFrame::Subscribe { topics } => assert_eq!(topics.len(), 2),
            other => panic!("expected Subscribe, got {other:?}"),
        }
    }

    #[test]
    fn publish_roundtrip() {
        let frame = BusFrame::publish("bump_score", json!({ "bump": 1 }));

        let line = frame.encode_line().unwrap();
        match BusFrame::decode_line(&line).unwrap() {
            BusFrame::Publish { topic, payload } => {
                assert_eq!(topic, "bump_score");
                assert_eq!(payload, json!({ "bump": 1 }));
            }
            other => panic!("expected Publish, got {other:?}"),
        }
    }

    #[test]
    fn garbage_line_is_rejected() {
        assert!(BusFrame::decode_line("not json").is_err());
        assert!(BusFrame::decode_line(r#"{"type":"dance"}"#).is_err());
    }
}
