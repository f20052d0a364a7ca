//! Account topics and the websocket pub/sub message format.
//!
//! Frames are JSON text:
//!
//! ```text
//! {"type":"subscribe","topic":"/accounts/22214/trades"}
//! {"type":"unsubscribe","topic":"/accounts/22214/trades"}
//! {"type":"publish","topic":"/accounts/22214/trades","payload":{...}}
//! ```

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    Trades,
    Positions,
}

impl TopicKind {
    fn segment(&self) -> &'static str {
        match self {
            TopicKind::Trades => "trades",
            TopicKind::Positions => "positions",
        }
    }
}

/// `/accounts/{id}/trades` or `/accounts/{id}/positions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(account_id: i64, kind: TopicKind) -> Self {
        Self(format!("/accounts/{}/{}", account_id, kind.segment()))
    }

    pub fn trades(account_id: i64) -> Self {
        Self::new(account_id, TopicKind::Trades)
    }

    pub fn positions(account_id: i64) -> Self {
        Self::new(account_id, TopicKind::Positions)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Account and kind, if the topic is well formed.
    pub fn parse_parts(&self) -> Result<(i64, TopicKind)> {
        let malformed = || ModelError::MalformedTopic(self.0.clone());
        let mut parts = self.0.trim_start_matches('/').split('/');

        if parts.next() != Some("accounts") {
            return Err(malformed());
        }
        let account = parts
            .next()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let kind = match parts.next() {
            Some("trades") => TopicKind::Trades,
            Some("positions") => TopicKind::Positions,
            _ => return Err(malformed()),
        };
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok((account, kind))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Topic {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let topic = Topic(s.to_string());
        topic.parse_parts()?;
        Ok(topic)
    }
}

/// One websocket frame of the pub/sub channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PubSubMessage {
    Subscribe { topic: Topic },
    Unsubscribe { topic: Topic },
    Publish { topic: Topic, payload: Value },
}

impl PubSubMessage {
    pub fn topic(&self) -> &Topic {
        match self {
            PubSubMessage::Subscribe { topic }
            | PubSubMessage::Unsubscribe { topic }
            | PubSubMessage::Publish { topic, .. } => topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_format_and_parse() {
        let topic = Topic::trades(22214);
        assert_eq!(topic.as_str(), "/accounts/22214/trades");
        assert_eq!(topic.parse_parts().unwrap(), (22214, TopicKind::Trades));

        let parsed: Topic = "/accounts/7/positions".parse().unwrap();
        assert_eq!(parsed, Topic::positions(7));
    }

    #[test]
    fn test_malformed_topics() {
        for bad in ["/accounts/x/trades", "/users/1/trades", "/accounts/1/orders", "/accounts/1/trades/extra"] {
            assert!(bad.parse::<Topic>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_message_wire_format() {
        let msg = PubSubMessage::Publish {
            topic: Topic::trades(1),
            payload: json!({"id": "T-1"}),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "publish", "topic": "/accounts/1/trades", "payload": {"id": "T-1"}})
        );

        let sub: PubSubMessage =
            serde_json::from_str(r#"{"type":"subscribe","topic":"/accounts/1/positions"}"#).unwrap();
        assert_eq!(sub.topic(), &Topic::positions(1));
    }
}
