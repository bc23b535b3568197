use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionMode {
    /// Co-located, face to face.
    #[serde(rename = "F2F")]
    F2f,
    /// Remote.
    #[serde(rename = "ONLINE")]
    Online,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::F2f => "F2F",
            SessionMode::Online => "ONLINE",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "f2f" | "in-person" | "local" => Ok(SessionMode::F2f),
            "online" | "remote" => Ok(SessionMode::Online),
            other => Err(anyhow::anyhow!("unknown session mode '{other}'")),
        }
    }
}

/// Append-only log entry written when a session finishes normally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub partner_id: String,
    pub skill: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub mode: SessionMode,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mode_uses_wire_names() {
        assert_eq!(serde_json::to_string(&SessionMode::F2f).unwrap(), "\"F2F\"");
        assert_eq!(
            serde_json::to_string(&SessionMode::Online).unwrap(),
            "\"ONLINE\""
        );
        assert_eq!("remote".parse::<SessionMode>().unwrap(), SessionMode::Online);
        assert!("carrier-pigeon".parse::<SessionMode>().is_err());
    }

    #[test]
    fn record_timestamp_is_epoch_millis() {
        let record = SessionRecord {
            id: "sess-1".into(),
            partner_id: "s2".into(),
            skill: "C++".into(),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            mode: SessionMode::Online,
            score: 2,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);
        assert_eq!(json["partnerId"], "s2");
        assert_eq!(json["mode"], "ONLINE");
    }
}
