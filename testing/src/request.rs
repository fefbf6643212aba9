//! Parsing incoming command frames.

use kvgate_store::resp::Frame;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Get { key: String },
    Set { key: String, value: String },
    Del { key: String },
    Keys { pattern: String },
    FlushAll,
    LPush { key: String, values: Vec<String> },
    LRange { key: String, start: i64, stop: i64 },
    Multi,
    Exec,
    Subscribe { channels: Vec<String> },
    Publish { channel: String, payload: String },
}

impl Request {
    /// Decode a request frame (an array of bulk strings). The returned error
    /// string is sent back verbatim as an error frame.
    pub fn from_frame(frame: Frame) -> Result<Self, String> {
        let Frame::Array(Some(items)) = frame else {
            return Err("ERR protocol error: expected array of bulk strings".to_string());
        };
        let mut args = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Frame::Bulk(Some(text)) => args.push(text),
                other => {
                    return Err(format!("ERR protocol error: unexpected argument {other:?}"))
                }
            }
        }
        let Some((name, rest)) = args.split_first() else {
            return Err("ERR empty command".to_string());
        };

        match (name.to_ascii_uppercase().as_str(), rest) {
            ("PING", []) => Ok(Request::Ping),
            ("GET", [key]) => Ok(Request::Get { key: key.clone() }),
            ("SET", [key, value]) => Ok(Request::Set {
                key: key.clone(),
                value: value.clone(),
            }),
            ("DEL", [key]) => Ok(Request::Del { key: key.clone() }),
            ("KEYS", [pattern]) => Ok(Request::Keys {
                pattern: pattern.clone(),
            }),
            ("FLUSHALL", []) => Ok(Request::FlushAll),
            ("LPUSH", [key, values @ ..]) if !values.is_empty() => Ok(Request::LPush {
                key: key.clone(),
                values: values.to_vec(),
            }),
            ("LRANGE", [key, start, stop]) => Ok(Request::LRange {
                key: key.clone(),
                start: parse_index(start)?,
                stop: parse_index(stop)?,
            }),
            ("MULTI", []) => Ok(Request::Multi),
            ("EXEC", []) => Ok(Request::Exec),
            ("SUBSCRIBE", channels @ [_, ..]) => Ok(Request::Subscribe {
                channels: channels.to_vec(),
            }),
            ("PUBLISH", [channel, payload]) => Ok(Request::Publish {
                channel: channel.clone(),
                payload: payload.clone(),
            }),
            (name, _) => Err(format!(
                "ERR unknown command '{name}', or wrong number of arguments"
            )),
        }
    }

    /// Key written by this request, if it is a write.
    pub fn write_key(&self) -> Option<&str> {
        match self {
            Request::Set { key, .. } | Request::LPush { key, .. } => Some(key),
            _ => None,
        }
    }
}

fn parse_index(text: &str) -> Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| "ERR value is not an integer or out of range".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(args: &[&str]) -> Frame {
        Frame::Array(Some(
            args.iter()
                .map(|arg| Frame::Bulk(Some(arg.to_string())))
                .collect(),
        ))
    }

    #[test]
    fn parses_set_case_insensitively() {
        let request = Request::from_frame(frame_of(&["set", "foo", "42"])).expect("valid SET");
        assert_eq!(
            request,
            Request::Set {
                key: "foo".into(),
                value: "42".into()
            }
        );
    }

    #[test]
    fn parses_multi_value_lpush() {
        let request =
            Request::from_frame(frame_of(&["LPUSH", "letters", "a", "b"])).expect("valid LPUSH");
        assert_eq!(
            request,
            Request::LPush {
                key: "letters".into(),
                values: vec!["a".into(), "b".into()]
            }
        );
    }

    #[test]
    fn rejects_lpush_without_values() {
        assert!(Request::from_frame(frame_of(&["LPUSH", "letters"])).is_err());
    }

    #[test]
    fn rejects_unknown_commands() {
        let err = Request::from_frame(frame_of(&["WAIT", "1"])).expect_err("unknown command");
        assert!(err.starts_with("ERR"));
    }

    #[test]
    fn rejects_non_array_frames() {
        assert!(Request::from_frame(Frame::Simple("PING".into())).is_err());
    }
}
