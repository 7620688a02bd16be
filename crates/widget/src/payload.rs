use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    vocalis_channels::{Error, Result},
    vocalis_common::ChatMessage,
};

/// Key and value the widget UI uses to tell bot bubbles from user bubbles.
pub const ROLE_MARKER: (&str, &str) = ("who", "bot");

/// Body of a widget `/answer` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_session_id: Option<String>,
}

impl AnswerRequest {
    pub fn decode(payload: Value) -> Result<Self> {
        serde_json::from_value(payload)
            .map_err(|e| Error::invalid_input(format!("invalid widget request: {e}")))
    }

    /// Convert to a user message. A request without a session starts a new
    /// one.
    pub fn into_message(self) -> ChatMessage {
        let conversation_id = self
            .chat_session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        ChatMessage::user(conversation_id, self.question)
    }

    /// Inverse of [`into_message`](Self::into_message).
    pub fn from_message(msg: &ChatMessage) -> Self {
        Self {
            question: msg.text.clone(),
            chat_session_id: Some(msg.conversation_id.clone()),
        }
    }
}

/// Encode a dispatch result as the widget response: the reply's fields plus
/// the role marker, or `{}` when nothing answered.
pub fn reply_payload(reply: Option<&ChatMessage>) -> Result<Value> {
    let Some(reply) = reply else {
        return Ok(Value::Object(Map::new()));
    };
    let mut value = serde_json::to_value(reply)?;
    let Some(obj) = value.as_object_mut() else {
        return Err(Error::invalid_input("chat message did not encode as an object"));
    };
    obj.insert(ROLE_MARKER.0.into(), ROLE_MARKER.1.into());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[test]
    fn request_with_session_keeps_it() {
        let msg = AnswerRequest::decode(json!({
            "question": "draw a cat",
            "chat_session_id": "session-42"
        }))
        .unwrap()
        .into_message();
        assert_eq!(msg.conversation_id, "session-42");
        assert_eq!(msg.text, "draw a cat");
    }

    #[rstest]
    #[case(json!({ "question": "hello" }))]
    #[case(json!({ "question": "hello", "chat_session_id": null }))]
    #[case(json!({ "question": "hello", "chat_session_id": "  " }))]
    fn request_without_session_gets_a_fresh_one(#[case] payload: Value) {
        let a = AnswerRequest::decode(payload.clone()).unwrap().into_message();
        let b = AnswerRequest::decode(payload).unwrap().into_message();
        assert!(uuid::Uuid::parse_str(&a.conversation_id).is_ok());
        assert_ne!(a.conversation_id, b.conversation_id);
    }

    #[test]
    fn missing_question_is_invalid_input() {
        let err = AnswerRequest::decode(json!({ "chat_session_id": "s" })).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn round_trip_preserves_conversation_and_text() {
        let original = ChatMessage::user("session-9", "say «bonjour» 👋");
        let payload = serde_json::to_value(AnswerRequest::from_message(&original)).unwrap();
        let decoded = AnswerRequest::decode(payload).unwrap().into_message();
        assert_eq!(decoded.conversation_id, original.conversation_id);
        assert_eq!(decoded.text, original.text);
    }

    #[test]
    fn reply_carries_role_marker() {
        let input = ChatMessage::user("session-42", "draw a cat");
        let reply = ChatMessage::reply_to(&input, "a cat picture");
        let payload = reply_payload(Some(&reply)).unwrap();
        assert_eq!(payload["text"], "a cat picture");
        assert_eq!(payload["who"], "bot");
        assert_eq!(payload["conversation_id"], "session-42");
    }

    #[test]
    fn no_reply_is_empty_object() {
        assert_eq!(reply_payload(None).unwrap(), json!({}));
    }
}
