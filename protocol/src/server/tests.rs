#[cfg(test)]
mod tests {
    use crate::{ContentKind, ServerEvent, decode_server_event};

    #[test]
    fn test_decode_new_message_text() {
        let frame = r#"{"event":"new_message","data":{"username":"brock","message":"<b>not markup</b>","type":"text","timestamp":"2026-08-30T10:30:00Z"}}"#;
        let event = decode_server_event(frame).unwrap();

        match event {
            ServerEvent::NewMessage(payload) => {
                assert_eq!(payload.username, "brock");
                // The body must survive verbatim, markup-looking or not.
                assert_eq!(payload.message, "<b>not markup</b>");
                assert_eq!(payload.kind, ContentKind::Text);
                assert_eq!(payload.timestamp.as_deref(), Some("2026-08-30T10:30:00Z"));
            }
            other => panic!("expected NewMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_new_message_image() {
        let frame = r#"{"event":"new_message","data":{"username":"misty","message":"data:image/png;base64,AAAA","type":"image","timestamp":"2026-08-30T10:31:00Z"}}"#;
        let event = decode_server_event(frame).unwrap();

        match event {
            ServerEvent::NewMessage(payload) => {
                assert!(payload.kind.is_image());
                assert_eq!(payload.message, "data:image/png;base64,AAAA");
            }
            other => panic!("expected NewMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_load_messages_preserves_order() {
        let frame = r#"{"event":"load_messages","data":[
            {"username":"a","message":"first","type":"text","timestamp":"2026-08-30T09:00:00Z"},
            {"username":"b","message":"second","type":"text","timestamp":"2026-08-30T09:01:00Z"},
            {"username":"a","message":"third","type":"text","timestamp":"2026-08-30T09:02:00Z"}
        ]}"#;
        let event = decode_server_event(frame).unwrap();

        match event {
            ServerEvent::LoadMessages(payloads) => {
                let bodies: Vec<&str> = payloads.iter().map(|p| p.message.as_str()).collect();
                assert_eq!(bodies, vec!["first", "second", "third"]);
            }
            other => panic!("expected LoadMessages, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_system_message() {
        let frame = r#"{"event":"system_message","data":"oak left the chat."}"#;
        let event = decode_server_event(frame).unwrap();

        assert_eq!(
            event,
            ServerEvent::SystemMessage("oak left the chat.".to_string())
        );
    }

    #[test]
    fn test_decode_unknown_event() {
        let frame = r#"{"event":"webrtc_offer","data":{}}"#;
        let result = decode_server_event(frame);

        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_event_field() {
        let frame = r#"{"data":"orphaned"}"#;
        let result = decode_server_event(frame);

        assert!(result.is_err());
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = decode_server_event("not json at all");

        assert!(result.is_err());
    }
}
