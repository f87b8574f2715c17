use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::translate::{ControllerHandle, ControllerView, TargetLanguage};

#[derive(Serialize)]
struct StateMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    #[serde(flatten)]
    view: &'a ControllerView,
}

/// Serialize a controller snapshot for the client
pub fn state_message(view: &ControllerView) -> serde_json::Result<String> {
    serde_json::to_string(&StateMessage {
        message_type: "translation-state",
        view,
    })
}

pub fn error_message(message: &str) -> String {
    json!({
        "type": "error",
        "message": message
    })
    .to_string()
}

/// Forward one client message to the view's controller.
pub fn handle_message(controller: &ControllerHandle, text: &str) -> anyhow::Result<()> {
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg.get("type").and_then(|v| v.as_str());

    match msg_type {
        Some("input-change") => {
            let input = msg
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("input-change requires a text field"))?;
            controller.set_input(input);
        }
        Some("target-change") => {
            let target = msg
                .get("target")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("target-change requires a target field"))?;
            let target: TargetLanguage = target.parse()?;
            controller.set_target(target);
        }
        Some("translate-now") => {
            debug!("Manual translate requested");
            controller.translate_now();
        }
        Some("clear") => {
            controller.clear();
        }
        _ => {
            warn!("Unknown message type: {:?}", msg_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{
        ControllerSettings, TranslateError, TranslationController, TranslationRequest, TranslationService,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl TranslationService for Echo {
        async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
            Ok(format!("[{}] {}", request.target_language.code(), request.text))
        }
    }

    fn controller() -> ControllerHandle {
        TranslationController::spawn(Arc::new(Echo), ControllerSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_drive_controller() {
        let handle = controller();

        handle_message(&handle, r#"{"type": "input-change", "text": "Good night"}"#).unwrap();
        handle_message(&handle, r#"{"type": "target-change", "target": "de"}"#).unwrap();
        handle_message(&handle, r#"{"type": "translate-now"}"#).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let view = handle.view();
        assert_eq!(view.result, "[de] Good night");
        assert_eq!(view.target, TargetLanguage::De);

        handle_message(&handle, r#"{"type": "clear"}"#).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let view = handle.view();
        assert_eq!(view.input, "");
        assert_eq!(view.state, "idle");
    }

    #[tokio::test]
    async fn test_bad_messages_are_rejected() {
        let handle = controller();

        assert!(handle_message(&handle, "not json").is_err());
        assert!(handle_message(&handle, r#"{"type": "input-change"}"#).is_err());
        let err = handle_message(&handle, r#"{"type": "target-change", "target": "pt"}"#).unwrap_err();
        assert!(err.to_string().contains("pt"));

        // Unknown types are ignored
        assert!(handle_message(&handle, r#"{"type": "mic-audio-data"}"#).is_ok());
    }

    #[test]
    fn test_state_message_shape() {
        let view = ControllerView {
            input: "Hello".to_string(),
            target: TargetLanguage::Hi,
            state: "resolved",
            result: "नमस्ते".to_string(),
            loading: false,
            error: None,
        };
        let value: Value = serde_json::from_str(&state_message(&view).unwrap()).unwrap();

        assert_eq!(value["type"], "translation-state");
        assert_eq!(value["target"], "hi");
        assert_eq!(value["result"], "नमस्ते");
        assert_eq!(value["loading"], false);
        assert!(value["error"].is_null());

        let value: Value = serde_json::from_str(&error_message("boom")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "boom");
    }
}
