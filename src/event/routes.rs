//! Handler bodies for the plugin's external event API
//!
//! Each handler resolves the inbound payload against the component it was
//! bound to. Entities the payload refers to but that no longer exist turn the
//! event into a no-op.

use serde_json::Value;
use tracing::debug;

use super::{dispatcher::RECEIVE_TAG, events::CustomEvent, handler::HandlerError};
use crate::{
    annotation::{AnnotationData, AnnotationState},
    controls::Controls,
};

pub fn open_annotation(event: &CustomEvent, state: &AnnotationState) -> Result<(), HandlerError> {
    log_receive(event);
    let id = detail_id(event)?;
    if !state.open_annotation(id) {
        debug!(annotation_id = id, "openAnnotation for unknown annotation ignored");
    }
    Ok(())
}

pub fn close_active_annotation(
    event: &CustomEvent,
    state: &AnnotationState,
) -> Result<(), HandlerError> {
    log_receive(event);
    state.clear_active();
    Ok(())
}

pub fn new_annotation(event: &CustomEvent, state: &AnnotationState) -> Result<(), HandlerError> {
    log_receive(event);
    let data: AnnotationData = serde_json::from_value(event.detail.clone())
        .map_err(|e| HandlerError::malformed(event, e.to_string()))?;

    let plugin = state.plugin().ok_or(HandlerError::PluginUnavailable)?;
    let controls = plugin.controls();
    if controls.is_adding() {
        controls.cancel_add_new();
    }

    state.create_and_add_annotation(data);
    Ok(())
}

pub fn destroy_annotation(event: &CustomEvent, state: &AnnotationState) -> Result<(), HandlerError> {
    log_receive(event);
    let id = detail_id(event)?;
    if !state.destroy_annotation(id) {
        debug!(annotation_id = id, "destroyAnnotation for unknown annotation ignored");
    }
    Ok(())
}

pub fn adding_annotation(event: &CustomEvent, controls: &Controls) -> Result<(), HandlerError> {
    log_receive(event);
    let plugin = controls.plugin().ok_or(HandlerError::PluginUnavailable)?;
    if !plugin.is_active() {
        plugin.toggle_annotations();
    }
    controls.start_add_new();
    Ok(())
}

pub fn cancel_adding_annotation(
    event: &CustomEvent,
    controls: &Controls,
) -> Result<(), HandlerError> {
    log_receive(event);
    controls.cancel_add_new();
    Ok(())
}

fn log_receive(event: &CustomEvent) {
    debug!(
        tag = RECEIVE_TAG,
        event_type = %event.event_type,
        detail = %event.detail,
        "Received event"
    );
}

/// The `detail.id` of an event, coerced to an integer
fn detail_id(event: &CustomEvent) -> Result<i64, HandlerError> {
    let raw = event
        .detail
        .get("id")
        .ok_or_else(|| HandlerError::malformed(event, "missing id"))?;
    coerce_id(raw)
        .ok_or_else(|| HandlerError::malformed(event, format!("id {raw} is not an integer")))
}

/// Integer value of an id given as a number or a numeric string
///
/// Floats truncate toward zero; strings use their leading integer, so
/// `"12abc"` is 12, `"0x1A"` is 26 and `"abc"` is rejected.
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(7), Some(7))]
    #[case(json!(-3), Some(-3))]
    #[case(json!(4.9), Some(4))]
    #[case(json!("12"), Some(12))]
    #[case(json!("  42"), Some(42))]
    #[case(json!("12abc"), Some(12))]
    #[case(json!("+5"), Some(5))]
    #[case(json!("-8px"), Some(-8))]
    #[case(json!("0x1A"), Some(26))]
    #[case(json!("-0Xff!"), Some(-255))]
    #[case(json!("0x"), None)]
    #[case(json!("abc"), None)]
    #[case(json!(""), None)]
    #[case(json!(null), None)]
    #[case(json!(true), None)]
    #[case(json!({ "id": 1 }), None)]
    fn test_coerce_id(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(coerce_id(&value), expected);
    }

    #[test]
    fn missing_id_is_malformed() {
        let event = CustomEvent::new("openAnnotation", json!({ "name": "x" }));

        let result = detail_id(&event);

        assert_eq!(
            result,
            Err(HandlerError::MalformedPayload {
                event: "openAnnotation".to_string(),
                reason: "missing id".to_string()
            })
        );
    }

    #[test]
    fn null_detail_is_malformed() {
        let event = CustomEvent::bare("destroyAnnotation");

        assert!(matches!(
            detail_id(&event),
            Err(HandlerError::MalformedPayload { .. })
        ));
    }
}
