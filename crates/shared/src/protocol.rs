use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{domain::ModelRef, error::ProtocolError};

/// Number of auxiliary ("neighbor") frames attached to a viewer slot.
pub const NEIGHBOR_IMAGE_COUNT: usize = 3;

/// Opaque image payload as the backend delivers it (base64 text).
/// Never decoded client-side; an empty string is the placeholder value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData(pub String);

impl ImageData {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ImageData {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Outbound client → backend commands.
///
/// `set_user_name` (dual view) identifies with the bare user name;
/// `set_user_data` (single view) carries the user name plus the model
/// ids the session will drive. The asymmetry is part of the backend
/// contract, not a client choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientCommand {
    SetUserName(String),
    SetUserData(UserData),
    GetInitImage(ModelRef),
    ResetPose(ModelRef),
    KeyControl { key: String, step: u8 },
}

/// Single-view identify payload. Field names are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "modelIds")]
    pub model_ids: Vec<ModelRef>,
}

/// Inbound backend → client events.
///
/// Unknown event names fail to decode and are skipped by the channel
/// reader; they must never tear the session down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BackendEvent {
    /// Diagnostic acknowledgement; logged, no state mutation.
    Response(ResponsePayload),
    SetClientInitImage(ImagePayload),
    SetClientMainImage(ImagePayload),
    #[serde(rename = "nnImg")]
    NnImg(NeighborPayload),
    FlightParams { altitude: f64, heading: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub message: String,
}

/// An image push arrives in two shapes for the same semantic event: the
/// single-view backend wraps it in a record (with a `modelId` the client
/// ignores), the dual-view backend sends the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImagePayload {
    Record {
        image: ImageData,
        #[serde(rename = "modelId", default, skip_serializing_if = "Option::is_none")]
        model_id: Option<Value>,
    },
    Raw(ImageData),
}

impl ImagePayload {
    pub fn into_image(self) -> ImageData {
        match self {
            ImagePayload::Record { image, .. } => image,
            ImagePayload::Raw(image) => image,
        }
    }
}

/// Neighbor-image push: a name → image mapping, either wrapped in a
/// record (single view) or raw (dual view). The mapping's insertion
/// order is the display order, hence `preserve_order` on serde_json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NeighborPayload {
    Record {
        images: Map<String, Value>,
        #[serde(rename = "modelId", default, skip_serializing_if = "Option::is_none")]
        model_id: Option<Value>,
    },
    Raw(Map<String, Value>),
}

impl NeighborPayload {
    /// Image payloads in the order the backend enumerated them.
    /// Non-string values are skipped rather than failing the event.
    pub fn into_images(self) -> Vec<ImageData> {
        let map = match self {
            NeighborPayload::Record { images, .. } => images,
            NeighborPayload::Raw(images) => images,
        };
        map.into_iter()
            .filter_map(|(_, value)| match value {
                Value::String(image) => Some(ImageData(image)),
                _ => None,
            })
            .collect()
    }
}

/// Encodes a command as the text frame the backend expects.
pub fn encode_command(command: &ClientCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(ProtocolError::Encode)
}

/// Decodes one inbound text frame into a backend event.
pub fn decode_event(text: &str) -> Result<BackendEvent, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_commands_use_backend_event_names() {
        let cmd = ClientCommand::KeyControl {
            key: "w".to_string(),
            step: 4,
        };
        let json = serde_json::to_value(&cmd).expect("encode");
        assert_eq!(json["type"], "key_control");
        assert_eq!(json["payload"]["key"], "w");
        assert_eq!(json["payload"]["step"], 4);

        let cmd = ClientCommand::GetInitImage(ModelRef::new("scene-a"));
        let json = serde_json::to_value(&cmd).expect("encode");
        assert_eq!(json["type"], "get_init_image");
        assert_eq!(json["payload"], "scene-a");
    }

    #[test]
    fn identify_payload_shapes_match_both_viewer_modes() {
        let dual = ClientCommand::SetUserName("alice".to_string());
        assert_eq!(
            serde_json::to_value(&dual).expect("encode")["payload"],
            "alice"
        );

        let single = ClientCommand::SetUserData(UserData {
            user_name: "alice".to_string(),
            model_ids: vec![ModelRef::new("0")],
        });
        let json = serde_json::to_value(&single).expect("encode");
        assert_eq!(json["payload"]["userName"], "alice");
        assert_eq!(json["payload"]["modelIds"][0], "0");
    }

    #[test]
    fn image_push_decodes_raw_and_record_shapes() {
        let raw: BackendEvent =
            serde_json::from_str(r#"{"type":"set_client_main_image","payload":"b64-frame"}"#)
                .expect("raw shape");
        match raw {
            BackendEvent::SetClientMainImage(payload) => {
                assert_eq!(payload.into_image(), ImageData::from("b64-frame"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let record: BackendEvent = serde_json::from_str(
            r#"{"type":"set_client_init_image","payload":{"modelId":"scene-a","image":"b64-init"}}"#,
        )
        .expect("record shape");
        match record {
            BackendEvent::SetClientInitImage(payload) => {
                assert_eq!(payload.into_image(), ImageData::from("b64-init"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn neighbor_images_keep_backend_enumeration_order() {
        let event: BackendEvent = serde_json::from_str(
            r#"{"type":"nnImg","payload":{"images":{"c.png":"img-c","a.png":"img-a","b.png":"img-b"}}}"#,
        )
        .expect("record shape");
        let BackendEvent::NnImg(payload) = event else {
            panic!("expected nnImg");
        };
        assert_eq!(
            payload.into_images(),
            vec![
                ImageData::from("img-c"),
                ImageData::from("img-a"),
                ImageData::from("img-b"),
            ]
        );

        let event: BackendEvent = serde_json::from_str(
            r#"{"type":"nnImg","payload":{"z.png":"img-z","y.png":"img-y"}}"#,
        )
        .expect("raw shape");
        let BackendEvent::NnImg(payload) = event else {
            panic!("expected nnImg");
        };
        assert_eq!(
            payload.into_images(),
            vec![ImageData::from("img-z"), ImageData::from("img-y")]
        );
    }

    #[test]
    fn non_string_neighbor_values_are_skipped() {
        let payload: NeighborPayload =
            serde_json::from_str(r#"{"a.png":"img-a","broken":42,"b.png":"img-b"}"#)
                .expect("raw shape");
        assert_eq!(
            payload.into_images(),
            vec![ImageData::from("img-a"), ImageData::from("img-b")]
        );
    }

    #[test]
    fn unknown_event_names_fail_to_decode() {
        let result = decode_event(r#"{"type":"get_asset_pose","payload":{}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn encode_decode_helpers_round_the_wire_shapes() {
        let text = encode_command(&ClientCommand::ResetPose(ModelRef::new("scene-a")))
            .expect("encode");
        assert_eq!(text, r#"{"type":"reset_pose","payload":"scene-a"}"#);

        let event = decode_event(r#"{"type":"response","payload":{"message":"ok"}}"#)
            .expect("decode");
        assert_eq!(
            event,
            BackendEvent::Response(ResponsePayload {
                message: "ok".to_string(),
            })
        );
    }
}
