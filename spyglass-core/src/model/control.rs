use serde::{Deserialize, Serialize};

/// Input event relayed from the viewer to the sharer.
///
/// Pointer coordinates are normalized to [0,1] relative to the shared
/// surface; scaling to device pixels is the receiving side's job. The
/// relay never validates or clamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlEvent {
    MouseMove {
        x: f64,
        y: f64,
    },
    Click {
        button: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    DblClick {
        button: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    MouseDown {
        button: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    MouseUp {
        button: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    Wheel {
        #[serde(rename = "deltaY")]
        delta_y: f64,
    },
    KeyDown {
        key: String,
    },
    KeyUp {
        key: String,
    },
}
