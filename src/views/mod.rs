//! Presentation layer: turns query results into chart and map data.
//!
//! Bar and line charts are emitted as Plotly figure JSON (`{data, layout}`),
//! the map as a list of Leaflet markers.  The page hands both straight to the
//! browser-side libraries, so nothing here touches HTTP.

pub mod bar;
pub mod map;
pub mod timeseries;

use serde_json::{json, Value};

pub const BACKGROUND: &str = "#000000";
pub const FOREGROUND: &str = "white";

/// Dark layout shared by every chart.
pub(crate) fn dark_layout(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "plot_bgcolor": BACKGROUND,
        "paper_bgcolor": BACKGROUND,
        "font": { "color": FOREGROUND },
    })
}

/// Merge `extra` into a layout object, overwriting existing keys.
pub(crate) fn extend_layout(mut layout: Value, extra: Value) -> Value {
    if let (Some(base), Value::Object(extra)) = (layout.as_object_mut(), extra) {
        base.extend(extra);
    }
    layout
}
