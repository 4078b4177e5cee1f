use serde::Serialize;

use crate::color::generate_palette;
use crate::data::aggregate::LocatedPoint;

/// Initial view: roughly the middle of England and Wales.
pub const MAP_CENTER: [f64; 2] = [53.5, -1.5];
pub const MAP_ZOOM: u8 = 6;

/// Marker colours cycle through this many hues.
pub const MARKER_PALETTE_SIZE: usize = 18;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Everything the page needs to draw the Leaflet map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub legend: Vec<LegendEntry>,
}

/// Colour each located point by its position in the selection.
pub fn map_view(points: &[LocatedPoint]) -> MapView {
    let palette = generate_palette(MARKER_PALETTE_SIZE);

    let markers: Vec<Marker> = points
        .iter()
        .map(|p| Marker {
            location: p.location.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            color: palette[p.selection_index % palette.len()].clone(),
        })
        .collect();

    let legend = markers
        .iter()
        .map(|m| LegendEntry {
            label: m.location.clone(),
            color: m.color.clone(),
        })
        .collect();

    MapView {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        markers,
        legend,
    }
}
