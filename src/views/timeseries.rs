use serde_json::{json, Value};

use super::{dark_layout, extend_layout};
use crate::color::ColorMap;
use crate::data::aggregate::{SeriesKey, TimeSeries};

pub const TITLE: &str = "Crime Counts Over Time";

/// Plotly line figure, one trace per (location, crime type) series.
///
/// Traces sharing a colour key share a legend entry, the other dimension goes
/// into the hover text.
pub fn line_figure(ts: &TimeSeries) -> Value {
    let colors = ColorMap::new(ts.series.iter().map(|s| s.key(ts.color_by)));
    let other = match ts.color_by {
        SeriesKey::Location => SeriesKey::CrimeType,
        SeriesKey::CrimeType => SeriesKey::Location,
    };

    let mut seen: Vec<&str> = Vec::new();
    let traces: Vec<Value> = ts
        .series
        .iter()
        .map(|s| {
            let key = s.key(ts.color_by);
            let first = !seen.contains(&key);
            if first {
                seen.push(key);
            }
            let color = colors.color_for(key);
            let months: Vec<String> = s.points.iter().map(|(m, _)| m.to_string()).collect();
            let counts: Vec<u64> = s.points.iter().map(|(_, c)| *c).collect();
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "name": key,
                "legendgroup": key,
                "showlegend": first,
                "hovertext": s.key(other),
                "x": months,
                "y": counts,
                "line": { "color": color },
                "marker": { "color": color },
            })
        })
        .collect();

    let layout = extend_layout(
        dark_layout(TITLE),
        json!({
            "xaxis": { "title": { "text": "Month" }, "type": "category" },
            "yaxis": { "title": { "text": "Crime Count" } },
        }),
    );

    json!({ "data": traces, "layout": layout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::Series;

    fn series(location: &str, crime: &str, points: &[(&str, u64)]) -> Series {
        Series {
            location: location.to_string(),
            crime_type: crime.to_string(),
            points: points.iter().map(|(m, c)| (m.parse().unwrap(), *c)).collect(),
        }
    }

    #[test]
    fn one_trace_per_series() {
        let ts = TimeSeries {
            series: vec![
                series("Leeds", "All Crimes", &[("2025-01", 3), ("2025-02", 5)]),
                series("York", "All Crimes", &[("2025-01", 1)]),
            ],
            color_by: SeriesKey::Location,
            location_options: vec!["Leeds".into(), "York".into()],
            selected: vec!["Leeds".into(), "York".into()],
        };
        let fig = line_figure(&ts);
        let data = fig["data"].as_array().unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Leeds");
        assert_eq!(data[0]["x"], json!(["2025-01", "2025-02"]));
        assert_eq!(data[0]["y"], json!([3, 5]));
        assert_ne!(data[0]["line"]["color"], data[1]["line"]["color"]);
        assert_eq!(fig["layout"]["title"]["text"], TITLE);
    }

    #[test]
    fn crime_type_colouring_shares_legend_entries() {
        let ts = TimeSeries {
            series: vec![
                series("Leeds", "Burglary", &[("2025-01", 1)]),
                series("York", "Burglary", &[("2025-01", 2)]),
                series("York", "Robbery", &[("2025-01", 4)]),
            ],
            color_by: SeriesKey::CrimeType,
            location_options: vec![],
            selected: vec![],
        };
        let fig = line_figure(&ts);
        let data = fig["data"].as_array().unwrap();

        assert_eq!(data[0]["showlegend"], true);
        assert_eq!(data[1]["showlegend"], false);
        assert_eq!(data[0]["line"]["color"], data[1]["line"]["color"]);
        assert_eq!(data[1]["hovertext"], "York");
    }

    #[test]
    fn no_series_renders_an_empty_chart() {
        let ts = TimeSeries {
            series: vec![],
            color_by: SeriesKey::Location,
            location_options: vec![],
            selected: vec![],
        };
        let fig = line_figure(&ts);
        assert_eq!(fig["data"], json!([]));
    }
}
