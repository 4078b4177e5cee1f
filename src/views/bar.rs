use serde_json::{json, Value};

use super::{dark_layout, extend_layout};
use crate::data::aggregate::{Metric, Rank, RankQuery, RankedLocation};
use crate::data::filter::LocationType;

// ---------------------------------------------------------------------------
// Bar chart (top / bottom N locations)
// ---------------------------------------------------------------------------

/// Title describing what the bars show, e.g.
/// `Top 10 LSOAs by Total Crimes – All Months (Highest)`.
pub fn bar_title(query: &RankQuery, shown: usize) -> String {
    let what = match query.location_type {
        LocationType::Lsoa => "LSOAs",
        LocationType::Common => "Locations",
    };
    let by = match query.metric {
        Metric::Total => "Total Crimes",
        Metric::Normalised => "Normalised Crime Rate",
    };
    let direction = match query.rank {
        Rank::Top => "Highest",
        Rank::Bottom => "Lowest",
    };
    format!("Top {shown} {what} by {by} – {} ({direction})", query.filter.months)
}

/// Horizontal Plotly bar figure.  An empty ranking gives an empty trace.
pub fn bar_figure(results: &[RankedLocation], query: &RankQuery) -> Value {
    let locations: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
    let values: Vec<Option<f64>> = results.iter().map(|r| r.value(query.metric)).collect();
    let counts: Vec<u64> = results.iter().map(|r| r.count).collect();

    let trace = json!({
        "type": "bar",
        "orientation": "h",
        "x": values,
        "y": locations,
        "customdata": counts,
        "hovertemplate": "%{y}<br>%{x}<br>%{customdata} crimes<extra></extra>",
    });

    let layout = extend_layout(
        dark_layout(&bar_title(query, results.len())),
        json!({
            "height": 500,
            "xaxis": { "title": { "text": query.metric.label() } },
            "yaxis": {
                "title": { "text": query.location_type.label() },
                "autorange": "reversed",
            },
        }),
    );

    json!({ "data": [trace], "layout": layout })
}
