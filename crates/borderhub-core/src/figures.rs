//! Chart figures, serialised in the JSON shape plotly.js consumes.

use serde::Serialize;

use crate::models::{BarDatum, BorderPost, Decay, TrendSeries};
use crate::pivot::PivotMatrix;

const COLORSCALE: &str = "YlGnBu";
const CHART_HEIGHT: u32 = 400;

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<Option<f64>>,
        hovertemplate: String,
    },
    Scatter {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
        mode: String,
    },
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
        colorscale: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        zmin: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        zmax: Option<f64>,
        texttemplate: String,
        colorbar: ColorBar,
        hoverongaps: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub text: String,
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text { text: s.to_string() }
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text { text }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Text,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Text>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Text,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub title: Text,
}

fn category_axis(title: &str) -> Axis {
    Axis {
        title: Some(title.into()),
        range: None,
        kind: Some("category".to_string()),
    }
}

/// Grouped bars: one trace per decay, borders on x, y fixed to [0, 1].
pub fn mpi_bar_chart(data: &[BarDatum]) -> Figure {
    let mut traces: Vec<(String, Vec<String>, Vec<Option<f64>>)> = vec![];
    for datum in data {
        let idx = match traces.iter().position(|(name, _, _)| *name == datum.decay) {
            Some(i) => i,
            None => {
                traces.push((datum.decay.clone(), vec![], vec![]));
                traces.len() - 1
            }
        };
        traces[idx].1.push(datum.border.clone());
        traces[idx].2.push(datum.value);
    }

    Figure {
        data: traces
            .into_iter()
            .map(|(name, x, y)| Trace::Bar {
                name,
                x,
                y,
                hovertemplate: "%{x}<br>Decay %{fullData.name}<br>MPI %{y:.3f}<extra></extra>"
                    .to_string(),
            })
            .collect(),
        layout: Layout {
            title: "Market Potential Index (MPI) by Border Post".into(),
            barmode: Some("group".to_string()),
            xaxis: category_axis("Border Name"),
            yaxis: Axis {
                title: Some("Market Potential Index".into()),
                range: Some([0.0, 1.0]),
                kind: None,
            },
            legend: Some(Legend {
                title: "Decay Parameter".into(),
            }),
            height: CHART_HEIGHT,
        },
    }
}

/// Single-column heatmap of MPI for one decay. The colour range is pinned to
/// [0, 1]; values outside it clip.
pub fn mpi_heatmap(borders: &[BorderPost], decay: Decay) -> Figure {
    let title = format!("MPI Heatmap (Decay {decay})");
    Figure {
        data: vec![Trace::Heatmap {
            x: vec![decay.label().to_string()],
            y: borders.iter().map(|b| b.name.clone()).collect(),
            z: borders.iter().map(|b| vec![b.mpi(decay)]).collect(),
            colorscale: COLORSCALE.to_string(),
            zmin: Some(0.0),
            zmax: Some(1.0),
            texttemplate: "%{z:.2f}".to_string(),
            colorbar: ColorBar {
                title: format!("MPI (Decay {decay})").into(),
            },
            hoverongaps: false,
        }],
        layout: Layout {
            title: title.into(),
            barmode: None,
            xaxis: category_axis("Decay"),
            yaxis: Axis {
                title: Some("Border Name".into()),
                range: None,
                kind: Some("category".to_string()),
            },
            legend: None,
            height: CHART_HEIGHT + 200,
        },
    }
}

/// One line per border, years as categories.
pub fn ci_trend_chart(series: &[TrendSeries]) -> Figure {
    Figure {
        data: series
            .iter()
            .map(|s| Trace::Scatter {
                name: s.border.clone(),
                x: s.points.iter().map(|p| p.year.to_string()).collect(),
                y: s.points.iter().map(|p| p.ci).collect(),
                mode: "lines+markers".to_string(),
            })
            .collect(),
        layout: Layout {
            title: "Temporal Trends in Conflict Exposure Index (CI)".into(),
            barmode: None,
            xaxis: category_axis("Year"),
            yaxis: Axis {
                title: Some("Conflict Exposure Index".into()),
                ..Default::default()
            },
            legend: Some(Legend {
                title: "Border Name".into(),
            }),
            height: CHART_HEIGHT,
        },
    }
}

/// Border × year heatmap. Blank cells serialise as `null` so plotly leaves
/// them empty.
pub fn ci_heatmap(matrix: &PivotMatrix) -> Figure {
    Figure {
        data: vec![Trace::Heatmap {
            x: matrix.columns.clone(),
            y: matrix.rows.clone(),
            z: matrix.cells.clone(),
            colorscale: COLORSCALE.to_string(),
            zmin: None,
            zmax: None,
            texttemplate: "%{z:.2f}".to_string(),
            colorbar: ColorBar {
                title: "CI Value".into(),
            },
            hoverongaps: false,
        }],
        layout: Layout {
            title: "Conflict Exposure Index (CI) by Border and Year".into(),
            barmode: None,
            xaxis: category_axis("year"),
            yaxis: category_axis("Border_Name"),
            legend: None,
            height: CHART_HEIGHT + 200,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_chart_groups_by_decay_with_fixed_range() {
        let data = vec![
            BarDatum { border: "Busia".into(), decay: "0.02".into(), value: Some(0.9) },
            BarDatum { border: "Busia".into(), decay: "0.03".into(), value: Some(0.8) },
            BarDatum { border: "Malaba".into(), decay: "0.02".into(), value: Some(0.5) },
            BarDatum { border: "Malaba".into(), decay: "0.03".into(), value: None },
        ];
        let fig = mpi_bar_chart(&data);
        assert_eq!(fig.data.len(), 2);
        let json = serde_json::to_value(&fig).unwrap();
        assert_eq!(json["data"][0]["type"], "bar");
        assert_eq!(json["data"][0]["name"], "0.02");
        assert_eq!(json["data"][1]["y"][1], serde_json::Value::Null);
        assert_eq!(json["layout"]["yaxis"]["range"], serde_json::json!([0.0, 1.0]));
        assert_eq!(json["layout"]["barmode"], "group");
    }

    #[test]
    fn ci_heatmap_keeps_gaps_as_null() {
        let matrix = crate::pivot::pivot(
            vec![("Busia", "2020", Some(8.0)), ("Malaba", "2021", Some(1.0))],
            crate::pivot::Aggregation::Sum,
        );
        let json = serde_json::to_value(ci_heatmap(&matrix)).unwrap();
        assert_eq!(json["data"][0]["z"][0][1], serde_json::Value::Null);
        assert_eq!(json["data"][0]["z"][0][0], 8.0);
        assert!(json["data"][0].get("zmin").is_none());
    }
}
