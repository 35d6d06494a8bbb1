use std::fmt::Write as _;

use trafficflow_shared::models::HistorySample;

const CHART_WIDTH: f64 = 420.0;
const CHART_HEIGHT: f64 = 160.0;
const CHART_PAD: f64 = 24.0;

/// A single time series drawn as an SVG polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    title: &'static str,
    color: &'static str,
    labels: Vec<u64>,
    values: Vec<f64>,
}

impl LineChart {
    pub fn new(title: &'static str, color: &'static str) -> Self {
        Self {
            title,
            color,
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        self.title
    }

    /// Replace labels and data in one go.
    pub fn set_series(&mut self, labels: Vec<u64>, values: Vec<f64>) {
        self.labels = labels;
        self.values = values;
    }

    /// Vertical range: starts at zero (or below for negative data) and never collapses.
    fn value_range(&self) -> (f64, f64) {
        let finite = self.values.iter().copied().filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if hi - lo < f64::EPSILON {
            (lo, lo + 1.0)
        } else {
            (lo, hi)
        }
    }

    fn points(&self) -> Vec<(f64, f64)> {
        let (lo, hi) = self.value_range();
        let n = self.values.len();
        let plot_w = CHART_WIDTH - 2.0 * CHART_PAD;
        let plot_h = CHART_HEIGHT - 2.0 * CHART_PAD;
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| {
                let fx = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
                let fy = (v - lo) / (hi - lo);
                (CHART_PAD + fx * plot_w, CHART_HEIGHT - CHART_PAD - fy * plot_h)
            })
            .collect()
    }

    /// Full redraw. There is no transition between frames.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" style="width:100%;height:auto;display:block;">"#
        );
        let base = CHART_HEIGHT - CHART_PAD;
        let _ = write!(
            svg,
            r##"<line x1="{CHART_PAD}" y1="{base}" x2="{}" y2="{base}" stroke="#334155" stroke-width="1"/>"##,
            CHART_WIDTH - CHART_PAD
        );

        let points = self.points();
        if !points.is_empty() {
            let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
            let _ = write!(
                svg,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2" stroke-linejoin="round"/>"#,
                coords.join(" "),
                self.color
            );
        }

        let (_, hi) = self.value_range();
        let _ = write!(
            svg,
            r##"<text x="{CHART_PAD}" y="14" fill="#94a3b8" font-size="11">{:.1}</text>"##,
            hi
        );
        if let (Some(first), Some(last)) = (self.labels.first(), self.labels.last()) {
            let label_y = CHART_HEIGHT - 6.0;
            let _ = write!(
                svg,
                r##"<text x="{CHART_PAD}" y="{label_y}" fill="#94a3b8" font-size="11">{first}</text><text x="{}" y="{label_y}" fill="#94a3b8" font-size="11" text-anchor="end">{last}</text>"##,
                CHART_WIDTH - CHART_PAD
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Speed and commute-time charts fed from the snapshot history window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartAdapter {
    speed: Option<LineChart>,
    commute: Option<LineChart>,
}

impl ChartAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) {
        self.speed = Some(LineChart::new("Average speed (m/s)", "#38bdf8"));
        self.commute = Some(LineChart::new("Average commute (ticks)", "#f59e0b"));
    }

    pub fn speed(&self) -> Option<&LineChart> {
        self.speed.as_ref()
    }

    pub fn commute(&self) -> Option<&LineChart> {
        self.commute.as_ref()
    }

    /// Replace both series with `history`. Returns `false` when the charts
    /// were never initialized.
    pub fn update(&mut self, history: &[HistorySample]) -> bool {
        let (Some(speed), Some(commute)) = (self.speed.as_mut(), self.commute.as_mut()) else {
            return false;
        };
        let labels: Vec<u64> = history.iter().map(|h| h.tick).collect();
        speed.set_series(labels.clone(), history.iter().map(|h| h.average_speed).collect());
        commute.set_series(labels, history.iter().map(|h| h.average_commute_time).collect());
        true
    }
}
