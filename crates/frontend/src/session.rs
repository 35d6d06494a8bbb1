use trafficflow_shared::models::{Metrics, Snapshot};
use trafficflow_shared::picking::ScreenEdge;

use crate::charts::ChartAdapter;
use crate::config::ViewerConfig;
use crate::render::{Renderer, SvgSurface};

/// Numbers shown beside the map. Metric fields hold their last known value
/// while snapshots arrive without a `metrics` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readouts {
    pub tick: Option<u64>,
    pub average_speed: Option<f64>,
    pub average_commute_time: Option<f64>,
    pub completed_commutes: Option<u64>,
    pub stuck_vehicles: Option<u64>,
    pub closed_roads: usize,
    pub vehicles: usize,
}

impl Readouts {
    pub fn update(&mut self, snapshot: &Snapshot) {
        self.tick = Some(snapshot.tick);
        self.closed_roads = snapshot.closed_edges.len();
        self.vehicles = snapshot.vehicles.len();
        if let Some(metrics) = &snapshot.metrics {
            self.apply_metrics(metrics);
        }
    }

    fn apply_metrics(&mut self, metrics: &Metrics) {
        self.average_speed = Some(metrics.average_speed);
        self.average_commute_time = Some(metrics.average_commute_time);
        self.completed_commutes = Some(metrics.completed_commutes);
        self.stuck_vehicles = Some(metrics.stuck_vehicles);
    }

    pub fn tick_text(&self) -> String {
        or_dash(self.tick.map(|t| t.to_string()))
    }

    pub fn speed_text(&self) -> String {
        or_dash(self.average_speed.map(|v| format!("{v:.1} m/s")))
    }

    pub fn commute_text(&self) -> String {
        or_dash(self.average_commute_time.map(|v| format!("{v:.1} ticks")))
    }

    pub fn completed_text(&self) -> String {
        or_dash(self.completed_commutes.map(|v| v.to_string()))
    }

    pub fn stuck_text(&self) -> String {
        or_dash(self.stuck_vehicles.map(|v| v.to_string()))
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "--".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUpdate {
    pub rendered: bool,
    pub charted: bool,
}

/// Everything the viewer derives from snapshots, owned in one place for the
/// lifetime of the page.
#[derive(Debug, Clone)]
pub struct Session {
    config: ViewerConfig,
    renderer: Renderer,
    surface: SvgSurface,
    charts: ChartAdapter,
    readouts: Readouts,
    frames: u64,
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        let mut charts = ChartAdapter::new();
        charts.init();
        Self {
            config,
            renderer: Renderer::new(config.viewport),
            surface: SvgSurface::new(&config.viewport),
            charts,
            readouts: Readouts::default(),
            frames: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Render, then readouts, then charts. Each step only depends on its own
    /// section of the snapshot.
    pub fn apply(&mut self, snapshot: &Snapshot) -> SessionUpdate {
        let rendered = self.renderer.render(snapshot, &mut self.surface);
        if rendered {
            self.frames += 1;
        } else {
            tracing::debug!(tick = snapshot.tick, "snapshot without network, frame kept");
        }

        self.readouts.update(snapshot);

        let charted = match &snapshot.history {
            Some(history) => self.charts.update(history),
            None => false,
        };

        SessionUpdate { rendered, charted }
    }

    pub fn edges(&self) -> &[ScreenEdge] {
        self.renderer.edges()
    }

    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    pub fn charts(&self) -> &ChartAdapter {
        &self.charts
    }

    pub fn network_svg(&self) -> String {
        self.surface.to_svg()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
