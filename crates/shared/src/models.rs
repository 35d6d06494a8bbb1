use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A point in simulation space (meters, unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// An intersection of the simulated road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A directed road between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub speed_limit: f64,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub lanes: Option<u32>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Network {
    /// Largest posted speed limit across all edges, if any edge has one.
    pub fn max_speed_limit(&self) -> Option<f64> {
        self.edges
            .iter()
            .map(|e| e.speed_limit)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub edge_id: Option<String>,
    /// Distance travelled along the current edge.
    #[serde(default)]
    pub position: f64,
    pub velocity: f64,
    #[serde(default)]
    pub arrived: bool,
    #[serde(default)]
    pub stuck: bool,
    pub coords: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub average_speed: f64,
    pub average_commute_time: f64,
    #[serde(default)]
    pub completed_commutes: u64,
    pub stuck_vehicles: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalTimings {
    #[serde(rename = "NS")]
    pub ns: f64,
    #[serde(rename = "EW")]
    pub ew: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub spawn_interval: u32,
    pub signal_timings: SignalTimings,
}

/// One recorded tick of metrics, used only for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub tick: u64,
    pub average_speed: f64,
    pub average_commute_time: f64,
    #[serde(default)]
    pub completed_commutes: u64,
    #[serde(default)]
    pub stuck_vehicles: u64,
}

/// Point-in-time view of the whole simulation, replaced wholesale every poll.
///
/// Sections the service may omit are `Option`s so that consumers skip exactly
/// the part they depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub closed_edges: HashSet<String>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub history: Option<Vec<HistorySample>>,
}

impl Snapshot {
    pub fn is_closed(&self, edge_id: &str) -> bool {
        self.closed_edges.contains(edge_id)
    }
}

// Request / response bodies for the settings and closure endpoints.

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalTimingUpdate {
    pub ns: f64,
    pub ew: f64,
}

/// The service clamps the requested interval to at least one tick and
/// answers with the value it applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnUpdate {
    pub spawn_interval: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureToggle {
    pub edge_id: String,
}

/// Closure state as reported by the service after a toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureState {
    pub edge_id: String,
    pub closed: bool,
}

impl ClosureState {
    pub fn label(&self) -> &'static str {
        if self.closed {
            "closed"
        } else {
            "open"
        }
    }
}
