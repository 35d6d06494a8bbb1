use trafficflow_shared::geometry::ScreenPoint;
use trafficflow_shared::models::{
    ClosureState, Settings, SignalTimingUpdate, SignalTimings, SpawnUpdate,
};
use trafficflow_shared::picking::{pick_edge, ScreenEdge};

use crate::api::ApiError;
use crate::notices::Notice;

/// Write side of the simulation service.
///
/// The signal and spawn endpoints answer with the applied values; `None` means
/// the request succeeded but the body could not be read.
#[allow(async_fn_in_trait)]
pub trait SettingsApi {
    async fn set_signal_timings(
        &self,
        update: SignalTimingUpdate,
    ) -> Result<Option<SignalTimings>, ApiError>;
    async fn set_spawn_interval(&self, update: SpawnUpdate) -> Result<Option<SpawnUpdate>, ApiError>;
    async fn toggle_closure(&self, edge_id: &str) -> Result<ClosureState, ApiError>;
}

/// Operator input the viewer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Click position in surface pixels.
    PointerClick(ScreenPoint),
    SignalsEdited { ns: f64, ew: f64 },
    SpawnEdited(i64),
}

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleClosure(String),
    SetSignals(SignalTimingUpdate),
    SetSpawn(SpawnUpdate),
}

pub struct SettingsSync<A> {
    api: A,
    tolerance: f64,
}

impl<A: SettingsApi> SettingsSync<A> {
    pub fn new(api: A, tolerance: f64) -> Self {
        Self { api, tolerance }
    }

    /// Turn an interaction into a request. A click resolves against `cache`
    /// and yields nothing unless a road lies within the click tolerance.
    pub fn resolve(&self, interaction: Interaction, cache: &[ScreenEdge]) -> Option<Action> {
        match interaction {
            Interaction::PointerClick(point) => {
                let hit = pick_edge(point, cache, self.tolerance);
                match &hit {
                    Some(hit) => tracing::debug!(edge_id = %hit.id, distance = hit.distance, "road picked"),
                    None => tracing::debug!(x = point.x, y = point.y, "click missed every road"),
                }
                hit.map(|hit| Action::ToggleClosure(hit.id))
            }
            Interaction::SignalsEdited { ns, ew } => Some(Action::SetSignals(SignalTimingUpdate { ns, ew })),
            Interaction::SpawnEdited(spawn_interval) => Some(Action::SetSpawn(SpawnUpdate { spawn_interval })),
        }
    }

    /// Send `action` and describe the outcome. Failures are reported, never raised.
    pub async fn perform(&self, action: Action) -> Notice {
        match action {
            Action::ToggleClosure(edge_id) => match self.api.toggle_closure(&edge_id).await {
                Ok(state) => {
                    tracing::info!(edge_id = %state.edge_id, closed = state.closed, "closure toggled");
                    Notice::success(format!("Road {} is now {}", state.edge_id, state.label()))
                }
                Err(e) => {
                    tracing::warn!(edge_id = %edge_id, error = %e, "closure toggle failed");
                    Notice::failure(format!("Could not toggle road {edge_id}: {e}"))
                }
            },
            Action::SetSignals(update) => match self.api.set_signal_timings(update).await {
                Ok(Some(applied)) => Notice::success(format!(
                    "Signal timings set to NS {}s / EW {}s",
                    applied.ns, applied.ew
                )),
                Ok(None) => Notice::success("Signal timings updated"),
                Err(e) => {
                    tracing::warn!(error = %e, "signal timing update failed");
                    Notice::failure(format!("Failed to update signal timings: {e}"))
                }
            },
            Action::SetSpawn(update) => match self.api.set_spawn_interval(update).await {
                Ok(Some(applied)) => Notice::success(format!(
                    "Spawn interval set to {} ticks",
                    applied.spawn_interval
                )),
                Ok(None) => Notice::success("Spawn interval updated"),
                Err(e) => {
                    tracing::warn!(error = %e, "spawn interval update failed");
                    Notice::failure(format!("Failed to update spawn interval: {e}"))
                }
            },
        }
    }

    /// Resolve and send in one step. `None` when the interaction maps to no request.
    pub async fn handle(&self, interaction: Interaction, cache: &[ScreenEdge]) -> Option<Notice> {
        let action = self.resolve(interaction, cache)?;
        Some(self.perform(action).await)
    }
}

// ---------------------------------------------------------------------------
// Settings form
// ---------------------------------------------------------------------------

/// One text input. While `dirty`, snapshots no longer overwrite the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormField {
    pub value: String,
    pub dirty: bool,
}

impl FormField {
    fn echo(&mut self, value: String) {
        if !self.dirty {
            self.value = value;
        }
    }

    fn edit(&mut self, value: String) {
        self.value = value;
        self.dirty = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    SpawnInterval,
    SignalNs,
    SignalEw,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub spawn_interval: FormField,
    pub signal_ns: FormField,
    pub signal_ew: FormField,
}

impl SettingsForm {
    /// Copy the service's current settings into every untouched field.
    pub fn echo(&mut self, settings: &Settings) {
        self.spawn_interval.echo(settings.spawn_interval.to_string());
        self.signal_ns.echo(settings.signal_timings.ns.to_string());
        self.signal_ew.echo(settings.signal_timings.ew.to_string());
    }

    pub fn edit(&mut self, field: SettingsField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SettingsField::SpawnInterval => self.spawn_interval.edit(value),
            SettingsField::SignalNs => self.signal_ns.edit(value),
            SettingsField::SignalEw => self.signal_ew.edit(value),
        }
    }

    /// Parse the signal inputs. Valid input releases both fields back to the
    /// snapshot echo; invalid input stays put so it can be corrected.
    pub fn submit_signals(&mut self) -> Result<Interaction, Notice> {
        let (Some(ns), Some(ew)) = (
            parse_seconds(&self.signal_ns.value),
            parse_seconds(&self.signal_ew.value),
        ) else {
            return Err(Notice::failure("Signal timings must be numbers"));
        };
        self.signal_ns.dirty = false;
        self.signal_ew.dirty = false;
        Ok(Interaction::SignalsEdited { ns, ew })
    }

    /// Any integer is accepted; the service clamps it to at least one tick.
    pub fn submit_spawn(&mut self) -> Result<Interaction, Notice> {
        let ticks = self
            .spawn_interval
            .value
            .trim()
            .parse::<i64>()
            .map_err(|_| Notice::failure("Spawn interval must be a whole number of ticks"))?;
        self.spawn_interval.dirty = false;
        Ok(Interaction::SpawnEdited(ticks))
    }
}

fn parse_seconds(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
