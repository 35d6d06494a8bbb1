use dioxus::prelude::*;

use crate::session::Session;

#[component]
pub fn MetricsPanel(session: Signal<Session>) -> Element {
    let readouts = session.read().readouts().clone();
    let rows = [
        ("Tick", readouts.tick_text()),
        ("Average speed", readouts.speed_text()),
        ("Average commute", readouts.commute_text()),
        ("Completed commutes", readouts.completed_text()),
        ("Stuck vehicles", readouts.stuck_text()),
        ("Vehicles", readouts.vehicles.to_string()),
        ("Closed roads", readouts.closed_roads.to_string()),
    ];

    rsx! {
        div { class: "panel",
            h3 { "Metrics" }
            div { class: "metrics-grid",
                for (label, value) in rows {
                    div { class: "metric",
                        span { class: "metric-label", "{label}" }
                        span { class: "metric-value", "{value}" }
                    }
                }
            }
        }
    }
}
