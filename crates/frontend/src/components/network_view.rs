use dioxus::prelude::*;
use trafficflow_shared::geometry::ScreenPoint;

use crate::coords::{self, NETWORK_CONTAINER_ID};
use crate::render::{FAST_AGENT, SLOW_AGENT};
use crate::session::Session;

#[component]
pub fn NetworkView(session: Signal<Session>, on_pick: EventHandler<ScreenPoint>) -> Element {
    let (svg_html, viewport) = {
        let s = session.read();
        (s.network_svg(), s.config().viewport)
    };
    let slow = SLOW_AGENT.css();
    let fast = FAST_AGENT.css();

    rsx! {
        div { class: "panel network-panel",
            h3 { "Road network" }
            div {
                id: NETWORK_CONTAINER_ID,
                class: "network-container",
                onclick: move |evt: Event<MouseData>| {
                    let client = evt.client_coordinates();
                    if let Some(point) = coords::click_to_surface(client.x, client.y, &viewport) {
                        on_pick.call(point);
                    }
                },
                dangerous_inner_html: "{svg_html}",
            }
            div { class: "legend",
                span { class: "legend-item",
                    span { class: "swatch road-open" }
                    "Open road"
                }
                span { class: "legend-item",
                    span { class: "swatch road-closed" }
                    "Closed road"
                }
                span { class: "legend-item",
                    span { class: "swatch", style: "background:{slow};" }
                    "Slow"
                }
                span { class: "legend-item",
                    span { class: "swatch", style: "background:{fast};" }
                    "Fast"
                }
                span { class: "hint", "Click a road to close or reopen it" }
            }
        }
    }
}
