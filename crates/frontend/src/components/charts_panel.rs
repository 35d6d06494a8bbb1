use dioxus::prelude::*;

use crate::session::Session;

#[component]
pub fn ChartsPanel(session: Signal<Session>) -> Element {
    let charts: Vec<(String, String)> = {
        let s = session.read();
        [s.charts().speed(), s.charts().commute()]
            .into_iter()
            .flatten()
            .map(|chart| (chart.title().to_string(), chart.to_svg()))
            .collect()
    };

    rsx! {
        div { class: "panel",
            h3 { "History" }
            for (title, svg) in charts {
                div { class: "chart",
                    h4 { "{title}" }
                    div { dangerous_inner_html: "{svg}" }
                }
            }
        }
    }
}
