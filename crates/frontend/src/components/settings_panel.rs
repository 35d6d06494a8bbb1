use dioxus::prelude::*;

use crate::sync::{SettingsField, SettingsForm};

#[component]
pub fn SettingsPanel(
    mut form: Signal<SettingsForm>,
    on_submit_signals: EventHandler<()>,
    on_submit_spawn: EventHandler<()>,
) -> Element {
    let current = form.read().clone();

    rsx! {
        div { class: "panel",
            h3 { "Signal timing" }
            div { class: "field-row",
                label { "North-south (s)" }
                input {
                    r#type: "number",
                    min: "1",
                    step: "1",
                    class: if current.signal_ns.dirty { "dirty" } else { "" },
                    value: "{current.signal_ns.value}",
                    oninput: move |evt: Event<FormData>| {
                        form.write().edit(SettingsField::SignalNs, evt.value());
                    },
                }
            }
            div { class: "field-row",
                label { "East-west (s)" }
                input {
                    r#type: "number",
                    min: "1",
                    step: "1",
                    class: if current.signal_ew.dirty { "dirty" } else { "" },
                    value: "{current.signal_ew.value}",
                    oninput: move |evt: Event<FormData>| {
                        form.write().edit(SettingsField::SignalEw, evt.value());
                    },
                }
            }
            button { onclick: move |_| on_submit_signals.call(()), "Apply timings" }

            h3 { "Traffic demand" }
            div { class: "field-row",
                label { "Spawn every (ticks)" }
                input {
                    r#type: "number",
                    min: "1",
                    step: "1",
                    class: if current.spawn_interval.dirty { "dirty" } else { "" },
                    value: "{current.spawn_interval.value}",
                    oninput: move |evt: Event<FormData>| {
                        form.write().edit(SettingsField::SpawnInterval, evt.value());
                    },
                }
            }
            button { onclick: move |_| on_submit_spawn.call(()), "Apply spawn rate" }
        }
    }
}
