use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use trafficflow_shared::geometry::ScreenPoint;
use trafficflow_shared::picking::ScreenEdge;

use crate::api::HttpApi;
use crate::components::charts_panel::ChartsPanel;
use crate::components::metrics_panel::MetricsPanel;
use crate::components::network_view::NetworkView;
use crate::components::settings_panel::SettingsPanel;
use crate::components::toasts::Toasts;
use crate::config::ViewerConfig;
use crate::notices::{Notice, NoticeBoard};
use crate::poller::{FramePacer, Poller, StopToken};
use crate::session::Session;
use crate::sync::{Interaction, SettingsForm, SettingsSync};

type SharedSync = Rc<SettingsSync<HttpApi>>;

/// Show `notice` and remove it again after `lifetime`.
fn show_notice(mut board: Signal<NoticeBoard>, notice: Notice, lifetime: Duration) {
    let id = board.write().push(notice);
    let millis = u32::try_from(lifetime.as_millis()).unwrap_or(u32::MAX);
    spawn(async move {
        gloo_timers::future::TimeoutFuture::new(millis).await;
        board.write().dismiss(id);
    });
}

/// Hand `interaction` to the sync layer. `cache` is the road cache as drawn
/// when the interaction happened; clicks that miss every road send nothing.
fn dispatch(
    sync: SharedSync,
    interaction: Interaction,
    cache: Vec<ScreenEdge>,
    board: Signal<NoticeBoard>,
    lifetime: Duration,
) {
    spawn(async move {
        if let Some(notice) = sync.handle(interaction, &cache).await {
            show_notice(board, notice, lifetime);
        }
    });
}

/// Route a form submission: parse errors are reported locally, valid input
/// goes to the service.
fn submit(
    sync: &SharedSync,
    submitted: Result<Interaction, Notice>,
    board: Signal<NoticeBoard>,
    lifetime: Duration,
) {
    match submitted {
        Ok(interaction) => dispatch(sync.clone(), interaction, Vec::new(), board, lifetime),
        Err(notice) => show_notice(board, notice, lifetime),
    }
}

#[component]
pub fn Dashboard() -> Element {
    let config = ViewerConfig::default();
    let lifetime = config.notice_lifetime;

    let mut session = use_signal(|| Session::new(config));
    let mut form = use_signal(SettingsForm::default);
    let notices = use_signal(NoticeBoard::default);
    let stop = use_hook(StopToken::new);
    let sync: SharedSync = use_hook(|| Rc::new(SettingsSync::new(HttpApi::same_origin(), config.click_tolerance_px)));

    // Snapshot loop, alive for as long as the page is mounted
    let poll_stop = stop.clone();
    use_future(move || {
        let stop = poll_stop.clone();
        async move {
            let poller = Poller::new(HttpApi::same_origin(), FramePacer::new(config.poll_interval), stop);
            poller
                .run(|snapshot| {
                    session.write().apply(&snapshot);
                    if let Some(settings) = &snapshot.settings {
                        form.write().echo(settings);
                    }
                })
                .await;
        }
    });
    use_drop(move || stop.stop());

    let pick_sync = sync.clone();
    let on_pick = move |point: ScreenPoint| {
        let cache = session.read().edges().to_vec();
        dispatch(pick_sync.clone(), Interaction::PointerClick(point), cache, notices, lifetime);
    };

    let signals_sync = sync.clone();
    let on_submit_signals = move |_: ()| {
        let submitted = form.write().submit_signals();
        submit(&signals_sync, submitted, notices, lifetime);
    };

    let spawn_sync = sync.clone();
    let on_submit_spawn = move |_: ()| {
        let submitted = form.write().submit_spawn();
        submit(&spawn_sync, submitted, notices, lifetime);
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "TrafficFlow" }
                span { class: "subtitle", "Live view of the running simulation" }
            }
            div { class: "layout",
                div { class: "main-column",
                    NetworkView { session: session, on_pick: on_pick }
                    ChartsPanel { session: session }
                }
                div { class: "sidebar",
                    MetricsPanel { session: session }
                    SettingsPanel {
                        form: form,
                        on_submit_signals: on_submit_signals,
                        on_submit_spawn: on_submit_spawn,
                    }
                }
            }
            Toasts { board: notices }
        }
    }
}
