use dioxus::prelude::*;

use crate::notices::NoticeBoard;

#[component]
pub fn Toasts(mut board: Signal<NoticeBoard>) -> Element {
    let items: Vec<(u64, &'static str, String)> = board
        .read()
        .iter()
        .map(|(id, notice)| (*id, notice.css_class(), notice.text.clone()))
        .collect();

    rsx! {
        div { class: "toast-stack",
            for (id, class, text) in items {
                div {
                    key: "{id}",
                    class: "{class}",
                    onclick: move |_| board.write().dismiss(id),
                    "{text}"
                }
            }
        }
    }
}
