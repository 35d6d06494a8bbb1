pub mod charts_panel;
pub mod metrics_panel;
pub mod network_view;
pub mod settings_panel;
pub mod toasts;
