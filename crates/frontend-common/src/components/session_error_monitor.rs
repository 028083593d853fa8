//! Invisible watchdog that recovers from a corrupted session

use crate::browser::{BrowserNavigator, local_spawner};
use crate::services::use_services;
use carenest_core::SessionErrorMonitor as Monitor;
use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::use_navigator;

#[derive(Properties, PartialEq)]
pub struct SessionErrorMonitorProps {
    /// Asked to re-fetch route data after redirecting to the login route
    #[prop_or_default]
    pub on_refresh: Callback<()>,
}

/// Watches auth events for repeated empty refreshes and checks the stored
/// session once on mount; either signal of corruption wipes the session and
/// sends the user to the login route. Renders nothing.
#[function_component(SessionErrorMonitor)]
pub fn session_error_monitor(props: &SessionErrorMonitorProps) -> Html {
    let services = use_services();
    let router = use_navigator();
    let on_refresh = props.on_refresh.clone();

    use_effect_with((), move |_| {
        let navigator = BrowserNavigator::new(router).with_refresh(on_refresh);
        let monitor = Monitor::new(
            services.auth(),
            services.wipe(Rc::new(navigator)),
            &services.config.guard,
        );
        let handle = monitor.mount(&local_spawner());

        move || handle.unmount()
    });

    html! {}
}
