//! "Stuck? Reset session" control that appears when a page hangs

use super::spinner::InlineSpinner;
use crate::browser::BrowserNavigator;
use crate::services::use_services;
use carenest_core::{EscapePhase, StuckPageEscape as Escape};
use gloo::timers::callback::Timeout;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Mounted once at the application root. After the configured delay the
/// control appears and stays; clicking it wipes the session and reloads `/`.
#[function_component(StuckPageEscape)]
pub fn stuck_page_escape() -> Html {
    let services = use_services();
    let phase = use_state(EscapePhase::default);
    let escape = use_memo((), move |_| {
        // No router: the manual path always reloads the whole document.
        let wipe = services.wipe(Rc::new(BrowserNavigator::default()));
        Escape::new(wipe, &services.config.guard)
    });

    {
        let escape = escape.clone();
        let phase = phase.clone();
        use_effect_with((), move |_| {
            let timer = {
                let escape = escape.clone();
                Timeout::new(escape.delay_ms(), move || {
                    phase.set(escape.on_timer_expired());
                })
            };

            move || {
                escape.unmount();
                drop(timer);
            }
        });
    }

    let onclick = {
        let escape = escape.clone();
        let phase = phase.clone();
        Callback::from(move |_: MouseEvent| {
            if !escape.begin() {
                return;
            }
            phase.set(escape.phase());

            let escape = escape.clone();
            spawn_local(async move {
                let report = escape.reset().await;
                if !report.is_clean() {
                    warn!(failures = report.failures().len(), "Manual reset finished with failures");
                }
            });
        })
    };

    if !phase.is_visible() {
        return html! {};
    }
    let busy = phase.is_busy();

    html! {
        <div class="fixed bottom-4 left-4 z-40 flex items-center gap-2 text-xs">
            <span class="text-gray-500 dark:text-gray-400">{"Page not responding?"}</span>
            <button
                type="button"
                {onclick}
                disabled={busy}
                aria-busy={busy.to_string()}
                class="inline-flex items-center justify-center px-3 py-1.5 text-xs font-medium rounded-lg
                       border border-gray-300 dark:border-gray-600 text-gray-700 dark:text-gray-200
                       hover:bg-gray-50 dark:hover:bg-gray-700 disabled:opacity-60 disabled:cursor-not-allowed"
            >
                if busy {
                    <InlineSpinner />
                    {"Resetting session..."}
                } else {
                    {"Reset session"}
                }
            </button>
        </div>
    }
}
