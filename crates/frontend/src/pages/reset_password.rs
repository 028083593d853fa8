use super::{AuthCard, field_setter};
use crate::app::Route;
use carenest_core::AuthClient;
use carenest_core::forms::{FormErrors, FormField, NewPasswordForm};
use carenest_frontend_common::auth::user_friendly_error;
use carenest_frontend_common::components::{Button, Spinner, TextInput};
use carenest_frontend_common::{use_auth, use_services, use_toast};
use tracing::{debug, warn};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

/// Progress of the token exchange for the link the user followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    /// No tokens in the URL; rely on the current session
    Absent,
    Exchanging,
    Exchanged,
    Rejected,
}

/// Take the URL fragment and strip it from the address bar
fn take_fragment() -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let hash = location.hash().ok().filter(|h| h.len() > 1)?;
    if let (Ok(history), Ok(path)) = (window.history(), location.pathname()) {
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&path)) {
            debug!(error = ?e, "Could not clear recovery tokens from the URL");
        }
    }
    Some(hash)
}

#[function_component(ResetPasswordPage)]
pub fn reset_password_page() -> Html {
    let services = use_services();
    let toaster = use_toast();
    let navigator = use_navigator();
    let auth = use_auth();

    let link = use_state(|| LinkState::Absent);
    let form = use_state(NewPasswordForm::default);
    let errors = use_state(FormErrors::default);
    let submitting = use_state(|| false);

    // Exchange the tokens from the recovery email once on mount
    {
        let client = services.client.clone();
        let link = link.clone();
        use_effect_with((), move |_| {
            if let Some(fragment) = take_fragment() {
                link.set(LinkState::Exchanging);
                spawn_local(async move {
                    match client.session_from_fragment(&fragment).await {
                        Ok(Some(_)) => link.set(LinkState::Exchanged),
                        Ok(None) => link.set(LinkState::Absent),
                        Err(error) => {
                            warn!(%error, "Recovery link rejected");
                            link.set(LinkState::Rejected);
                        }
                    }
                });
            }
        });
    }

    let onsubmit = {
        let form = form.clone();
        let errors = errors.clone();
        let submitting = submitting.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let current = (*form).clone();
            if let Err(invalid) = current.validate() {
                errors.set(invalid);
                return;
            }
            errors.set(FormErrors::default());
            submitting.set(true);

            let client = services.client.clone();
            let toaster = toaster.clone();
            let navigator = navigator.clone();
            let submitting = submitting.clone();
            spawn_local(async move {
                match client.update_password(&current.password).await {
                    Ok(_) => {
                        toaster.success("Your password has been updated");
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Home);
                        }
                    }
                    Err(error) => {
                        warn!(%error, "Password reset failed");
                        toaster.error(user_friendly_error(&error));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let checking = *link == LinkState::Exchanging || (*link == LinkState::Absent && auth.is_loading);
    if checking {
        return html! { <Spinner text={Some("Verifying your reset link...".to_string())} /> };
    }

    let usable = *link == LinkState::Exchanged || (*link == LinkState::Absent && auth.session.is_some());
    if !usable {
        return html! {
            <AuthCard title="Link expired">
                <p class="text-gray-700 dark:text-gray-300 mb-4">
                    {"This password reset link is invalid or has expired. Request a new one to continue."}
                </p>
                <Link<Route> to={Route::ForgotPassword} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Request a new link"}
                </Link<Route>>
            </AuthCard>
        };
    }

    html! {
        <AuthCard title="Choose a new password">
            <form {onsubmit}>
                <TextInput
                    id="password"
                    label="New password"
                    input_type="password"
                    autocomplete={Some(AttrValue::from("new-password"))}
                    value={form.password.clone()}
                    oninput={field_setter(&form, |f, v| f.password = v)}
                    error={errors.message(FormField::Password)}
                />
                <TextInput
                    id="confirm-password"
                    label="Confirm new password"
                    input_type="password"
                    autocomplete={Some(AttrValue::from("new-password"))}
                    value={form.confirm_password.clone()}
                    oninput={field_setter(&form, |f, v| f.confirm_password = v)}
                    error={errors.message(FormField::ConfirmPassword)}
                />
                <Button submit=true loading={*submitting} loading_text={Some(AttrValue::from("Saving..."))}>
                    {"Update password"}
                </Button>
            </form>
        </AuthCard>
    }
}
