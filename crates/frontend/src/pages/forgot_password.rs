use super::{AuthCard, field_setter};
use crate::app::Route;
use carenest_core::AuthClient;
use carenest_core::forms::{ForgotPasswordForm, FormErrors, FormField};
use carenest_frontend_common::auth::user_friendly_error;
use carenest_frontend_common::components::{Button, TextInput};
use carenest_frontend_common::{use_services, use_toast};
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

/// Where the recovery email should send the user back to
fn reset_redirect_url() -> Option<String> {
    let origin = web_sys::window()?.location().origin().ok()?;
    Some(format!("{origin}{}", Route::ResetPassword.to_path()))
}

#[function_component(ForgotPasswordPage)]
pub fn forgot_password_page() -> Html {
    let services = use_services();
    let toaster = use_toast();

    let form = use_state(ForgotPasswordForm::default);
    let errors = use_state(FormErrors::default);
    let submitting = use_state(|| false);
    let sent = use_state(|| false);

    let onsubmit = {
        let form = form.clone();
        let errors = errors.clone();
        let submitting = submitting.clone();
        let sent = sent.clone();
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
            let submitting = submitting.clone();
            let sent = sent.clone();
            spawn_local(async move {
                let redirect = reset_redirect_url();
                match client
                    .reset_password_for_email(&current.email, redirect.as_deref())
                    .await
                {
                    Ok(()) => sent.set(true),
                    Err(error) => {
                        warn!(%error, "Password recovery request failed");
                        toaster.error(user_friendly_error(&error));
                    }
                }
                submitting.set(false);
            });
        })
    };

    if *sent {
        return html! {
            <AuthCard title="Check your email">
                <p class="text-gray-700 dark:text-gray-300 mb-4">
                    {"If an account exists for that address, a link to reset your password is on its way."}
                </p>
                <Link<Route> to={Route::Login} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Back to sign in"}
                </Link<Route>>
            </AuthCard>
        };
    }

    html! {
        <AuthCard title="Reset your password" subtitle={Some(AttrValue::from("We'll email you a link to choose a new one"))}>
            <form {onsubmit}>
                <TextInput
                    id="email"
                    label="Email"
                    input_type="email"
                    autocomplete={Some(AttrValue::from("email"))}
                    value={form.email.clone()}
                    oninput={field_setter(&form, |f, v| f.email = v)}
                    error={errors.message(FormField::Email)}
                />
                <Button submit=true loading={*submitting} loading_text={Some(AttrValue::from("Sending..."))}>
                    {"Send reset link"}
                </Button>
            </form>
            <p class="mt-4 text-sm text-center">
                <Link<Route> to={Route::Login} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Back to sign in"}
                </Link<Route>>
            </p>
        </AuthCard>
    }
}
