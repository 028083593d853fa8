use super::{AuthCard, field_setter};
use crate::app::Route;
use carenest_core::forms::{FormErrors, FormField, SignUpForm};
use carenest_core::{AuthClient, SignUpRequest};
use carenest_frontend_common::auth::{use_is_authenticated, user_friendly_error};
use carenest_frontend_common::components::{Button, TextInput};
use carenest_frontend_common::{use_services, use_toast};
use tracing::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(SignUpPage)]
pub fn sign_up_page() -> Html {
    let services = use_services();
    let toaster = use_toast();
    let navigator = use_navigator();
    let is_authenticated = use_is_authenticated();

    let form = use_state(SignUpForm::default);
    let errors = use_state(FormErrors::default);
    let submitting = use_state(|| false);
    let awaiting_confirmation = use_state(|| false);

    let onsubmit = {
        let form = form.clone();
        let errors = errors.clone();
        let submitting = submitting.clone();
        let awaiting_confirmation = awaiting_confirmation.clone();
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

            let request = SignUpRequest {
                email: current.email,
                password: current.password,
                full_name: current.full_name,
            };
            let client = services.client.clone();
            let toaster = toaster.clone();
            let navigator = navigator.clone();
            let submitting = submitting.clone();
            let awaiting_confirmation = awaiting_confirmation.clone();
            spawn_local(async move {
                match client.sign_up(&request).await {
                    Ok(Some(_)) => {
                        toaster.success("Welcome to CareNest");
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Home);
                        }
                    }
                    Ok(None) => {
                        info!("Account created, waiting for email confirmation");
                        awaiting_confirmation.set(true);
                    }
                    Err(error) => {
                        warn!(%error, "Sign-up failed");
                        toaster.error(user_friendly_error(&error));
                    }
                }
                submitting.set(false);
            });
        })
    };

    if is_authenticated {
        return html! { <Redirect<Route> to={Route::Home} /> };
    }

    if *awaiting_confirmation {
        return html! {
            <AuthCard title="Check your email">
                <p class="text-gray-700 dark:text-gray-300">
                    {format!("We sent a confirmation link to {}. Open it to finish creating your account.", form.email.trim())}
                </p>
            </AuthCard>
        };
    }

    html! {
        <AuthCard title="Create your account" subtitle={Some(AttrValue::from("For patients and psychologists"))}>
            <form {onsubmit}>
                <TextInput
                    id="full-name"
                    label="Full name"
                    autocomplete={Some(AttrValue::from("name"))}
                    value={form.full_name.clone()}
                    oninput={field_setter(&form, |f, v| f.full_name = v)}
                    error={errors.message(FormField::FullName)}
                />
                <TextInput
                    id="email"
                    label="Email"
                    input_type="email"
                    autocomplete={Some(AttrValue::from("email"))}
                    value={form.email.clone()}
                    oninput={field_setter(&form, |f, v| f.email = v)}
                    error={errors.message(FormField::Email)}
                />
                <TextInput
                    id="password"
                    label="Password"
                    input_type="password"
                    autocomplete={Some(AttrValue::from("new-password"))}
                    value={form.password.clone()}
                    oninput={field_setter(&form, |f, v| f.password = v)}
                    error={errors.message(FormField::Password)}
                />
                <TextInput
                    id="confirm-password"
                    label="Confirm password"
                    input_type="password"
                    autocomplete={Some(AttrValue::from("new-password"))}
                    value={form.confirm_password.clone()}
                    oninput={field_setter(&form, |f, v| f.confirm_password = v)}
                    error={errors.message(FormField::ConfirmPassword)}
                />
                <Button submit=true loading={*submitting} loading_text={Some(AttrValue::from("Creating account..."))}>
                    {"Create account"}
                </Button>
            </form>
            <p class="mt-4 text-sm text-center">
                {"Already have an account? "}
                <Link<Route> to={Route::Login} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Sign in"}
                </Link<Route>>
            </p>
        </AuthCard>
    }
}
