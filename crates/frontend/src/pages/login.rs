use super::{AuthCard, field_setter};
use crate::app::Route;
use carenest_core::AuthClient;
use carenest_core::forms::{FormErrors, FormField, LoginForm};
use carenest_frontend_common::auth::{use_is_authenticated, user_friendly_error};
use carenest_frontend_common::components::{Button, TextInput};
use carenest_frontend_common::{use_services, use_toast};
use tracing::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let services = use_services();
    let toaster = use_toast();
    let navigator = use_navigator();
    let is_authenticated = use_is_authenticated();

    let form = use_state(LoginForm::default);
    let errors = use_state(FormErrors::default);
    let submitting = use_state(|| false);

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
                match client
                    .sign_in_with_password(&current.email, &current.password)
                    .await
                {
                    Ok(_) => {
                        toaster.success("Signed in");
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Home);
                        }
                    }
                    Err(error) => {
                        warn!(%error, "Sign-in failed");
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

    html! {
        <AuthCard title="Sign in" subtitle={Some(AttrValue::from("Welcome back to CareNest"))}>
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
                <TextInput
                    id="password"
                    label="Password"
                    input_type="password"
                    autocomplete={Some(AttrValue::from("current-password"))}
                    value={form.password.clone()}
                    oninput={field_setter(&form, |f, v| f.password = v)}
                    error={errors.message(FormField::Password)}
                />
                <Button submit=true loading={*submitting} loading_text={Some(AttrValue::from("Signing in..."))}>
                    {"Sign in"}
                </Button>
            </form>
            <div class="mt-4 flex justify-between text-sm">
                <Link<Route> to={Route::ForgotPassword} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Forgot password?"}
                </Link<Route>>
                <Link<Route> to={Route::SignUp} classes="text-teal-700 dark:text-teal-300 hover:underline">
                    {"Create an account"}
                </Link<Route>>
            </div>
        </AuthCard>
    }
}
