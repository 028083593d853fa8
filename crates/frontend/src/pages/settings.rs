use super::field_setter;
use crate::app::Route;
use carenest_core::AuthClient;
use carenest_core::forms::{FormErrors, FormField, NewPasswordForm};
use carenest_frontend_common::auth::user_friendly_error;
use carenest_frontend_common::components::{Button, ButtonVariant, TextInput};
use carenest_frontend_common::{use_auth, use_services, use_toast};
use tracing::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
    let services = use_services();
    let toaster = use_toast();
    let navigator = use_navigator();
    let auth = use_auth();

    let form = use_state(NewPasswordForm::default);
    let errors = use_state(FormErrors::default);
    let saving = use_state(|| false);
    let signing_out = use_state(|| false);

    let onsubmit = {
        let services = services.clone();
        let toaster = toaster.clone();
        let form = form.clone();
        let errors = errors.clone();
        let saving = saving.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *saving {
                return;
            }
            let current = (*form).clone();
            if let Err(invalid) = current.validate() {
                errors.set(invalid);
                return;
            }
            errors.set(FormErrors::default());
            saving.set(true);

            let client = services.client.clone();
            let toaster = toaster.clone();
            let form = form.clone();
            let saving = saving.clone();
            spawn_local(async move {
                match client.update_password(&current.password).await {
                    Ok(_) => {
                        toaster.success("Password changed");
                        form.set(NewPasswordForm::default());
                    }
                    Err(error) => {
                        warn!(%error, "Password change failed");
                        toaster.error(user_friendly_error(&error));
                    }
                }
                saving.set(false);
            });
        })
    };

    let on_sign_out = {
        let signing_out = signing_out.clone();
        Callback::from(move |_: MouseEvent| {
            if *signing_out {
                return;
            }
            signing_out.set(true);

            let client = services.client.clone();
            let toaster = toaster.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                // The local session is gone even when the remote call fails.
                if let Err(error) = client.sign_out().await {
                    warn!(%error, "Remote sign-out failed");
                }
                info!("Signed out");
                toaster.info("You have been signed out");
                if let Some(navigator) = navigator {
                    navigator.push(&Route::Login);
                }
            });
        })
    };

    let email = auth
        .user()
        .and_then(|u| u.email.clone())
        .unwrap_or_default();
    let name = auth
        .user()
        .and_then(carenest_core::User::display_name)
        .unwrap_or_default();

    html! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">{"Settings"}</h1>

            <section class="bg-white dark:bg-gray-800 rounded-lg shadow-md p-6">
                <h2 class="text-lg font-semibold mb-4">{"Account"}</h2>
                <dl class="grid grid-cols-3 gap-2 text-sm">
                    <dt class="text-gray-500 dark:text-gray-400">{"Name"}</dt>
                    <dd class="col-span-2">{name}</dd>
                    <dt class="text-gray-500 dark:text-gray-400">{"Email"}</dt>
                    <dd class="col-span-2">{email}</dd>
                </dl>
            </section>

            <section class="bg-white dark:bg-gray-800 rounded-lg shadow-md p-6">
                <h2 class="text-lg font-semibold mb-4">{"Change password"}</h2>
                <form {onsubmit}>
                    <TextInput
                        id="new-password"
                        label="New password"
                        input_type="password"
                        autocomplete={Some(AttrValue::from("new-password"))}
                        value={form.password.clone()}
                        oninput={field_setter(&form, |f, v| f.password = v)}
                        error={errors.message(FormField::Password)}
                    />
                    <TextInput
                        id="confirm-new-password"
                        label="Confirm new password"
                        input_type="password"
                        autocomplete={Some(AttrValue::from("new-password"))}
                        value={form.confirm_password.clone()}
                        oninput={field_setter(&form, |f, v| f.confirm_password = v)}
                        error={errors.message(FormField::ConfirmPassword)}
                    />
                    <Button submit=true loading={*saving} loading_text={Some(AttrValue::from("Saving..."))}>
                        {"Update password"}
                    </Button>
                </form>
            </section>

            <section class="bg-white dark:bg-gray-800 rounded-lg shadow-md p-6">
                <h2 class="text-lg font-semibold mb-4">{"Session"}</h2>
                <Button variant={ButtonVariant::Danger} onclick={on_sign_out} loading={*signing_out} loading_text={Some(AttrValue::from("Signing out..."))}>
                    {"Sign out"}
                </Button>
            </section>
        </div>
    }
}
