//! Routed pages

mod forgot_password;
mod home;
mod login;
mod not_found;
mod reset_password;
mod settings;
mod signup;

pub use forgot_password::ForgotPasswordPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use reset_password::ResetPasswordPage;
pub use settings::SettingsPage;
pub use signup::SignUpPage;

use yew::prelude::*;

/// Callback writing an input's value into one field of a form held in state
fn field_setter<F>(form: &UseStateHandle<F>, set: fn(&mut F, String)) -> Callback<String>
where
    F: Clone + 'static,
{
    let form = form.clone();
    Callback::from(move |value| {
        let mut next = (*form).clone();
        set(&mut next, value);
        form.set(next);
    })
}

#[derive(Properties, PartialEq)]
struct AuthCardProps {
    title: AttrValue,
    #[prop_or_default]
    subtitle: Option<AttrValue>,
    children: Children,
}

/// Centered card shared by the sign-in and password pages
#[function_component(AuthCard)]
fn auth_card(props: &AuthCardProps) -> Html {
    html! {
        <div class="max-w-md mx-auto">
            <h1 class="text-2xl font-bold text-gray-800 dark:text-gray-100 mb-2 text-center">{props.title.clone()}</h1>
            if let Some(subtitle) = &props.subtitle {
                <p class="text-gray-600 dark:text-gray-400 mb-6 text-center">{subtitle.clone()}</p>
            }
            <div class="bg-white dark:bg-gray-800 rounded-lg shadow-md p-6">
                {props.children.clone()}
            </div>
        </div>
    }
}
