use crate::app::Route;
use carenest_frontend_common::use_auth;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let auth = use_auth();
    let name = auth
        .user()
        .and_then(carenest_core::User::display_name)
        .unwrap_or_else(|| "there".to_string());

    html! {
        <div class="bg-white dark:bg-gray-800 rounded-lg shadow-md p-6">
            <h1 class="text-2xl font-bold mb-2">{format!("Welcome, {name}")}</h1>
            <p class="text-gray-600 dark:text-gray-400 mb-4">
                {"Your appointments and sessions will appear here."}
            </p>
            <Link<Route> to={Route::Settings} classes="text-teal-700 dark:text-teal-300 hover:underline">
                {"Account settings"}
            </Link<Route>>
        </div>
    }
}
