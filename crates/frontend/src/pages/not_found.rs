use crate::app::Route;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <div class="text-center py-16">
            <h1 class="text-3xl font-bold mb-4">{"Page not found"}</h1>
            <Link<Route> to={Route::Home} classes="text-teal-700 dark:text-teal-300 hover:underline">
                {"Back to home"}
            </Link<Route>>
        </div>
    }
}
