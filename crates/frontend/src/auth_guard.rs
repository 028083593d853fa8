//! Authentication guard component for protected routes

use crate::app::Route;
use carenest_frontend_common::components::Spinner;
use carenest_frontend_common::use_auth;
use yew::prelude::*;
use yew_router::prelude::Redirect;

#[derive(Properties, PartialEq)]
pub struct RequireAuthProps {
    pub children: Children,
}

/// Renders its children for signed-in users and sends everyone else to the login page
#[function_component(RequireAuth)]
pub fn require_auth(props: &RequireAuthProps) -> Html {
    let auth = use_auth();

    if auth.is_loading {
        return html! {
            <div class="flex flex-col items-center justify-center min-h-[60vh]">
                <Spinner text={Some("Checking your session...".to_string())} />
            </div>
        };
    }

    if auth.session.is_some() {
        return html! { <>{ props.children.clone() }</> };
    }

    html! { <Redirect<Route> to={Route::Login} /> }
}
