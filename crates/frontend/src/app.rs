use crate::auth_guard::RequireAuth;
use crate::pages::{
    ForgotPasswordPage, HomePage, LoginPage, NotFoundPage, ResetPasswordPage, SettingsPage,
    SignUpPage,
};
use carenest_frontend_common::auth::use_is_authenticated;
use carenest_frontend_common::{
    AppServices, AuthProvider, SessionErrorMonitor, ServicesProvider, StuckPageEscape,
    ToastProvider, config,
};
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/signup")]
    SignUp,
    #[at("/forgot-password")]
    ForgotPassword,
    #[at("/reset-password")]
    ResetPassword,
    #[at("/settings")]
    Settings,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <RequireAuth><HomePage /></RequireAuth> },
        Route::Login => html! { <LoginPage /> },
        Route::SignUp => html! { <SignUpPage /> },
        Route::ForgotPassword => html! { <ForgotPasswordPage /> },
        Route::ResetPassword => html! { <ResetPasswordPage /> },
        Route::Settings => html! { <RequireAuth><SettingsPage /></RequireAuth> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let services = use_memo((), |_| AppServices::browser(config::load()));

    html! {
        <ServicesProvider services={(*services).clone()}>
            <ToastProvider>
                <AuthProvider>
                    <BrowserRouter>
                        <AppContent />
                    </BrowserRouter>
                </AuthProvider>
            </ToastProvider>
        </ServicesProvider>
    }
}

#[function_component(AppContent)]
fn app_content() -> Html {
    // Bumped after an automatic recovery so routed pages remount and reload their data.
    let epoch = use_state(|| 0_u32);
    let on_refresh = {
        let epoch = epoch.clone();
        Callback::from(move |()| epoch.set(epoch.wrapping_add(1)))
    };

    html! {
        <div class="min-h-screen bg-gray-50 dark:bg-gray-900 text-gray-900 dark:text-gray-100">
            <SessionErrorMonitor {on_refresh} />
            <Header />
            <main key={epoch.to_string()} class="max-w-3xl mx-auto px-4 py-8">
                <Switch<Route> render={switch} />
            </main>
            <StuckPageEscape />
        </div>
    }
}

#[function_component(Header)]
fn header() -> Html {
    let is_authenticated = use_is_authenticated();

    html! {
        <header class="bg-white dark:bg-gray-800 shadow-sm">
            <nav class="max-w-3xl mx-auto px-4 py-3 flex items-center justify-between">
                <Link<Route> to={Route::Home} classes="text-lg font-semibold text-teal-700 dark:text-teal-300">
                    {"CareNest"}
                </Link<Route>>
                if is_authenticated {
                    <Link<Route> to={Route::Settings} classes="text-sm text-gray-600 dark:text-gray-300 hover:underline">
                        {"Settings"}
                    </Link<Route>>
                } else {
                    <Link<Route> to={Route::Login} classes="text-sm text-gray-600 dark:text-gray-300 hover:underline">
                        {"Sign in"}
                    </Link<Route>>
                }
            </nav>
        </header>
    }
}
