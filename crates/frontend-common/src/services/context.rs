//! Application-wide service handles provided through a Yew context

use super::GoTrueClient;
use crate::browser::{DocumentCookies, WebStorage};
use carenest_core::{AppConfig, AuthClient, CookieJar, KeyValueStore, Navigator, SessionWipe};
use std::rc::Rc;
use yew::prelude::*;

/// Everything a page or watchdog needs to reach the outside world
#[derive(Clone)]
pub struct AppServices {
    pub config: Rc<AppConfig>,
    pub client: Rc<GoTrueClient>,
    pub local_storage: Rc<dyn KeyValueStore>,
    pub session_storage: Rc<dyn KeyValueStore>,
    pub cookies: Rc<dyn CookieJar>,
}

impl AppServices {
    /// Services backed by the browser's storage, cookies and the GoTrue client
    pub fn browser(config: AppConfig) -> Self {
        let local_storage: Rc<dyn KeyValueStore> = Rc::new(WebStorage::local());
        let client = Rc::new(GoTrueClient::new(&config, local_storage.clone()));
        Self {
            config: Rc::new(config),
            client,
            local_storage,
            session_storage: Rc::new(WebStorage::session()),
            cookies: Rc::new(DocumentCookies),
        }
    }

    /// The auth client behind its trait
    pub fn auth(&self) -> Rc<dyn AuthClient> {
        self.client.clone()
    }

    /// A wipe over these services that finishes on `navigator`
    pub fn wipe(&self, navigator: Rc<dyn Navigator>) -> SessionWipe {
        SessionWipe::new(
            self.auth(),
            self.local_storage.clone(),
            self.session_storage.clone(),
            self.cookies.clone(),
            navigator,
        )
    }
}

impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client) && self.config == other.config
    }
}

#[derive(Properties, PartialEq)]
pub struct ServicesProviderProps {
    pub services: AppServices,
    pub children: Children,
}

#[function_component(ServicesProvider)]
pub fn services_provider(props: &ServicesProviderProps) -> Html {
    html! {
        <ContextProvider<AppServices> context={props.services.clone()}>
            {props.children.clone()}
        </ContextProvider<AppServices>>
    }
}

/// Hook to reach the application services
#[hook]
pub fn use_services() -> AppServices {
    use_context::<AppServices>()
        .expect("AppServices not found. Make sure to wrap your component with ServicesProvider")
}
