mod app;
mod auth_guard;
mod pages;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    carenest_frontend_common::logging::init(tracing::Level::INFO);
    yew::Renderer::<App>::new().render();
}
