//! Labelled text input with an inline error

use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct TextInputProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub value: AttrValue,
    pub oninput: Callback<String>,
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
    #[prop_or_default]
    pub autocomplete: Option<AttrValue>,
    #[prop_or_default]
    pub error: Option<String>,
    #[prop_or_default]
    pub disabled: bool,
}

#[function_component(TextInput)]
pub fn text_input(props: &TextInputProps) -> Html {
    let oninput = {
        let oninput = props.oninput.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            oninput.emit(input.value());
        })
    };

    let error_id = format!("{}-error", props.id);
    let border = if props.error.is_some() {
        "border-red-500 focus:ring-red-500"
    } else {
        "border-gray-300 dark:border-gray-600 focus:ring-teal-500"
    };

    html! {
        <div class="mb-4">
            <label for={props.id.clone()} class="block text-sm font-medium text-gray-700 dark:text-gray-300 mb-1">
                {props.label.clone()}
            </label>
            <input
                id={props.id.clone()}
                type={props.input_type.clone()}
                value={props.value.clone()}
                placeholder={props.placeholder.clone()}
                autocomplete={props.autocomplete.clone()}
                disabled={props.disabled}
                aria-invalid={props.error.is_some().to_string()}
                aria-describedby={props.error.as_ref().map(|_| error_id.clone())}
                class={classes!("w-full", "px-3", "py-2", "border", "rounded-lg", "bg-white", "dark:bg-gray-700", "dark:text-white", "focus:outline-none", "focus:ring-2", border)}
                {oninput}
            />
            if let Some(error) = &props.error {
                <p id={error_id.clone()} class="mt-1 text-sm text-red-600 dark:text-red-400">{error}</p>
            }
        </div>
    }
}
