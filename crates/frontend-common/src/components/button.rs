//! Button with a loading state

use super::spinner::InlineSpinner;
use yew::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Danger,
}

impl ButtonVariant {
    const fn classes(self) -> &'static str {
        match self {
            Self::Primary => "bg-teal-600 hover:bg-teal-700 text-white",
            Self::Secondary => {
                "bg-white hover:bg-gray-50 text-gray-800 border border-gray-300 dark:bg-gray-800 dark:text-gray-100 dark:border-gray-600"
            }
            Self::Danger => "bg-red-600 hover:bg-red-700 text-white",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    pub children: Children,
    #[prop_or_default]
    pub onclick: Callback<MouseEvent>,
    #[prop_or_default]
    pub variant: ButtonVariant,
    #[prop_or_default]
    pub loading: bool,
    #[prop_or_default]
    pub disabled: bool,
    /// Render as a form submit button
    #[prop_or_default]
    pub submit: bool,
    #[prop_or_default]
    pub loading_text: Option<AttrValue>,
}

#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    let class = classes!(
        "w-full",
        "disabled:bg-gray-400",
        "disabled:cursor-not-allowed",
        "font-medium",
        "py-3",
        "px-4",
        "rounded-lg",
        "transition-colors",
        "flex",
        "items-center",
        "justify-center",
        props.variant.classes(),
    );

    html! {
        <button
            type={if props.submit { "submit" } else { "button" }}
            onclick={props.onclick.clone()}
            disabled={props.disabled || props.loading}
            aria-busy={props.loading.to_string()}
            {class}
        >
            if props.loading {
                <InlineSpinner />
                if let Some(text) = &props.loading_text {
                    {text.clone()}
                } else {
                    {props.children.clone()}
                }
            } else {
                {props.children.clone()}
            }
        </button>
    }
}
