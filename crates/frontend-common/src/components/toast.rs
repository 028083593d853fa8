//! Toast notifications with auto-dismiss

use gloo::timers::callback::Timeout;
use std::cell::Cell;
use std::rc::Rc;
use yew::prelude::*;

/// How long a toast stays on screen
pub const TOAST_DISMISS_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    const fn classes(self) -> &'static str {
        match self {
            Self::Success => "bg-green-50 text-green-800 border-green-200 dark:bg-green-900/40 dark:text-green-200",
            Self::Error => "bg-red-50 text-red-700 border-red-200 dark:bg-red-900/40 dark:text-red-300",
            Self::Info => "bg-blue-50 text-blue-800 border-blue-200 dark:bg-blue-900/40 dark:text-blue-200",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToastList {
    pub toasts: Vec<Toast>,
}

pub enum ToastAction {
    Push(Toast),
    Dismiss(u64),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut toasts = self.toasts.clone();
        match action {
            ToastAction::Push(toast) => toasts.push(toast),
            ToastAction::Dismiss(id) => {
                if !toasts.iter().any(|t| t.id == id) {
                    return self;
                }
                toasts.retain(|t| t.id != id);
            }
        }
        Rc::new(Self { toasts })
    }
}

/// Handle pages use to raise toasts
#[derive(Clone)]
pub struct Toaster {
    dispatcher: UseReducerDispatcher<ToastList>,
    next_id: Rc<Cell<u64>>,
}

impl PartialEq for Toaster {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.next_id, &other.next_id)
    }
}

impl Toaster {
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.dispatcher.dispatch(ToastAction::Push(Toast {
            id,
            kind,
            message: message.into(),
        }));

        let dispatcher = self.dispatcher.clone();
        Timeout::new(TOAST_DISMISS_MS, move || {
            dispatcher.dispatch(ToastAction::Dismiss(id));
        })
        .forget();
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.dispatcher.dispatch(ToastAction::Dismiss(id));
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    pub children: Children,
}

#[function_component(ToastProvider)]
pub fn toast_provider(props: &ToastProviderProps) -> Html {
    let list = use_reducer(ToastList::default);
    let toaster = use_memo((), {
        let dispatcher = list.dispatcher();
        move |_| Toaster {
            dispatcher,
            next_id: Rc::new(Cell::new(0)),
        }
    });

    html! {
        <ContextProvider<Toaster> context={(*toaster).clone()}>
            {props.children.clone()}
            <div class="fixed bottom-4 right-4 z-50 flex flex-col gap-2 max-w-sm" aria-live="polite">
                { for list.toasts.iter().map(|toast| {
                    let ondismiss = {
                        let toaster = (*toaster).clone();
                        let id = toast.id;
                        Callback::from(move |_: MouseEvent| toaster.dismiss(id))
                    };
                    html! {
                        <div key={toast.id.to_string()} role="alert" class={classes!("flex", "items-start", "gap-3", "p-3", "border", "rounded-lg", "shadow", "text-sm", toast.kind.classes())}>
                            <span class="flex-1">{&toast.message}</span>
                            <button type="button" aria-label="Dismiss" class="opacity-60 hover:opacity-100" onclick={ondismiss}>{"×"}</button>
                        </div>
                    }
                }) }
            </div>
        </ContextProvider<Toaster>>
    }
}

/// Hook to raise toasts
#[hook]
pub fn use_toast() -> Toaster {
    use_context::<Toaster>()
        .expect("Toaster not found. Make sure to wrap your component with ToastProvider")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toast(id: u64) -> Toast {
        Toast {
            id,
            kind: ToastKind::Info,
            message: format!("toast {id}"),
        }
    }

    #[test]
    fn dismiss_removes_only_that_toast() {
        let list = Rc::new(ToastList::default())
            .reduce(ToastAction::Push(toast(0)))
            .reduce(ToastAction::Push(toast(1)))
            .reduce(ToastAction::Dismiss(0));
        assert_eq!(list.toasts, vec![toast(1)]);
    }

    #[test]
    fn dismissing_unknown_toast_keeps_state() {
        let list = Rc::new(ToastList::default()).reduce(ToastAction::Push(toast(4)));
        let next = list.clone().reduce(ToastAction::Dismiss(9));
        assert!(Rc::ptr_eq(&list, &next));
    }
}
