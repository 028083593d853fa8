mod button;
mod session_error_monitor;
mod spinner;
mod stuck_page_escape;
mod text_input;
mod toast;

pub use button::{Button, ButtonVariant};
pub use session_error_monitor::{SessionErrorMonitor, SessionErrorMonitorProps};
pub use spinner::{InlineSpinner, LoadingSpinner as Spinner};
pub use stuck_page_escape::StuckPageEscape;
pub use text_input::TextInput;
pub use toast::{Toast, ToastKind, ToastProvider, Toaster, use_toast};
