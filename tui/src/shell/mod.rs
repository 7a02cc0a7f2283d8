mod controller;
mod keymap;
mod view;

pub use controller::ControllerOutcome;
pub use controller::ImpersonationPicker;
pub use controller::LoginField;
pub use controller::LoginForm;
pub use controller::Overlay;
pub use controller::ShellController;
pub use keymap::KeymapEngine;
pub use keymap::ShellCommand;
pub use view::ShellView;
