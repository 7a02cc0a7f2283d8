use std::collections::HashMap;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;

/// Shell-level intent decoded from a key press. Translated into navigation
/// actions by the controller, which knows the current tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    ToggleMenu,
    NextApp,
    PrevApp,
    NextModule,
    PrevModule,
    /// Zero-based index into the visible application tabs.
    SelectApp(usize),
    OpenLogin,
    Logout,
    OpenImpersonation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyChord {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyChord {
    fn new(mut code: KeyCode, modifiers: KeyModifiers) -> Self {
        if let KeyCode::Char(c) = code {
            code = KeyCode::Char(c.to_ascii_lowercase());
        }
        Self { code, modifiers }
    }
}

#[derive(Debug, Default)]
pub struct KeymapEngine {
    global: HashMap<KeyChord, ShellCommand>,
}

impl KeymapEngine {
    pub fn new() -> Self {
        let mut engine = Self::default();
        engine.populate_global();
        engine
    }

    fn populate_global(&mut self) {
        use ShellCommand::*;
        let bindings = [
            (KeyCode::Char('q'), KeyModifiers::NONE, Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL, Quit),
            (KeyCode::Char('m'), KeyModifiers::NONE, ToggleMenu),
            (KeyCode::Tab, KeyModifiers::NONE, NextApp),
            (KeyCode::BackTab, KeyModifiers::SHIFT, PrevApp),
            (KeyCode::Right, KeyModifiers::NONE, NextModule),
            (KeyCode::Left, KeyModifiers::NONE, PrevModule),
            (KeyCode::Char(']'), KeyModifiers::NONE, NextModule),
            (KeyCode::Char('['), KeyModifiers::NONE, PrevModule),
            (KeyCode::Char('l'), KeyModifiers::NONE, OpenLogin),
            (KeyCode::Char('o'), KeyModifiers::NONE, Logout),
            (KeyCode::Char('i'), KeyModifiers::NONE, OpenImpersonation),
        ];
        for (code, modifiers, command) in bindings {
            self.global.insert(KeyChord::new(code, modifiers), command);
        }
    }

    pub fn resolve(&self, event: KeyEvent) -> Option<ShellCommand> {
        if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }
        // Digits pick an application tab directly: 1 is the first tab.
        if let (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) = (event.code, event.modifiers) {
            let index = c.to_digit(10).map_or(0, |digit| digit as usize - 1);
            return Some(ShellCommand::SelectApp(index));
        }
        self.global
            .get(&KeyChord::new(event.code, event.modifiers))
            .copied()
    }
}
