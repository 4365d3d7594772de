use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::inputs::key::Key;

/// Something a key press can mean, depending on the view.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    Quit,
    Select,
    Next,
    Previous,
    Filter,
    Refresh,
    Submit,
    Erase,
    Back,
    SwitchField,
    Acknowledge,
}

/// Lookup order when several bound actions could match a key.
static ALL_ACTIONS: [Action; 11] = [
    Action::Quit,
    Action::Select,
    Action::Next,
    Action::Previous,
    Action::Filter,
    Action::Refresh,
    Action::Submit,
    Action::Erase,
    Action::Back,
    Action::SwitchField,
    Action::Acknowledge,
];

impl Action {
    /// Bindings; the first one is shown in the help line.
    pub fn keys(&self) -> &'static [Key] {
        match self {
            Action::Quit => &[Key::Char('q')],
            Action::Select | Action::Submit => &[Key::Enter],
            Action::Next => &[Key::Down, Key::Char('j')],
            Action::Previous => &[Key::Up, Key::Char('k')],
            Action::Filter => &[Key::Char('f')],
            Action::Refresh => &[Key::Char('r')],
            Action::Erase => &[Key::Backspace],
            Action::Back => &[Key::Esc, Key::Char('b')],
            Action::SwitchField => &[Key::Tab],
            Action::Acknowledge => &[Key::Enter, Key::Esc, Key::Char('o')],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Action::Quit => "Quit",
            Action::Select => "Select",
            Action::Next => "Next",
            Action::Previous => "Previous",
            Action::Filter => "Filter",
            Action::Refresh => "Refresh",
            Action::Submit => "Submit",
            Action::Erase => "Erase",
            Action::Back => "Back",
            Action::SwitchField => "Switch Field",
            Action::Acknowledge => "OK",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keys().first() {
            Some(key) => write!(f, "{} {}", key, self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// The actions bound in one view. No two of them may share a key.
#[derive(Default, Debug, Clone)]
pub struct Actions(Vec<Action>);

impl Actions {
    pub fn find(&self, key: Key) -> Option<&Action> {
        ALL_ACTIONS
            .iter()
            .find(|action| self.0.contains(action) && action.keys().contains(&key))
    }
}

/// One line per key bound to more than one action, sorted for stable output.
fn key_conflicts(actions: &[Action]) -> Vec<String> {
    let mut owners: HashMap<Key, Vec<String>> = HashMap::new();
    for action in actions {
        for key in action.keys() {
            owners.entry(*key).or_default().push(action.label().to_string());
        }
    }
    let mut conflicts: Vec<String> = owners
        .into_iter()
        .filter(|(_, labels)| labels.len() > 1)
        .map(|(key, labels)| format!("{} is bound to {}", key, labels.join(" and ")))
        .collect();
    conflicts.sort();
    conflicts
}

impl From<Vec<Action>> for Actions {
    /// # Panics
    ///
    /// When two of `actions` share a key. Bindings are static, so this is a
    /// programming error.
    fn from(actions: Vec<Action>) -> Self {
        let conflicts = key_conflicts(&actions);
        if !conflicts.is_empty() {
            panic!("conflicting key bindings: {}", conflicts.join("; "));
        }
        Self(actions)
    }
}

impl Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let help: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&help.join(" | "))
    }
}
