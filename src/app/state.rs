use std::collections::BTreeMap;
use std::fmt::{self, Display};

use chrono::{DateTime, Local};

use super::actions::{Action, Actions};
use super::snapshot::{DisplayRow, Snapshot};
use crate::container_management::ContainerRecord;
use crate::inputs::buffer::InputBuffer;
use crate::io::Operation;

/// The container an action menu or prompt is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Name,
    Status,
}

impl FilterField {
    pub fn toggle(self) -> Self {
        match self {
            FilterField::Name => FilterField::Status,
            FilterField::Status => FilterField::Name,
        }
    }
}

impl Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterField::Name => write!(f, "Name"),
            FilterField::Status => write!(f, "Status"),
        }
    }
}

/// A backend-side filter applied to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: FilterField,
    pub value: String,
}

impl Filter {
    pub fn operation(&self) -> Operation {
        match self.field {
            FilterField::Name => Operation::FilterByName(self.value.clone()),
            FilterField::Status => Operation::FilterByStatus(self.value.clone()),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Pending,
    Success,
    Failure,
}

/// The container list. Installed empty and `loading` until its own list call
/// answers, then populated once.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub snapshot: Snapshot,
    pub filter: Option<Filter>,
    pub loading: bool,
    pub selected: Option<usize>,
    pub refreshed_at: Option<DateTime<Local>>,
}

impl TableView {
    pub fn loading(filter: Option<Filter>) -> Self {
        Self {
            snapshot: Snapshot::default(),
            filter,
            loading: true,
            selected: None,
            refreshed_at: None,
        }
    }

    pub fn populate(&mut self, records: &[ContainerRecord]) {
        self.snapshot = Snapshot::build(records);
        self.loading = false;
        self.selected = if self.snapshot.is_empty() {
            None
        } else {
            Some(0)
        };
        self.refreshed_at = Some(Local::now());
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.selected.and_then(|index| self.snapshot.get(index))
    }

    pub fn next(&mut self) {
        if self.snapshot.is_empty() {
            return;
        }
        let index = match self.selected {
            Some(i) if i + 1 < self.snapshot.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.selected = Some(index);
    }

    pub fn previous(&mut self) {
        if self.snapshot.is_empty() {
            return;
        }
        let index = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.selected = Some(index);
    }
}

/// The one screen currently shown. Replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Table(TableView),
    ActionMenu {
        target: Target,
        input: InputBuffer,
    },
    CommandPrompt {
        target: Target,
        input: InputBuffer,
    },
    FilterForm {
        field: FilterField,
        input: InputBuffer,
    },
    NetworkInfo {
        container: String,
        networks: BTreeMap<String, String>,
    },
    Result {
        message: String,
        severity: Severity,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn get_actions(&self) -> Actions {
        match self {
            ViewState::Table(_) => vec![
                Action::Quit,
                Action::Select,
                Action::Next,
                Action::Previous,
                Action::Filter,
                Action::Refresh,
            ]
            .into(),
            ViewState::ActionMenu { .. } | ViewState::CommandPrompt { .. } => {
                vec![Action::Submit, Action::Erase, Action::Back].into()
            }
            ViewState::FilterForm { .. } => vec![
                Action::Submit,
                Action::Erase,
                Action::SwitchField,
                Action::Back,
            ]
            .into(),
            ViewState::Result {
                severity: Severity::Pending,
                ..
            } => vec![Action::Back].into(),
            ViewState::Error { .. } => vec![Action::Acknowledge].into(),
            ViewState::Result { .. } | ViewState::NetworkInfo { .. } => Actions::default(),
        }
    }

    /// The text field keystrokes go to, for views that collect text.
    pub fn input_mut(&mut self) -> Option<&mut InputBuffer> {
        match self {
            ViewState::ActionMenu { input, .. }
            | ViewState::CommandPrompt { input, .. }
            | ViewState::FilterForm { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Views that go back to the table on whatever key is pressed.
    pub fn returns_on_any_key(&self) -> bool {
        matches!(
            self,
            ViewState::NetworkInfo { .. }
                | ViewState::Result {
                    severity: Severity::Success | Severity::Failure,
                    ..
                }
        )
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ViewState::Table(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Table(_) => "table",
            ViewState::ActionMenu { .. } => "action menu",
            ViewState::CommandPrompt { .. } => "command prompt",
            ViewState::FilterForm { .. } => "filter form",
            ViewState::NetworkInfo { .. } => "network info",
            ViewState::Result { .. } => "result",
            ViewState::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container_management::ContainerState;

    fn populated(count: usize) -> TableView {
        let records: Vec<_> = (0..count)
            .map(|i| {
                ContainerRecord::new(format!("id{}", i), format!("/c{}", i), ContainerState::Running)
            })
            .collect();
        let mut table = TableView::loading(None);
        table.populate(&records);
        table
    }

    #[test]
    fn populate_selects_first_row() {
        let table = populated(2);
        assert!(!table.loading);
        assert_eq!(table.selected, Some(0));
        assert!(table.refreshed_at.is_some());

        let empty = populated(0);
        assert_eq!(empty.selected, None);
        assert!(empty.selected_row().is_none());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut table = populated(2);
        table.previous();
        assert_eq!(table.selected, Some(0));
        table.next();
        table.next();
        assert_eq!(table.selected, Some(1));
        assert_eq!(
            table.selected_row().map(|r| r.display_name.as_str()),
            Some("c1")
        );

        let mut empty = populated(0);
        empty.next();
        assert_eq!(empty.selected, None);
    }

    #[test]
    fn filter_maps_to_backend_query() {
        let by_status = Filter {
            field: FilterField::Status,
            value: "running".to_string(),
        };
        assert_eq!(
            by_status.operation(),
            Operation::FilterByStatus("running".to_string())
        );
        assert_eq!(FilterField::Status.toggle(), FilterField::Name);
    }

    #[test]
    fn every_view_has_consistent_bindings() {
        let views = vec![
            ViewState::Table(TableView::loading(None)),
            ViewState::FilterForm {
                field: FilterField::Name,
                input: InputBuffer::new(),
            },
            ViewState::Result {
                message: String::new(),
                severity: Severity::Pending,
            },
            ViewState::Error {
                message: String::new(),
            },
        ];
        for view in views {
            // Panics on conflicting keys.
            let _ = view.get_actions();
        }
    }
}
