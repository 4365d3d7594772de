pub mod actions;
pub mod snapshot;
pub mod state;
pub mod ui;

use log::{debug, error, info, warn};
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::error::Error;
use crate::inputs::buffer::InputBuffer;
use crate::inputs::key::Key;
use crate::io::{ActionResult, IoEvent, Operation, Outcome};
use actions::{Action, Actions};
use state::{Filter, FilterField, Severity, TableView, Target, ViewState};

const SUCCESS_MESSAGE: &str = "Action completed successfully!";

#[derive(Debug, PartialEq, Eq)]
pub enum AppReturn {
    Exit,
    Continue,
}

/// One outstanding background operation and the view instance waiting on it.
#[derive(Debug)]
struct InFlightAction {
    generation: u64,
    operation: Operation,
    slot: oneshot::Receiver<ActionResult>,
}

/// The view state machine.
///
/// Only the UI loop owns an `App`. Background work never touches the view:
/// each dispatch leaves a one-shot slot here, and `update_on_tick` collects
/// finished slots. Every transition bumps `generation`, and a result is only
/// applied if the generation it was dispatched from is still current.
///
/// An abandoned `ShowLogs` keeps following the stream until the daemon closes
/// it, so its slot stays in `in_flight` for the rest of the session.
pub struct App {
    /// We could dispatch an IO event
    io_tx: mpsc::Sender<IoEvent>,
    /// Contextual actions
    actions: Actions,
    view: ViewState,
    generation: u64,
    in_flight: Vec<InFlightAction>,
    /// Exec/log output may have been written over the last frame.
    redraw: bool,
}

impl App {
    pub fn new(io_tx: mpsc::Sender<IoEvent>) -> Self {
        let view = ViewState::Table(TableView::loading(None));
        let actions = view.get_actions();

        Self {
            io_tx,
            actions,
            view,
            generation: 0,
            in_flight: Vec::new(),
            redraw: false,
        }
    }

    /// Loads the unfiltered table shown at startup.
    pub async fn initialize(&mut self) {
        self.rebuild_table(None).await;
    }

    /// Handle a user action
    pub async fn do_action(&mut self, key: Key) -> AppReturn {
        if key == Key::Ctrl('c') {
            return AppReturn::Exit;
        }
        if self.view.returns_on_any_key() {
            self.rebuild_table(None).await;
            return AppReturn::Continue;
        }
        if let (Some(c), Some(input)) = (key.get_char(), self.view.input_mut()) {
            input.push(c);
            return AppReturn::Continue;
        }
        match self.actions.find(key).copied() {
            Some(action) => self.do_view_action(action).await,
            None => AppReturn::Continue,
        }
    }

    async fn do_view_action(&mut self, action: Action) -> AppReturn {
        match action {
            Action::Quit => return AppReturn::Exit,
            Action::Next => {
                if let ViewState::Table(table) = &mut self.view {
                    table.next();
                }
            }
            Action::Previous => {
                if let ViewState::Table(table) = &mut self.view {
                    table.previous();
                }
            }
            Action::Select => self.select_row(),
            Action::Filter => self.open_filter_form(),
            Action::Refresh => {
                let filter = match &self.view {
                    ViewState::Table(table) => table.filter.clone(),
                    _ => None,
                };
                self.rebuild_table(filter).await;
            }
            Action::Submit => self.submit().await,
            Action::Erase => {
                if let Some(input) = self.view.input_mut() {
                    input.backspace();
                }
            }
            Action::SwitchField => {
                if let ViewState::FilterForm { field, .. } = &mut self.view {
                    *field = field.toggle();
                }
            }
            Action::Back | Action::Acknowledge => self.rebuild_table(None).await,
        }
        AppReturn::Continue
    }

    /// Collects results of finished background operations.
    pub fn update_on_tick(&mut self) -> AppReturn {
        let mut finished = Vec::new();
        self.in_flight
            .retain_mut(|action| match action.slot.try_recv() {
                Ok(result) => {
                    finished.push((action.generation, action.operation.clone(), result));
                    false
                }
                Err(TryRecvError::Empty) => true,
                Err(TryRecvError::Closed) => {
                    error!("Background task for {} ended without a result", action.operation);
                    finished.push((
                        action.generation,
                        action.operation.clone(),
                        Err(Error::BackendOperationFailed(
                            "background task ended without a result".to_string(),
                        )),
                    ));
                    false
                }
            });

        for (generation, operation, result) in finished {
            self.deliver(generation, operation, result);
        }
        AppReturn::Continue
    }

    /// Sends `operation` to the background runner on behalf of the current view.
    ///
    /// A view waits on at most one operation; a second dispatch from the same
    /// view is refused with `Error::ActionPending`.
    pub async fn dispatch(&mut self, operation: Operation) -> Result<(), Error> {
        if self.is_waiting() {
            warn!(
                "Refusing to {}: view {} already waits on an action",
                operation, self.generation
            );
            return Err(Error::ActionPending(operation.to_string()));
        }

        let (reply, slot) = oneshot::channel();
        let event = IoEvent::Perform {
            operation: operation.clone(),
            reply,
        };
        if let Err(e) = self.io_tx.send(event).await {
            error!("Error from dispatch {}", e);
            let err = Error::BackendUnavailable("background worker stopped".to_string());
            self.transition(ViewState::Result {
                message: failure_message(&err),
                severity: Severity::Failure,
            });
            return Err(err);
        }

        debug!("Dispatched {} for view {}", operation, self.generation);
        self.in_flight.push(InFlightAction {
            generation: self.generation,
            operation,
            slot,
        });
        Ok(())
    }

    fn deliver(&mut self, generation: u64, operation: Operation, result: ActionResult) {
        if operation.writes_to_terminal() {
            self.redraw = true;
        }
        if generation != self.generation {
            info!(
                "Discarding result of {}: view {} was replaced by view {}",
                operation, generation, self.generation
            );
            return;
        }

        match result {
            Ok(Outcome::Containers(records)) => match &mut self.view {
                ViewState::Table(table) => table.populate(&records),
                other => warn!("Got a container list for the {} view", other.name()),
            },
            Ok(Outcome::Networks(networks)) => {
                let container = match operation {
                    Operation::NetworkInfo(id) => id,
                    _ => String::new(),
                };
                self.transition(ViewState::NetworkInfo {
                    container,
                    networks,
                });
            }
            Ok(Outcome::Done) => self.transition(ViewState::Result {
                message: SUCCESS_MESSAGE.to_string(),
                severity: Severity::Success,
            }),
            Err(e)
                if matches!(
                    operation,
                    Operation::FilterByName(_) | Operation::FilterByStatus(_)
                ) =>
            {
                self.transition(ViewState::Error {
                    message: e.to_string(),
                })
            }
            Err(e) => self.transition(ViewState::Result {
                message: failure_message(&e),
                severity: Severity::Failure,
            }),
        }
    }

    fn transition(&mut self, view: ViewState) {
        if self.waits_on_terminal_output() {
            self.redraw = true;
        }
        self.generation += 1;
        debug!(
            "View {} -> {} (generation {})",
            self.view.name(),
            view.name(),
            self.generation
        );
        self.actions = view.get_actions();
        self.view = view;
    }

    fn waits_on_terminal_output(&self) -> bool {
        self.in_flight.iter().any(|action| {
            action.generation == self.generation && action.operation.writes_to_terminal()
        })
    }

    /// Installs a fresh, loading table and asks for its content.
    async fn rebuild_table(&mut self, filter: Option<Filter>) {
        let operation = filter.as_ref().map_or(Operation::List, Filter::operation);
        self.transition(ViewState::Table(TableView::loading(filter)));
        if let Err(e) = self.dispatch(operation).await {
            debug!("Table rebuild not dispatched: {}", e);
        }
    }

    /// Shows the pending message, then hands the call to the runner.
    async fn begin_action(&mut self, operation: Operation) {
        self.transition(ViewState::Result {
            message: operation.pending_message().to_string(),
            severity: Severity::Pending,
        });
        if let Err(e) = self.dispatch(operation).await {
            debug!("Action not dispatched: {}", e);
        }
    }

    fn select_row(&mut self) {
        let target = match &self.view {
            ViewState::Table(table) => table.selected_row().map(|row| Target {
                id: row.id.clone(),
                name: row.display_name.clone(),
            }),
            _ => None,
        };
        if let Some(target) = target {
            self.transition(ViewState::ActionMenu {
                target,
                input: InputBuffer::new(),
            });
        }
    }

    fn open_filter_form(&mut self) {
        self.transition(ViewState::FilterForm {
            field: FilterField::Name,
            input: InputBuffer::new(),
        });
    }

    async fn submit(&mut self) {
        match &mut self.view {
            ViewState::ActionMenu { target, input } => {
                let line = input.take();
                let target = target.clone();
                self.submit_menu(target, line).await;
            }
            ViewState::CommandPrompt { target, input } => {
                let line = input.take();
                let id = target.id.clone();
                let argv: Vec<String> = line.split_whitespace().map(String::from).collect();
                if !argv.is_empty() {
                    self.begin_action(Operation::Exec { id, argv }).await;
                }
            }
            ViewState::FilterForm { field, input } => {
                let value = input.take().trim().to_string();
                let filter = if value.is_empty() {
                    None
                } else {
                    Some(Filter {
                        field: *field,
                        value,
                    })
                };
                self.rebuild_table(filter).await;
            }
            _ => {}
        }
    }

    /// Only the first character of the line counts. An unknown letter stays in
    /// the buffer as the next candidate.
    async fn submit_menu(&mut self, target: Target, line: String) {
        let letter = match line.chars().next() {
            Some(c) => c.to_ascii_lowercase(),
            None => return,
        };
        let operation = match letter {
            's' => Operation::Start(target.id),
            'x' => Operation::Stop(target.id),
            'r' => Operation::Restart(target.id),
            'p' => Operation::Pause(target.id),
            'u' => Operation::Unpause(target.id),
            'l' => Operation::ShowLogs(target.id),
            'd' => Operation::Remove(target.id),
            'n' => Operation::NetworkInfo(target.id),
            'e' => {
                self.transition(ViewState::CommandPrompt {
                    target,
                    input: InputBuffer::new(),
                });
                return;
            }
            'f' => {
                self.open_filter_form();
                return;
            }
            'b' => {
                self.rebuild_table(None).await;
                return;
            }
            other => {
                debug!("Unknown menu command '{}'", other);
                if let Some(input) = self.view.input_mut() {
                    input.push(other);
                }
                return;
            }
        };
        self.begin_action(operation).await;
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }
    pub fn view(&self) -> &ViewState {
        &self.view
    }
    pub fn generation(&self) -> u64 {
        self.generation
    }
    /// Whether the current view waits on a background operation.
    pub fn is_waiting(&self) -> bool {
        self.in_flight
            .iter()
            .any(|action| action.generation == self.generation)
    }
    /// Whether the next frame must repaint the whole screen. Clears the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }
    /// Outstanding operations, stale ones included.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

fn failure_message(e: &Error) -> String {
    format!("Failed to perform action: {}", e)
}
