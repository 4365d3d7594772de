use std::collections::BTreeMap;

use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use super::snapshot::StatusClass;
use super::state::{FilterField, Severity, TableView, Target, ViewState};
use super::App;
use crate::inputs::buffer::InputBuffer;

const MENU_OPTIONS: [(&str, &str); 11] = [
    ("s", "Start"),
    ("x", "Stop"),
    ("r", "Restart"),
    ("p", "Pause"),
    ("u", "Unpause"),
    ("l", "Show Logs"),
    ("d", "Delete"),
    ("n", "Network Info"),
    ("e", "Execute Command"),
    ("f", "Filter"),
    ("b", "Go back"),
];

/// Draws the next frame. tui only writes cells that changed since the last
/// frame, so after exec/log output the screen is cleared first.
pub fn render<B>(terminal: &mut Terminal<B>, app: &mut App) -> std::io::Result<()>
where
    B: Backend,
{
    if app.take_redraw() {
        terminal.clear()?;
    }
    terminal.draw(|rect| draw(rect, app))?;
    Ok(())
}

pub fn draw<B>(rect: &mut Frame<B>, app: &App)
where
    B: Backend,
{
    let size = rect.size();

    // Vertical layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(size);

    draw_body(rect, chunks[0], app.view());

    let help = if app.view().returns_on_any_key() {
        "Press any key to go back to the table".to_string()
    } else {
        format!("{}", app.actions())
    };
    draw_help(rect, chunks[1], &help);
}

fn draw_body<B>(frame: &mut Frame<B>, area: Rect, view: &ViewState)
where
    B: Backend,
{
    match view {
        ViewState::Table(table) => draw_table(frame, area, table),
        ViewState::ActionMenu { target, input } => draw_menu(frame, area, target, input),
        ViewState::CommandPrompt { target, input } => draw_prompt(frame, area, target, input),
        ViewState::FilterForm { field, input } => draw_filter_form(frame, area, *field, input),
        ViewState::NetworkInfo {
            container,
            networks,
        } => draw_networks(frame, area, container, networks),
        ViewState::Result { message, severity } => draw_result(frame, area, message, *severity),
        ViewState::Error { message } => draw_error(frame, area, message),
    }
}

fn draw_table<B>(frame: &mut Frame<B>, area: Rect, table: &TableView)
where
    B: Backend,
{
    let selected_style = Style::default()
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD);

    let header_cells = ["ID", "STATUS", "CONTAINER NAME"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = table.snapshot.rows().iter().map(|row| {
        let status_color = match row.status_class {
            StatusClass::Healthy => Color::Green,
            StatusClass::Unhealthy => Color::Red,
        };
        Row::new(vec![
            Cell::from(row.short_id.clone()),
            Cell::from(row.status_label.clone()).style(Style::default().fg(status_color)),
            Cell::from(row.display_name.clone()),
        ])
        .height(1)
    });

    let mut title = String::from("Containers");
    if let Some(filter) = &table.filter {
        title.push_str(&format!(" [{}]", filter));
    }
    if table.loading {
        title.push_str(" (loading..)");
    } else if let Some(at) = table.refreshed_at {
        title.push_str(&format!(" - updated {}", at.format("%H:%M:%S")));
    }

    let t = Table::new(rows)
        .header(header)
        .block(Block::default().borders(Borders::TOP).title(title))
        .highlight_style(selected_style)
        .widths(&[
            Constraint::Length(14),     // ID
            Constraint::Length(12),     // STATUS
            Constraint::Percentage(60), // NAME
        ])
        .column_spacing(2);

    let mut table_state = TableState::default();
    table_state.select(table.selected);

    frame.render_stateful_widget(t, area, &mut table_state);
}

fn draw_menu<B>(frame: &mut Frame<B>, area: Rect, target: &Target, input: &InputBuffer)
where
    B: Backend,
{
    let mut lines = vec![
        Spans::from(vec![
            Span::raw("You have selected: "),
            Span::styled(target.name.clone(), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(target.id.clone(), Style::default().fg(Color::Green)),
        ]),
        Spans::from(""),
        Spans::from("Options:"),
    ];
    for (letter, label) in MENU_OPTIONS.iter() {
        if matches!(*letter, "l" | "b") {
            lines.push(Spans::from("  ---------------"));
        }
        lines.push(Spans::from(format!("  [ {} ] {}", letter, label)));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(vec![
        Span::raw("Please select your action: "),
        Span::styled(
            input.as_str().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::TOP).title("Actions"));
    frame.render_widget(p, area);
}

fn draw_prompt<B>(frame: &mut Frame<B>, area: Rect, target: &Target, input: &InputBuffer)
where
    B: Backend,
{
    let lines = vec![
        Spans::from(vec![
            Span::raw("Run a command in "),
            Span::styled(target.name.clone(), Style::default().fg(Color::Yellow)),
            Span::raw(", output goes to the terminal."),
        ]),
        Spans::from(""),
        Spans::from(vec![
            Span::styled("$ ", Style::default().fg(Color::Green)),
            Span::raw(input.as_str().to_string()),
        ]),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::TOP).title("Exec CMD"));
    frame.render_widget(p, area);
}

fn draw_filter_form<B>(frame: &mut Frame<B>, area: Rect, field: FilterField, input: &InputBuffer)
where
    B: Backend,
{
    let choice = |candidate: FilterField| {
        let label = format!(" {} ", candidate);
        if candidate == field {
            Span::styled(label, Style::default().bg(Color::Blue).fg(Color::White))
        } else {
            Span::raw(label)
        }
    };
    let lines = vec![
        Spans::from(vec![
            Span::raw("Filter by: "),
            choice(FilterField::Name),
            Span::raw(" "),
            choice(FilterField::Status),
        ]),
        Spans::from(""),
        Spans::from(vec![
            Span::raw("Value: "),
            Span::styled(
                input.as_str().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::TOP).title("Filter"));
    frame.render_widget(p, area);
}

fn draw_networks<B>(
    frame: &mut Frame<B>,
    area: Rect,
    container: &str,
    networks: &BTreeMap<String, String>,
) where
    B: Backend,
{
    let header = Row::new(
        ["NETWORK", "IP ADDRESS"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow))),
    )
    .bottom_margin(1);
    let rows = networks
        .iter()
        .map(|(name, address)| Row::new(vec![Cell::from(name.clone()), Cell::from(address.clone())]));

    let short_id: String = container.chars().take(12).collect();
    let t = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(format!("Networks of {}", short_id)),
        )
        .widths(&[Constraint::Percentage(50), Constraint::Percentage(50)])
        .column_spacing(2);
    frame.render_widget(t, area);
}

fn draw_result<B>(frame: &mut Frame<B>, area: Rect, message: &str, severity: Severity)
where
    B: Backend,
{
    let line = match severity {
        Severity::Pending => Spans::from(Span::raw(message.to_string())),
        Severity::Success => Spans::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Green),
        )),
        Severity::Failure => Spans::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
    };
    let p = Paragraph::new(vec![line])
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::TOP).title("Result"));
    frame.render_widget(p, area);
}

fn draw_error<B>(frame: &mut Frame<B>, area: Rect, message: &str)
where
    B: Backend,
{
    let modal = centered_rect(60, 40, area);
    let lines = vec![
        Spans::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )),
        Spans::from(""),
        Spans::from(Span::styled(
            "[ OK ]",
            Style::default().add_modifier(Modifier::REVERSED),
        )),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("Error"),
        );
    frame.render_widget(Clear, modal);
    frame.render_widget(p, modal);
}

fn draw_help<B>(frame: &mut Frame<B>, chunk: Rect, help_txt: &str)
where
    B: Backend,
{
    let p = Paragraph::new(vec![Spans::from(Span::raw(help_txt))])
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .style(Style::default().fg(Color::White))
                .title("Help")
                .border_type(BorderType::Plain),
        );
    frame.render_widget(p, chunk);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use tui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::container_management::{ContainerRecord, ContainerState};
    use crate::io::{IoEvent, Operation, Outcome};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        terminal.draw(|f| draw(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    fn app_with(view: ViewState) -> App {
        let (io_tx, _io_rx) = mpsc::channel(1);
        let mut app = App::new(io_tx);
        app.transition(view);
        app
    }

    #[test]
    fn table_shows_rows_and_status() {
        let mut table = TableView::loading(None);
        table.populate(&[
            ContainerRecord::new("abc123456789ffff", "/web", ContainerState::Running),
            ContainerRecord::new("def123456789ffff", "/db", ContainerState::Exited),
        ]);
        let screen = render(&app_with(ViewState::Table(table)));

        assert!(screen.contains("CONTAINER NAME"));
        assert!(screen.contains("abc123456789"));
        assert!(!screen.contains("abc123456789f"));
        assert!(screen.contains("RUNNING"));
        assert!(screen.contains("EXITED"));
        assert!(screen.contains("web"));
    }

    #[test]
    fn loading_table_says_so() {
        let screen = render(&app_with(ViewState::Table(TableView::loading(None))));
        assert!(screen.contains("loading"));
    }

    #[test]
    fn menu_echoes_typed_input() {
        let screen = render(&app_with(ViewState::ActionMenu {
            target: Target {
                id: "abc123456789".to_string(),
                name: "web".to_string(),
            },
            input: InputBuffer::from("x"),
        }));
        assert!(screen.contains("You have selected: web"));
        assert!(screen.contains("Please select your action: x"));
    }

    #[test]
    fn error_modal_has_ok_button() {
        let screen = render(&app_with(ViewState::Error {
            message: "filter failed".to_string(),
        }));
        assert!(screen.contains("filter failed"));
        assert!(screen.contains("[ OK ]"));
    }

    #[test]
    fn result_view_offers_the_way_back() {
        let screen = render(&app_with(ViewState::Result {
            message: "Action completed successfully!".to_string(),
            severity: Severity::Success,
        }));
        assert!(screen.contains("Action completed successfully!"));
        assert!(screen.contains("Press any key"));
    }

    fn row(terminal: &Terminal<TestBackend>, y: usize) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer.content()[y * width..(y + 1) * width]
            .iter()
            .map(|cell| cell.symbol.as_str())
            .collect()
    }

    #[tokio::test]
    async fn exec_output_is_wiped_before_the_next_frame() {
        let (io_tx, mut io_rx) = mpsc::channel(4);
        let mut app = App::new(io_tx);
        app.transition(ViewState::Result {
            message: "Executing command..".to_string(),
            severity: Severity::Pending,
        });
        app.dispatch(Operation::Exec {
            id: "abc123456789".to_string(),
            argv: vec!["ls".to_string()],
        })
        .await
        .expect("dispatch");
        let reply = match io_rx.recv().await.expect("exec request") {
            IoEvent::Perform { reply, .. } => reply,
        };

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("test terminal");
        super::render(&mut terminal, &mut app).expect("draw");

        // Command output lands on the terminal behind tui's back.
        let mut ink = tui::buffer::Cell::default();
        ink.set_symbol("Z");
        terminal
            .backend_mut()
            .draw((0..10u16).map(|x| (x, 5u16, &ink)))
            .expect("write output");
        assert!(row(&terminal, 5).starts_with("ZZZZZZZZZZ"));

        reply.send(Ok(Outcome::Done)).expect("app listening");
        app.update_on_tick();
        super::render(&mut terminal, &mut app).expect("draw");

        assert!(!row(&terminal, 5).contains('Z'));
        let screen: String = (0..30).map(|y| row(&terminal, y)).collect();
        assert!(screen.contains("Action completed successfully!"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let backend = TestBackend::new(10, 2);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        let app = app_with(ViewState::Error {
            message: "boom".to_string(),
        });
        terminal.draw(|f| draw(f, &app)).expect("draw");
    }
}
