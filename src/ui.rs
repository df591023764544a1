use crate::api::TaskStore;
use crate::board::{TodoBoard, View};
use crate::task::{DraftEdit, Priority, Status, Task};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Title,
    Description,
    Priority,
    Tasks,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Title, Focus::Description, Focus::Priority, Focus::Tasks];

    fn step(self, direction: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(index + direction).rem_euclid(len) as usize]
    }
}

/// Cursor state that only matters to the terminal front end.
#[derive(Debug, Default)]
pub struct UiState {
    pub focus: Focus,
    pub selected_task: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Reload,
}

pub fn run_app<B: Backend, S: TaskStore>(terminal: &mut Terminal<B>, store: S) -> io::Result<()> {
    let mut board = TodoBoard::new(store);
    let mut state = UiState::default();
    loop {
        render(terminal, &mut board, &state)?;
        if apply_event(&mut board, &mut state, event::read()?) == Control::Quit {
            return Ok(());
        }
    }
}

/// Draws the board, running the pending list refresh first when it is loading.
fn render<B: Backend, S: TaskStore>(
    terminal: &mut Terminal<B>,
    board: &mut TodoBoard<S>,
    state: &UiState,
) -> io::Result<()> {
    if board.is_loading() {
        terminal.draw(|f| draw(f, board, state))?;
        board.refresh();
    }
    terminal.draw(|f| draw(f, board, state))?;
    Ok(())
}

pub fn apply_event<S: TaskStore>(
    board: &mut TodoBoard<S>,
    state: &mut UiState,
    event: Event,
) -> Control {
    let Event::Key(key) = event else {
        return Control::Continue;
    };
    if key.kind != KeyEventKind::Press {
        return Control::Continue;
    }
    let control = handle_key(board, state, key);
    if control == Control::Reload {
        tracing::info!("reloading from scratch");
        board.reset();
        *state = UiState::default();
    }
    control
}

pub fn handle_key<S: TaskStore>(
    board: &mut TodoBoard<S>,
    state: &mut UiState,
    key: KeyEvent,
) -> Control {
    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
    if key.code == KeyCode::Esc || ctrl_c {
        return Control::Quit;
    }

    match board.view() {
        View::Loading => return Control::Continue,
        View::Error(_) => {
            return match key.code {
                KeyCode::Char('r') => Control::Reload,
                KeyCode::Char('q') => Control::Quit,
                _ => Control::Continue,
            };
        }
        View::Ready(_) => {}
    }

    match key.code {
        KeyCode::Tab => state.focus = state.focus.step(1),
        KeyCode::BackTab => state.focus = state.focus.step(-1),
        _ => match state.focus {
            Focus::Title | Focus::Description => edit_text(board, state.focus, key),
            Focus::Priority => match key.code {
                KeyCode::Left => shift_priority(board, -1),
                KeyCode::Right => shift_priority(board, 1),
                KeyCode::Enter => board.submit_draft(),
                _ => {}
            },
            Focus::Tasks => return handle_task_key(board, state, key.code),
        },
    }
    Control::Continue
}

fn edit_text<S: TaskStore>(board: &mut TodoBoard<S>, focus: Focus, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        board.submit_draft();
        return;
    }
    let chord = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    let mut text = match focus {
        Focus::Title => board.draft().title.clone(),
        _ => board.draft().description.clone(),
    };
    match key.code {
        KeyCode::Char(c) if !chord => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => return,
    }
    let edit = match focus {
        Focus::Title => DraftEdit::Title(text),
        _ => DraftEdit::Description(text),
    };
    board.update_draft(edit);
}

fn shift_priority<S: TaskStore>(board: &mut TodoBoard<S>, direction: isize) {
    let priority = board.draft().priority.shift(direction);
    board.update_draft(DraftEdit::Priority(priority));
}

fn handle_task_key<S: TaskStore>(
    board: &mut TodoBoard<S>,
    state: &mut UiState,
    code: KeyCode,
) -> Control {
    match code {
        KeyCode::Char('q') => return Control::Quit,
        KeyCode::Up => state.selected_task = state.selected_task.saturating_sub(1),
        KeyCode::Down => {
            if state.selected_task + 1 < board.tasks().len() {
                state.selected_task += 1;
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(task) = board.tasks().get(state.selected_task).cloned() {
                board.toggle_status(&task);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = board.tasks().get(state.selected_task).map(|t| t.id.clone()) {
                board.remove(&id);
                state.selected_task = state
                    .selected_task
                    .min(board.tasks().len().saturating_sub(1));
            }
        }
        _ => {}
    }
    Control::Continue
}

pub fn draw<S: TaskStore>(f: &mut Frame, board: &TodoBoard<S>, state: &UiState) {
    match board.view() {
        View::Loading => draw_message(f, "Loading...", Style::default(), Block::default()),
        View::Error(message) => draw_message(
            f,
            message,
            Style::default().fg(Color::Red),
            Block::default().title_bottom("r reload | q quit"),
        ),
        View::Ready(tasks) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Length(7),
                    Constraint::Min(3),
                    Constraint::Length(1),
                ])
                .split(f.area());

            let title = Paragraph::new(Line::from(Span::styled(
                "My Todo List",
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center);
            f.render_widget(title, chunks[0]);

            draw_form(f, board, state, chunks[1]);
            draw_tasks(f, tasks, state, chunks[2]);
            f.render_widget(
                Paragraph::new(help_line(state.focus))
                    .style(Style::default().fg(Color::DarkGray)),
                chunks[3],
            );
        }
    }
}

fn draw_message(f: &mut Frame, message: &str, style: Style, block: Block) {
    let text = Paragraph::new(Line::from(Span::styled(message.to_string(), style)))
        .alignment(Alignment::Center)
        .block(block.borders(Borders::ALL));
    f.render_widget(text, f.area());
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_form<S: TaskStore>(f: &mut Frame, board: &TodoBoard<S>, state: &UiState, area: Rect) {
    let draft = board.draft();
    let field = |label: &'static str, value: &str, focus: Focus| {
        let active = state.focus == focus;
        let cursor = if active { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<12}"), focus_style(active)),
            Span::raw(format!("{value}{cursor}")),
        ])
    };

    let mut priorities = vec![Span::styled(
        format!("{:<12}", "Priority"),
        focus_style(state.focus == Focus::Priority),
    )];
    for priority in Priority::ALL {
        let style = if priority == draft.priority {
            priority_style(priority).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        priorities.push(Span::styled(format!(" {priority} "), style));
        priorities.push(Span::raw(" "));
    }

    let lines = vec![
        field("Title", &draft.title, Focus::Title),
        field("Description", &draft.description, Focus::Description),
        Line::from(priorities),
        Line::default(),
        Line::from(Span::styled(
            "+ Add Task (Enter)",
            Style::default().fg(Color::Green),
        )),
    ];

    let form_focused = state.focus != Focus::Tasks;
    let form = Paragraph::new(lines).block(
        Block::default()
            .title("Add New Task")
            .borders(Borders::ALL)
            .border_style(focus_style(form_focused)),
    );
    f.render_widget(form, area);
}

fn priority_style(priority: Priority) -> Style {
    let color = match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    };
    Style::default().fg(color)
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Pending => Style::default().fg(Color::Blue),
        Status::Completed => Style::default().fg(Color::Green),
    }
}

fn task_item(task: &Task) -> ListItem<'_> {
    let title_style = if task.is_completed() {
        Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let toggle_label = if task.is_completed() { "Undo" } else { "Complete" };

    let mut lines = vec![Line::from(vec![
        Span::styled(task.title.as_str(), title_style),
        Span::raw("  "),
        Span::styled(format!("[{}]", task.priority), priority_style(task.priority)),
        Span::raw(" "),
        Span::styled(format!("[{}]", task.status), status_style(task.status)),
        Span::styled(
            format!("  {toggle_label} | Delete"),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", task.description),
            Style::default().fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

fn draw_tasks(f: &mut Frame, tasks: &[Task], state: &UiState, area: Rect) {
    let block = Block::default()
        .title(format!("Tasks ({})", tasks.len()))
        .borders(Borders::ALL)
        .border_style(focus_style(state.focus == Focus::Tasks));

    if tasks.is_empty() {
        let empty = Paragraph::new("No tasks found.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let list = List::new(tasks.iter().map(task_item))
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if state.focus == Focus::Tasks {
        list_state.select(Some(state.selected_task));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn help_line(focus: Focus) -> &'static str {
    match focus {
        Focus::Title | Focus::Description => "type to edit | Enter add | Tab next | Esc quit",
        Focus::Priority => "Left/Right change | Enter add | Tab next | Esc quit",
        Focus::Tasks => "Up/Down select | Space toggle | d delete | Tab next | q quit",
    }
}
