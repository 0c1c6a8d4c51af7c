use crate::application::{App, AppMode};
use crate::domain::Grid;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

const HEADER_HEIGHT: u16 = 1;
const BUTTON_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 3;
/// Table borders plus the column label row.
const TABLE_CHROME: u16 = 3;

/// Number of grid rows that fit on a terminal of the given height.
pub fn visible_grid_rows(terminal_height: u16) -> usize {
    terminal_height
        .saturating_sub(HEADER_HEIGHT + BUTTON_HEIGHT + STATUS_HEIGHT + TABLE_CHROME)
        .max(1) as usize
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_grid(f, app, chunks[1]);
    render_export_button(f, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "gridform | Cell: {}{} | {} filled",
        Grid::column_label(app.selected_col),
        app.selected_row + 1,
        app.grid.filled_cells()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = area.height.saturating_sub(TABLE_CHROME) as usize;
    let cols = app.grid.cols();

    let mut headers = vec![Cell::from("")];
    for col in 0..cols {
        let style = if col == app.selected_col {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        headers.push(Cell::from(Grid::column_label(col)).style(style));
    }
    let mut rows = vec![Row::new(headers).height(1)];

    let last_row = (app.scroll_row + visible_rows).min(app.grid.rows());
    for (row, values) in app
        .grid
        .iter_rows()
        .enumerate()
        .take(last_row)
        .skip(app.scroll_row)
    {
        let number_style = if row == app.selected_row {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(number_style)];

        for (col, value) in values.iter().enumerate() {
            let selected = row == app.selected_row && col == app.selected_col;
            let cell = if selected && app.mode == AppMode::Editing {
                Cell::from(editing_text(app)).style(Style::default().bg(Color::Green).fg(Color::Black))
            } else if selected {
                Cell::from(value.as_str()).style(Style::default().bg(Color::Blue).fg(Color::White))
            } else {
                Cell::from(value.as_str())
            };
            cells.push(cell);
        }
        rows.push(Row::new(cells).height(1));
    }

    let mut widths = vec![Constraint::Length(4)];
    widths.extend((0..cols).map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Form"))
        .column_spacing(1);
    f.render_widget(table, area);
}

/// The edit buffer with a bar marking the cursor.
fn editing_text(app: &App) -> String {
    let mut text: String = app.input.chars().take(app.cursor_position).collect();
    text.push('|');
    text.extend(app.input.chars().skip(app.cursor_position));
    text
}

fn render_export_button(f: &mut Frame, area: Rect) {
    let button = Paragraph::new("Download Excel  [e]")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
    f.render_widget(button, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => app.status_message.clone().unwrap_or_else(|| {
            "Enter: edit | Del: clear cell | e: download Excel | Ctrl+X: clear all | ?: help | q: quit"
                .to_string()
        }),
        AppMode::Editing => "Editing (saved as you type) | Enter: done | Esc: undo edit".to_string(),
        AppMode::Help => "↑↓/jk: scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ConfirmClear => "Clear every cell? (y to confirm, any other key cancels)".to_string(),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ConfirmClear => Style::default().fg(Color::Red),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;
    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let help_widget = Paragraph::new(help_lines[start_line..end_line].join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("gridform Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"GRIDFORM

A 10 x 5 grid of free-text cells. Every change is saved immediately.

=== NAVIGATION ===
Arrow keys / hjkl   Move between cells
Tab                 Next column
Enter / F2          Edit selected cell
Backspace / Del     Clear selected cell

=== EDITING ===
Typing              Updates the cell and saves on every keystroke
Left / Right        Move cursor
Home / End          Jump to start / end
Enter               Done, move to the cell below
Esc                 Restore the value from before editing

=== EXPORT ===
e / Ctrl+E          Download Excel: writes gridData.xlsx to the cache
                    directory and opens it with the system handler

=== OTHER ===
Ctrl+X              Clear every cell (asks for confirmation)
F1 / ?              Show this help
q                   Quit"#;
