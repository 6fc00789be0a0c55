use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::state::app_state::{PhaseView, Scoreboard, TeamPanel};
use crate::ui::layout::LayoutAreas;
use scoreboard_engine::{
    BallState, BoccePhase, ClockMode, CurlingPhase, Indicator, STONES_PER_END, Side, Sport,
};

const TEAM_COLORS: [Color; 2] = [Color::Cyan, Color::Magenta];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);
        let board = &app.state.board;

        if !app.settings.full_screen {
            draw_header(f, layout.header, board);
            draw_detail(f, layout.detail, board);
        }
        for side in Side::BOTH {
            draw_team(f, layout.teams[side.index()], board, side);
        }
        draw_status(f, layout.status, app);
        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        if let Some(entry) = app.state.name_entry.as_ref() {
            draw_name_entry(f, f.area(), entry.side, &entry.input);
        }
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_header(f: &mut Frame, header: [Rect; 2], board: &Scoreboard) {
    let round = match board.sport {
        Sport::Bocce => format!("Frame {}", board.frame),
        Sport::Curling => format!("End {}", board.end),
    };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", board.sport.label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {round}  ")),
        Span::styled(phase_label(board), Style::default().fg(Color::Gray)),
    ]))
    .block(default_border(Color::White));
    f.render_widget(title, header[0]);

    let clock_style = if board.clock.running {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mode = match board.clock.mode {
        ClockMode::CountDown => "",
        ClockMode::CountUp => " +",
    };
    let clock = Paragraph::new(format!("{}{mode}", board.clock.label()))
        .alignment(Alignment::Center)
        .style(clock_style)
        .block(default_border(Color::White).title(" Clock "));
    f.render_widget(clock, header[1]);
}

fn phase_label(board: &Scoreboard) -> String {
    match board.phase {
        PhaseView::Bocce(BoccePhase::Idle) => "TIME+OK to start".to_string(),
        PhaseView::Bocce(BoccePhase::Playing) => "in play".to_string(),
        PhaseView::Bocce(BoccePhase::Measuring { .. }) => "measuring".to_string(),
        PhaseView::Bocce(BoccePhase::DownAndBack) => "down and back".to_string(),
        PhaseView::Bocce(BoccePhase::Finished) => "final".to_string(),
        PhaseView::Curling(CurlingPhase::ChoosingEnds { cursor }) => {
            format!("how many ends? < {cursor} >  OK to confirm")
        }
        PhaseView::Curling(CurlingPhase::NamingTeams) => "name teams, PWR to start".to_string(),
        PhaseView::Curling(CurlingPhase::InProgress { adding_points: true }) => {
            "adding points".to_string()
        }
        PhaseView::Curling(CurlingPhase::InProgress { .. }) => "in play".to_string(),
        PhaseView::Curling(CurlingPhase::Finished) => "final, PWR for a new game".to_string(),
    }
}

fn draw_team(f: &mut Frame, area: Rect, board: &Scoreboard, side: Side) {
    let team = board.team(side);
    let color = TEAM_COLORS[side.index()];
    let mut title = format!(" {} ", team.name);
    if board.hammer == Some(side) {
        title.push_str("(hammer) ");
    }
    let block = default_border(color).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [score_area, pieces_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);

    let mut lines = vec![Line::from(Span::styled(
        team.score.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if board.adding_points {
        lines.push(Line::from(Span::styled(
            format!("+{}", team.temp_points),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_rows(score_area, 2),
    );

    let pieces = match board.sport {
        Sport::Bocce => ball_line(team, color),
        Sport::Curling => stone_line(team, color),
    };
    f.render_widget(Paragraph::new(pieces).alignment(Alignment::Center), pieces_area);
}

fn ball_line(team: &TeamPanel, color: Color) -> Line<'static> {
    let spans: Vec<Span> = team
        .balls
        .iter()
        .map(|ball| match ball {
            BallState::Landed => Span::styled(" ● ", Style::default().fg(color)),
            BallState::Thrown => Span::styled(" ○ ", Style::default().fg(color)),
            BallState::NotThrown => Span::styled(" · ", Style::default().fg(Color::DarkGray)),
        })
        .collect();
    Line::from(spans)
}

fn stone_line(team: &TeamPanel, color: Color) -> Line<'static> {
    let thrown = STONES_PER_END.saturating_sub(team.stones);
    Line::from(vec![
        Span::styled("◉ ".repeat(usize::from(team.stones)), Style::default().fg(color)),
        Span::styled(
            "· ".repeat(usize::from(thrown)),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn draw_detail(f: &mut Frame, area: Rect, board: &Scoreboard) {
    match board.sport {
        Sport::Bocce => draw_indicator(f, area, board),
        Sport::Curling => {
            let [ends, indicator] =
                Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(area);
            draw_ends(f, ends, board);
            draw_indicator(f, indicator, board);
        }
    }
}

fn draw_ends(f: &mut Frame, area: Rect, board: &Scoreboard) {
    let total = board.ends_cursor.unwrap_or(board.end);
    let header = Row::new(
        std::iter::once("End".to_string()).chain((1..=total).map(|n| n.to_string())),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let row_for = |side: Side| {
        let cells = (1..=total).map(|n| {
            board
                .locked_ends
                .iter()
                .find(|row| row.end == n)
                .map(|row| match side {
                    Side::Home => row.home_points,
                    Side::Away => row.away_points,
                })
                .map_or_else(|| "-".to_string(), |p| p.to_string())
        });
        Row::new(std::iter::once(board.team(side).name.clone()).chain(cells))
            .style(Style::default().fg(TEAM_COLORS[side.index()]))
    };

    let widths = std::iter::once(Constraint::Length(12))
        .chain((1..=total).map(|_| Constraint::Length(3)))
        .collect::<Vec<_>>();
    let table = Table::new(vec![row_for(Side::Home), row_for(Side::Away)], widths)
        .header(header)
        .block(default_border(Color::DarkGray).title(" Ends "));
    f.render_widget(table, area);
}

fn draw_indicator(f: &mut Frame, area: Rect, board: &Scoreboard) {
    let text = board
        .indicator
        .map(|indicator| indicator_label(board, indicator))
        .unwrap_or_default();
    let style = if board.down_and_back {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(style)
            .block(default_border(Color::DarkGray)),
        area,
    );
}

fn indicator_label(board: &Scoreboard, indicator: Indicator) -> String {
    let name = |side: Side| board.team(side).name.clone();
    match indicator {
        Indicator::PallinoNeeded => "Throw the pallino".to_string(),
        Indicator::TeamIn(side) => format!("{} is in", name(side)),
        Indicator::Casino(side) => format!("CASINO for {}!", name(side)),
        Indicator::MeasurementNeeded => "Tie: measure (PLAY)".to_string(),
        Indicator::DownAndBack => "Down and back".to_string(),
        Indicator::AddPointsMode(true) => "Adding points".to_string(),
        Indicator::AddPointsMode(false) => String::new(),
        Indicator::LockedIn => "Locked in ⚡".to_string(),
        Indicator::Hammer(side) => format!("{} has the hammer", name(side)),
        Indicator::ClockExpired => "Time! Overtime running".to_string(),
        Indicator::Reaction(reaction) => reaction.label().to_string(),
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match (&app.state.last_error, &app.state.status) {
        (Some(err), _) => Span::styled(err.clone(), Style::default().fg(Color::Red)),
        (None, Some(status)) => Span::styled(status.clone(), Style::default().fg(Color::Gray)),
        (None, None) => Span::styled(
            "q quit  \" logs  f full screen",
            Style::default().fg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(widget, area);
}

fn draw_name_entry(f: &mut Frame, area: Rect, side: Side, input: &str) {
    let width = 40.min(area.width);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height.saturating_sub(3) / 2,
        width,
        3.min(area.height),
    );
    let title = match side {
        Side::Home => " Home team name ",
        Side::Away => " Away team name ",
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(format!("{input}_"))
            .block(default_border(TEAM_COLORS[side.index()]).title(title)),
        popup,
    );
}

fn centered_rows(area: Rect, rows: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(rows),
        Constraint::Fill(1),
    ])
    .areas(area);
    middle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use tui::backend::TestBackend;

    fn app(args: &[&str]) -> App {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let dir = std::env::temp_dir()
            .join(format!("obie-draw-{}", std::process::id()))
            .display()
            .to_string();
        App::new(
            AppSettings::from_sources(&args, |k| (k == "XDG_CONFIG_HOME").then(|| dir.clone()))
                .unwrap(),
        )
    }

    fn rendered(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn bocce_board_shows_names_and_frame() {
        let mut app = app(&[]);
        app.press(scoreboard_engine::Button::Time);
        app.press(scoreboard_engine::Button::Ok);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        draw(&mut terminal, &mut app);
        let screen = rendered(&terminal);
        assert!(screen.contains("Home"));
        assert!(screen.contains("Away"));
        assert!(screen.contains("Frame 1"));
        assert!(screen.contains("Throw the pallino"));
    }

    #[test]
    fn curling_board_shows_the_ends_grid() {
        let mut app = app(&["--game", "curling"]);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        draw(&mut terminal, &mut app);
        let screen = rendered(&terminal);
        assert!(screen.contains("how many ends?"));
        assert!(screen.contains("Ends"));
    }

    #[test]
    fn tiny_terminals_are_skipped() {
        let mut app = app(&[]);
        let mut terminal = Terminal::new(TestBackend::new(8, 8)).unwrap();
        draw(&mut terminal, &mut app);
        assert!(rendered(&terminal).trim().is_empty());
    }

    #[test]
    fn indicator_labels_use_team_names() {
        let mut board = Scoreboard::new(Sport::Bocce);
        board.teams[1].name = "Pink".into();
        assert_eq!(
            indicator_label(&board, Indicator::Casino(Side::Away)),
            "CASINO for Pink!"
        );
    }
}
