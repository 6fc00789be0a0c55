use tui::layout::{Constraint, Layout, Rect, Size};

pub const HEADER_HEIGHT: u16 = 3;
pub const DETAIL_HEIGHT: u16 = 5;
pub const STATUS_HEIGHT: u16 = 1;
pub const LOG_PANE_PERCENT: u16 = 30;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutAreas {
    /// Title and clock.
    pub header: [Rect; 2],
    /// Home and away panels.
    pub teams: [Rect; 2],
    pub detail: Rect,
    pub status: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (board, logs) = if show_logs {
            let [board, logs] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Percentage(LOG_PANE_PERCENT),
            ])
            .areas(area);
            (board, Some(logs))
        } else {
            (area, None)
        };

        if full_screen {
            let [teams, status] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(STATUS_HEIGHT)])
                    .areas(board);
            return LayoutAreas {
                header: [Rect::ZERO, Rect::ZERO],
                teams: Self::split_teams(teams),
                detail: Rect::ZERO,
                status,
                logs,
            };
        }

        let [header, teams, detail, status] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(DETAIL_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(board);

        LayoutAreas {
            header: Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
                .areas(header),
            teams: Self::split_teams(teams),
            detail,
            status,
            logs,
        }
    }

    fn split_teams(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area)
    }
}
