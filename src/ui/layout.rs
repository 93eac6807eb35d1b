use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct ExerciseLayout {
    pub header_area: Rect,
    pub content_area: Rect,
    pub feedback_area: Rect,
    pub help_area: Rect,
}

pub struct ReviewLayout {
    pub header_area: Rect,
    pub card_area: Rect,
    pub controls_area: Rect,
    pub help_area: Rect,
}

pub struct SummaryLayout {
    pub header_area: Rect,
    pub content_area: Rect,
    pub help_area: Rect,
}

pub fn calculate_exercise_chunks(area: Rect) -> ExerciseLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(area);

    ExerciseLayout {
        header_area: chunks[0],
        content_area: chunks[1],
        feedback_area: chunks[2],
        help_area: chunks[3],
    }
}

pub fn calculate_review_chunks(area: Rect) -> ReviewLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(area);

    ReviewLayout {
        header_area: chunks[0],
        card_area: chunks[1],
        controls_area: chunks[2],
        help_area: chunks[3],
    }
}

pub fn calculate_summary_chunks(area: Rect) -> SummaryLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    SummaryLayout {
        header_area: chunks[0],
        content_area: chunks[1],
        help_area: chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_layout_heights() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = calculate_exercise_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.feedback_area.height, 4);
        assert_eq!(layout.help_area.height, 4);
        assert!(layout.content_area.height >= 8);
    }

    #[test]
    fn test_review_layout_heights() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = calculate_review_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.controls_area.height, 4);
        assert_eq!(layout.help_area.height, 3);
    }

    #[test]
    fn test_summary_layout_heights() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = calculate_summary_chunks(area);

        assert_eq!(layout.header_area.height, 3);
        assert_eq!(layout.help_area.height, 3);
        assert!(layout.content_area.height >= 10);
    }
}
