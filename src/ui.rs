use chrono::Utc;
use flashdeck::{
    card::technology_name,
    filter::Selection,
    stats::mastery,
    tracker::CardStatus,
    util::{format_time, time_ago, truncate},
    SessionPhase,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const RECENT_SESSIONS: usize = 5;

struct Palette {
    accent: Color,
    text: Color,
}

impl Palette {
    fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                accent: Color::Cyan,
                text: Color::White,
            }
        } else {
            Self {
                accent: Color::Blue,
                text: Color::Black,
            }
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_mode(self.dark_mode);
        match self.engine.phase() {
            SessionPhase::Idle => render_browse(self, &palette, area, buf),
            SessionPhase::Active => render_study(self, &palette, area, buf),
            SessionPhase::Reviewing => render_review(self, &palette, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn selection_label(value: &Selection, named: bool) -> String {
    match value {
        Selection::All => "All".to_string(),
        Selection::Only(v) if named => technology_name(v).to_string(),
        Selection::Only(v) => v.clone(),
    }
}

fn render_browse(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let selection = engine.selection();
    let accent_bold = bold().fg(palette.accent);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(1), // technology
            Constraint::Length(1), // category
            Constraint::Length(1), // card count
            Constraint::Length(1),
            Constraint::Length(1), // last session
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("flashdeck", accent_bold))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("technology  ", italic()),
        Span::styled(
            format!("< {} >", selection_label(&selection.technology, true)),
            bold().fg(palette.text),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("category  ", italic()),
        Span::styled(
            format!("< {} >", selection_label(&selection.category, false)),
            bold().fg(palette.text),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let total = engine.total_cards();
    let count = if total == 0 {
        Span::styled("no cards match", bold().fg(Color::Red))
    } else {
        Span::styled(format!("{total} cards"), bold())
    };
    Paragraph::new(count)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    if let Some(last) = engine.session_history().last() {
        Paragraph::new(Span::styled(
            format!(
                "last session: {} cards   {}% acc   {}",
                last.cards_studied,
                last.accuracy,
                format_time(last.time_spent)
            ),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) start / (←→) technology / (↑↓) category / (d)ark mode / (esc)ape",
        italic(),
    ))
    .render(chunks[9], buf);
}

fn render_study(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let stats = engine.stats();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // progress + timer
            Constraint::Length(1), // stats
            Constraint::Length(1),
            Constraint::Min(3),    // card
            Constraint::Length(1), // card meta
            Constraint::Length(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let Some(card) = engine.current_card() else {
        Paragraph::new(Span::styled(
            "no cards match the current filter - (esc) to go back",
            bold().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);
        return;
    };

    let position = engine.current_index() + 1;
    let total = engine.total_cards();
    let clock = format_time(engine.elapsed_secs());
    Paragraph::new(Line::from(vec![
        Span::styled(format!("card {position}/{total}"), bold()),
        Span::raw("   "),
        Span::styled(clock, bold().fg(palette.accent)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let green = bold().fg(Color::Green);
    let red = bold().fg(Color::Red);
    let magenta = bold().fg(Color::Magenta);
    Paragraph::new(Line::from(vec![
        Span::styled(format!("✓ {}", stats.total_correct), green),
        Span::raw("   "),
        Span::styled(format!("✗ {}", stats.total_incorrect), red),
        Span::raw("   "),
        Span::styled(format!("{}% acc", stats.accuracy), bold()),
        Span::raw("   "),
        Span::styled(format!("streak {}", stats.streak), magenta),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let (status_label, status_color) = match engine.card_status(&card.id) {
        CardStatus::Unanswered => ("", palette.accent),
        CardStatus::Correct => (" correct ", Color::Green),
        CardStatus::Incorrect => (" incorrect ", Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(card.question.clone(), bold().fg(palette.text))),
        Line::from(""),
    ];
    if app.show_answer {
        lines.extend(
            card.answer
                .lines()
                .map(|l| Line::from(Span::raw(l.to_string()))),
        );
        if let Some(code) = &card.code_example {
            lines.push(Line::from(""));
            lines.extend(code.lines().map(|l| {
                Line::from(Span::styled(
                    l.to_string(),
                    Style::default().fg(Color::Yellow),
                ))
            }));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "(space) to reveal the answer",
            italic().add_modifier(Modifier::DIM),
        )));
    }

    let title = format!(
        " {} / {} ",
        technology_name(&card.technology),
        truncate(&card.category, 30)
    );
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(status_color))
                .title(Span::styled(title, bold()))
                .title_bottom(Span::styled(status_label, bold().fg(status_color))),
        )
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    let reviewed = time_ago(card.last_reviewed, Utc::now()).to_lowercase();
    let mut meta = vec![
        Span::styled(card.difficulty.to_string(), italic()),
        Span::raw("   "),
        Span::styled(mastery(card).to_string(), italic().fg(palette.accent)),
        Span::raw("   "),
        Span::styled(format!("reviewed {reviewed}"), italic()),
    ];
    if let Some(version) = &card.version {
        meta.push(Span::raw("   "));
        meta.push(Span::styled(version.clone(), italic()));
    }
    Paragraph::new(Line::from(meta))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        "(space) flip / (y)es / (n)o / (←→) move / (esc) end session",
        italic(),
    ))
    .render(chunks[6], buf);
}

fn render_review(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let history = engine.session_history();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // heading
            Constraint::Length(1),
            Constraint::Length(1), // summary
            Constraint::Length(1),
            Constraint::Length(RECENT_SESSIONS as u16 + 2), // recent sessions
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("session complete", bold().fg(palette.accent)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if let Some(summary) = engine.last_summary() {
        Paragraph::new(Span::styled(
            format!(
                "{} cards   {}% acc   {}",
                summary.cards_studied,
                summary.accuracy,
                format_time(summary.time_spent)
            ),
            bold().fg(palette.text),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    let recent: Vec<Line> = history
        .iter()
        .rev()
        .take(RECENT_SESSIONS)
        .map(|s| {
            Line::from(Span::raw(format!(
                "{}  {:>3} cards  {:>3}%  {}",
                truncate(&s.date, 20),
                s.cards_studied,
                s.accuracy,
                format_time(s.time_spent)
            )))
        })
        .collect();
    Paragraph::new(recent)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(Span::styled(" recent sessions ", italic())),
        )
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(r)estart / (b)ack to decks / (d)ark mode / (esc)ape",
        italic(),
    ))
    .render(chunks[7], buf);
}
