use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use crate::app::{App, Focus, PopupState};
use crate::constants::{
    AMOUNT_ROW_HEIGHT, FOOTER_HEIGHT, HEADER_HEIGHT, INFO_PANEL_HEIGHT, WALLET_PANEL_HEIGHT,
    format_xlm,
};
use crate::stellar::voting_options;
use crate::theme;

/// Render the entire application UI.
pub fn render(app: &App, frame: &mut Frame) {
    let size = frame.area();

    if app.checking_wallet {
        render_loading(frame, size);
        return;
    }

    let chunks = Layout::default()
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(WALLET_PANEL_HEIGHT),
            Constraint::Min(10),
            Constraint::Length(INFO_PANEL_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(size);

    render_header(app, frame, chunks[0]);
    render_wallet_panel(app, frame, chunks[1]);
    render_voting_panel(app, frame, chunks[2]);
    render_info_panel(frame, chunks[3]);
    render_footer(app, frame, chunks[4]);

    match &app.popup {
        PopupState::Message(message) => render_popup(frame, size, " Message ", message, false),
        PopupState::Error(message) => render_popup(frame, size, " Error ", message, true),
        PopupState::None => {}
    }
}

/// Full-screen splash shown while the startup wallet check is pending.
fn render_loading(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(theme::BORDER_STYLE);
    frame.render_widget(block, area);

    let text = Paragraph::new("Checking wallet connection...")
        .style(Style::default().fg(theme::MUTED_COLOR))
        .alignment(Alignment::Center);
    let text_area = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(text, text_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header_block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(theme::FOCUSED_BORDER_STYLE);
    frame.render_widget(header_block, area);

    if area.height <= 2 {
        return;
    }

    let title = Line::from(vec![
        "[".into(),
        "lumen".yellow().bold(),
        "vote".cyan().bold(),
        "] ".into(),
        "vote and support with one payment".fg(theme::MUTED_COLOR),
    ]);
    let title_area = Rect::new(
        area.x + 2,
        area.y + 1,
        area.width.saturating_sub(4).min(50),
        1,
    );
    frame.render_widget(Paragraph::new(title), title_area);

    if area.width > 40 {
        let network_label = Paragraph::new(format!("Network: {}", app.network.as_str()))
            .style(Style::default().fg(theme::PRIMARY_COLOR))
            .alignment(Alignment::Right);
        let network_area = Rect::new(area.right().saturating_sub(20), area.y + 1, 18, 1);
        frame.render_widget(network_label, network_area);
    }
}

fn render_wallet_panel(app: &App, frame: &mut Frame, area: Rect) {
    let wallet_block = Block::default()
        .borders(Borders::ALL)
        .title(" Wallet ")
        .title_style(theme::SELECTED_STYLE)
        .border_set(border::ROUNDED)
        .border_style(theme::BORDER_STYLE);
    let inner = wallet_block.inner(area);
    frame.render_widget(wallet_block, area);

    let lines = match (&app.session, &app.account) {
        (Some(_), account) => {
            let mut lines = vec![Line::from(vec![
                Span::styled("● Connected  ", Style::default().fg(theme::SUCCESS_COLOR)),
                Span::raw(app.display_address().unwrap_or_default()),
            ])];
            if let Some(account) = account {
                lines.push(Line::from(Span::styled(
                    format!(
                        "Balance: {} {}",
                        crate::constants::XLM_SYMBOL,
                        format_xlm(account.balance)
                    ),
                    Style::default().fg(theme::MUTED_COLOR),
                )));
            }
            lines
        }
        (None, _) => vec![
            Line::from(Span::styled(
                "○ Wallet not connected",
                Style::default().fg(theme::WARNING_COLOR),
            )),
            Line::from(Span::styled(
                "Press w to connect your wallet agent",
                Style::default().fg(theme::MUTED_COLOR),
            )),
        ],
    };

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_voting_panel(app: &App, frame: &mut Frame, area: Rect) {
    let panel_block = Block::default()
        .borders(Borders::ALL)
        .title(" Voting and Support ")
        .title_style(theme::SELECTED_STYLE)
        .border_set(border::ROUNDED)
        .border_style(theme::BORDER_STYLE);
    let inner = panel_block.inner(area);
    frame.render_widget(panel_block, area);

    if !app.is_connected() {
        let hint = Paragraph::new("Connect a wallet to cast your vote")
            .style(Style::default().fg(theme::MUTED_COLOR))
            .alignment(Alignment::Center);
        let hint_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        frame.render_widget(hint, hint_area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(7), Constraint::Length(AMOUNT_ROW_HEIGHT)])
        .split(inner);

    render_option_cards(app, frame, rows[0]);
    render_amount_row(app, frame, rows[1]);
}

fn render_option_cards(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (option, column) in voting_options().iter().zip(columns.iter()) {
        let is_selected = app.draft.selected == Some(option.id);
        let is_focused = app.focus == Focus::Options;

        let border_style = if is_selected {
            Style::default().fg(option.color)
        } else if is_focused {
            theme::FOCUSED_BORDER_STYLE
        } else {
            theme::BORDER_STYLE
        };
        let marker = if is_selected { "▶ " } else { "" };
        let card = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {marker}{} {} ", option.icon, option.name))
            .title_style(if is_selected {
                Style::default().fg(option.color).bold()
            } else {
                Style::default()
            })
            .border_set(border::ROUNDED)
            .border_style(border_style);
        let inner = card.inner(*column);
        frame.render_widget(card, *column);

        if inner.height < 4 || inner.width < 6 {
            continue;
        }

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let description = Paragraph::new(option.description)
            .style(Style::default().fg(theme::MUTED_COLOR))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(description, sections[0]);

        let percent = app.result_percent(option.id);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(option.color))
            .ratio(f64::from(percent.min(100)) / 100.0)
            .label(format!("{percent}% of votes"));
        frame.render_widget(gauge, sections[1]);

        let key_hint = Paragraph::new(format!("press {}", option.id))
            .style(Style::default().fg(theme::MUTED_COLOR))
            .alignment(Alignment::Center);
        frame.render_widget(key_hint, sections[2]);
    }
}

fn render_amount_row(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(20)])
        .split(area);

    let amount_focused = app.focus == Focus::Amount;
    let amount_block = Block::default()
        .borders(Borders::ALL)
        .title(" Amount (XLM) ")
        .border_set(border::ROUNDED)
        .border_style(if amount_focused {
            theme::FOCUSED_BORDER_STYLE
        } else {
            theme::BORDER_STYLE
        });
    let amount_inner = amount_block.inner(columns[0]);
    frame.render_widget(amount_block, columns[0]);

    let cursor = if amount_focused { "_" } else { "" };
    let amount_style = if app.draft.amount_value().is_some() {
        Style::default()
    } else {
        Style::default().fg(theme::ERROR_COLOR)
    };
    let amount = Paragraph::new(format!("{}{cursor}", app.draft.amount)).style(amount_style);
    frame.render_widget(amount, amount_inner);

    let mut status_lines = Vec::new();
    if app.submitting {
        status_lines.push(Line::from(Span::styled(
            "Submitting vote...",
            Style::default().fg(theme::WARNING_COLOR),
        )));
    } else if let (Some(option), Some(amount)) = (
        app.draft.selected.and_then(crate::stellar::voting_option),
        app.draft.amount_value(),
    ) {
        status_lines.push(Line::from(vec![
            Span::raw("You will send "),
            Span::styled(format!("{amount} XLM"), Style::default().bold()),
            Span::raw(" to "),
            Span::styled(option.name, Style::default().fg(option.color).bold()),
        ]));
        status_lines.push(Line::from(Span::styled(
            "Press Enter to vote and support",
            Style::default().fg(theme::SUCCESS_COLOR),
        )));
    } else {
        status_lines.push(Line::from(Span::styled(
            "Pick an option (1-3) and enter an amount",
            Style::default().fg(theme::MUTED_COLOR),
        )));
    }

    let status_area = Rect::new(
        columns[1].x + 1,
        columns[1].y + 1,
        columns[1].width.saturating_sub(2),
        columns[1].height.saturating_sub(1),
    );
    frame.render_widget(Paragraph::new(status_lines), status_area);
}

fn render_info_panel(frame: &mut Frame, area: Rect) {
    let cards = [
        ("🗳️ Vote", "Pick one of three options to cast your vote"),
        ("💰 Support", "Your payment goes directly to the option's fund"),
        ("🌟 On-ledger", "Transactions settle on the Stellar test network"),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for ((title, text), column) in cards.iter().zip(columns.iter()) {
        let card = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_set(border::ROUNDED)
            .border_style(theme::BORDER_STYLE);
        let inner = card.inner(*column);
        frame.render_widget(card, *column);

        let body = Paragraph::new(*text)
            .style(Style::default().fg(theme::MUTED_COLOR))
            .wrap(Wrap { trim: true });
        frame.render_widget(body, inner);
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let footer_text = if app.is_connected() {
        "q:Quit  d:Disconnect  1-3/←→:Select  Tab:Focus  Enter:Vote  c:Copy address"
    } else {
        "q:Quit  w:Connect wallet"
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(theme::MUTED_COLOR))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

/// Render a centered message popup.
fn render_popup(frame: &mut Frame, area: Rect, title: &str, message: &str, is_error: bool) {
    let popup_area = centered_popup_area(area, 46, 8);

    let popup_block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(if is_error {
            theme::ERROR_COLOR
        } else {
            theme::PRIMARY_COLOR
        }));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup_block.clone(), popup_area);

    let inner_area = popup_block.inner(popup_area);
    let prompt = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(prompt, inner_area);

    let help_text = "Press Esc to continue";
    let text_area = Rect::new(
        popup_area.x + (popup_area.width.saturating_sub(help_text.len() as u16)) / 2,
        popup_area.y + popup_area.height.saturating_sub(2),
        help_text.len() as u16,
        1,
    );
    let help_msg = Paragraph::new(help_text)
        .style(Style::default().fg(theme::MUTED_COLOR))
        .alignment(Alignment::Center);
    frame.render_widget(help_msg, text_area);
}

/// Computes a centered rectangle of at most the given size.
fn centered_popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
