use eoex_core::RolePolicy;
use eoex_core::UserDirectory;
use eoex_core::ViewKind;
use eoex_core::nav::NavSnapshot;
use eoex_core::nav::ViewState;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;

use crate::shell::controller::ImpersonationPicker;
use crate::shell::controller::LoginField;
use crate::shell::controller::LoginForm;
use crate::shell::controller::Overlay;
use crate::shell::controller::ShellController;

pub(crate) const NO_APPS_MESSAGE: &str = "No apps available for this role.";
pub(crate) const MODULE_UNAVAILABLE_MESSAGE: &str = "Module unavailable.";

pub struct ShellView<'a> {
    snapshot: &'a NavSnapshot,
    overlay: &'a Overlay,
    status: Option<&'a str>,
    directory: &'a UserDirectory,
    policy: &'a RolePolicy,
}

impl<'a> ShellView<'a> {
    pub fn new(controller: &'a ShellController, snapshot: &'a NavSnapshot) -> Self {
        Self {
            snapshot,
            overlay: controller.overlay(),
            status: controller.status(),
            directory: controller.directory(),
            policy: controller.policy(),
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::from(" EOEX ").bold().reversed(), Span::raw(" ")];
        match &self.snapshot.identity {
            Some(identity) => {
                spans.push(Span::from(identity.label.clone()).bold());
                spans.push(Span::raw(format!(" <{}>", identity.email)));
                if let Some(role) = &self.snapshot.effective_role {
                    spans.push(Span::raw("  role: "));
                    spans.push(Span::from(role.to_string()).cyan());
                }
                if self.snapshot.impersonating {
                    spans.push(Span::raw(" "));
                    spans.push(Span::from("(impersonating)").yellow());
                }
            }
            None => spans.push(Span::from("Not signed in").dim()),
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_app_tabs(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::from("≡ ").cyan()];
        if !self.snapshot.menu_expanded {
            spans.push(Span::from("Menu (m)").dim());
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }
        for (index, tab) in self.snapshot.apps.iter().enumerate() {
            let label = format!(" {} {} ", index + 1, tab.label);
            if tab.active {
                spans.push(Span::styled(label, active_tab_style()));
            } else {
                spans.push(Span::raw(label));
            }
            spans.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_module_tabs(&self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .snapshot
            .modules
            .iter()
            .map(|tab| {
                if tab.active {
                    Span::styled(format!("[{}] ", tab.id), active_tab_style())
                } else {
                    Span::from(format!(" {} ", tab.id)).dim()
                }
            })
            .collect();
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_content(&self, area: Rect, buf: &mut Buffer) {
        match &self.snapshot.view {
            ViewState::SignedOut => self.render_signed_out(area, buf),
            ViewState::NoApplications => notice(NO_APPS_MESSAGE, area, buf),
            ViewState::ModuleUnavailable { .. } => notice(MODULE_UNAVAILABLE_MESSAGE, area, buf),
            ViewState::Module { app, module, view } => {
                let app_label = self.policy.catalog().label(app).unwrap_or(app.as_str());
                let title = format!(" {app_label} · {module} ");
                let block = Block::default().title(title).borders(Borders::ALL);
                let inner = block.inner(area);
                block.render(area, buf);
                Paragraph::new(self.module_lines(app_label, view))
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
        }
    }

    fn module_lines(&self, app_label: &str, view: &ViewKind) -> Vec<Line<'static>> {
        let heading = Line::from(Span::from(view.title().to_string()).bold());
        let mut lines = vec![heading, Line::raw("")];
        match view {
            ViewKind::Dashboard => {
                lines.push(Line::raw(format!("{app_label} overview")));
                lines.push(Line::from("Pick a module with ←/→ or [ and ].".dim()));
            }
            ViewKind::ListView { .. } => lines.push(Line::from("No records to display.".dim())),
            ViewKind::Cards { .. } => lines.push(Line::from("No cards to display.".dim())),
            ViewKind::Reports => lines.push(Line::from("No reports generated yet.".dim())),
            ViewKind::Calendar { .. } => lines.push(Line::from("No scheduled events.".dim())),
            ViewKind::AdminDashboard => {
                lines.push(Line::raw(format!(
                    "Applications: {}",
                    self.policy.catalog().entries().len()
                )));
                lines.push(Line::raw(format!(
                    "Demo accounts: {}",
                    self.directory.entries().len()
                )));
            }
            ViewKind::UserDirectory => {
                lines.push(Line::from(
                    format!("{:<24} {:<30} {:<30} {}", "Name", "Email", "Role", "App").bold(),
                ));
                for row in self.directory.rows(self.policy) {
                    lines.push(Line::raw(format!(
                        "{:<24} {:<30} {:<30} {}",
                        row.label,
                        row.email,
                        row.role.as_str(),
                        row.app
                    )));
                }
            }
        }
        lines
    }

    fn render_signed_out(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().title(" Welcome ").borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);
        let mut lines = vec![
            Line::raw("Sign in to continue. Press l to open the login form."),
            Line::raw(""),
            Line::from("Demo accounts".bold()),
        ];
        for entry in self.directory.entries() {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<24}", entry.label)),
                Span::from(format!("{:<30}", entry.email)).cyan(),
                Span::from(entry.role.to_string()).dim(),
            ]));
        }
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let line = match self.status {
            Some(status) => Line::from(status.to_string().yellow()),
            None if self.snapshot.identity.is_some() => Line::from(
                "Tab/1-9 apps  ←/→ modules  m menu  i impersonate  o logout  q quit".dim(),
            ),
            None => Line::from("l login  q quit".dim()),
        };
        Paragraph::new(line).render(area, buf);
    }
}

impl Widget for ShellView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 20 {
            return;
        }
        let [header, apps, modules, content, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(header, buf);
        if self.snapshot.identity.is_some() {
            self.render_app_tabs(apps, buf);
            self.render_module_tabs(modules, buf);
        }
        self.render_content(content, buf);
        self.render_footer(footer, buf);

        match self.overlay {
            Overlay::None => {}
            Overlay::Login(form) => render_login(form, centered(content, 56, 9), buf),
            Overlay::Impersonate(picker) => {
                let height = (picker.options.len() as u16 + 3).min(content.height);
                render_picker(picker, centered(content, 64, height), buf);
            }
        }
    }
}

fn render_login(form: &LoginForm, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);
    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    block.render(area, buf);

    let field = |label: &str, value: String, focused: bool| {
        let marker = if focused { "> " } else { "  " };
        let value = if focused {
            Span::from(format!("{value}_")).bold()
        } else {
            Span::raw(value)
        };
        Line::from(vec![Span::raw(format!("{marker}{label:<10}")), value])
    };
    let mut lines = vec![
        field("Email", form.email.clone(), form.focus == LoginField::Email),
        field(
            "Password",
            "*".repeat(form.password.chars().count()),
            form.focus == LoginField::Password,
        ),
        Line::raw(""),
    ];
    if form.pending.is_some() {
        lines.push(Line::from("Signing in...".cyan()));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(error.clone().red()));
    } else {
        lines.push(Line::from("Enter to submit, Esc to cancel".dim()));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}

fn render_picker(picker: &ImpersonationPicker, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);
    let block = Block::default()
        .title(" Impersonate user ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    block.render(area, buf);

    let mut rows = vec!["None (use my role)".to_string()];
    rows.extend(
        picker
            .options
            .iter()
            .map(|entry| format!("{} ({})", entry.label, entry.email)),
    );
    let lines: Vec<Line> = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            if index == picker.selected {
                Line::from(Span::styled(format!("> {row}"), active_tab_style()))
            } else {
                Line::raw(format!("  {row}"))
            }
        })
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

fn notice(message: &str, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    block.render(area, buf);
    Paragraph::new(Line::from(message.to_string().yellow())).render(inner, buf);
}

fn active_tab_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
