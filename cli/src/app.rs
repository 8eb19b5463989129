//! The interactive page: a single-threaded read-eval-render loop around
//! `Controller`.
//!
//! # Design
//! Every command runs to completion before the next line is read. Controller
//! dispatches go through the same `StudentApi::send` as the one-shot queries,
//! and follow-ups (the reload after a create or delete) are executed in the
//! same turn, so the page re-renders once per command.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use snafu::Snafu;
use student_core::{Controller, Dispatch, DraftField, StudentApi, StudentStatus, Transport};
use tracing::debug;

use crate::console::Console;
use crate::render;

pub const HELP: &str = "\
Commands:
  refresh                  reload the student list
  set <field> <value>      edit the new-student form (student_code, first_name,
                           last_name, email, major, year)
  draft                    show the form
  add                      submit the form
  delete <id>              delete a student (asks first)
  show <id>                print one student
  major <name>             list students in a major
  status [status]          list students by status (default: active)
  health                   check the service
  help                     this text
  quit                     leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    Set { field: DraftField, value: String },
    Draft,
    Add,
    Delete(u64),
    Show(u64),
    Major(String),
    Status(Option<StudentStatus>),
    Health,
    Help,
    Quit,
}

#[derive(Debug, Snafu)]
pub enum CommandError {
    #[snafu(display("unknown command {name:?}, type `help` for a list"))]
    Unknown { name: String },

    #[snafu(display("usage: {usage}"))]
    Usage { usage: &'static str },

    #[snafu(display("{message}"))]
    BadArgument { message: String },
}

fn parse_id(arg: &str, usage: &'static str) -> Result<u64, CommandError> {
    if arg.is_empty() {
        return UsageSnafu { usage }.fail();
    }
    arg.parse().map_err(|_| CommandError::BadArgument {
        message: format!("{arg:?} is not a student id"),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match name.to_ascii_lowercase().as_str() {
            "refresh" | "r" => Command::Refresh,
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    return UsageSnafu {
                        usage: "set <field> <value>",
                    }
                    .fail();
                }
                let field = field.parse::<DraftField>().map_err(|err| {
                    CommandError::BadArgument {
                        message: err.to_string(),
                    }
                })?;
                Command::Set {
                    field,
                    value: value.trim().to_string(),
                }
            }
            "draft" | "form" => Command::Draft,
            "add" | "submit" => Command::Add,
            "delete" | "rm" => Command::Delete(parse_id(rest, "delete <id>")?),
            "show" | "get" => Command::Show(parse_id(rest, "show <id>")?),
            "major" => {
                if rest.is_empty() {
                    return UsageSnafu {
                        usage: "major <name>",
                    }
                    .fail();
                }
                Command::Major(rest.to_string())
            }
            "status" => {
                if rest.is_empty() {
                    Command::Status(None)
                } else {
                    let status = rest.parse::<StudentStatus>().map_err(|err| {
                        CommandError::BadArgument {
                            message: err.to_string(),
                        }
                    })?;
                    Command::Status(Some(status))
                }
            }
            "health" => Command::Health,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => {
                return UnknownSnafu {
                    name: name.to_string(),
                }
                .fail()
            }
        };
        Ok(command)
    }
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<T, R, W> {
    api: StudentApi<T>,
    controller: Controller,
    console: Console<R, W>,
}

impl<T: Transport, R: BufRead, W: Write> App<T, R, W> {
    pub fn new(api: StudentApi<T>, console: Console<R, W>) -> Self {
        let controller = Controller::new(api.client().clone());
        Self {
            api,
            controller,
            console,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Mount the page, then handle commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let first = self.controller.mount();
        self.drive(first);
        self.render()?;

        while let Some(line) = self.console.read_line("> ")? {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.handle(command)? == Flow::Quit {
                        break;
                    }
                }
                Err(err) => self.console.print(&err.to_string())?,
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, command: Command) -> io::Result<Flow> {
        debug!(?command, "handling command");
        match command {
            Command::Refresh => {
                let dispatch = self.controller.refresh();
                self.drive(Some(dispatch));
                self.render()?;
            }
            Command::Set { field, value } => {
                if let Err(err) = self.controller.set_draft_field(field, &value) {
                    self.console.print(&err.to_string())?;
                }
            }
            Command::Draft => {
                let text = render::render_draft(self.controller.state().draft());
                self.console.print(&text)?;
            }
            Command::Add => {
                let dispatch = self.controller.submit_draft();
                self.drive(dispatch);
                self.render()?;
            }
            Command::Delete(id) => {
                let dispatch = self.controller.request_delete(id, &mut self.console);
                let listed = self.controller.state().students().iter().any(|s| s.id == id);
                if !listed {
                    self.console.print(&format!("no student with id {id} in the list"))?;
                }
                self.drive(dispatch);
                self.render()?;
            }
            Command::Show(id) => {
                let text = match self.api.get_student(id) {
                    Ok(student) => render::render_student(&student),
                    Err(err) => format!("Error: {err}"),
                };
                self.console.print(&text)?;
            }
            Command::Major(major) => {
                let text = match self.api.list_students_by_major(&major) {
                    Ok(envelope) => render::render_students(&envelope.data, None),
                    Err(err) => format!("Error: {err}"),
                };
                self.console.print(&text)?;
            }
            Command::Status(status) => {
                let text = match self.api.list_students_by_status(status) {
                    Ok(envelope) => render::render_students(&envelope.data, None),
                    Err(err) => format!("Error: {err}"),
                };
                self.console.print(&text)?;
            }
            Command::Health => {
                let text = match self.api.health_check() {
                    Ok(health) => format!("service status: {}", health.status),
                    Err(err) => format!("Error: {err}"),
                };
                self.console.print(&text)?;
            }
            Command::Help => self.console.print(HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Execute a dispatch and every follow-up it produces.
    fn drive(&mut self, first: Option<Dispatch>) {
        let mut next = first;
        while let Some(dispatch) = next {
            let outcome = self.api.send(&dispatch.request);
            next = self
                .controller
                .complete(dispatch.pending, outcome, &mut self.console);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let page = render::render_page(self.controller.state());
        self.console.print(&page)
    }
}
