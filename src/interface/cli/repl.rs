use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::util::{is_legacy_shaped, Mapper};

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Derived(String),
    Info(String),
    Error(String),
    Quit,
}

/// Line handling for the interactive prompt, kept apart from the editor so
/// it can be driven directly.
#[derive(Debug)]
pub struct Session {
    mapper: Mapper,
}

impl Session {
    pub fn new(mapper: Mapper) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Every line is derived as-is, including surrounding whitespace;
    /// lines starting with `:` are commands.
    pub fn handle(&mut self, line: &str) -> Reply {
        let Some(command) = line.strip_prefix(':') else {
            return Reply::Derived(self.mapper.derive(line).to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("quit") | Some("q"), None) => Reply::Quit,
            (Some("scheme"), Some(value)) => match value.parse() {
                Ok(scheme) => {
                    self.mapper.scheme = scheme;
                    Reply::Info(format!("scheme = {scheme}"))
                }
                Err(e) => Reply::Error(e),
            },
            (Some("encoding"), Some(value)) => match value.parse() {
                Ok(encoding) => {
                    self.mapper.encoding = encoding;
                    Reply::Info(format!("encoding = {encoding}"))
                }
                Err(e) => Reply::Error(e),
            },
            (Some("check"), Some(value)) => {
                Reply::Info(format!("{value}: legacy shaped = {}", is_legacy_shaped(value)))
            }
            (Some("show"), None) => Reply::Info(format!(
                "scheme = {}, encoding = {}, namespace = {}",
                self.mapper.scheme, self.mapper.encoding, self.mapper.namespace
            )),
            _ => Reply::Error(format!(
                "unknown command ':{command}' (try :scheme, :encoding, :check, :show, :quit)"
            )),
        }
    }
}

pub fn run(mapper: Mapper) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut session = Session::new(mapper);

    println!("{}", "udyoga-id: one identity per line, :quit to exit".bold());

    loop {
        match editor.readline("id> ") {
            Ok(line) => {
                editor.add_history_entry(line.as_str())?;
                match session.handle(&line) {
                    Reply::Derived(id) => println!("{}", id.green()),
                    Reply::Info(msg) => println!("{}", msg.cyan()),
                    Reply::Error(msg) => println!("{}", msg.red()),
                    Reply::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CharEncoding, Scheme};

    #[test]
    fn derives_plain_lines() {
        let mut session = Session::new(Mapper::default());
        assert_eq!(
            session.handle("user_2example1"),
            Reply::Derived("39bd513b-2b82-48a5-813b-513bd8a50000".to_string())
        );
    }

    #[test]
    fn commands_change_settings() {
        let mut session = Session::new(Mapper::default());
        assert!(matches!(session.handle(":scheme v5"), Reply::Info(_)));
        assert!(matches!(session.handle(":encoding scalar"), Reply::Info(_)));
        assert_eq!(session.mapper().scheme, Scheme::V5);
        assert_eq!(session.mapper().encoding, CharEncoding::Scalar);
        assert!(matches!(session.handle(":scheme md5"), Reply::Error(_)));
        assert_eq!(session.handle(":quit"), Reply::Quit);
    }
}
