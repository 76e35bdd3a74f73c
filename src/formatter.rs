use crate::report::ConsoleLine;
use std::io::{self, Write};

const INDENT: &str = "  ";

/// Renders a single console line, without the trailing newline.
pub fn format_line(line: &ConsoleLine) -> String {
    match line {
        ConsoleLine::Info(message) => message.clone(),
        ConsoleLine::Success(message) => format!("✅ {}", message),
        ConsoleLine::Error(message) => format!("❌ {}", message),
        ConsoleLine::Suite { depth, description } => {
            format!("{}{}", INDENT.repeat(*depth), description)
        }
        ConsoleLine::SpecPassed { depth, description } => {
            format!("{}✔ {}", INDENT.repeat(*depth), description)
        }
        ConsoleLine::SpecFailed {
            depth,
            description,
            message,
        } => {
            let pad = INDENT.repeat(*depth);
            match message {
                Some(message) => format!("{pad}✘ {description}\n{pad}  ➤ {message}"),
                None => format!("{pad}✘ {description}"),
            }
        }
    }
}

pub fn write_lines<W: Write>(out: &mut W, lines: &[ConsoleLine]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", format_line(line))?;
    }
    out.flush()
}
