// Terminal input/output for the shell. The shell never touches stdin or
// stdout directly, which lets tests drive it with a scripted console.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

pub trait Console {
    /// Reads one line of input, trimmed. An empty string is a valid answer.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn write_line(&mut self, line: &str);

    fn error(&mut self, message: &str) {
        self.write_line(&format!("[ERRO] {message}"));
    }

    fn success(&mut self, message: &str) {
        self.write_line(&format!("[SUCESSO] {message}"));
    }

    /// Signals that a request is in flight until [`Console::idle`].
    fn busy(&mut self, _message: &str) {}

    fn idle(&mut self) {}
}

/// Console backed by the real terminal.
///
/// Uses `dialoguer` prompts and colours when attached to a terminal, plain
/// line reads otherwise (e.g. when input is piped).
pub struct TermConsole {
    interactive: bool,
    colored: bool,
    spinner: Option<ProgressBar>,
}

impl TermConsole {
    pub fn new() -> Self {
        TermConsole {
            interactive: io::stdin().is_terminal(),
            colored: io::stdout().is_terminal(),
            spinner: None,
        }
    }

    fn read_plain(&self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "entrada encerrada",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TermConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        if !self.interactive {
            return self.read_plain(prompt);
        }
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn error(&mut self, message: &str) {
        if self.colored {
            println!("{} {message}", "[ERRO]".red().bold());
        } else {
            println!("[ERRO] {message}");
        }
    }

    fn success(&mut self, message: &str) {
        if self.colored {
            println!("{} {message}", "[SUCESSO]".green().bold());
        } else {
            println!("[SUCESSO] {message}");
        }
    }

    fn busy(&mut self, message: &str) {
        if !self.colored {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn idle(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
