//! Interactive read-eval-print loop
//!
//! Reads a line, parses it into a [`Command`], checks it against the current
//! state, runs the matching session transition and prints the rendered
//! result. Recoverable errors are printed as `Error: <message>` and the loop
//! carries on; only terminal I/O failures end it early.
//!
//! Input, output and the password prompt are generic so the loop can be
//! driven from a byte slice in tests.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app::{CatalogApi, Outcome, Session, StateKind};
use crate::auth::{Credentials, SecretPrompt};
use crate::cli::command::Command;
use crate::cli::progress::DownloadProgress;
use crate::cli::render;
use crate::constants::render::PROMPT;
use crate::errors::{Result, UserInputError};

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// REPL over a session
pub struct Repl<A, R, W, P>
where
    A: CatalogApi,
    R: AsyncBufRead + Unpin,
    W: Write,
    P: SecretPrompt,
{
    session: Session<A>,
    input: R,
    output: W,
    secrets: P,
    show_progress: bool,
}

impl<A, R, W, P> Repl<A, R, W, P>
where
    A: CatalogApi,
    R: AsyncBufRead + Unpin,
    W: Write,
    P: SecretPrompt,
{
    pub fn new(session: Session<A>, input: R, output: W, secrets: P) -> Self {
        Self {
            session,
            input,
            output,
            secrets,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr during downloads
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn session(&self) -> &Session<A> {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Run until `quit` or end of input
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if reading input or writing output fails
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{}", render::welcome(self.session.registry()))?;

        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let Some(line) = self.read_line().await? else {
                writeln!(self.output)?;
                break;
            };

            match self.execute_line(&line).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) if e.is_recoverable() => {
                    tracing::debug!(category = e.category(), "Command failed: {}", e);
                    writeln!(self.output, "Error: {}", e)?;
                }
                Err(e) => return Err(e),
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    /// Parse and run a single line
    pub async fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = Command::parse(line)? else {
            return Ok(Flow::Continue);
        };
        command.check_allowed(self.session.kind())?;
        tracing::debug!("Running {:?}", command);

        let outcome = match command {
            Command::Quit => return Ok(Flow::Exit),
            Command::Help => {
                let text = render::help(self.session.state(), self.session.registry());
                writeln!(self.output, "{}", text)?;
                return Ok(Flow::Continue);
            }
            Command::Connect { target, auth } => {
                let credentials = self.credentials(auth).await?;
                self.session.connect(&target, credentials).await?
            }
            Command::Url { url, auth } => {
                let credentials = self.credentials(auth).await?;
                self.session.connect_url(&url, credentials).await?
            }
            Command::Number(n) => match self.session.kind() {
                StateKind::Disconnected => self.session.connect(&n.to_string(), None).await?,
                StateKind::Connected => self.session.select(n).await?,
                StateKind::StockSelected => self.session.view(n).await?,
            },
            Command::Select(n) => self.session.select(n).await?,
            Command::Download(n) => self.download(n).await?,
            Command::Back => self.session.back()?,
            Command::Refresh => self.session.refresh().await?,
            Command::Search(query) => self.session.search(&query).await?,
            Command::ListAll => self.session.list_all().await?,
            Command::Next => self.session.next().await?,
            Command::Prev => self.session.prev().await?,
            Command::View(n) => self.session.view(n).await?,
        };

        let text = render::render_outcome(self.session.state(), self.session.registry(), &outcome);
        writeln!(self.output, "{}", text)?;
        Ok(Flow::Continue)
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).await?;
        Ok((read > 0).then_some(line))
    }

    /// Ask for credentials when `--auth` was given
    async fn credentials(&mut self, auth: bool) -> Result<Option<Credentials>> {
        if !auth {
            return Ok(None);
        }

        write!(self.output, "Username: ")?;
        self.output.flush()?;
        let username = self
            .read_line()
            .await?
            .ok_or_else(|| UserInputError::InvalidCredentials {
                reason: "no username given".to_string(),
            })?;

        let password = self.secrets.prompt_secret("Password: ").map_err(|e| {
            UserInputError::InvalidCredentials {
                reason: format!("could not read password: {}", e),
            }
        })?;

        Ok(Some(Credentials::new(username.trim(), password)?))
    }

    async fn download(&mut self, number: Option<usize>) -> Result<Outcome> {
        let mut progress = if self.show_progress {
            DownloadProgress::new("Downloading")
        } else {
            DownloadProgress::hidden("Downloading")
        };

        let result = self
            .session
            .download(number, &mut |written, total| progress.update(written, total))
            .await;

        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.abandon(),
        }
        result
    }
}
