use crossterm::tty::IsTty;
use std::io::{self, StdinLock, Stdout};

/// The streams a program talks to through `INP` and `OUT`.
///
/// `interactive` decides whether `INP` prompts before blocking, it is
/// determined once when the console is created.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl Console<StdinLock<'static>, Stdout> {
    /// Stdin and stdout of the process, interactive if stdin is a terminal.
    #[must_use]
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_tty();
        Self::new(stdin.lock(), io::stdout(), interactive)
    }
}

impl<R, W> Console<R, W> {
    pub const fn new(input: R, output: W, interactive: bool) -> Self {
        Self {
            input,
            output,
            interactive,
        }
    }
    pub const fn is_interactive(&self) -> bool {
        self.interactive
    }
    pub const fn input(&mut self) -> &mut R {
        &mut self.input
    }
    pub const fn output(&mut self) -> &mut W {
        &mut self.output
    }
    pub const fn output_ref(&self) -> &W {
        &self.output
    }
}
