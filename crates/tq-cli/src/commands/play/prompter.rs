//! Line-oriented prompting over any async reader/writer pair.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tq_engine::Answer;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write one line.
    pub async fn say(&mut self, text: &str) -> anyhow::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Show `question` and read the trimmed reply. `None` at end of input.
    pub async fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.write_all(b" ").await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until the reply is a yes/no token. `None` at end of input.
    pub async fn ask_yes_no(&mut self, question: &str) -> anyhow::Result<Option<Answer>> {
        loop {
            let Some(reply) = self.ask(question).await? else {
                return Ok(None);
            };
            match Answer::parse(&reply) {
                Some(answer) => return Ok(Some(answer)),
                None => self.say("Please answer yes or no.").await?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tq_engine::Answer;

    use super::Prompter;

    #[tokio::test]
    async fn ask_returns_trimmed_line_then_none() {
        let mut prompter = Prompter::new("  Alice \n".as_bytes(), Vec::new());
        assert_eq!(prompter.ask("Name?").await.expect("io"), Some("Alice".to_string()));
        assert_eq!(prompter.ask("Name?").await.expect("io"), None);
    }

    #[tokio::test]
    async fn ask_yes_no_reprompts_on_invalid_reply() {
        let mut prompter = Prompter::new("maybe\nY\n".as_bytes(), Vec::new());
        let answer = prompter.ask_yes_no("Ready?").await.expect("io");
        assert_eq!(answer, Some(Answer::Yes));

        let transcript = String::from_utf8(prompter.into_output()).expect("utf8");
        assert_eq!(transcript.matches("Ready?").count(), 2);
        assert!(transcript.contains("Please answer yes or no."));
    }
}
