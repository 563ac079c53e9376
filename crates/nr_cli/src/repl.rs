use std::io::Write;
use nr_core::Result;
use nr_inference::ChatAgent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// Read questions line by line until `exit`/`quit` or end of input.
pub async fn chat_loop<R, W>(agent: &mut ChatAgent, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "\nChatting about the latest report on '{}'.", agent.report().topic)?;
    writeln!(output, "Type 'exit' or 'quit' to leave.\n")?;

    let mut lines = input.lines();
    loop {
        write!(output, "You: ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(output, "\nExiting chat.")?;
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            writeln!(output, "Goodbye.")?;
            break;
        }
        if question.is_empty() {
            continue;
        }

        match agent.ask(question).await {
            Ok(answer) => writeln!(output, "Agent: {}\n", answer)?,
            Err(e) => {
                warn!("💬 Model call failed: {}", e);
                writeln!(output, "Agent error: {}\n", e)?;
            }
        }
    }
    Ok(())
}
