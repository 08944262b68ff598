//! The interactive prompt loop.
//!
//! Reads one line at a time, hands it to the [`ChatSession`], prints the reply,
//! and runs any function calls the model asks for through [`TodoTools`].
//! Every failure is logged and turned into [`FAILURE_MESSAGE`]; the loop
//! keeps going until `exit` or end of input.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::llm::session::ToolResult;
use crate::llm::{ChatModel, ChatSession, ModelReply};
use crate::tools::TodoTools;

pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";
pub const LIMIT_MESSAGE: &str =
    "I stopped before running more functions for that request. Ask again to continue.";
pub const EXIT_COMMAND: &str = "exit";
const TOOL_LIMIT_ERROR: &str = "function call limit reached";
const PROMPT: &str = "> ";

/// Run the chat loop until `exit` or end of input.
///
/// Only I/O errors on `input`/`output` end the loop early.
pub async fn run_chat<M, R, W>(
    session: &mut ChatSession<M>,
    tools: &TodoTools,
    max_tool_rounds: usize,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    M: ChatModel,
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "What would you like to do with your to-do list? (type '{EXIT_COMMAND}' to quit)"
    )?;

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let prompt = line.trim();
        if prompt == EXIT_COMMAND {
            break;
        }
        if prompt.is_empty() {
            continue;
        }

        handle_prompt(session, tools, max_tool_rounds, prompt, &mut output).await?;
    }

    tracing::info!("chat loop finished");
    Ok(())
}

/// One user turn: prompt, optional function calls, follow-up.
async fn handle_prompt<M, W>(
    session: &mut ChatSession<M>,
    tools: &TodoTools,
    max_tool_rounds: usize,
    prompt: &str,
    output: &mut W,
) -> Result<()>
where
    M: ChatModel,
    W: Write,
{
    let checkpoint = session.checkpoint();

    let mut reply = match session.send_user(prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "model call failed");
            session.rollback(checkpoint);
            writeln!(output, "{FAILURE_MESSAGE}")?;
            return Ok(());
        }
    };
    print_text(&reply, output)?;

    // Once a function has run, the transcript must keep its result: the database
    // already reflects it.
    let mut rounds = 0;
    while reply.wants_tool_calls() {
        if rounds >= max_tool_rounds {
            tracing::warn!(rounds, "model kept requesting function calls, giving up on this prompt");
            if rounds == 0 {
                session.rollback(checkpoint);
                writeln!(output, "{FAILURE_MESSAGE}")?;
            } else {
                session.record_tool_results(refuse_tool_calls(&reply));
                writeln!(output, "{LIMIT_MESSAGE}")?;
            }
            return Ok(());
        }
        rounds += 1;

        let results = run_tool_calls(&reply, tools, output).await?;

        reply = match session.send_tool_results(results).await {
            Ok(reply) => reply,
            Err(e) => {
                // The results stay in history; only the model's follow-up is missing.
                tracing::error!(error = %e, "model call with function results failed");
                writeln!(output, "{FAILURE_MESSAGE}")?;
                return Ok(());
            }
        };
        print_text(&reply, output)?;
    }

    Ok(())
}

/// Answer every pending call without running it.
fn refuse_tool_calls(reply: &ModelReply) -> Vec<ToolResult> {
    reply
        .tool_calls
        .iter()
        .map(|call| ToolResult {
            tool_call_id: call.id.clone(),
            content: serde_json::json!({ "error": TOOL_LIMIT_ERROR }).to_string(),
        })
        .collect()
}

/// Run each requested call in order. A failed call is reported to the user and
/// handed back to the model as `{"error": ...}`.
async fn run_tool_calls<W: Write>(
    reply: &ModelReply,
    tools: &TodoTools,
    output: &mut W,
) -> Result<Vec<ToolResult>> {
    let mut results = Vec::with_capacity(reply.tool_calls.len());

    for call in &reply.tool_calls {
        let content = match tools.call(&call.name, &call.arguments).await {
            Ok(content) => content,
            Err(message) => {
                tracing::error!(function = %call.name, error = %message, "function call failed");
                writeln!(output, "{FAILURE_MESSAGE}")?;
                serde_json::json!({ "error": message }).to_string()
            }
        };
        results.push(ToolResult {
            tool_call_id: call.id.clone(),
            content,
        });
    }

    Ok(results)
}

fn print_text<W: Write>(reply: &ModelReply, output: &mut W) -> Result<()> {
    if let Some(text) = &reply.text {
        writeln!(output, "{}", text.trim_end())?;
    }
    Ok(())
}
