mod helpers;

use helpers::{call, test_tools, text, ScriptedModel};
use serde_json::json;
use std::io::Cursor;
use todo_chat::chat::{run_chat, FAILURE_MESSAGE, LIMIT_MESSAGE};
use todo_chat::llm::{ChatSession, LlmError, Message};
use todo_chat::todo::store::list_todos;
use todo_chat::tools::declarations;

fn session(model: ScriptedModel) -> ChatSession<ScriptedModel> {
    ChatSession::new(model, "test-model", 256, "You manage to-dos.", declarations())
}

#[tokio::test]
async fn exit_stops_before_reading_further() {
    let (tools, _db) = test_tools();
    let model = ScriptedModel::new(vec![]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("exit\nadd milk\n"), &mut out)
        .await
        .unwrap();

    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn plain_reply_is_printed() {
    let (tools, _db) = test_tools();
    let mut session = session(ScriptedModel::new(vec![text("Hello! What should I add?")]));

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("hi\n"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Hello! What should I add?"));
}

#[tokio::test]
async fn function_call_runs_once_and_result_goes_back() {
    let (tools, db) = test_tools();
    let model = ScriptedModel::new(vec![
        call("call_1", "create_todo", json!({"text": "Buy milk"})),
        text("Added 'Buy milk' to your list."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("remind me to buy milk\nexit\n"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Added 'Buy milk' to your list."));
    assert_eq!(list_todos(&db.lock().unwrap()).unwrap().len(), 1);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].functions.len(), 4);
    match requests[1].messages.last().unwrap() {
        Message::Tool {
            tool_call_id,
            content,
        } => {
            assert_eq!(tool_call_id, "call_1");
            assert!(content.contains("Buy milk"));
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn model_failure_prints_generic_message_and_continues() {
    let (tools, _db) = test_tools();
    let model = ScriptedModel::new(vec![
        Err(LlmError::Api {
            status: 500,
            message: "upstream down".into(),
        }),
        text("Back online."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("first\nsecond\n"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(FAILURE_MESSAGE));
    assert!(out.contains("Back online."));

    // The failed prompt was rolled back: the second request carries only the
    // system prompt and the second user message.
    let requests = requests.lock().unwrap();
    assert_eq!(
        requests[1].messages,
        vec![
            Message::System("You manage to-dos.".into()),
            Message::User("second".into()),
        ]
    );
}

#[tokio::test]
async fn failed_function_is_reported_and_fed_back() {
    let (tools, _db) = test_tools();
    let model = ScriptedModel::new(vec![
        call("call_7", "delete_todo", json!({"id": 7})),
        text("There is no to-do with id 7."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("delete todo 7\n"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(FAILURE_MESSAGE));
    assert!(out.contains("There is no to-do with id 7."));

    let requests = requests.lock().unwrap();
    match requests[1].messages.last().unwrap() {
        Message::Tool { content, .. } => assert!(content.contains("todo not found: 7")),
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn round_limit_without_any_run_discards_the_turn() {
    let (tools, db) = test_tools();
    let model = ScriptedModel::new(vec![
        call("c1", "create_todo", json!({"text": "never added"})),
        text("Hello again."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 0, Cursor::new("add something
hi
"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(FAILURE_MESSAGE));
    assert!(list_todos(&db.lock().unwrap()).unwrap().is_empty());

    // Nothing ran, so nothing of the first prompt is kept.
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 2);
    assert_eq!(requests[1].messages[1], Message::User("hi".into()));
}

#[tokio::test]
async fn round_limit_keeps_completed_writes_in_history() {
    let (tools, db) = test_tools();
    let model = ScriptedModel::new(vec![
        call("c1", "create_todo", json!({"text": "milk"})),
        call("c2", "list_todos", json!({})),
        text("I added milk."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("add milk
what did you add?
"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(!out.contains(FAILURE_MESSAGE), "{out}");
    assert!(out.contains(LIMIT_MESSAGE));
    assert!(out.contains("I added milk."));
    assert_eq!(list_todos(&db.lock().unwrap()).unwrap().len(), 1);

    // The next prompt still sees the create and a refusal for the extra call.
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    let messages = &requests[2].messages;
    let tool_contents: Vec<(&str, &str)> = messages
        .iter()
        .filter_map(|m| match m {
            Message::Tool {
                tool_call_id,
                content,
            } => Some((tool_call_id.as_str(), content.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(tool_contents.len(), 2);
    assert_eq!(tool_contents[0].0, "c1");
    assert!(tool_contents[0].1.contains("milk"));
    assert_eq!(tool_contents[1].0, "c2");
    assert!(tool_contents[1].1.contains("function call limit reached"));
    assert_eq!(
        messages.last().unwrap(),
        &Message::User("what did you add?".into())
    );
}

#[tokio::test]
async fn follow_up_failure_keeps_completed_writes_in_history() {
    let (tools, db) = test_tools();
    let model = ScriptedModel::new(vec![
        call("c1", "create_todo", json!({"text": "eggs"})),
        Err(LlmError::Api {
            status: 503,
            message: "overloaded".into(),
        }),
        text("You have eggs on your list."),
    ]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("add eggs
list
"), &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains(FAILURE_MESSAGE));
    assert_eq!(list_todos(&db.lock().unwrap()).unwrap().len(), 1);

    let requests = requests.lock().unwrap();
    assert!(requests[2].messages.iter().any(|m| matches!(
        m,
        Message::Tool { tool_call_id, content } if tool_call_id == "c1" && content.contains("eggs")
    )));
}

#[tokio::test]
async fn blank_lines_are_skipped_and_eof_ends_the_loop() {
    let (tools, _db) = test_tools();
    let model = ScriptedModel::new(vec![]);
    let requests = model.requests.clone();
    let mut session = session(model);

    let mut out = Vec::new();
    run_chat(&mut session, &tools, 1, Cursor::new("\n   \n"), &mut out)
        .await
        .unwrap();

    assert!(requests.lock().unwrap().is_empty());
}
