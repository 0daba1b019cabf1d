//! End-to-end tests of the role state machine with scripted models.

use async_trait::async_trait;
use serde_json::{Value, json};
use sjt_agents::{
    Decision, Director, GenerationTools, LlmDirector, RoleName, RunContext, SequentialDirector,
    SwarmOrchestrator, TranscriptEntry,
};
use sjt_config::DirectorKind;
use sjt_core::{
    CharacterSeed, GenerateRequest, GenerateResponse, Message, Output, PromptSource, Role,
    ToolCall,
};
use sjt_error::{AgentErrorKind, SjtErrorKind, SjtResult};
use sjt_interface::{TextDriver, ToolDefinition, ToolUse};
use sjt_media::CharacterStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const CUES: &str = r#"```json
{"cues": [
  {"cue_id": "cue1", "type": "环境", "content": "班级群聊", "importance": "高", "reason": "群聊"},
  {"cue_id": "cue2", "type": "事件", "content": "同学质疑她的方案", "importance": "中", "reason": "质疑"}
]}
```"#;
const STORYBOARD: &str = r#"{"core_video_prompt": "她盯着手机屏幕，手指停在输入框上。"}"#;
const PROMPT: &str = "A young woman in casual clothes stares at her phone in a dorm room.";
const PASS: &str = r#"{"trait": "神经质", "alignment_check": [], "coverage_reflection": "ok", "pass": true, "correct": "ok"}"#;

/// Answers generation and reflection requests by their system prompt and
/// tool-calling requests from a queue.
#[derive(Default)]
struct ScriptedModel {
    cues_answer: Option<String>,
    prompt_answers: Mutex<VecDeque<String>>,
    tool_turns: Mutex<VecDeque<GenerateResponse>>,
    text_requests: Mutex<Vec<(String, String)>>,
    tool_requests: Mutex<Vec<(Vec<Message>, Vec<String>)>>,
}

impl ScriptedModel {
    fn with_cues_answer(answer: &str) -> Self {
        Self {
            cues_answer: Some(answer.to_string()),
            ..Self::default()
        }
    }

    fn with_prompt_answers(answers: &[&str]) -> Self {
        Self {
            prompt_answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            ..Self::default()
        }
    }

    fn with_tool_turns(turns: Vec<GenerateResponse>) -> Self {
        Self {
            tool_turns: Mutex::new(turns.into()),
            ..Self::default()
        }
    }

    fn text_requests(&self) -> Vec<(String, String)> {
        self.text_requests.lock().unwrap().clone()
    }

    fn count(&self, needle: &str) -> usize {
        self.text_requests()
            .iter()
            .filter(|(system, _)| system.contains(needle))
            .count()
    }
}

#[async_trait]
impl TextDriver for ScriptedModel {
    async fn generate(&self, req: &GenerateRequest) -> SjtResult<GenerateResponse> {
        let system = req.messages()[0].content.clone();
        let user = req.messages()[1].content.clone();
        self.text_requests
            .lock()
            .unwrap()
            .push((system.clone(), user));

        let answer = if system.contains("extract situational cues") {
            self.cues_answer.clone().unwrap_or_else(|| CUES.to_string())
        } else if system.contains("storyboard narrative for a short video") {
            STORYBOARD.to_string()
        } else if system.contains("final prompt for a text-to-video model") {
            self.prompt_answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| PROMPT.to_string())
        } else {
            PASS.to_string()
        };
        Ok(GenerateResponse {
            outputs: vec![Output::Text(answer)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

#[async_trait]
impl ToolUse for ScriptedModel {
    async fn generate_with_tools(
        &self,
        req: &GenerateRequest,
        tools: &[ToolDefinition],
    ) -> SjtResult<GenerateResponse> {
        self.tool_requests.lock().unwrap().push((
            req.messages().clone(),
            tools.iter().map(|tool| tool.name.clone()).collect(),
        ));
        Ok(self
            .tool_turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| GenerateResponse {
                outputs: vec![Output::Text("done".to_string())],
            }))
    }
}

/// Replays a fixed list of decisions.
struct ScriptedDirector {
    decisions: Mutex<VecDeque<Decision>>,
}

impl ScriptedDirector {
    fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into()),
        }
    }
}

#[async_trait]
impl Director for ScriptedDirector {
    async fn decide(&self, _ctx: &RunContext, _conversation: &[Message]) -> SjtResult<Decision> {
        Ok(self
            .decisions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Decision::Finish("out of script".to_string())))
    }

    fn kind(&self) -> DirectorKind {
        DirectorKind::Sequential
    }
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

fn tool_turn(calls: Vec<ToolCall>) -> GenerateResponse {
    GenerateResponse {
        outputs: vec![Output::ToolCalls(calls)],
    }
}

fn character_store(dir: &tempfile::TempDir) -> CharacterStore {
    let store = CharacterStore::new(dir.path().join("role_features.json"));
    store
        .save(&CharacterSeed::default().with_description())
        .unwrap();
    store
}

fn orchestrator(
    model: Arc<ScriptedModel>,
    director: Arc<dyn Director>,
    store: CharacterStore,
    max_turns: u32,
) -> SwarmOrchestrator {
    SwarmOrchestrator::new(GenerationTools::new(model, store), director, max_turns)
}

fn context() -> RunContext {
    RunContext::new(
        "班级群里有同学公开质疑你的方案。",
        CharacterSeed::default().with_description(),
    )
    .with_trait_label("神经质")
}

#[tokio::test]
async fn test_sequential_run_reaches_video_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::default());
    let swarm = orchestrator(
        model.clone(),
        Arc::new(SequentialDirector::new()),
        character_store(&dir),
        25,
    );

    let run = swarm.run(context()).await.unwrap();

    let prompt = run.video_prompt().unwrap();
    assert_eq!(prompt.text, PROMPT);
    assert_eq!(prompt.source, PromptSource::VideoRole);
    assert_eq!(run.context.active, RoleName::Video);
    assert_eq!(run.context.cues.as_ref().unwrap().cues.len(), 2);
    assert_eq!(run.context.verdicts.len(), 3);
    // generate + reflect per role, two handoffs, one finish
    assert_eq!(run.context.turns, 9);

    let handoffs: Vec<_> = run
        .transcript
        .entries()
        .iter()
        .filter_map(|entry| match entry {
            TranscriptEntry::Handoff { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        handoffs,
        vec![
            (RoleName::Cue, RoleName::Storyboard),
            (RoleName::Storyboard, RoleName::Video)
        ]
    );

    // Storyboard and prompt tools see the stored character features
    let requests = model.text_requests();
    let storyboard_user = &requests[2].1;
    let payload: Value = serde_json::from_str(storyboard_user).unwrap();
    assert_eq!(payload["role_features"]["hairstyle"], "短发");
    assert!(payload["cues_data"].as_str().unwrap().contains("cue2"));
}

#[tokio::test]
async fn test_malformed_cues_do_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::with_cues_answer("Sorry, no JSON today."));
    let swarm = orchestrator(
        model,
        Arc::new(SequentialDirector::new()),
        character_store(&dir),
        25,
    );

    let run = swarm.run(context()).await.unwrap();

    let cues = run.context.cues.as_ref().unwrap();
    assert!(cues.cues.is_empty());
    assert_eq!(cues.cues_raw.as_deref(), Some("Sorry, no JSON today."));
    assert!(run.context.storyboard.is_some());
    assert_eq!(run.video_prompt().unwrap().source, PromptSource::VideoRole);
}

#[tokio::test]
async fn test_fallback_uses_video_handoff_payload_only() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::default());
    let director = ScriptedDirector::new(vec![
        Decision::Call(vec![call(
            "c1",
            "transfer_to_storyboard",
            json!({"cues_data": "{\"cues\": []}"}),
        )]),
        Decision::Call(vec![call(
            "c2",
            "transfer_to_video",
            json!({"storyboard_data": "{\"storyboard\": {\"core_video_prompt\": \"from the handoff\"}}"}),
        )]),
        Decision::Finish("nothing to add".to_string()),
    ]);
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 25);

    let run = swarm.run(context()).await.unwrap();

    let prompt = run.video_prompt().unwrap();
    assert_eq!(prompt.source, PromptSource::HandoffFallback);
    assert_eq!(prompt.text, PROMPT);

    // Only the prompt tool ran, fed from the handoff payload
    let requests = model.text_requests();
    assert_eq!(requests.len(), 1);
    let payload: Value = serde_json::from_str(&requests[0].1).unwrap();
    assert_eq!(payload["core_video_prompt"], "from the handoff");
    assert_eq!(model.count("extract situational cues"), 0);
}

#[tokio::test]
async fn test_regenerated_video_prompt_supersedes_first() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::with_prompt_answers(&[
        "first draft",
        "revised draft",
    ]));
    let storyboard = json!({"storyboard_data": STORYBOARD});
    let director = ScriptedDirector::new(vec![
        Decision::Call(vec![call(
            "c1",
            "transfer_to_storyboard",
            json!({"cues_data": "{\"cues\": []}"}),
        )]),
        Decision::Call(vec![call("c2", "transfer_to_video", storyboard.clone())]),
        Decision::Call(vec![call("c3", "generate_video_prompt", storyboard.clone())]),
        Decision::Call(vec![call("c4", "generate_video_prompt", storyboard)]),
        Decision::Finish("done".to_string()),
    ]);
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 25);

    let run = swarm.run(context()).await.unwrap();

    let prompt = run.video_prompt().unwrap();
    assert_eq!(prompt.source, PromptSource::VideoRole);
    assert_eq!(prompt.text, "revised draft");
    assert_eq!(model.count("final prompt for a text-to-video model"), 2);
}

#[tokio::test]
async fn test_no_prompt_and_no_handoff_fails() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::default());
    let director = ScriptedDirector::new(vec![Decision::Finish("giving up".to_string())]);
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 25);

    let run = swarm.run(context()).await.unwrap();

    let error = run.video_prompt().unwrap_err();
    match error.kind() {
        SjtErrorKind::Agent(agent) => assert_eq!(agent.kind, AgentErrorKind::NoVideoPrompt),
        other => panic!("unexpected error: {other}"),
    }
    assert!(model.text_requests().is_empty());
    assert!(run.transcript.output_content().contains(&"giving up".to_string()));
}

#[tokio::test]
async fn test_turn_budget_ends_primary_path() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::default());
    let director = ScriptedDirector::new(
        (0..10)
            .map(|n| {
                Decision::Call(vec![call(
                    &format!("c{n}"),
                    "get_cues",
                    json!({"text": "stem"}),
                )])
            })
            .collect(),
    );
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 3);

    let run = swarm.run(context()).await.unwrap();

    assert_eq!(run.context.turns, 3);
    assert_eq!(model.count("extract situational cues"), 3);
    assert!(run.video_prompt().is_err());
}

#[tokio::test]
async fn test_foreign_tool_is_rejected_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::default());
    let director = ScriptedDirector::new(vec![
        Decision::Call(vec![call(
            "c1",
            "generate_video_prompt",
            json!({"storyboard_data": "{}"}),
        )]),
        Decision::Finish("stop".to_string()),
    ]);
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 25);

    let run = swarm.run(context()).await.unwrap();

    let rejected = run.transcript.entries().iter().find_map(|entry| match entry {
        TranscriptEntry::ToolResult { content, ok, .. } => Some((content.clone(), *ok)),
        _ => None,
    });
    let (content, ok) = rejected.unwrap();
    assert!(!ok);
    assert!(content.contains("has no tool named 'generate_video_prompt'"));
    assert!(model.text_requests().is_empty());
    assert!(run.context.video_prompt.is_none());
}

#[tokio::test]
async fn test_llm_director_drives_all_roles() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::with_tool_turns(vec![
        tool_turn(vec![call("t1", "get_cues", json!({"text": "班级群里"}))]),
        tool_turn(vec![call(
            "t2",
            "transfer_to_storyboard",
            json!({"cues_data": "{\"source_text\": \"班级群里\", \"cues\": []}"}),
        )]),
        tool_turn(vec![
            call("t3", "generate_storyboard", json!({"cues_data": "{}"})),
            call("t4", "transfer_to_video", json!({"storyboard_data": STORYBOARD})),
            call("t5", "reflect_storyboard", json!({"storyboard_data": "{}"})),
        ]),
        tool_turn(vec![call(
            "t6",
            "generate_video_prompt",
            json!({"storyboard_data": STORYBOARD}),
        )]),
    ]));
    let director = LlmDirector::new(model.clone());
    let swarm = orchestrator(model.clone(), Arc::new(director), character_store(&dir), 25);

    let run = swarm.run(context()).await.unwrap();

    assert_eq!(run.video_prompt().unwrap().source, PromptSource::VideoRole);
    assert!(run.context.finished);

    let tool_requests = model.tool_requests.lock().unwrap().clone();
    assert_eq!(tool_requests.len(), 5);
    assert_eq!(
        tool_requests[0].1,
        vec!["get_cues", "reflect_cues", "transfer_to_storyboard"]
    );
    assert_eq!(
        tool_requests[3].1,
        vec!["generate_video_prompt", "reflect_video_prompt"]
    );

    // Every tool call is answered, including the one skipped after the handoff
    let last_conversation = &tool_requests[4].0;
    assert_eq!(last_conversation[0].role, Role::System);
    let answered: Vec<_> = last_conversation
        .iter()
        .filter_map(|message| message.tool_call_id.clone())
        .collect();
    assert_eq!(answered, vec!["t1", "t2", "t3", "t4", "t5", "t6"]);
    let skipped = last_conversation
        .iter()
        .find(|message| message.tool_call_id.as_deref() == Some("t5"))
        .unwrap();
    assert!(skipped.content.starts_with("Skipped"));
    assert_eq!(model.count("review a storyboard"), 0);
}
