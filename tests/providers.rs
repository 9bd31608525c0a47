use std::collections::BTreeSet;
use std::sync::Arc;

use eduagent::{
    agent::{Agent, AgentBuilder},
    agents::TutorAgent,
    errors::{AgentError, AgentResult},
    providers::{
        base::{Generation, Provider},
        configs::OllamaProviderConfig,
        ollama::OllamaProvider,
        types::message::Message,
    },
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

/// Generic test harness for any Provider implementation
struct ProviderTester {
    provider: Arc<dyn Provider>,
}

impl ProviderTester {
    fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    fn test_generate(&self, expected: &str) -> AgentResult<()> {
        let text = self
            .provider
            .generate("What is the capital of France?", false)?
            .into_text()?;
        assert_eq!(text, expected);
        Ok(())
    }

    fn test_chat(&self, expected: &str) -> AgentResult<()> {
        let reply = self.provider.chat(&[Message::user("hi")])?;
        assert_eq!(reply, expected);
        Ok(())
    }

    fn test_list_models(&self, expected: &[&str]) -> AgentResult<()> {
        let models = self.provider.list_models()?;
        let expected: BTreeSet<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(models, expected);
        Ok(())
    }

    fn test_backend_errors(&self, body: &str) {
        let failures = [
            self.provider.generate("hi", false).map(|_| ()),
            self.provider.generate("hi", true).map(|_| ()),
            self.provider.chat(&[Message::user("hi")]).map(|_| ()),
            self.provider.list_models().map(|_| ()),
        ];
        for result in failures {
            let err = result.expect_err("expected a backend error");
            assert!(
                matches!(err, AgentError::Backend { .. }),
                "unexpected error: {err:?}"
            );
            assert!(err.to_string().contains(body), "body missing from: {err}");
        }
    }
}

fn ollama_for(server: &ServerGuard) -> AgentResult<Arc<dyn Provider>> {
    let config =
        OllamaProviderConfig::new(server.url(), "llama3".to_string()).with_auto_start(false);
    Ok(Arc::new(OllamaProvider::new(config)?))
}

fn healthy_server() -> ServerGuard {
    let mut server = Server::new();
    server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"llama3","response":"Paris","done":true}"#)
        .create();
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":{"role":"assistant","content":"hello"},"done":true}"#)
        .create();
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"llama3"},{"name":"mistral"}]}"#)
        .create();
    server
}

#[test]
fn test_ollama_provider() -> AgentResult<()> {
    let server = healthy_server();
    let tester = ProviderTester::new(ollama_for(&server)?);

    tester.test_generate("Paris")?;
    tester.test_chat("hello")?;
    tester.test_list_models(&["llama3", "mistral"])?;
    Ok(())
}

#[test]
fn test_ollama_provider_server_errors() -> AgentResult<()> {
    let mut server = Server::new();
    for (method, path) in [
        ("POST", "/api/generate"),
        ("POST", "/api/chat"),
        ("GET", "/api/tags"),
    ] {
        server
            .mock(method, path)
            .with_status(500)
            .with_body("ollama: out of memory")
            .create();
    }

    let tester = ProviderTester::new(ollama_for(&server)?);
    tester.test_backend_errors("ollama: out of memory");
    Ok(())
}

#[test]
fn test_unreachable_backend_is_connection_error() -> AgentResult<()> {
    // Nothing listens on the discard port
    let config = OllamaProviderConfig::new("http://127.0.0.1:9".to_string(), "llama3".to_string())
        .with_auto_start(false);
    let provider = OllamaProvider::new(config)?;

    let err = provider.generate("hi", false).unwrap_err();
    assert!(matches!(err, AgentError::Connection(_)));
    Ok(())
}

#[test]
fn test_streamed_generation_is_lazy_and_single_pass() -> AgentResult<()> {
    let mut server = Server::new();
    server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({"model": "llama3", "stream": true})))
        .with_status(200)
        .with_body("{\"response\":\"The capital\"}\n{\"response\":\" is Paris.\",\"done\":true}\n")
        .create();

    let provider = ollama_for(&server)?;
    let Generation::Stream(mut stream) = provider.generate("capital of France?", true)? else {
        panic!("Expected a stream");
    };

    let first = stream.next().expect("first chunk")?;
    assert_eq!(first, "{\"response\":\"The capital\"}");
    let rest = stream.text_chunks().collect::<AgentResult<String>>()?;
    assert_eq!(rest, " is Paris.");
    Ok(())
}

#[test]
fn test_tutor_agent_over_ollama() -> AgentResult<()> {
    let mut server = Server::new();
    let chat = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3",
            "messages": [
                {"role": "system", "content": "Answer in one word."},
                {"role": "user", "content": "Capital of France?"}
            ]
        })))
        .with_status(200)
        .with_body(r#"{"message":{"role":"assistant","content":"Paris"}}"#)
        .create();

    let mut tutor =
        TutorAgent::new("ada", ollama_for(&server)?).with_system_prompt("Answer in one word.");
    assert_eq!(tutor.respond("Capital of France?")?, "Paris");
    assert_eq!(tutor.recall("last_query"), Some(&json!("Capital of France?")));
    chat.assert();
    Ok(())
}

#[test]
fn test_abstract_agent_cannot_be_built() -> AgentResult<()> {
    let server = healthy_server();
    let model = ollama_for(&server)?;

    let abstract_agent = AgentBuilder::new("base", model.clone()).build();
    assert!(matches!(abstract_agent, Err(AgentError::Instantiation(_))));

    let mut concrete = AgentBuilder::new("echo", model)
        .respond_with(|base, query| Ok(base.model().generate(query, false)?.into_text()?))
        .build()?;
    assert_eq!(concrete.respond("What is the capital of France?")?, "Paris");
    Ok(())
}
