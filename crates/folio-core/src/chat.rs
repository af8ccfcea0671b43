//! Follow-up question pipeline over a stored paper.

use std::sync::Arc;

use folio_llm::{CompletionProvider, RetryingClient};
use folio_store::{ChatMessage, ChatStore, PaperId, PaperStore};

use crate::error::PipelineError;
use crate::prompt;

const RATE_LIMITED_REPLY: &str =
    "I'm sorry, I couldn't process your question due to API rate limits. Please try again in a minute.";
const FAILED_REPLY: &str =
    "I'm sorry, I encountered an error while processing your question. Please try again.";

/// Answers questions about a processed paper, maintaining its chat
/// history.
pub struct ChatPipeline<P> {
    client: RetryingClient<P>,
    papers: Arc<dyn PaperStore>,
    chats: Arc<dyn ChatStore>,
}

impl<P> std::fmt::Debug for ChatPipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatPipeline").finish_non_exhaustive()
    }
}

impl<P: CompletionProvider> ChatPipeline<P> {
    #[must_use]
    pub fn new(
        client: RetryingClient<P>,
        papers: Arc<dyn PaperStore>,
        chats: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            client,
            papers,
            chats,
        }
    }

    /// Answer one question, appending the exchange to the paper's history.
    ///
    /// Completion failures degrade to fixed fallback replies that are
    /// stored and returned like any answer.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no paper has this id (history untouched),
    /// and `Store` when loading or saving the history fails.
    pub async fn ask(&self, paper_id: PaperId, message: &str) -> Result<String, PipelineError> {
        let Some(paper) = self.papers.get(paper_id).await? else {
            return Err(PipelineError::NotFound);
        };

        let mut history = self.chats.load(paper_id).await?;
        history.push(ChatMessage::user(message));

        let prompt = prompt::question_prompt(&paper.summaries, &history, message);
        let reply = match self.client.complete(&prompt).await {
            Ok(answer) => answer,
            Err(err) if err.is_rate_limited() => {
                tracing::warn!(paper_id = %paper_id, error = %err, "answer rate limited after retries");
                RATE_LIMITED_REPLY.to_owned()
            }
            Err(err) => {
                tracing::error!(paper_id = %paper_id, error = %err, "answer failed");
                FAILED_REPLY.to_owned()
            }
        };

        history.push(ChatMessage::assistant(reply.clone()));
        self.chats.save(paper_id, history).await?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use folio_llm::mock::MockProvider;
    use folio_store::{ChatRole, InMemoryChatStore, InMemoryPaperStore, PaperRecord, SectionKind};

    use super::*;

    struct Fixture {
        pipeline: ChatPipeline<MockProvider>,
        provider: MockProvider,
        chats: Arc<InMemoryChatStore>,
        paper_id: PaperId,
    }

    async fn fixture(provider: MockProvider) -> Fixture {
        let papers = Arc::new(InMemoryPaperStore::new());
        let chats = Arc::new(InMemoryChatStore::new());

        let paper_id = PaperId::new();
        let mut summaries = BTreeMap::new();
        summaries.insert(SectionKind::Abstract, "a study of widgets".to_owned());
        summaries.insert(SectionKind::Results, "widgets work".to_owned());
        papers
            .put(PaperRecord {
                id: paper_id,
                full_text: "Abstract a study of widgets".to_owned(),
                sections: BTreeMap::new(),
                summaries,
            })
            .await
            .unwrap();
        chats.save(paper_id, Vec::new()).await.unwrap();

        let pipeline = ChatPipeline::new(
            RetryingClient::new(provider.clone()),
            papers,
            Arc::clone(&chats) as Arc<dyn ChatStore>,
        );
        Fixture {
            pipeline,
            provider,
            chats,
            paper_id,
        }
    }

    #[tokio::test]
    async fn ask_appends_user_then_assistant() {
        let fx = fixture(MockProvider::with_responses(vec!["they do".to_owned()])).await;

        let reply = fx
            .pipeline
            .ask(fx.paper_id, "do widgets work?")
            .await
            .unwrap();
        assert_eq!(reply, "they do");

        let history = fx.chats.load(fx.paper_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "do widgets work?");
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "they do");
    }

    #[tokio::test]
    async fn unknown_paper_fails_not_found_without_history_writes() {
        let fx = fixture(MockProvider::default()).await;
        let stranger = PaperId::new();

        let err = fx.pipeline.ask(stranger, "hello?").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound));
        assert!(fx.chats.load(stranger).await.unwrap().is_empty());
        assert_eq!(fx.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn prompt_includes_summaries_and_question() {
        let fx = fixture(MockProvider::default()).await;
        fx.pipeline.ask(fx.paper_id, "what now?").await.unwrap();

        let prompts = fx.provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("ABSTRACT: a study of widgets"));
        assert!(prompts[0].contains("RESULTS: widgets work"));
        assert!(prompts[0].contains("User question: what now?"));
    }

    #[tokio::test]
    async fn prompt_sees_the_question_in_the_history_window() {
        let fx = fixture(MockProvider::default()).await;
        fx.pipeline.ask(fx.paper_id, "first question").await.unwrap();

        let prompts = fx.provider.prompts();
        assert!(prompts[0].contains("Recent conversation:\nUser: first question"));
    }

    #[tokio::test]
    async fn follow_up_carries_prior_exchange() {
        let fx = fixture(MockProvider::with_responses(vec![
            "first answer".to_owned(),
            "second answer".to_owned(),
        ]))
        .await;

        fx.pipeline.ask(fx.paper_id, "first question").await.unwrap();
        fx.pipeline.ask(fx.paper_id, "second question").await.unwrap();

        let prompts = fx.provider.prompts();
        assert!(prompts[1].contains("User: first question"));
        assert!(prompts[1].contains("Assistant: first answer"));
        assert!(prompts[1].contains("User: second question"));

        let history = fx.chats.load(fx.paper_id).await.unwrap();
        assert_eq!(history.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhaustion_degrades_to_fallback_reply() {
        let fx = fixture(MockProvider::rate_limited()).await;

        let reply = fx.pipeline.ask(fx.paper_id, "anything?").await.unwrap();
        assert_eq!(reply, RATE_LIMITED_REPLY);

        // The fallback is stored like a real answer.
        let history = fx.chats.load(fx.paper_id).await.unwrap();
        assert_eq!(history[1].content, RATE_LIMITED_REPLY);
    }

    #[tokio::test]
    async fn permanent_failure_degrades_to_generic_fallback_reply() {
        let fx = fixture(MockProvider::failing()).await;

        let reply = fx.pipeline.ask(fx.paper_id, "anything?").await.unwrap();
        assert_eq!(reply, FAILED_REPLY);
        assert_eq!(fx.provider.call_count(), 1);
    }
}
