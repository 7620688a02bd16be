use std::sync::Arc;

use {
    tracing::{debug, info, warn},
    vocalis_common::ChatMessage,
    vocalis_media::BlockStore,
    vocalis_tools::{CapabilityOutput, CapabilityRegistry},
};

#[cfg(feature = "metrics")]
use vocalis_metrics::{counter, dispatch as dispatch_metrics, histogram, labels};

use crate::{Error, Result};

/// A capability must score strictly above this to claim a message.
pub const CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Outcome of the preemption scan for one message. Request-local.
#[derive(Debug, Clone, PartialEq)]
pub struct PreemptionDecision {
    pub capability: String,
    pub score: f32,
    pub prompt: String,
    pub output: CapabilityOutput,
}

/// Runs the fixed-order preemption scan shared by every transport.
#[derive(Clone)]
pub struct Dispatcher {
    capabilities: CapabilityRegistry,
    store: Arc<dyn BlockStore>,
}

fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

impl Dispatcher {
    pub fn new(capabilities: CapabilityRegistry, store: Arc<dyn BlockStore>) -> Self {
        Self {
            capabilities,
            store,
        }
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    /// Select and invoke the first capability whose score exceeds
    /// [`CONFIDENCE_THRESHOLD`]. Capabilities after the winner are never
    /// scored. `Ok(None)` when nothing qualifies.
    pub async fn decide(&self, msg: &ChatMessage) -> Result<Option<PreemptionDecision>> {
        #[cfg(feature = "metrics")]
        counter!(dispatch_metrics::MESSAGES_TOTAL).increment(1);

        for capability in self.capabilities.iter() {
            let score = clamp_score(capability.preemption_score(&msg.text));
            #[cfg(feature = "metrics")]
            counter!(
                dispatch_metrics::CAPABILITY_SCORED_TOTAL,
                labels::CAPABILITY => capability.name().to_string()
            )
            .increment(1);
            debug!(
                conversation_id = %msg.conversation_id,
                capability = capability.name(),
                score,
                "scored message"
            );
            if score <= CONFIDENCE_THRESHOLD {
                continue;
            }

            let prompt = capability.build_prompt(&msg.text);
            info!(
                conversation_id = %msg.conversation_id,
                capability = capability.name(),
                score,
                "capability preempting message"
            );
            #[cfg(feature = "metrics")]
            counter!(
                dispatch_metrics::PREEMPTIONS_TOTAL,
                labels::CAPABILITY => capability.name().to_string()
            )
            .increment(1);

            #[cfg(feature = "metrics")]
            let start = std::time::Instant::now();
            let result = capability.invoke(&prompt).await;
            #[cfg(feature = "metrics")]
            histogram!(
                dispatch_metrics::INVOCATION_DURATION_SECONDS,
                labels::CAPABILITY => capability.name().to_string()
            )
            .record(start.elapsed().as_secs_f64());

            let output = result.map_err(|e| {
                #[cfg(feature = "metrics")]
                counter!(
                    dispatch_metrics::INVOCATION_ERRORS_TOTAL,
                    labels::CAPABILITY => capability.name().to_string()
                )
                .increment(1);
                warn!(
                    conversation_id = %msg.conversation_id,
                    capability = capability.name(),
                    error = %e,
                    "capability invocation failed"
                );
                Error::capability(capability.name(), e)
            })?;
            return Ok(Some(PreemptionDecision {
                capability: capability.name().to_string(),
                score,
                prompt,
                output,
            }));
        }

        #[cfg(feature = "metrics")]
        counter!(dispatch_metrics::UNMATCHED_TOTAL).increment(1);
        debug!(
            conversation_id = %msg.conversation_id,
            "no capability preempted message"
        );
        Ok(None)
    }

    /// Full dispatch: decide, then normalize the capability output into a
    /// bot reply in the same conversation as `msg`.
    pub async fn respond(&self, msg: &ChatMessage) -> Result<Option<ChatMessage>> {
        let Some(decision) = self.decide(msg).await? else {
            return Ok(None);
        };

        let reply = match decision.output {
            CapabilityOutput::Inline(text) => ChatMessage::reply_to(msg, text),
            CapabilityOutput::Reference(id) => {
                let block = self.store.get(&id).await.map_err(|e| match e {
                    vocalis_media::Error::NotFound(id) => Error::BlockNotFound {
                        capability: decision.capability.clone(),
                        id,
                    },
                    other => Error::Storage(other),
                })?;
                block.to_reply(msg)
            },
        };

        Ok(Some(reply.with_tag("capability", decision.capability)))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        anyhow::bail,
        async_trait::async_trait,
        rstest::rstest,
        std::sync::atomic::{AtomicUsize, Ordering},
        vocalis_common::{BlockId, Role},
        vocalis_media::{Block, InMemoryBlockStore},
        vocalis_tools::Capability,
    };

    enum Outcome {
        Inline(&'static str),
        Reference(BlockId),
        Fail,
    }

    struct Scripted {
        name: &'static str,
        score: f32,
        outcome: Outcome,
        scored: Arc<AtomicUsize>,
        invoked: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(name: &'static str, score: f32, outcome: Outcome) -> Self {
            Self {
                name,
                score,
                outcome,
                scored: Arc::new(AtomicUsize::new(0)),
                invoked: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Capability for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "scripted test capability"
        }

        fn preemption_score(&self, _text: &str) -> f32 {
            self.scored.fetch_add(1, Ordering::SeqCst);
            self.score
        }

        fn build_prompt(&self, text: &str) -> String {
            text.trim_start_matches("draw ").to_string()
        }

        async fn invoke(&self, _prompt: &str) -> anyhow::Result<CapabilityOutput> {
            self.invoked.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Outcome::Inline(text) => Ok(CapabilityOutput::Inline((*text).to_string())),
                Outcome::Reference(id) => Ok(CapabilityOutput::Reference(*id)),
                Outcome::Fail => bail!("quota exceeded"),
            }
        }
    }

    fn dispatcher(capabilities: Vec<Scripted>) -> Dispatcher {
        dispatcher_with_store(capabilities, Arc::new(InMemoryBlockStore::new()))
    }

    fn dispatcher_with_store(
        capabilities: Vec<Scripted>,
        store: Arc<InMemoryBlockStore>,
    ) -> Dispatcher {
        let mut registry = CapabilityRegistry::new();
        for capability in capabilities {
            registry.register(Box::new(capability));
        }
        Dispatcher::new(registry, store)
    }

    #[tokio::test]
    async fn first_confident_capability_wins() {
        let d = dispatcher(vec![
            Scripted::new("first", 0.9, Outcome::Inline("from first")),
            Scripted::new("second", 0.99, Outcome::Inline("from second")),
        ]);
        let msg = ChatMessage::user("c1", "draw a cat");
        let decision = d.decide(&msg).await.unwrap().unwrap();
        assert_eq!(decision.capability, "first");
        assert_eq!(decision.prompt, "a cat");
        assert_eq!(decision.output, CapabilityOutput::Inline("from first".into()));
    }

    #[tokio::test]
    async fn scan_stops_at_the_winner() {
        let winner = Scripted::new("winner", 0.95, Outcome::Inline("ok"));
        let later = Scripted::new("later", 1.0, Outcome::Inline("never"));
        let later_scored = later.scored.clone();
        let later_invoked = later.invoked.clone();
        let d = dispatcher(vec![winner, later]);

        d.respond(&ChatMessage::user("c1", "anything"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(later_scored.load(Ordering::SeqCst), 0);
        assert_eq!(later_invoked.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case(0.8)]
    #[case(0.5)]
    #[case(0.0)]
    #[case(-3.0)]
    #[case(f32::NAN)]
    #[tokio::test]
    async fn scores_at_or_below_threshold_yield_nothing(#[case] score: f32) {
        let capability = Scripted::new("weak", score, Outcome::Inline("nope"));
        let invoked = capability.invoked.clone();
        let d = dispatcher(vec![capability]);
        let reply = d.respond(&ChatMessage::user("c1", "hello")).await.unwrap();
        assert!(reply.is_none());
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scores_above_one_are_clamped() {
        let d = dispatcher(vec![Scripted::new("loud", 7.0, Outcome::Inline("hi"))]);
        let decision = d
            .decide(&ChatMessage::user("c1", "x"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decision.score, 1.0);
    }

    #[tokio::test]
    async fn empty_registry_yields_nothing() {
        let d = dispatcher(Vec::new());
        assert!(d.respond(&ChatMessage::user("c1", "say hi")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inline_output_becomes_reply_in_same_conversation() {
        let d = dispatcher(vec![Scripted::new(
            "draw",
            0.95,
            Outcome::Inline("a cat picture"),
        )]);
        let input = ChatMessage::user("session-42", "draw a cat");
        let reply = d.respond(&input).await.unwrap().unwrap();
        assert_eq!(reply.conversation_id, "session-42");
        assert_eq!(reply.role, Role::Bot);
        assert_eq!(reply.text, "a cat picture");
        assert_eq!(reply.tag("capability"), Some("draw"));
        assert!(reply.source_reference.is_none());
    }

    #[tokio::test]
    async fn reference_output_resolves_stored_block() {
        let store = Arc::new(InMemoryBlockStore::new());
        let id = store
            .put(Block::text("Bonjour").with_tag("lang", "fr"))
            .await
            .unwrap();
        let d = dispatcher_with_store(
            vec![Scripted::new("translate", 0.9, Outcome::Reference(id))],
            store,
        );
        let input = ChatMessage::user("chat-7", "translate hello");
        let reply = d.respond(&input).await.unwrap().unwrap();
        assert_eq!(reply.text, "Bonjour");
        assert_eq!(reply.conversation_id, "chat-7");
        assert_eq!(reply.source_reference, Some(id));
        assert_eq!(reply.tag("lang"), Some("fr"));
        assert_eq!(reply.tag("capability"), Some("translate"));
    }

    #[tokio::test]
    async fn capability_failure_propagates() {
        let d = dispatcher(vec![
            Scripted::new("broken", 0.9, Outcome::Fail),
            Scripted::new("fallback", 0.9, Outcome::Inline("unused")),
        ]);
        let err = d
            .respond(&ChatMessage::user("c1", "draw a cat"))
            .await
            .unwrap_err();
        assert!(matches!(&err, Error::Capability { name, .. } if name == "broken"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn dangling_reference_is_an_error() {
        let missing = BlockId::new();
        let d = dispatcher(vec![Scripted::new(
            "ghost",
            0.9,
            Outcome::Reference(missing),
        )]);
        let err = d
            .respond(&ChatMessage::user("c1", "boo"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BlockNotFound { id, .. } if id == missing));
    }
}
