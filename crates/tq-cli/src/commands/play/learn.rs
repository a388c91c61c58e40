//! Teaching the game a new entity after it gave up.

use tokio::io::{AsyncBufRead, AsyncWrite};
use tq_core::attributes::{humanize, to_attribute_name};
use tq_core::entities::{AttributeMap, Entity, NewEntity};
use tq_db::error::StoreError;
use tq_db::service::CandidateStore;
use tq_engine::engine::Vocabulary;

use super::prompter::Prompter;

/// Values shown as hints per attribute.
const MAX_HINTS: usize = 6;

/// Ask the player to describe `name` and store it.
///
/// Returns `None` when the player stops answering or the name cannot be
/// registered. Attribute keys the store rejects are dropped and the player is
/// asked again.
pub async fn register<R, W>(
    store: &CandidateStore,
    vocabulary: &Vocabulary,
    prompter: &mut Prompter<R, W>,
    name: &str,
) -> anyhow::Result<Option<Entity>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    prompter
        .say(&format!("I don't know {name} yet. Tell me about them."))
        .await?;

    loop {
        let Some(attributes) = describe(vocabulary, prompter).await? else {
            return Ok(None);
        };
        let new = NewEntity {
            name: name.to_string(),
            attributes,
        };

        match store.add(new).await {
            Ok(entity) => {
                prompter
                    .say(&format!("Thanks, I'll remember {}.", entity.name))
                    .await?;
                return Ok(Some(entity));
            }
            Err(StoreError::InvalidAttributeName(attribute)) => {
                prompter
                    .say(&format!("'{attribute}' can't be used as an attribute. Let's try again."))
                    .await?;
            }
            Err(error @ (StoreError::DuplicateName(_) | StoreError::InvalidName(_))) => {
                tracing::warn!(%error, "learned entity not registered");
                prompter.say(&format!("I can't register {name}: {error}")).await?;
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        }
    }
}

/// One value per known attribute, then any number of new ones.
async fn describe<R, W>(
    vocabulary: &Vocabulary,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<Option<AttributeMap>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut attributes = AttributeMap::new();

    for (attribute, values) in vocabulary {
        let hints = values
            .iter()
            .take(MAX_HINTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let question = if hints.is_empty() {
            format!("What is its {}? (blank if unknown)", humanize(attribute))
        } else {
            format!("What is its {}? [{hints}] (blank if unknown)", humanize(attribute))
        };
        let Some(value) = prompter.ask(&question).await? else {
            return Ok(None);
        };
        attributes.insert(attribute.clone(), (!value.is_empty()).then_some(value));
    }

    loop {
        let Some(label) = prompter
            .ask("Anything else that sets them apart? Attribute name (blank to finish)")
            .await?
        else {
            return Ok(None);
        };
        if label.is_empty() {
            return Ok(Some(attributes));
        }
        let Some(attribute) = to_attribute_name(&label) else {
            prompter
                .say(&format!("'{label}' can't be used as an attribute name; use letters, digits and spaces."))
                .await?;
            continue;
        };
        let Some(value) = prompter
            .ask(&format!("What is its {}?", humanize(&attribute)))
            .await?
        else {
            return Ok(None);
        };
        attributes.insert(attribute, (!value.is_empty()).then_some(value));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tq_engine::engine::Vocabulary;

    use super::{describe, register};
    use crate::commands::play::prompter::Prompter;
    use crate::test_support;

    fn vocabulary() -> Vocabulary {
        [(
            "hair".to_string(),
            ["blond".to_string(), "brown".to_string()].into(),
        )]
        .into()
    }

    #[tokio::test]
    async fn describe_fills_known_then_new_attributes() {
        let mut prompter = Prompter::new("\nHas Glasses\nyes\n\n".as_bytes(), Vec::new());
        let attributes = describe(&vocabulary(), &mut prompter)
            .await
            .expect("io")
            .expect("description finished");

        assert_eq!(attributes.get("hair"), Some(&None));
        assert_eq!(attributes["has_glasses"].as_deref(), Some("yes"));

        let transcript = String::from_utf8(prompter.into_output()).expect("utf8");
        assert!(transcript.contains("What is its hair? [blond, brown]"));
    }

    #[tokio::test]
    async fn describe_reprompts_unusable_labels() {
        let mut prompter = Prompter::new("black\n???\nmood\ncalm\n\n".as_bytes(), Vec::new());
        let attributes = describe(&vocabulary(), &mut prompter)
            .await
            .expect("io")
            .expect("description finished");

        assert_eq!(attributes.len(), 2);
        let transcript = String::from_utf8(prompter.into_output()).expect("utf8");
        assert!(transcript.contains("'???' can't be used"));
    }

    #[tokio::test]
    async fn end_of_input_abandons_description() {
        let mut prompter = Prompter::new("black\n".as_bytes(), Vec::new());
        assert!(describe(&vocabulary(), &mut prompter).await.expect("io").is_none());
    }

    #[tokio::test]
    async fn register_stores_the_entity() {
        let (_dir, ctx) = test_support::seeded_context().await;
        let mut prompter = Prompter::new("grey\n\n".as_bytes(), Vec::new());

        let entity = register(&ctx.store, &vocabulary(), &mut prompter, "Dora")
            .await
            .expect("register should run")
            .expect("entity stored");
        assert_eq!(entity.value_of("hair").as_deref(), Some("grey"));
        assert_eq!(ctx.store.count().await.expect("count"), 4);
    }

    #[tokio::test]
    async fn register_declines_known_names() {
        let (_dir, ctx) = test_support::seeded_context().await;
        let mut prompter = Prompter::new("grey\n\n".as_bytes(), Vec::new());

        let stored = register(&ctx.store, &vocabulary(), &mut prompter, "alice")
            .await
            .expect("register should run");
        assert!(stored.is_none());
        assert_eq!(ctx.store.count().await.expect("count"), 3);
    }
}
