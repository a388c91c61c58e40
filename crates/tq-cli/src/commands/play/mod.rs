//! `tq play`: the interactive question/guess/learn loop.

mod learn;
pub mod prompter;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tq_core::attributes::humanize;
use tq_db::service::CandidateStore;
use tq_engine::{
    AnswerOutcome, GameSession, InformationEngine, MAX_GUESS_ATTEMPTS, Prompt, SessionStatus,
    SessionSummary,
};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PlayArgs;
use crate::context::AppContext;
use crate::output::output;
use prompter::Prompter;

#[derive(Debug, Serialize)]
pub struct GameOutcome {
    pub status: SessionStatus,
    pub summary: SessionSummary,
    /// `None` when the game was cut short and nothing was recorded.
    pub game_id: Option<i64>,
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub games: Vec<GameOutcome>,
}

/// Handle `tq play`.
pub async fn handle(args: &PlayArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut prompter = Prompter::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let response = run(args, ctx, &mut prompter).await?;
    output(&response, flags.format)
}

/// Play games until the player declines another round, `--rounds` is
/// reached, or input ends.
pub async fn run<R, W>(
    args: &PlayArgs,
    ctx: &AppContext,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<PlayResponse>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let candidates = ctx.store.load().await.context("failed to load candidates")?;
    let mut engine = InformationEngine::new(candidates)
        .context("nothing to play with; add entities with 'tq add' or 'tq import'")?;

    let mut games = Vec::new();
    loop {
        let outcome = play_game(&ctx.store, &mut engine, prompter).await?;
        let interrupted = outcome.game_id.is_none();
        games.push(outcome);

        if interrupted {
            break;
        }
        match args.rounds {
            Some(rounds) if games.len() >= usize::try_from(rounds).unwrap_or(usize::MAX) => break,
            Some(_) => {}
            None => {
                let again = prompter.ask_yes_no("Play again?").await?;
                if !again.is_some_and(tq_engine::Answer::is_yes) {
                    break;
                }
            }
        }
    }
    Ok(PlayResponse { games })
}

/// Drive one session to a terminal state and record it.
///
/// Running out of input abandons the session without a record. Store
/// failures abandon it as well and are returned as errors. A newly learned
/// entity is loaded into `engine` before the session completes.
pub async fn play_game<R, W>(
    store: &CandidateStore,
    engine: &mut InformationEngine,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<GameOutcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = GameSession::start(engine)?;
    let mut target: Option<String> = None;
    prompter
        .say(&format!(
            "Think of someone. I know {} candidates.",
            engine.len()
        ))
        .await?;

    loop {
        match session.next_step() {
            Prompt::Question(question) => {
                let text = format!("Is its {} {}?", humanize(&question.attribute), question.value);
                let Some(reply) = prompter.ask(&text).await? else {
                    session.abort();
                    break;
                };
                if let AnswerOutcome::Rejected { input } = session.answer(&reply)? {
                    prompter.say(&format!("'{input}' is not yes or no.")).await?;
                }
            }
            Prompt::Guess {
                entity,
                confidence,
                attempt,
            } => {
                let text = format!(
                    "Is it {}? ({:.0}% sure, guess {attempt} of {MAX_GUESS_ATTEMPTS})",
                    entity.name,
                    confidence * 100.0
                );
                let Some(answer) = prompter.ask_yes_no(&text).await? else {
                    session.abort();
                    break;
                };
                if answer.is_yes() {
                    target = Some(entity.name);
                }
                session.confirm_guess(answer.is_yes())?;
            }
            Prompt::IdentifyTarget => {
                let Some(name) = prompter
                    .ask("I give up. Who were you thinking of? (blank to skip)")
                    .await?
                else {
                    session.abort();
                    break;
                };
                if name.is_empty() {
                    session.decline_registration()?;
                    continue;
                }
                let existing = match store.find_by_name(&name).await {
                    Ok(existing) => existing,
                    Err(error) => {
                        session.abort();
                        return Err(error).context("failed to look up target");
                    }
                };
                if let Some(entity) = &existing {
                    prompter
                        .say(&format!("{}! I should have got that one.", entity.name))
                        .await?;
                    target = Some(entity.name.clone());
                }
                session.identify_target(&name, existing.as_ref())?;
            }
            Prompt::RegisterTarget { name } => {
                let learned = match learn::register(store, engine.vocabulary(), prompter, &name).await {
                    Ok(learned) => learned,
                    Err(error) => {
                        session.abort();
                        return Err(error.context("failed to register new entity"));
                    }
                };
                let Some(entity) = learned else {
                    session.decline_registration()?;
                    continue;
                };
                let candidates = match store.load().await {
                    Ok(candidates) => candidates,
                    Err(error) => {
                        session.abort();
                        return Err(error).context("failed to reload candidates");
                    }
                };
                engine.reload(candidates)?;
                target = Some(entity.name.clone());
                session.complete_learning(&entity)?;
            }
            Prompt::Finished(_) => break,
        }
    }

    let game_id = match session.record() {
        Some(record) => Some(
            store
                .record_game(record)
                .await
                .context("failed to record game")?,
        ),
        None => None,
    };

    let closing = match session.status() {
        SessionStatus::Won => "Got it!",
        SessionStatus::Learned => "I'll get it next time.",
        SessionStatus::Missed => "You win this round.",
        _ => "Maybe next time.",
    };
    prompter.say(closing).await?;

    Ok(GameOutcome {
        status: session.status(),
        summary: session.summary(),
        game_id,
        target,
    })
}
