//! The `quizgate insights` command.

use anyhow::Result;

use quizgate_core::statistics::aggregate;
use quizgate_core::summary::{
    build_insight_prompt, summarize, SummaryOptions, NO_ERRORS_MESSAGE, UNAVAILABLE_MESSAGE,
};

use super::{GlobalOpts, Session};

pub async fn execute(
    opts: &GlobalOpts,
    set_id: &str,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let stats = aggregate(&session.store, &session.store, &set.id)?;

    let text = match session.config.generator(provider) {
        Ok(generator) => {
            let options = SummaryOptions {
                model: model.unwrap_or_else(|| session.config.default_model.clone()),
                max_tokens: session.config.max_tokens,
                temperature: session.config.temperature,
            };
            summarize(generator.as_ref(), &stats, &options).await
        }
        Err(_) if build_insight_prompt(&stats).is_none() => NO_ERRORS_MESSAGE.to_string(),
        Err(e) => {
            tracing::warn!("insight backend unavailable: {e:#}");
            UNAVAILABLE_MESSAGE.to_string()
        }
    };

    println!("{text}");
    Ok(())
}
