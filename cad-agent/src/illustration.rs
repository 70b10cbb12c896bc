use crate::{
    code::extract_code, prompts, PipelineError, PipelineEvent, PipelineObserver, SessionParams,
};
use cad_sdk::{AssistantRequest, AssistantService, IllustrationRequest, IllustrationService, ViewType};
use futures::{pin_mut, stream::FuturesUnordered, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// The prompt used for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPrompt {
    pub view_type: ViewType,
    pub prompt: String,
}

/// A rendered view of the design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    pub view_type: ViewType,
    pub prompt: String,
    /// Decoded image bytes.
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IllustrationBatch {
    /// Views in the order they completed.
    pub delivered: Vec<Illustration>,
    pub failed: Vec<(ViewType, String)>,
}

/// Match the assistant's prompt list to [`ViewType::ALL`]. Any view without a
/// usable prompt gets one derived from its label and the analysis.
#[must_use]
pub fn parse_view_prompts(reply: &str, analysis: &str) -> Vec<ViewPrompt> {
    let parsed: Vec<String> =
        serde_json::from_str(extract_code(reply, "json").trim()).unwrap_or_default();

    ViewType::ALL
        .iter()
        .enumerate()
        .map(|(index, &view_type)| {
            let prompt = parsed
                .get(index)
                .filter(|prompt| !prompt.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| prompts::fallback_image_prompt(view_type.label(), analysis));
            ViewPrompt { view_type, prompt }
        })
        .collect()
}

/// Ask the assistant for one prompt per view. Never fails: when the call
/// fails every view falls back to a derived prompt.
pub async fn generate_view_prompts(
    assistant: &dyn AssistantService,
    params: &SessionParams,
    analysis: &str,
) -> Vec<ViewPrompt> {
    let request = AssistantRequest::new(
        prompts::image_prompts_prompt(analysis),
        &params.image_prompts_system_prompt,
    );

    match assistant.complete(request).await {
        Ok(response) => parse_view_prompts(&response.content, analysis),
        Err(error) => {
            warn!(error = %error, "image prompt generation failed, using derived prompts");
            parse_view_prompts("", analysis)
        }
    }
}

async fn illustrate_one(
    illustrator: &dyn IllustrationService,
    view: ViewPrompt,
) -> Result<Illustration, PipelineError> {
    let response = illustrator
        .illustrate(IllustrationRequest::new(view.prompt.clone(), view.view_type))
        .await?;
    let image = response.decode_image()?;

    Ok(Illustration {
        view_type: view.view_type,
        prompt: view.prompt,
        image,
    })
}

/// Issue every request at once and yield each result as it completes.
pub fn illustrate_views(
    illustrator: Arc<dyn IllustrationService>,
    views: Vec<ViewPrompt>,
) -> impl Stream<Item = (ViewType, Result<Illustration, PipelineError>)> + Send {
    async_stream::stream! {
        let mut pending: FuturesUnordered<_> = views
            .into_iter()
            .map(|view| {
                let illustrator = Arc::clone(&illustrator);
                async move {
                    let view_type = view.view_type;
                    (view_type, illustrate_one(illustrator.as_ref(), view).await)
                }
            })
            .collect();

        while let Some(settled) = pending.next().await {
            yield settled;
        }
    }
}

/// Run a whole batch, reporting each view to `observer` as it settles.
/// Failed views are logged and skipped.
pub async fn illustrate_all(
    illustrator: Arc<dyn IllustrationService>,
    views: Vec<ViewPrompt>,
    observer: &dyn PipelineObserver,
) -> IllustrationBatch {
    let mut batch = IllustrationBatch::default();
    let stream = illustrate_views(illustrator, views);
    pin_mut!(stream);

    while let Some((view_type, result)) = stream.next().await {
        match result {
            Ok(illustration) => {
                debug!(view = view_type.label(), "illustration delivered");
                observer.on_event(PipelineEvent::Illustration(illustration.clone()));
                batch.delivered.push(illustration);
            }
            Err(error) => {
                warn!(view = view_type.label(), error = %error, "illustration failed");
                let error = error.to_string();
                observer.on_event(PipelineEvent::IllustrationFailed {
                    view_type,
                    error: error.clone(),
                });
                batch.failed.push((view_type, error));
            }
        }
    }

    observer.on_event(PipelineEvent::IllustrationsSettled {
        delivered: batch.delivered.len(),
        failed: batch.failed.len(),
    });
    batch
}
