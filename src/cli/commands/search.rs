//! Search command implementation.

use crate::cli::output::plain_text;
use crate::cli::Output;
use crate::client::{
    AudioState, Delivery, Dispatcher, FailureKind, FinalView, GatewayApi, HttpGateway, ListKind,
    Orchestrator, Panel, ResummarizeOutcome, SessionState,
};
use crate::config::Settings;
use crate::models::{ListItem, SortMode};
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Options for the search command.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub sort: Option<String>,
    pub select: Vec<String>,
    pub all: bool,
    pub audio: bool,
    pub gateway: Option<String>,
}

/// Run the search command.
pub async fn run_search(keyword: &str, options: SearchOptions, settings: Settings) -> Result<()> {
    let sort = match &options.sort {
        Some(raw) => raw.parse::<SortMode>().map_err(|e| anyhow!(e))?,
        None => settings.client.default_sort,
    };
    let selections = options
        .select
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;

    let gateway_url = options
        .gateway
        .clone()
        .unwrap_or_else(|| settings.client.gateway_url.clone());
    let api: Arc<dyn GatewayApi> = Arc::new(HttpGateway::new(&gateway_url)?);
    let dispatcher = Dispatcher::new(Arc::clone(&api));
    let orchestrator = Orchestrator::new(api);
    let mut session = SessionState::new();

    let mut pending = match dispatcher.begin(&mut session, keyword, sort) {
        Ok(pending) => pending,
        Err(e) => {
            Output::warning(session.prompt.as_deref().unwrap_or("Enter a search keyword"));
            return Err(e.into());
        }
    };

    let spinner = Output::spinner(&format!("Searching for \"{}\"...", keyword.trim()));
    while let Some(delivery) = pending.next(&mut session).await {
        if let Delivery::Applied(kind) = delivery {
            spinner.suspend(|| render_panel(&session, kind));
        }
    }
    spinner.finish_and_clear();

    if !options.all && selections.is_empty() {
        return Ok(());
    }

    if options.all {
        orchestrator.select_all(&mut session, ListKind::News);
        orchestrator.select_all(&mut session, ListKind::Videos);
    }
    for (kind, position) in selections {
        let key = key_at(&session, kind, position)
            .ok_or_else(|| anyhow!("There is no {} result #{}", kind, position))?;
        orchestrator.select(&mut session, kind, &key, true)?;
    }

    let spinner = Output::spinner("Summarizing selected originals...");
    let outcome = orchestrator.resummarize(&mut session).await;
    spinner.finish_and_clear();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::warning(session.prompt.as_deref().unwrap_or(&e.to_string()));
            return Err(e.into());
        }
    };
    render_final(&session);

    if options.audio && matches!(outcome, ResummarizeOutcome::Success(_)) {
        save_audio(&orchestrator, &mut session, &settings).await?;
    }

    Ok(())
}

/// Parse "news:2" / "video:1" into a list and 1-based position.
fn parse_selection(raw: &str) -> Result<(ListKind, usize)> {
    let (list, position) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("Selection must look like news:1 or video:2, got {}", raw))?;

    let kind = match list.trim().to_lowercase().as_str() {
        "news" | "n" => ListKind::News,
        "video" | "videos" | "v" | "youtube" => ListKind::Videos,
        other => return Err(anyhow!("Unknown result list: {}", other)),
    };
    let position: usize = position
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid position in selection: {}", raw))?;
    if position == 0 {
        return Err(anyhow!("Positions start at 1: {}", raw));
    }
    Ok((kind, position))
}

fn key_at(session: &SessionState, kind: ListKind, position: usize) -> Option<String> {
    let index = position.checked_sub(1)?;
    match kind {
        ListKind::News => session
            .news
            .items()
            .and_then(|l| l.entries().get(index))
            .map(|e| e.item.key().to_string()),
        ListKind::Videos => session
            .videos
            .items()
            .and_then(|l| l.entries().get(index))
            .map(|e| e.item.key().to_string()),
    }
}

fn render_panel(session: &SessionState, kind: ListKind) {
    match kind {
        ListKind::News => {
            Output::header("News");
            render_list(&session.news, |item| item.url.clone());
        }
        ListKind::Videos => {
            Output::header("Videos");
            render_list(&session.videos, |item| item.watch_url());
        }
    }
}

fn render_list<T: ListItem>(panel: &Panel<T>, link: impl Fn(&T) -> String) {
    match panel {
        Panel::Items(list) => {
            for (i, entry) in list.entries().iter().enumerate() {
                Output::result_item(i + 1, entry.item.title(), &link(&entry.item), entry.item.summary_html());
            }
        }
        Panel::NoResults => Output::warning("No results found."),
        Panel::Failed(message) => Output::error(&format!("Could not load results: {}", message)),
        Panel::Blank | Panel::Loading => {}
    }
}

fn render_final(session: &SessionState) {
    match &session.final_view {
        FinalView::Summary(summary) => {
            Output::header("Final summary");
            println!("{}", plain_text(summary));
        }
        FinalView::Failed {
            kind: FailureKind::Application,
            message,
        } => Output::error(&format!("No summary: {}", message)),
        FinalView::Failed {
            kind: FailureKind::Transport,
            message,
        } => Output::error(message),
        FinalView::Hidden | FinalView::Pending => {}
    }
}

async fn save_audio(
    orchestrator: &Orchestrator,
    session: &mut SessionState,
    settings: &Settings,
) -> Result<()> {
    let file_id = match session.audio.state() {
        AudioState::Ready(source) => source.file_id(),
        _ => {
            Output::info("No audio summary was offered.");
            return Ok(());
        }
    };

    let spinner = Output::spinner("Downloading audio...");
    let clip = orchestrator.play_audio(session).await;
    spinner.finish_and_clear();
    let clip = clip?;

    let dir = settings.audio_dir();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.mp3", file_id.replace(['/', '\\'], "_")));
    std::fs::write(&path, &clip.bytes)?;
    Output::success(&format!("Saved audio to {}", path.display()));
    Ok(())
}
