//! Analysis command implementations (`analyze`, `chat`, `authors`, `markdown`)

use crate::api::{ChatPaper, PaperContent, PaperscopeClient};
use crate::cli::output::{format_analysis, format_authors_table, format_markdown, pretty_json};
use crate::cli::{AnalyzeArgs, AuthorsArgs, ChatArgs, MarkdownArgs};
use crate::resolver::ResolveMode;

fn mode_for(fast: bool) -> ResolveMode {
    if fast {
        ResolveMode::Fast
    } else {
        ResolveMode::Probed
    }
}

/// Handle analyze command
pub async fn handle_analyze(
    args: &AnalyzeArgs,
    client: &PaperscopeClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let content = PaperContent {
        title: args.title.clone(),
        abstract_text: args.abstract_text.clone(),
        url: args.url.clone(),
        paper_id: args.paper_id.clone(),
        ..Default::default()
    };

    let client = client.clone().with_mode(mode_for(args.fast));
    let record = client.analyze(&content).await?;

    if args.json {
        Ok(pretty_json(&record))
    } else {
        Ok(format_analysis(&record))
    }
}

/// Handle chat command
pub async fn handle_chat(
    args: &ChatArgs,
    client: &PaperscopeClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let paper = ChatPaper {
        title: args.title.clone(),
        abstract_text: args.abstract_text.clone(),
        paper_content: String::new(),
        summary: args.summary.clone(),
    };

    let client = client.clone().with_mode(mode_for(args.fast));
    Ok(client.chat(&args.message, &paper).await?)
}

/// Handle authors command
pub async fn handle_authors(
    args: &AuthorsArgs,
    client: &PaperscopeClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let analysis = client
        .analyze_authors(&args.authors, &args.affiliations)
        .await?;

    if args.json {
        Ok(pretty_json(&analysis))
    } else {
        Ok(format_authors_table(&analysis))
    }
}

/// Handle markdown command
pub async fn handle_markdown(
    args: &MarkdownArgs,
    client: &PaperscopeClient,
) -> Result<String, Box<dyn std::error::Error>> {
    let markdown = client
        .markdown(&args.paper_id)
        .await?
        .ok_or_else(|| format!("No markdown available for paper '{}'", args.paper_id))?;

    if args.json {
        Ok(pretty_json(&markdown))
    } else {
        Ok(format_markdown(&markdown))
    }
}
