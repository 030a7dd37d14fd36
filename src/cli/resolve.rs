//! Resolve include paths and categories against a content fixture.
//!
//! Component types come from `--type`, from walking `--page-content`, or both. With
//! `--page` the request is treated as a page render: include paths are only resolved
//! when `--selector amp` is given, and the page link is printed as well.
//!
//! # Examples
//!
//! ```bash
//! # Plain lookup for two types, collecting below their own declarations
//! clientlib resolve --content site.toml --type site/components/teaser --type site/components/title
//!
//! # Collect below explicit roots instead
//! clientlib resolve --content site.toml --type site/components/teaser --root /apps/site/components
//!
//! # Alternate rendering of a page
//! clientlib resolve --content site.toml --page /content/site/en --selector amp \
//!     --page-content /content/site/en/jcr:content --format json
//! ```

use super::OutputFormat;
use crate::config::ResolverConfig;
use crate::content::{ContentTree, MemoryContent};
use crate::page::{AlternateMode, AlternatePage, DocumentRequest, PageLink};
use crate::resolver::{
    CancellationFlag, ClientlibResolver, ResolutionRequest, ResolutionResult,
    collect_component_types,
};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Arguments of `clientlib resolve`.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Content fixture to resolve against.
    #[arg(long, value_name = "FILE")]
    pub content: PathBuf,

    /// Component type used on the document (repeatable).
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,

    /// Root below which library folders are collected (repeatable).
    ///
    /// Defaults to the component types themselves.
    #[arg(long = "root", value_name = "PATH", conflicts_with = "page")]
    pub roots: Vec<String>,

    /// Page content node whose subtree supplies component types.
    #[arg(long, value_name = "PATH")]
    pub page_content: Option<String>,

    /// Page path; resolves as a page render and prints the page link.
    #[arg(long, value_name = "PATH")]
    pub page: Option<String>,

    /// Alternate mode of the page; read from the page node when omitted.
    #[arg(long, value_name = "MODE", requires = "page")]
    pub mode: Option<AlternateMode>,

    /// Request selector (repeatable), e.g. `amp`.
    #[arg(long = "selector", value_name = "SELECTOR", requires = "page")]
    pub selectors: Vec<String>,

    /// Run both resolution branches on worker threads.
    #[arg(long)]
    pub concurrent: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    #[serde(flatten)]
    result: &'a ResolutionResult,
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<PageLink>,
}

impl ResolveCommand {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded or the page content walk is
    /// interrupted.
    pub async fn execute(self, config: ResolverConfig) -> Result<()> {
        let content = Arc::new(MemoryContent::load(&self.content)?);
        let cancel = CancellationFlag::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let mut types = self.types.clone();
        if let Some(page_content) = &self.page_content {
            let found = collect_component_types(
                content.as_ref(),
                page_content,
                config.max_traversal_depth,
                &cancel,
            )
            .with_context(|| format!("Failed to enumerate components below {page_content}"))?;
            debug!("{} component types below {}", found.len(), page_content);
            types.extend(found);
        }

        let resolver = ClientlibResolver::from_repository(content.clone(), config);

        let (result, link) = match &self.page {
            Some(page_path) => {
                let mode = self.mode.unwrap_or_else(|| {
                    content
                        .get_node(page_path)
                        .map(|node| AlternateMode::from_node(&node))
                        .unwrap_or_default()
                });
                let request = self.selectors.iter().fold(
                    DocumentRequest::new(page_path.clone(), mode),
                    |request, selector| request.with_selector(selector.clone()),
                );
                let page = AlternatePage::new(&resolver, request);
                let render = if self.concurrent {
                    page.resolve_concurrent(types, cancel.clone()).await
                } else {
                    page.resolve(types, &cancel)
                };
                (render.assets, Some(render.link))
            }
            None => {
                let roots = if self.roots.is_empty() {
                    types.clone()
                } else {
                    self.roots.clone()
                };
                let request =
                    ResolutionRequest::new().with_type_ids(types).with_component_roots(roots);
                let result = if self.concurrent {
                    resolver.resolve_concurrent(request, cancel.clone()).await
                } else {
                    resolver.resolve(&request, &cancel)
                };
                (result, None)
            }
        };
        interrupt.abort();

        match self.format {
            OutputFormat::Json => {
                let report = ResolveReport {
                    result: &result,
                    truncated: result.is_truncated(),
                    link,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => print_text(&result, link.as_ref()),
        }

        Ok(())
    }
}

fn print_text(result: &ResolutionResult, link: Option<&PageLink>) {
    println!("{}", "Include paths:".bold());
    if result.include_paths().is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for path in result.include_paths() {
        println!("  {path}");
    }

    println!("{}", "Categories:".bold());
    if result.categories().is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for category in result.categories() {
        println!("  {}", category.green());
    }

    if let Some(link) = link {
        println!("{}", "Link:".bold());
        println!("  rel=\"{}\" href=\"{}\"", link.rel.cyan(), link.href);
    }

    if !result.warnings().is_empty() {
        println!("{}", "Warnings:".bold());
        for warning in result.warnings() {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }
}
