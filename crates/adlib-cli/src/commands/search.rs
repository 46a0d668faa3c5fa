//! Search command implementation.

use anyhow::Result;
use clap::Args;

use adlib_core::error::ValidationError;
use adlib_core::{MediaType, Platform, QuerySpec};

use super::AdFilters;
use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  meta-adlib search --query \"climate\" --country US
  meta-adlib search --query \"election\" --country US --type POLITICAL_AND_ISSUE_ADS --status ACTIVE
  meta-adlib search --page-id 123456789 --country DE --limit 50
  meta-adlib search --query \"cars\" --country FR --country DE --platform facebook --platform instagram")]
pub struct SearchArgs {
    /// Search terms to find in ad creative text
    #[arg(long)]
    pub query: Option<String>,

    /// Facebook Page ID(s) to search. Repeatable.
    #[arg(long = "page-id", value_name = "ID")]
    pub page_ids: Vec<String>,

    #[command(flatten)]
    pub filters: AdFilters,

    /// Platform filter: facebook, instagram, audience_network, messenger, threads. Repeatable.
    #[arg(long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<String>,

    /// Language filter (ISO 639-1, e.g. en, fr). Repeatable.
    #[arg(long = "language", value_name = "CODE")]
    pub languages: Vec<String>,

    /// Filter by media type: ALL, IMAGE, MEME, VIDEO, NONE
    #[arg(long)]
    pub media_type: Option<String>,

    /// Comma-separated list of fields to return
    #[arg(long)]
    pub fields: Option<String>,
}

impl SearchArgs {
    fn query_spec(&self) -> Result<QuerySpec, ValidationError> {
        let mut spec = QuerySpec {
            search_terms: self.query.clone().filter(|q| !q.is_empty()),
            page_ids: self.page_ids.clone(),
            languages: self.languages.clone(),
            ..QuerySpec::default()
        };
        self.filters.apply(&mut spec)?;

        spec.platforms = self
            .platforms
            .iter()
            .map(|p| p.parse::<Platform>())
            .collect::<Result<_, _>>()?;
        spec.media_type = self
            .media_type
            .as_deref()
            .map(str::parse::<MediaType>)
            .transpose()?;

        if let Some(fields) = &self.fields {
            spec.fields = fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(spec)
    }
}

pub async fn run(ctx: &Context, args: SearchArgs) -> Result<()> {
    let client = ctx.client()?;
    let spec = args.query_spec()?;

    let ads = client.search_ads(&spec, args.filters.limit).await?;

    output::ads(ctx.output, &ads, "no ads found", |n| {
        format!("{n} ad(s) returned")
    })
}
