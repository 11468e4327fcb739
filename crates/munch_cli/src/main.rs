use anyhow::{anyhow, bail, Context, Result as AnyhowResult};
use clap::Parser;
use colored::*;
use munch_client::{build_http_client, MunchApiClient, SearchApi};
use munch_logging::logging::setup_logging;
use munch_search::{FetchOutcome, FilterManager, SearchContext, SearchSession};
use munch_settings::config::MunchConfig;
use munch_types::{
    CardKind, HourFilter, LatLng, LocationFilter, SearchCard, SearchQuery, HOUR_NAMES,
    HOUR_OPEN_NOW,
};
use std::sync::Arc;
use tabled::settings::object::Columns;
use tabled::settings::{Style, Width};
use tabled::{Table, Tabled};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "munch-search")]
#[command(about = "Search for places to eat", long_about = None)]
struct Cli {
    /// Free text to search for
    text: Option<String>,

    /// Tag to filter on, may be repeated
    #[arg(short, long)]
    tag: Vec<String>,

    /// Price bracket as NAME:MIN:MAX, e.g. '$:5:15'
    #[arg(long)]
    price: Option<String>,

    /// Only places open within the next hour
    #[arg(long)]
    open_now: bool,

    /// Named hour such as Breakfast or Supper, may be repeated
    #[arg(long)]
    hour: Vec<String>,

    /// Search everywhere instead of nearby
    #[arg(long)]
    anywhere: bool,

    /// Device location as LAT,LNG
    #[arg(long)]
    lat_lng: Option<String>,

    /// Sort directive understood by the backend
    #[arg(long)]
    sort: Option<String>,

    /// Number of pages to load
    #[arg(short, long, default_value_t = 1)]
    pages: usize,

    /// Print result and tag counts before searching
    #[arg(long)]
    counts: bool,
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "#")]
    index: usize,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Id")]
    id: String,

    #[tabled(rename = "Title")]
    title: String,
}

fn parse_price(value: &str) -> AnyhowResult<(String, f64, f64)> {
    let parts: Vec<&str> = value.split(':').collect();
    let [name, min, max] = parts.as_slice() else {
        bail!("Price must be NAME:MIN:MAX, got '{}'", value);
    };

    let min: f64 = min
        .trim()
        .parse()
        .with_context(|| format!("Invalid minimum price '{}'", min))?;
    let max: f64 = max
        .trim()
        .parse()
        .with_context(|| format!("Invalid maximum price '{}'", max))?;

    if min > max {
        bail!("Minimum price {} is above maximum {}", min, max);
    }

    Ok((name.trim().to_string(), min, max))
}

fn build_filters(cli: &Cli, context: &SearchContext) -> AnyhowResult<FilterManager> {
    let query = SearchQuery::with_text(cli.text.as_deref().unwrap_or_default());
    let mut manager = FilterManager::new(query, context);

    manager.add_update_hook(|query| {
        debug!(
            tags = query.filter.tag.positives.len(),
            filtered = query.is_filtered(),
            "Filters updated"
        );
    });

    for tag in &cli.tag {
        manager.select_tag(tag, true);
    }
    if cli.open_now {
        manager.select_hour(HOUR_OPEN_NOW);
    }
    for hour in &cli.hour {
        let Some(name) = HourFilter::canonical_name(hour) else {
            bail!("Unknown hour '{}', expected one of: {}", hour, HOUR_NAMES.join(", "));
        };
        manager.select_hour(name);
    }
    if let Some(price) = &cli.price {
        let (name, min, max) = parse_price(price)?;
        manager.select_price(&name, min, max);
    }
    if cli.anywhere {
        manager.select_location(LocationFilter::Anywhere, false);
    }
    manager.select_sort(cli.sort.as_deref());

    Ok(manager)
}

fn paint_kind(kind: &CardKind) -> String {
    match kind {
        CardKind::QueryError | CardKind::Unsupported | CardKind::NoLocation => {
            kind.as_str().red().to_string()
        }
        CardKind::NoResult => kind.as_str().yellow().to_string(),
        CardKind::Unknown(_) => kind.as_str().dimmed().to_string(),
        _ => kind.as_str().green().to_string(),
    }
}

fn render(cards: &[SearchCard]) -> String {
    let rows: Vec<CardRow> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| CardRow {
            index: index + 1,
            kind: paint_kind(&card.kind),
            id: card.unique_id.clone().unwrap_or_default(),
            title: card.title().unwrap_or_default().to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.modify(Columns::one(3), Width::wrap(60).keep_words(true));
    table.to_string()
}

#[tokio::main]
async fn main() -> AnyhowResult<()> {
    let cli = Cli::parse();

    let config = MunchConfig::new();
    setup_logging(&config.log_settings()).context("Failed to setup logging")?;

    let lat_lng = cli
        .lat_lng
        .as_deref()
        .map(|value| LatLng::parse(value).ok_or_else(|| anyhow!("Invalid location '{}'", value)))
        .transpose()?;

    let api_settings = config.api_settings();
    let client = build_http_client(&api_settings).context("Failed to create http client")?;
    let api = Arc::new(MunchApiClient::new(&api_settings, &client));
    let search_settings = config
        .search_settings()
        .context("Invalid search settings")?;

    let context = SearchContext::with_location(lat_lng);
    let manager = build_filters(&cli, &context)?;

    if cli.counts {
        let count = api
            .filter_count(manager.query())
            .await
            .context("Failed to count results")?;
        println!("{} {}", "Results:".bold(), count.count);
        for tag in &cli.tag {
            println!("  {} {}", tag, count.tag_count(tag));
        }
    }

    let mut session = SearchSession::new(api, context, search_settings.page_size);
    let paginator = session.replace(manager.into_query());

    info!(base_path = %api_settings.base_path(), "Searching");
    let mut outcome = paginator.start().await;
    for _ in 1..cli.pages {
        if !matches!(outcome, FetchOutcome::Appended(_)) {
            break;
        }
        outcome = paginator.append().await;
    }

    println!("{}", render(&paginator.cards()));
    if paginator.more() {
        println!("{}", "More results available".dimmed());
    }

    session.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$:5:15").unwrap(), ("$".to_string(), 5.0, 15.0));
        assert_eq!(
            parse_price("$$ : 15.5 : 40").unwrap(),
            ("$$".to_string(), 15.5, 40.0)
        );
        assert!(parse_price("$:5").is_err());
        assert!(parse_price("$:a:15").is_err());
        assert!(parse_price("$:20:15").is_err());
    }

    #[test]
    fn test_build_filters() {
        let cli = Cli::parse_from([
            "munch-search",
            "chicken rice",
            "--tag",
            "Halal",
            "--price",
            "$:5:15",
            "--hour",
            "Supper",
            "--anywhere",
        ]);

        let manager = build_filters(&cli, &SearchContext::default()).unwrap();
        let query = manager.query();
        assert_eq!(query.query.as_deref(), Some("chicken rice"));
        assert!(query.filter.tag.positives.contains("Halal"));
        assert!(query.filter.tag.positives.contains("Supper"));
        assert_eq!(query.filter.price.name.as_deref(), Some("$"));
        assert_eq!(query.filter.location, Some(LocationFilter::Anywhere));
        assert!(!query.requires_location());
    }

    #[test]
    fn test_build_filters_rejects_unknown_hour() {
        let cli = Cli::parse_from(["munch-search", "--hour", "lunch"]);
        let manager = build_filters(&cli, &SearchContext::default()).unwrap();
        assert!(manager.is_hour_selected("Lunch"));

        let cli = Cli::parse_from(["munch-search", "--hour", "Brunch"]);
        assert!(build_filters(&cli, &SearchContext::default()).is_err());
    }

    #[test]
    fn test_render_lists_cards() {
        let cards = vec![SearchCard::no_result()];
        let table = render(&cards);
        assert!(table.contains("no-result"));
        assert!(table.contains("Kind"));
    }
}
