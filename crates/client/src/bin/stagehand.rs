use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stagehand_client::api::{HttpApi, StagehandApi};
use stagehand_client::config::ClientConfig;
use stagehand_client::controller::{
    CategoriesController, CategoriesIntent, CategoriesState, DetailController, DetailIntent,
    DetailState, ListController, ListIntent, ListState,
};
use stagehand_client::logging::init_logging;
use stagehand_client::dto::UpdateUrlRequest;
use stagehand_client::models::{Category, UrlStatus};
use stagehand_client::repository::{CategoryRepository, UrlRepository};
use stagehand_client::version::VERSION;
use stagehand_common::PRESET_COLORS;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Browse and curate links collected by a Stagehand server")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// API base URL, overrides the configuration
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Print one or more pages of URLs")]
    List {
        #[arg(long, conflicts_with_all = ["status", "uncategorized"])]
        category: Option<i32>,

        #[arg(long, value_parser = parse_status, conflicts_with = "uncategorized")]
        status: Option<UrlStatus>,

        #[arg(long)]
        uncategorized: bool,

        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        pages: u32,
    },

    #[command(about = "Interactive list; type 'help' for commands")]
    Browse,

    #[command(about = "Show one URL with its link preview")]
    Show { id: i32 },

    #[command(about = "Change the category or status of one URL")]
    Set {
        id: i32,

        #[arg(long, conflicts_with = "no_category")]
        category: Option<i32>,

        #[arg(long)]
        no_category: bool,

        #[arg(long, value_parser = parse_status, conflicts_with = "clear_status")]
        status: Option<UrlStatus>,

        #[arg(long)]
        clear_status: bool,
    },

    #[command(about = "Mark one URL as covered or move it in the running order")]
    Mark {
        id: i32,

        #[arg(long, conflicts_with = "uncovered")]
        covered: bool,

        #[arg(long)]
        uncovered: bool,

        #[arg(long)]
        order: Option<i32>,
    },

    #[command(about = "List categories")]
    Categories,

    #[command(about = "Create, rename or delete a category")]
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    #[command(about = "Apply one change to many URLs")]
    Bulk {
        #[command(subcommand)]
        command: BulkCommand,
    },

    #[command(about = "Print client and server versions")]
    Version,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        name: String,
        #[arg(long, default_value = PRESET_COLORS[0])]
        color: String,
    },
    Update {
        id: i32,
        name: String,
        #[arg(long, default_value = PRESET_COLORS[0])]
        color: String,
    },
    Show { id: i32 },
    Delete { id: i32 },
}

#[derive(Subcommand, Debug)]
enum BulkCommand {
    Categorize {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i32>,
        /// Omit to remove the category
        #[arg(long)]
        category: Option<i32>,
    },
    Flag {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i32>,
        #[arg(long, value_parser = parse_status)]
        status: UrlStatus,
    },
}

fn parse_status(raw: &str) -> Result<UrlStatus, String> {
    raw.parse()
        .map_err(|_| format!("unknown status '{raw}', expected on_show or dump"))
}

#[derive(Debug, PartialEq)]
enum BrowseCommand {
    Quit,
    Help,
    Intent(ListIntent),
    /// Toggle by id; the current status is looked up in the list.
    Toggle(i32),
}

fn parse_browse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let id = |rest: &str| rest.parse::<i32>().map_err(|_| format!("expected an id, got '{rest}'"));

    let command = match word {
        "q" | "quit" => BrowseCommand::Quit,
        "help" | "?" => BrowseCommand::Help,
        "r" | "refresh" => BrowseCommand::Intent(ListIntent::Refresh),
        "m" | "more" => BrowseCommand::Intent(ListIntent::LoadMore),
        "s" | "search" => BrowseCommand::Intent(ListIntent::Search(rest.to_string())),
        "c" | "category" if rest == "-" || rest.is_empty() => {
            BrowseCommand::Intent(ListIntent::FilterByCategory(None))
        }
        "c" | "category" => BrowseCommand::Intent(ListIntent::FilterByCategory(Some(id(rest)?))),
        "f" | "status" if rest == "-" || rest.is_empty() => {
            BrowseCommand::Intent(ListIntent::FilterByStatus(None))
        }
        "f" | "status" => BrowseCommand::Intent(ListIntent::FilterByStatus(Some(parse_status(rest)?))),
        "u" | "uncategorized" => BrowseCommand::Intent(ListIntent::ToggleUncategorized),
        "x" | "clear" => BrowseCommand::Intent(ListIntent::ClearFilters),
        "t" | "toggle" => BrowseCommand::Toggle(id(rest)?),
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };
    Ok(Some(command))
}

const BROWSE_HELP: &str = "\
r            refresh
m            load more
s <text>     search (debounced)
c <id|->     filter by category
f <status|-> filter by status (on_show, dump)
u            toggle uncategorized
x            clear filters and search
t <id>       toggle on_show for an item
q            quit";

fn print_list(state: &ListState) {
    for url in &state.items {
        println!(
            "{:>6}  {:<8} {:<14} {}",
            url.id,
            url.status.map(|s| s.as_str()).unwrap_or("-"),
            url.category_name.as_deref().unwrap_or("-"),
            url.display_title()
        );
    }
    let mut summary = format!(
        "{} of {} shown{}",
        state.items.len(),
        state.paging.total_count,
        if state.paging.has_more { ", more available" } else { "" }
    );
    if state.has_active_filters() {
        summary.push_str(&format!(" | filter: {:?}", state.filter));
        if !state.search_query.is_empty() {
            summary.push_str(&format!(" | search: {:?}", state.search_query));
        }
    }
    println!("{summary}");
    if let Some(e) = &state.error {
        println!("error: {e}");
    }
}

fn print_detail(state: &DetailState) {
    let Some(url) = &state.url else {
        return;
    };
    println!("#{} {}", url.id, url.display_title());
    println!("  link:      {}", url.source_url);
    println!("  posted by: {} at {}", url.posted_by, url.posted_at);
    let category = state
        .categories
        .iter()
        .find(|c| Some(c.id) == url.category_id)
        .map(|c| c.name.as_str())
        .or(url.category_name.as_deref())
        .unwrap_or("-");
    println!("  category:  {category}");
    println!("  status:    {}", url.status.map(|s| s.as_str()).unwrap_or("-"));
    if url.is_duplicate {
        println!("  duplicate of an earlier post");
    }
    if let Some(preview) = &state.link_preview {
        if let Some(title) = &preview.title {
            println!("  preview:   {title}");
        }
        if let Some(description) = &preview.description {
            println!("             {description}");
        }
    }
}

fn print_category(category: &Category) {
    println!(
        "{:>4}  {:<8} {:<24} {}",
        category.id, category.color, category.name, category.url_count
    );
}

fn print_categories(state: &CategoriesState) {
    state.categories.iter().for_each(print_category);
}

fn mark_request(covered: bool, uncovered: bool, order: Option<i32>) -> UpdateUrlRequest {
    let mut request = UpdateUrlRequest::default();
    if covered || uncovered {
        request = request.with_covered(covered);
    }
    if let Some(order) = order {
        request = request.with_display_order(order);
    }
    request
}

async fn run_list(
    list: &ListController,
    category: Option<i32>,
    status: Option<UrlStatus>,
    uncategorized: bool,
    search: Option<String>,
    pages: u32,
) -> Result<(), BoxError> {
    let mut loaded = false;
    if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
        let mut rx = list.subscribe();
        list.handle(ListIntent::Search(term.clone())).await;
        rx.wait_for(|s| s.search_query == term && !s.loading.any())
            .await?;
        loaded = true;
    }
    if let Some(id) = category {
        list.handle(ListIntent::FilterByCategory(Some(id))).await;
        loaded = true;
    } else if status.is_some() {
        list.handle(ListIntent::FilterByStatus(status)).await;
        loaded = true;
    } else if uncategorized {
        list.handle(ListIntent::ToggleUncategorized).await;
        loaded = true;
    }
    if !loaded {
        list.handle(ListIntent::Load).await;
    }
    for _ in 1..pages {
        if !list.state().paging.has_more {
            break;
        }
        list.handle(ListIntent::LoadMore).await;
    }

    let state = list.state();
    print_list(&state);
    match state.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn run_browse(list: ListController) -> Result<(), BoxError> {
    // Prints whenever the list settles, including after debounced searches.
    let mut rx = list.subscribe();
    let printer = tokio::spawn(async move {
        let mut last: Option<ListState> = None;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.loading.any() || last.as_ref() == Some(&state) {
                continue;
            }
            print_list(&state);
            last = Some(state);
        }
    });

    list.start().await?;
    println!("{BROWSE_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_browse_command(&line) {
            Ok(None) => {}
            Ok(Some(BrowseCommand::Quit)) => break,
            Ok(Some(BrowseCommand::Help)) => println!("{BROWSE_HELP}"),
            Ok(Some(BrowseCommand::Intent(intent))) => {
                list.dispatch(intent);
            }
            Ok(Some(BrowseCommand::Toggle(id))) => {
                let current = list.state().items.iter().find(|u| u.id == id).map(|u| u.status);
                match current {
                    Some(current_status) => {
                        list.dispatch(ListIntent::ToggleItemStatus { id, current_status });
                    }
                    None => println!("#{id} is not in the list"),
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    printer.abort();
    Ok(())
}

async fn run_detail(
    detail: &DetailController,
    edit: Option<(Option<Option<i32>>, Option<Option<UrlStatus>>)>,
) -> Result<(), BoxError> {
    detail.start().await?;
    if let Some((category, status)) = edit {
        if detail.state().url.is_some() {
            if let Some(category) = category {
                detail.handle(DetailIntent::SelectCategory(category)).await;
            }
            if let Some(status) = status {
                detail.handle(DetailIntent::SelectStatus(status)).await;
            }
            detail.handle(DetailIntent::SaveChanges).await;
        }
    }

    let state = detail.state();
    print_detail(&state);
    if let Some(e) = state.error {
        return Err(e.into());
    }
    if state.saved {
        println!("saved");
    }
    Ok(())
}

async fn run_categories(categories: &CategoriesController, intent: CategoriesIntent) -> Result<(), BoxError> {
    categories.handle(intent).await;
    if categories.state().categories.is_empty() && categories.state().error.is_none() {
        categories.handle(CategoriesIntent::Load).await;
    }
    let state = categories.state();
    match state.error {
        Some(e) => Err(e.into()),
        None => {
            print_categories(&state);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    init_logging(&config.log_dir, "warn,stagehand_client=info");
    info!(version = VERSION, base_url = %config.base_url, "Starting stagehand.");

    let api: Arc<dyn StagehandApi> = Arc::new(HttpApi::new(&config.base_url)?);
    let urls = UrlRepository::new(api.clone());
    let categories = CategoryRepository::new(api);

    let result = match args.command {
        Command::List {
            category,
            status,
            uncategorized,
            search,
            pages,
        } => {
            let list = ListController::new(urls, categories, config.list_config());
            run_list(&list, category, status, uncategorized, search, pages.max(1)).await
        }
        Command::Browse => {
            run_browse(ListController::new(urls, categories, config.list_config())).await
        }
        Command::Show { id } => run_detail(&DetailController::new(id, urls, categories), None).await,
        Command::Set {
            id,
            category,
            no_category,
            status,
            clear_status,
        } => {
            let category = if no_category { Some(None) } else { category.map(Some) };
            let status = if clear_status { Some(None) } else { status.map(Some) };
            if category.is_none() && status.is_none() {
                Err(BoxError::from(
                    "nothing to change: pass --category, --no-category, --status or --clear-status",
                ))
            } else {
                run_detail(&DetailController::new(id, urls, categories), Some((category, status))).await
            }
        }
        Command::Categories => {
            run_categories(&CategoriesController::new(categories), CategoriesIntent::Load).await
        }
        Command::Mark {
            id,
            covered,
            uncovered,
            order,
        } => {
            let request = mark_request(covered, uncovered, order);
            match urls.update_url(id, &request).await {
                Ok(url) => {
                    println!(
                        "#{} covered: {}, order: {}",
                        url.id, url.covered, url.display_order
                    );
                    Ok(())
                }
                Err(e) => Err(BoxError::from(e)),
            }
        }
        Command::Category { command } => {
            let intent = match command {
                CategoryCommand::Show { id } => {
                    return finish(
                        categories
                            .get_category(id)
                            .await
                            .map(|category| print_category(&category))
                            .map_err(BoxError::from),
                    );
                }
                CategoryCommand::Create { name, color } => CategoriesIntent::Create { name, color },
                CategoryCommand::Update { id, name, color } => {
                    CategoriesIntent::Update { id, name, color }
                }
                CategoryCommand::Delete { id } => CategoriesIntent::Delete(id),
            };
            run_categories(&CategoriesController::new(categories), intent).await
        }
        Command::Bulk { command } => {
            let affected = match command {
                BulkCommand::Categorize { ids, category } => urls.bulk_categorize(ids, category).await,
                BulkCommand::Flag { ids, status } => urls.bulk_flag(ids, status).await,
            };
            affected
                .map(|n| println!("{n} URLs updated"))
                .map_err(BoxError::from)
        }
        Command::Version => {
            println!("client: {VERSION}");
            match urls.get_version().await {
                Ok(server) => {
                    println!("server: {} {} ({})", server.name, server.version, server.description);
                    Ok(())
                }
                Err(e) => Err(BoxError::from(e)),
            }
        }
    };

    finish(result)
}

fn finish(result: Result<(), BoxError>) -> Result<(), BoxError> {
    if let Err(e) = &result {
        error!(error = %e, "Command failed.");
    }
    result
}
