//! Incubator Portal CLI
//!
//! Command-line front end for the incubator backend:
//! - Browse startups, news and events
//! - Month calendar of news or events
//! - Raw admin CRUD on any resource
//! - Login, logout and registration

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use incubator_portal::api::dto::{Event, News};
use incubator_portal::config::{generate_default_config, LoggingConfig};
use incubator_portal::views::filters::{categories, maturities};
use incubator_portal::views::{
    AdminConsole, Dashboard, DatedListFilter, LoginForm, RegisterFlow, RegisterPhase, SortOrder,
    StartupFilter,
};
use incubator_portal::{
    CalendarView, Config, HttpTransport, IncubatorClient, MonthCursor, Resource, SessionStore,
    StartupCache, TokenStore,
};

#[derive(Parser)]
#[command(name = "incubator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the incubator portal backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and runtime config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every startup (all pages, sorted by name)
    Startups {
        /// Match on name, email or sector
        #[arg(short, long, default_value = "")]
        query: String,
        /// Exact maturity
        #[arg(short, long, default_value = "")]
        maturity: String,
    },

    /// Show one startup with its founders
    Startup { id: u64 },

    /// List one page of a resource
    List {
        resource: Resource,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Fetch one item of a resource
    Get { resource: Resource, id: u64 },

    /// Create an item from a JSON payload (inline, or @file)
    Create { resource: Resource, payload: String },

    /// Update an item from a JSON payload (inline, or @file)
    Update {
        resource: Resource,
        id: u64,
        payload: String,
    },

    /// Delete an item
    Delete { resource: Resource, id: u64 },

    /// List news
    News {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short = 'C', long, default_value = "")]
        category: String,
        /// desc (newest first) or asc
        #[arg(short, long, default_value = "desc")]
        order: SortOrder,
    },

    /// List events
    Events {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short = 'C', long, default_value = "")]
        category: String,
        /// desc (newest first) or asc
        #[arg(short, long, default_value = "desc")]
        order: SortOrder,
    },

    /// Month calendar of news or events
    Calendar {
        source: CalendarSource,
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
        /// List the records of one day (YYYY-MM-DD)
        #[arg(short, long)]
        day: Option<String>,
    },

    /// Log in and store the access token
    Login {
        email: String,
        /// Password (or INCUBATOR_PASSWORD)
        #[arg(long, env = "INCUBATOR_PASSWORD")]
        password: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Register: without --code a code is emailed; with --code the account is created
    Register {
        email: String,
        #[arg(long, env = "INCUBATOR_PASSWORD")]
        password: String,
        #[arg(long)]
        code: Option<String>,
    },

    /// Startup count and analytics
    Dashboard,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CalendarSource {
    News,
    Events,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    config.bootstrap_runtime().await;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    tracing::debug!(base_url = %config.api.base_url, "Using backend");

    let session = match config.session.token_path() {
        Some(path) => SessionStore::with_token_store(TokenStore::new(path)),
        None => SessionStore::new(),
    };
    if let Some(token) = &config.api.auth_token {
        session.seed_token(token);
    }

    let transport = HttpTransport::with_session(config.transport_config(), session.clone())?;
    let client = IncubatorClient::new(Arc::new(transport));
    let cache = StartupCache::new(Arc::new(client.clone()), config.api.page_size);
    let json = cli.format == "json";

    match cli.command {
        Commands::Startups { query, maturity } => {
            let all = cache.get_all().await;
            let filter = StartupFilter::new(query, maturity);
            let shown = filter.apply(&all);

            if json {
                print_json(&shown)?;
            } else {
                println!("{:<6} {:<30} {:<20} {}", "ID", "Name", "Sector", "Maturity");
                println!("{}", "-".repeat(72));
                for s in &shown {
                    println!(
                        "{:<6} {:<30} {:<20} {}",
                        s.id,
                        truncate(&s.name, 30),
                        truncate(s.sector.as_deref().unwrap_or("-"), 20),
                        s.maturity.as_deref().unwrap_or("-")
                    );
                }
                println!();
                println!("{} of {} startups", shown.len(), all.len());
                let levels = maturities(&all);
                if !levels.is_empty() {
                    println!("Maturities: {}", levels.join(", "));
                }
            }
        }

        Commands::Startup { id } => {
            let detail = client.get_startup(id).await?;
            if json {
                print_json(&detail)?;
            } else {
                println!("{} (#{})", detail.name, detail.id);
                println!("  Email:    {}", detail.email);
                println!("  Sector:   {}", detail.sector.as_deref().unwrap_or("-"));
                println!("  Maturity: {}", detail.maturity.as_deref().unwrap_or("-"));
                println!("  Website:  {}", detail.website_url.as_deref().unwrap_or("-"));
                if let Some(description) = &detail.description {
                    println!();
                    println!("{}", description);
                }
                if !detail.founders.is_empty() {
                    println!();
                    println!("Founders:");
                    for founder in &detail.founders {
                        println!("  - {} (#{})", founder.name, founder.id);
                    }
                }
            }
        }

        Commands::List {
            resource,
            skip,
            limit,
        } => {
            let mut console = AdminConsole::new();
            console.select(resource);
            console.skip = skip.to_string();
            console.limit = limit.to_string();
            console.list(&client).await;
            finish_admin(&console, console.list_result.as_ref())?;
        }

        Commands::Get { resource, id } => {
            let mut console = admin_for(resource, id);
            console.get_by_id(&client).await;
            finish_admin(&console, console.item_result.as_ref())?;
        }

        Commands::Create { resource, payload } => {
            let mut console = admin_for(resource, 0);
            console.payload = read_payload(&payload)?;
            console.create(&client).await;
            finish_admin(&console, console.action_result.as_ref())?;
        }

        Commands::Update {
            resource,
            id,
            payload,
        } => {
            let mut console = admin_for(resource, id);
            console.payload = read_payload(&payload)?;
            console.update(&client).await;
            finish_admin(&console, console.action_result.as_ref())?;
        }

        Commands::Delete { resource, id } => {
            let mut console = admin_for(resource, id);
            console.delete(&client).await;
            finish_admin(&console, console.action_result.as_ref())?;
        }

        Commands::News {
            query,
            category,
            order,
        } => {
            let items: Vec<News> = client.list_news(None, None).await?;
            let filter = DatedListFilter {
                query,
                category,
                order,
            };
            let shown = filter.apply(&items);

            if json {
                print_json(&shown)?;
            } else {
                println!("{:<6} {:<12} {:<16} {}", "ID", "Date", "Category", "Title");
                println!("{}", "-".repeat(72));
                for n in &shown {
                    println!(
                        "{:<6} {:<12} {:<16} {}",
                        n.id,
                        n.news_date.as_deref().map(|d| truncate(d, 10)).unwrap_or_else(|| "-".into()),
                        truncate(n.category.as_deref().unwrap_or("-"), 16),
                        n.title
                    );
                }
                print_categories(&categories(&items));
            }
        }

        Commands::Events {
            query,
            category,
            order,
        } => {
            let items: Vec<Event> = client.list_events(None, None).await?;
            let filter = DatedListFilter {
                query,
                category,
                order,
            };
            let shown = filter.apply(&items);

            if json {
                print_json(&shown)?;
            } else {
                println!("{:<6} {:<12} {:<16} {}", "ID", "Date", "Type", "Name");
                println!("{}", "-".repeat(72));
                for e in &shown {
                    println!(
                        "{:<6} {:<12} {:<16} {}",
                        e.id,
                        e.dates.as_deref().map(|d| truncate(d, 10)).unwrap_or_else(|| "-".into()),
                        truncate(e.event_type.as_deref().unwrap_or("-"), 16),
                        e.name
                    );
                }
                print_categories(&categories(&items));
            }
        }

        Commands::Calendar { source, month, day } => match source {
            CalendarSource::News => {
                let items = client.list_news(None, None).await?;
                show_calendar(&items, month.as_deref(), day.as_deref(), json, |n| n.title.clone())?;
            }
            CalendarSource::Events => {
                let items = client.list_events(None, None).await?;
                show_calendar(&items, month.as_deref(), day.as_deref(), json, |e| e.name.clone())?;
            }
        },

        Commands::Login { email, password } => {
            let mut form = LoginForm::new(email, password);
            match form.submit(&session, &client).await {
                Some(user) => println!("Logged in as {} <{}> ({})", user.name, user.email, user.role),
                None => bail!(form.error.unwrap_or_else(|| "Login failed".to_string())),
            }
        }

        Commands::Logout => {
            session.clear();
            println!("Logged out");
        }

        Commands::Whoami => {
            if !session.is_authenticated() {
                bail!("Not logged in. Run: incubator login <email>");
            }
            let user = session.refresh_me(&client).await?;
            if json {
                print_json(&user)?;
            } else {
                println!("{} <{}>", user.name, user.email);
                println!("  Role: {}", user.role);
            }
        }

        Commands::Register {
            email,
            password,
            code,
        } => {
            let mut flow = RegisterFlow {
                email,
                confirm: password.clone(),
                password,
                ..RegisterFlow::default()
            };
            if let Some(code) = code {
                flow.code = code;
                flow.phase = RegisterPhase::Verify;
            }

            flow.submit(&client).await;
            if let Some(error) = flow.error {
                bail!(error);
            }
            match flow.phase {
                RegisterPhase::Verify => {
                    println!("{}", flow.info.unwrap_or_default());
                    println!("Then run: incubator register {} --code <code>", flow.email.trim());
                }
                RegisterPhase::Done => println!("Account created. You can now log in."),
                RegisterPhase::Request => {}
            }
        }

        Commands::Dashboard => {
            let mut dashboard = Dashboard::new();
            dashboard.load(&cache).await;
            if json {
                print_json(&dashboard)?;
            } else {
                println!("Total startups:   {}", dashboard.total_startups.unwrap_or(0));
                println!("Project views:    {}", dashboard.project_views);
                println!("Engagement rate:  {:.1}%", dashboard.engagement_rate);
                println!("Avg time on page: {}s", dashboard.avg_time_on_page);
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "incubator_portal={0},incubator={0}",
            logging.level
        ))
    });

    // Logs go to stderr so stdout stays parseable
    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn admin_for(resource: Resource, id: u64) -> AdminConsole {
    let mut console = AdminConsole::new();
    console.select(resource);
    console.id = id.to_string();
    console
}

fn finish_admin(console: &AdminConsole, result: Option<&serde_json::Value>) -> anyhow::Result<()> {
    if let Some(error) = &console.error {
        bail!("{}", error);
    }
    if let Some(value) = result {
        print_json(value)?;
    }
    Ok(())
}

/// Inline JSON, or `@path` to read it from a file
fn read_payload(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path)),
        None => Ok(arg.to_string()),
    }
}

fn show_calendar<R, F>(
    records: &[R],
    month: Option<&str>,
    day: Option<&str>,
    json: bool,
    title: F,
) -> anyhow::Result<()>
where
    R: incubator_portal::DatedRecord + Serialize,
    F: Fn(&R) -> String,
{
    if let Some(raw) = month {
        if MonthCursor::parse(raw).is_none() {
            bail!("Invalid month {:?}, expected YYYY-MM", raw);
        }
    }
    let view = CalendarView::with_initial_month(records, month);

    if let Some(day) = day {
        let on_day = incubator_portal::calendar::records_on(records, day);
        if json {
            print_json(&on_day)?;
        } else {
            println!("{}: {} item(s)", day, on_day.len());
            for record in on_day {
                println!("  - {}", title(record));
            }
        }
        return Ok(());
    }

    if json {
        let cells: Vec<serde_json::Value> = view
            .cells()
            .map(|c| {
                serde_json::json!({
                    "date": c.iso,
                    "in_current_month": c.in_current_month,
                    "has_event": c.has_event,
                    "count": c.count,
                })
            })
            .collect();
        return print_json(&cells);
    }

    println!("{:^28}", view.month_label());
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");
    for week in view.weeks() {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                use chrono::Datelike;
                if !cell.in_current_month {
                    "  . ".to_string()
                } else if cell.has_event {
                    format!("{:>2}*{}", cell.date.day(), cell.count.min(9))
                } else {
                    format!("{:>3} ", cell.date.day())
                }
            })
            .collect();
        println!("{}", line.join(""));
    }
    println!();
    println!("* = items on that day (count after the star)");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_categories(values: &[String]) {
    if !values.is_empty() {
        println!();
        println!("Categories: {}", values.join(", "));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
