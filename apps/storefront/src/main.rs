use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, BrowseState, ClientEvent, NoticeKind, StorefrontClient};
use shared::domain::{LessonId, SortAttribute, SortDirection};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured api base url, e.g. http://localhost:3000/api
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List lessons as the storefront would display them.
    Lessons {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        sort: Option<SortAttribute>,
        #[arg(long, default_value = "asc")]
        order: SortDirection,
    },
    /// Book seats and place an order. Repeat --lesson for several seats.
    Order {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long = "lesson", required = true)]
        lessons: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("invalid storefront settings")?;
    if let Some(api_url) = cli.api_url {
        settings = settings.with_api_base_url(&api_url)?;
    }

    let mut client = StorefrontClient::new(settings)?;
    let mut events = client.subscribe_events();

    let outcome = match cli.command {
        Command::Lessons {
            search,
            sort,
            order,
        } => list_lessons(&mut client, search, sort, order).await,
        Command::Order {
            name,
            phone,
            lessons,
        } => place_order(&mut client, name, phone, lessons).await,
    };

    print_notices(&mut events);
    outcome
}

async fn list_lessons(
    client: &mut StorefrontClient,
    search: String,
    sort: Option<SortAttribute>,
    order: SortDirection,
) -> Result<()> {
    let mut browse = BrowseState::new(search);
    browse.sort = sort;
    browse.direction = order;
    client.set_browse(browse).await?;

    println!(
        "{:<26} {:<16} {:<16} {:>9} {:>6} {:>6}",
        "id", "subject", "location", "price", "spaces", "rating"
    );
    for lesson in client.display_lessons() {
        println!(
            "{:<26} {:<16} {:<16} {:>9.2} {:>6} {:>6}",
            lesson.id,
            lesson.subject,
            lesson.location,
            lesson.price,
            lesson.spaces,
            lesson
                .rating
                .map(|rating| rating.to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }
    Ok(())
}

async fn place_order(
    client: &mut StorefrontClient,
    name: String,
    phone: String,
    lessons: Vec<String>,
) -> Result<()> {
    client.load_lessons().await?;
    for raw in lessons {
        let lesson_id = client
            .state()
            .catalog()
            .resolve_id(&raw)
            .cloned()
            .unwrap_or_else(|| LessonId::new(raw));
        client
            .add_to_cart(&lesson_id)
            .with_context(|| format!("cannot book lesson {lesson_id}"))?;
    }
    println!(
        "Cart: {} seat(s), total {:.2}",
        client.state().cart().len(),
        client.cart_total()
    );

    client.set_contact(name, phone);
    let report = client.place_order().await?;
    for (lesson_id, spaces) in report.seat_updates {
        println!("lesson {lesson_id}: {spaces} space(s) left");
    }
    Ok(())
}

fn print_notices(events: &mut broadcast::Receiver<ClientEvent>) {
    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Notice(notice) = event {
            match notice.kind() {
                NoticeKind::Success => println!("{}", notice.message()),
                NoticeKind::Failure => eprintln!("error: {}", notice.message()),
            }
        }
    }
}
