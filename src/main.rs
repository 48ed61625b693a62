use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use quill::api::blog::{Blog, BlogApi, Category, User};
use quill::app::alert::{AlertKind, Alerts};
use quill::app::cache::{EntityCache, EntryKey, EntrySnapshot, EntryStatus};
use quill::app::config::{Config, PathOpt, StrOpt, U64Opt};
use quill::app::forms::{BlogForm, EditBlogForm, FormFlow, ImageAttachment, SubmitOutcome};
use quill::app::mutation::MutationExec;
use quill::app::save::{LOGIN_PROMPT, SaveFlow, SaveOutcome};
use quill::env::Env;
use quill::fs::Fs;
use quill::log::Log;
use quill::net::Net;
use quill::session::Session;
use quill::{ArcPath, ArcStr, os_key};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "A CLI client for the blog platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List blogs, one page at a time
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show a single blog
    Show {
        /// The blog id
        #[arg(required = true)]
        id: String,
    },
    /// Create a new blog
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// The category id the blog belongs to
        #[arg(long)]
        category: String,
    },
    /// Edit an existing blog
    Edit {
        /// The blog id
        #[arg(required = true)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Path to a replacement cover image
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Toggle a blog in or out of the saved list
    Save {
        /// The blog id
        #[arg(required = true)]
        id: String,
    },
    /// List all categories
    Categories,
    /// Show the logged-in user
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize actors
    let env = Env::spawn();
    let fs = Fs::spawn();

    let home = env.var(os_key("HOME")).await?;
    let config_path = Path::new(home.as_ref())
        .join(".config")
        .join("quill")
        .join("config.toml");
    let config = Config::spawn(env.clone(), fs.clone(), ArcPath::from(config_path.as_path()));
    if config.load().await.is_err() {
        config.save().await?;
    }

    let log = Log::spawn(
        fs.clone(),
        config.log_level().await,
        config.u64(U64Opt::LogMaxAgeDays).await as usize,
        config.path(PathOpt::LogDir).await,
    )
    .await?;
    log.collect_garbage().await;

    let session = Session::spawn(env).await;
    let net = Net::spawn(config.clone(), log.clone()).await?;
    let api = BlogApi::spawn(
        net,
        session.clone(),
        config.str(StrOpt::ApiUrl).await,
        log.clone(),
    );
    let cache = EntityCache::spawn(api.clone(), config.clone(), log.clone()).await;
    let alerts = Alerts::spawn(config, log.clone()).await;
    let exec = MutationExec::spawn(api.clone(), cache.clone(), alerts.clone(), log.clone());

    log.info("main", "Starting quill CLI");

    match cli.command {
        Commands::List { page } => handle_list(&cache, page).await?,
        Commands::Show { id } => handle_show(&cache, &id).await?,
        Commands::Create {
            title,
            description,
            category,
        } => {
            let flow = FormFlow::new(api, exec, session, log.clone());
            let form = BlogForm {
                title: ArcStr::from(title.as_str()),
                description: ArcStr::from(description.as_str()),
                category_id: ArcStr::from(category.as_str()),
            };
            handle_submit(flow.submit_new(form).await, &alerts).await;
        }
        Commands::Edit {
            id,
            title,
            description,
            image,
        } => {
            let image = match image {
                Some(path) => Some(load_image(&fs, &path).await?),
                None => None,
            };
            let flow = FormFlow::new(api, exec, session, log.clone());
            let form = EditBlogForm {
                id: ArcStr::from(id.as_str()),
                title: ArcStr::from(title.as_str()),
                description: ArcStr::from(description.as_str()),
                image,
            };
            handle_submit(flow.submit_edit(form).await, &alerts).await;
        }
        Commands::Save { id } => {
            let flow = SaveFlow::new(exec, cache, session);
            match flow.toggle(ArcStr::from(id.as_str())).await {
                SaveOutcome::LoginRequired(_) => eprintln!("{LOGIN_PROMPT}"),
                SaveOutcome::Resolved(status) => {
                    log.info("main", format!("save toggle on {id} ended as {status:?}"));
                    print_alert(&alerts).await;
                }
            }
        }
        Commands::Categories => handle_categories(&cache).await?,
        Commands::Whoami => handle_whoami(&cache).await?,
    }

    log.flush().await?;
    Ok(())
}

/// Reads an entry and waits for its background fetch to settle.
async fn read_through(cache: &EntityCache, key: EntryKey) -> anyhow::Result<EntrySnapshot> {
    let mut snapshot = cache.read(key.clone()).await;
    while snapshot.status == EntryStatus::Pending {
        tokio::time::sleep(Duration::from_millis(25)).await;
        snapshot = cache.peek(key.clone()).await;
    }
    if !snapshot.has_value() {
        anyhow::bail!("Failed to load {key}");
    }
    Ok(snapshot)
}

async fn handle_list(cache: &EntityCache, page: usize) -> anyhow::Result<()> {
    let snapshot = read_through(cache, EntryKey::blog_list(page)).await?;
    let blogs: Vec<Blog> = serde_json::from_value(snapshot.value.unwrap_or_default())?;
    if blogs.is_empty() {
        println!("No blogs on page {page}.");
        return Ok(());
    }
    for blog in blogs {
        println!("{}  {}", blog.id, blog.title);
    }
    Ok(())
}

async fn handle_show(cache: &EntityCache, id: &str) -> anyhow::Result<()> {
    let snapshot = read_through(cache, EntryKey::blog(id)).await?;
    let blog: Blog = serde_json::from_value(snapshot.value.unwrap_or_default())?;
    println!("{}", blog.title);
    if let Some(image) = &blog.blog_image {
        println!("cover: {image}");
    }
    println!();
    println!("{}", blog.description);
    Ok(())
}

async fn handle_categories(cache: &EntityCache) -> anyhow::Result<()> {
    let snapshot = read_through(cache, EntryKey::categories()).await?;
    let categories: Vec<Category> = serde_json::from_value(snapshot.value.unwrap_or_default())?;
    for category in categories {
        println!("{}  {}", category.id, category.title);
    }
    Ok(())
}

async fn handle_whoami(cache: &EntityCache) -> anyhow::Result<()> {
    let snapshot = read_through(cache, EntryKey::current_user()).await?;
    let user: User = serde_json::from_value(snapshot.value.unwrap_or_default())?;
    println!("{} <{}>", user.name, user.email);
    if !user.saved_blogs.is_empty() {
        println!("saved blogs:");
        for id in user.saved_blogs {
            println!("  {id}");
        }
    }
    Ok(())
}

async fn handle_submit(outcome: SubmitOutcome, alerts: &Alerts) {
    match outcome {
        SubmitOutcome::Invalid(errors) => {
            for error in errors {
                eprintln!("{error}");
            }
        }
        SubmitOutcome::LoginRequired => eprintln!("You need to login first!"),
        SubmitOutcome::InFlight => eprintln!("A submission is already running."),
        SubmitOutcome::Navigate(_) | SubmitOutcome::Stayed => print_alert(alerts).await,
    }
}

async fn load_image(fs: &Fs, path: &Path) -> anyhow::Result<ImageAttachment> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs.read(ArcPath::from(path)).await?;
    Ok(ImageAttachment {
        filename: ArcStr::from(filename.as_str()),
        bytes,
    })
}

async fn print_alert(alerts: &Alerts) {
    if let Some(alert) = alerts.current().await {
        match alert.kind {
            AlertKind::Success | AlertKind::Info => println!("{}", alert.text),
            AlertKind::Error => eprintln!("{}", alert.text),
        }
    }
}
