use std::path::{Path, PathBuf};

use afstandmeten_api::auth::Identity;
use afstandmeten_api::types::{SortOrder, TextMatch};
use afstandmeten_api::{AfstandmetenClient, RouteRecord, SearchQuery};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "afstandmeten",
    version,
    about = "Search, favorite and download routes on afstandmeten.nl"
)]
struct Cli {
    #[command(flatten)]
    login: LoginArgs,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LoginArgs {
    /// Account name to log in with
    #[arg(short, long, global = true)]
    user: Option<String>,
    /// Account password
    #[arg(long, env = "AFSTANDMETEN_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Search public routes
    Search {
        /// Text to look for
        text: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your own routes (requires login)
    Mine {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// List your favorite routes (requires login)
    Favorites {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Log in and show the account details
    Whoami,
    /// Add or remove favorites (requires login)
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Delete your own routes (requires login)
    Delete {
        /// Route ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search for a route and download its GPX track
    Download {
        /// Text to look for
        text: String,
        /// Route id among the results (default: the first result)
        #[arg(long)]
        id: Option<String>,
        /// Output directory
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// Add routes to your favorites
    Add {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove routes from your favorites
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Match the text against title or username
    #[arg(long, default_value = "title")]
    by: TextMatch,
    /// Activity as named on the site, e.g. Fietsen
    #[arg(short, long)]
    activity: Option<String>,
    /// Minimum distance in km
    #[arg(long)]
    min_km: Option<f64>,
    /// Maximum distance in km
    #[arg(long)]
    max_km: Option<f64>,
    /// Max results
    #[arg(short, long, default_value = "500")]
    limit: u32,
    /// Sort order: bDESC, bASC (date), aDESC, aASC (distance), tDESC, tASC (title)
    #[arg(short, long, default_value = "bDESC")]
    sort: SortOrder,
}

impl FilterArgs {
    fn apply(self, query: &mut SearchQuery<'_>) {
        query
            .set_text_match(self.by)
            .set_min_km(self.min_km)
            .set_max_km(self.max_km)
            .set_max_results(self.limit)
            .set_sort_order(self.sort);
        if let Some(activity) = self.activity {
            query.set_activity(activity);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut client = AfstandmetenClient::new()?;
    match cli.command {
        Command::Search { text, filter, json } => {
            let mut query = client.search_text(&text);
            filter.apply(&mut query);
            print_routes(query.results()?, json)
        }
        Command::Mine { filter, json } => {
            login(&mut client, cli.login)?;
            let mut query = client.private();
            filter.apply(&mut query);
            print_routes(query.fetch()?, json)
        }
        Command::Favorites { filter, json } => {
            login(&mut client, cli.login)?;
            let mut query = client.favorites();
            filter.apply(&mut query);
            print_routes(query.fetch()?, json)
        }
        Command::Whoami => {
            let identity = login(&mut client, cli.login)?;
            print_identity(&identity);
            logout(&mut client);
            Ok(())
        }
        Command::Favorite { action } => {
            login(&mut client, cli.login)?;
            match action {
                FavoriteAction::Add { ids } => {
                    client.account().add_favorite(&ids)?;
                    println!("Added {} favorite(s).", ids.len());
                }
                FavoriteAction::Remove { ids } => {
                    client.account().delete_favorite(&ids)?;
                    println!("Removed {} favorite(s).", ids.len());
                }
            }
            logout(&mut client);
            Ok(())
        }
        Command::Delete { ids } => {
            login(&mut client, cli.login)?;
            client.account().delete_route(&ids)?;
            println!("Deleted {} route(s).", ids.len());
            logout(&mut client);
            Ok(())
        }
        Command::Download { text, id, output } => {
            cmd_download(&client, &text, id.as_deref(), output.as_deref())
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Default filter covering this binary and the library.
fn log_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("afstandmeten={level},afstandmeten_api={level}")
}

// ── session ──

fn login(client: &mut AfstandmetenClient, args: LoginArgs) -> Result<Identity> {
    let user = args.user.context("--user is required for this command")?;
    let password = args
        .password
        .context("set AFSTANDMETEN_PASSWORD or pass --password")?;
    let identity = client
        .login(&user, &password)
        .with_context(|| format!("login as {user} failed"))?;
    Ok(identity.clone())
}

fn logout(client: &mut AfstandmetenClient) {
    if let Err(e) = client.logout() {
        tracing::warn!("logout failed: {e}");
    }
}

fn print_identity(identity: &Identity) {
    println!("User:    {} (id={})", identity.username, identity.user_id);
    println!("City:    {}", identity.city);
    println!("Country: {}", identity.country);
}

// ── routes ──

fn print_routes(routes: &[RouteRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(routes)?);
        return Ok(());
    }

    for r in routes {
        println!(
            "  [{}] {}  {} - {} ({} km, {}, {}, {} views)",
            r.id,
            r.date,
            r.username,
            r.title,
            r.distance,
            r.activity_type,
            r.location_name,
            r.view_count,
        );
    }
    println!("Total: {}", routes.len());
    Ok(())
}

fn cmd_download(
    client: &AfstandmetenClient,
    text: &str,
    id: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let mut query = client.search_text(text);
    let routes = query.results()?;
    let route = match id {
        Some(id) => routes.iter().find(|r| r.id == id),
        None => routes.first(),
    };
    let Some(route) = route else {
        match id {
            Some(id) => bail!("route {id} is not among the results for \"{text}\""),
            None => bail!("no route matching \"{text}\""),
        }
    };

    let path = client
        .account()
        .download_track(route, output)
        .with_context(|| format!("failed to download route {}", route.id))?;
    println!("Downloaded {} -> {}", route.title, path.display());
    Ok(())
}
