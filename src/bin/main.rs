use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodmatch::config::Config;
use moodmatch::film::FilmSummary;
use moodmatch::pager::ResultPager;
use moodmatch::search::QUIET_PERIOD;
use moodmatch::session::Session;
use moodmatch::wizard::Advance;

#[derive(Parser, Debug)]
#[command(name = "moodmatch")]
#[command(about = "Mood-based movie recommendation client", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "moodmatch.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the preference wizard and fetch recommendations
    Recommend {
        #[arg(long)]
        mood: String,
        #[arg(long)]
        language: String,
        #[arg(long)]
        genre: String,
        /// Preferred actor, resolved against the catalog
        #[arg(long)]
        actor: Option<String>,
        /// Earliest release year
        #[arg(long)]
        from: Option<i32>,
        /// Latest release year
        #[arg(long)]
        to: Option<i32>,
    },
    /// Find films similar to the best title match for a query
    Similar { title: String },
    /// Search films by free-text description
    Describe { description: String },
    /// Show your liked movies
    Liked,
    /// Show details for one film
    Detail { id: String },
    /// Like a movie
    Like { id: String },
    /// Unlike a movie
    Unlike { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodmatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config, args.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: &Config, command: Command) -> Result<(), moodmatch::Error> {
    let mut session = Session::connect(config).await?;

    match command {
        Command::Recommend {
            mood,
            language,
            genre,
            actor,
            from,
            to,
        } => {
            let prefs = session.preferences_mut();
            prefs.set_mood(Some(mood));
            prefs.set_language(Some(language));
            prefs.set_genre(Some(genre));
            prefs.set_release_date_start(from);
            prefs.set_release_date_end(to);

            if let Some(warning) = prefs.date_range_warning() {
                eprintln!("Warning: {warning}");
            }

            if let Some(name) = actor {
                session.type_actor_query(&name);
                tokio::time::sleep(QUIET_PERIOD + Duration::from_millis(100)).await;
                if session.actor_search_error().is_some() {
                    eprintln!("Failed to fetch actors. Please try again.");
                    std::process::exit(1);
                }
                match session.actor_results().into_iter().next() {
                    Some(actor) => {
                        println!("Matched actor: {}", actor.name);
                        session.preferences_mut().set_actor(Some(actor));
                    }
                    None => eprintln!("No actor found for \"{name}\", continuing without one"),
                }
            }

            println!("Shareable link: {}", session.preferences().location("/"));

            loop {
                match session.advance().await? {
                    Advance::Next => continue,
                    Advance::Finished | Advance::None => break,
                }
            }

            match session.results() {
                Some(pager) => print_all_pages(pager.clone(), session.likes()),
                None => println!("No recommendations."),
            }
        }

        Command::Similar { title } => {
            session.type_title_query(&title);
            tokio::time::sleep(QUIET_PERIOD + Duration::from_millis(100)).await;

            if session.title_search_error().is_some() {
                eprintln!("An error occurred while searching films. Please try again.");
                std::process::exit(1);
            }
            let Some(film) = session.title_results().into_iter().next() else {
                println!("No film found for \"{title}\".");
                return Ok(());
            };
            println!("Similar to: {} ({})", film.title, film.id);

            let pager = session.find_similar(&film.id).await?.clone();
            print_all_pages(pager, session.likes());
        }

        Command::Describe { description } => {
            let pager = session.describe(&description).await?.clone();
            print_all_pages(pager, session.likes());
        }

        Command::Liked => {
            let films = session.liked_films().await;
            if films.is_empty() {
                println!("You haven't liked any movies yet.");
            }
            for film in films {
                print_film(&film, true);
            }
        }

        Command::Detail { id } => {
            let film = session.film_detail(&id).await?;
            // backend dates are ISO; show them MM/DD/YYYY as the web app did
            let released = chrono::NaiveDate::parse_from_str(&film.release_date, "%Y-%m-%d")
                .map(|d| d.format("%m/%d/%Y").to_string())
                .unwrap_or_else(|_| film.release_date.clone());
            println!("{} ({})", film.title, released);
            println!("Directed by {}", film.director);
            println!("Language: {}  Genres: {}", film.language, film.genres.join(", "));
            if let Some(rating) = &film.rating {
                println!("Rating: {rating}");
            }
            println!();
            println!("{}", film.description);
            if !film.actors.is_empty() {
                let cast: Vec<&str> = film.actors.iter().map(|a| a.name.as_str()).collect();
                println!();
                println!("Cast: {}", cast.join(", "));
            }
            if let Some(trailer) = &film.trailer_url {
                println!("Trailer: {trailer}");
            }
            if session.likes().is_liked(&film.id) {
                println!();
                println!("♥ in your liked movies");
            }
        }

        Command::Like { id } => {
            session.toggle_like(&id, true).await;
            print_liked_count(&session);
        }

        Command::Unlike { id } => {
            session.toggle_like(&id, false).await;
            print_liked_count(&session);
        }
    }

    Ok(())
}

fn print_liked_count(session: &Session) {
    println!("{} liked movie(s).", session.likes().snapshot().len());
}

fn print_film(film: &FilmSummary, liked: bool) {
    let heart = if liked { "♥" } else { " " };
    let year = film.year.map(|y| format!(" ({y})")).unwrap_or_default();
    let rating = film
        .rating
        .map(|r| format!("  ★ {r:.1}"))
        .unwrap_or_default();
    println!("{heart} [{}] {}{year}{rating}", film.id, film.title);
}

fn print_all_pages(mut pager: ResultPager, likes: &moodmatch::likes::LikeStore) {
    if pager.is_empty() {
        println!("No results found.");
        return;
    }

    for page in 0..pager.page_count() {
        if pager.has_navigation() {
            println!("-- page {}/{} --", page + 1, pager.page_count());
        }
        for film in pager.visible() {
            print_film(film, likes.is_liked(&film.id));
        }
        pager.next();
    }
}
